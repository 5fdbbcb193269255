//! Retrieval-augmented query pipeline

use std::sync::Arc;
use tracing::{debug, warn};

use casebot_core::{
    Answer, ChatMessage, ChatSession, ConversationMemory, Error, LLMProvider, Result,
    RetrievalStatus, VectorStore,
};

use crate::config::RagConfig;

const GUARDRAIL: &str = "Answer only from the relevant documents and the conversation history \
below. If they do not contain the answer, say that you could not find it in the case reports. \
Do not present a diagnosis or treatment as a certainty.";

const CONVERSATION_PREAMBLE: &str = "The following is a friendly conversation between a human \
and an AI. The AI is talkative and provides lots of specific details from its context. If the AI \
does not know the answer to a question, it truthfully says it does not know.";

/// Everything the answer prompt is rendered from
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub question: String,
    pub history: String,
    /// Retrieved contents, in store order
    pub documents: Vec<String>,
}

impl PromptContext {
    pub fn new(question: impl Into<String>, history: impl Into<String>, documents: Vec<String>) -> Self {
        Self {
            question: question.into(),
            history: history.into(),
            documents,
        }
    }

    /// Render the answer prompt. The history section is left out when empty.
    pub fn render(&self) -> String {
        let mut prompt = String::from(
            "You are an assistant answering questions about medical case reports.\n",
        );
        prompt.push_str(GUARDRAIL);
        prompt.push_str(&format!("\n\nPrompt: {}\n", self.question));

        if !self.history.trim().is_empty() {
            prompt.push_str(&format!("\nConversation history:\n{}\n", self.history.trim_end()));
        }

        prompt.push_str("\nRelevant Documents:\n");
        if self.documents.is_empty() {
            prompt.push_str("(none found)\n");
        } else {
            prompt.push_str(&self.documents.join("\n\n"));
            prompt.push('\n');
        }
        prompt
    }

    /// Wrap the rendered prompt as the next human line of a remembered conversation
    pub fn render_conversation(&self, conversation: &str) -> String {
        format!(
            "{}\n\nCurrent conversation:\n{}\nHuman: {}\nAI:",
            CONVERSATION_PREAMBLE,
            conversation.trim_end(),
            self.render()
        )
    }
}

/// Answers questions from vector store context.
///
/// The pipeline holds no per-user state: history is passed in, either as text
/// or as the memory of a [`ChatSession`].
pub struct RagPipeline<V: VectorStore + ?Sized, L: LLMProvider + ?Sized> {
    vector_store: Arc<V>,
    llm: Arc<L>,
    config: RagConfig,
}

impl<V: VectorStore + ?Sized, L: LLMProvider + ?Sized> RagPipeline<V, L> {
    pub fn new(vector_store: Arc<V>, llm: Arc<L>, config: RagConfig) -> Self {
        Self {
            vector_store,
            llm,
            config,
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn vector_store(&self) -> &Arc<V> {
        &self.vector_store
    }

    fn validate(question: &str) -> Result<&str> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }
        Ok(question)
    }

    /// Search the store; failures degrade to an empty context
    async fn retrieve(&self, question: &str) -> (Vec<String>, RetrievalStatus) {
        let search = self
            .vector_store
            .similarity_search_with_score(question, &self.config.search_config())
            .await;

        match search {
            Ok(result) if result.is_empty() => {
                debug!(collection = self.vector_store.collection_name(), "no documents retrieved");
                (Vec::new(), RetrievalStatus::Empty)
            }
            Ok(result) => {
                debug!(count = result.documents.len(), "documents retrieved");
                let contents = result.documents.into_iter().map(|d| d.content).collect();
                (contents, RetrievalStatus::Retrieved)
            }
            Err(e) => {
                warn!(error = %e, "retrieval failed, answering without documents");
                (Vec::new(), RetrievalStatus::Failed(e.to_string()))
            }
        }
    }

    /// Stateless query with optional history text
    pub async fn query(&self, question: &str, history: &str) -> Result<Answer> {
        let question = Self::validate(question)?;
        let (contexts, retrieval) = self.retrieve(question).await;

        let prompt = PromptContext::new(question, history, contexts.clone()).render();
        let result = self.llm.generate(&prompt).await?;

        Ok(Answer {
            answer: result.text,
            contexts,
            retrieval,
        })
    }

    /// Query through conversation memory, saving the turn afterwards
    pub async fn query_with_memory(
        &self,
        question: &str,
        memory: &mut dyn ConversationMemory,
    ) -> Result<Answer> {
        let question = Self::validate(question)?;
        let (contexts, retrieval) = self.retrieve(question).await;

        let context = PromptContext::new(question, "", contexts.clone());
        let prompt = context.render_conversation(&memory.history());
        let result = self.llm.generate(&prompt).await?;

        if let Err(e) = memory.save_turn(question, &result.text).await {
            warn!(error = %e, "failed to save conversation turn");
        }

        Ok(Answer {
            answer: result.text,
            contexts,
            retrieval,
        })
    }

    /// Run one turn of a chat session, recording both sides in its messages.
    ///
    /// On failure the session gets an apology message and the error is
    /// returned to the caller.
    pub async fn query_in_session(&self, question: &str, session: &mut ChatSession) -> Result<Answer> {
        let question = Self::validate(question)?;
        session.push(ChatMessage::user(question));

        let result = match session.memory_mut() {
            Some(memory) => self.query_with_memory(question, memory).await,
            None => self.query(question, "").await,
        };

        match result {
            Ok(answer) => {
                session.push(ChatMessage::assistant(answer.answer.clone()));
                Ok(answer)
            }
            Err(e) => {
                session.push(ChatMessage::assistant(format!(
                    "Sorry, I encountered an error: {}",
                    e
                )));
                Err(e)
            }
        }
    }

    /// Send text straight to the model, without retrieval
    pub async fn passthrough(&self, text: &str) -> Result<String> {
        let text = Self::validate(text)?;
        Ok(self.llm.generate(text).await?.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::BufferMemory;
    use casebot_core::testing::{ScriptedLLM, StaticStore};
    use casebot_core::{Role, WELCOME_MESSAGE};

    fn pipeline(store: StaticStore, llm: ScriptedLLM) -> (RagPipeline<StaticStore, ScriptedLLM>, Arc<StaticStore>, Arc<ScriptedLLM>) {
        let store = Arc::new(store);
        let llm = Arc::new(llm);
        let pipeline = RagPipeline::new(store.clone(), llm.clone(), RagConfig::default());
        (pipeline, store, llm)
    }

    fn case_reports() -> StaticStore {
        StaticStore::with_documents(vec![
            ("Case 1: 45 year old runner with anterior knee pain.", 0.91),
            ("Case 2: meniscal tear after a skiing fall.", 0.87),
            ("Case 3: osteoarthritis of the knee in an elderly patient.", 0.80),
            ("Case 4: patellar tendinopathy in a basketball player.", 0.78),
            ("Case 5: septic arthritis presenting as knee swelling.", 0.70),
        ])
    }

    #[tokio::test]
    async fn test_query_returns_answer_and_contexts_in_order() {
        let (pipeline, store, llm) =
            pipeline(case_reports(), ScriptedLLM::answering("Several knee cases were found."));

        let answer = pipeline.query("knee pain", "").await.unwrap();

        assert_eq!(answer.answer, "Several knee cases were found.");
        assert_eq!(answer.contexts.len(), 4);
        assert!(answer.contexts[0].starts_with("Case 1"));
        assert!(answer.contexts[3].starts_with("Case 4"));
        assert_eq!(answer.retrieval, RetrievalStatus::Retrieved);
        assert_eq!(store.searches(), vec!["knee pain"]);
        assert_eq!(llm.call_count(), 1);

        let prompt = &llm.requests()[0].messages[0].content;
        assert!(prompt.contains("Prompt: knee pain"));
        assert!(prompt.contains("Case 2: meniscal tear"));
        assert!(!prompt.contains("Case 5"));
    }

    #[tokio::test]
    async fn test_query_with_empty_store_degrades() {
        let (pipeline, _, llm) = pipeline(StaticStore::empty(), ScriptedLLM::answering("I could not find that."));

        let answer = pipeline.query("knee pain", "").await.unwrap();

        assert_eq!(answer.answer, "I could not find that.");
        assert!(answer.contexts.is_empty());
        assert_eq!(answer.retrieval, RetrievalStatus::Empty);
        assert!(llm.requests()[0].messages[0].content.contains("(none found)"));
    }

    #[tokio::test]
    async fn test_query_with_store_error_degrades() {
        let (pipeline, _, _) = pipeline(
            StaticStore::unreachable("connection refused"),
            ScriptedLLM::answering("No documents available."),
        );

        let answer = pipeline.query("knee pain", "").await.unwrap();

        assert!(answer.contexts.is_empty());
        assert!(answer.retrieval.is_degraded());
        assert!(matches!(answer.retrieval, RetrievalStatus::Failed(ref r) if r.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_provider_failure_is_an_error() {
        let (pipeline, _, _) = pipeline(case_reports(), ScriptedLLM::new().then_fail("upstream 500"));

        let err = pipeline.query("knee pain", "").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn test_empty_question_makes_no_calls() {
        let (pipeline, store, llm) = pipeline(case_reports(), ScriptedLLM::new());

        let err = pipeline.query("   ", "").await.unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(store.searches().is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_history_is_rendered_into_prompt() {
        let (pipeline, _, llm) = pipeline(case_reports(), ScriptedLLM::answering("ok"));

        pipeline
            .query("which one was a skier?", "Human: knee pain cases?\nAI: I found five.")
            .await
            .unwrap();

        let prompt = &llm.requests()[0].messages[0].content;
        assert!(prompt.contains("Conversation history:\nHuman: knee pain cases?\nAI: I found five."));
    }

    #[tokio::test]
    async fn test_query_with_memory_saves_turn() {
        let (pipeline, _, llm) = pipeline(
            case_reports(),
            ScriptedLLM::new().then_reply("Case 2 was a skier.").then_reply("It was a meniscal tear."),
        );
        let mut memory = BufferMemory::default();

        pipeline.query_with_memory("who was a skier?", &mut memory).await.unwrap();
        assert_eq!(memory.history(), "Human: who was a skier?\nAI: Case 2 was a skier.");

        pipeline.query_with_memory("what was the injury?", &mut memory).await.unwrap();
        let prompt = &llm.requests()[1].messages[0].content;
        assert!(prompt.contains("Current conversation:\nHuman: who was a skier?\nAI: Case 2 was a skier.\nHuman: "));
        assert!(prompt.ends_with("AI:"));
    }

    #[tokio::test]
    async fn test_query_in_session_records_messages() {
        let (pipeline, _, _) = pipeline(case_reports(), ScriptedLLM::answering("Five cases."));
        let mut session = ChatSession::with_greeting(WELCOME_MESSAGE)
            .with_memory(Box::new(BufferMemory::default()));

        pipeline.query_in_session("knee pain", &mut session).await.unwrap();

        let roles: Vec<Role> = session.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(session.messages()[2].content, "Five cases.");
        assert_eq!(
            session.memory_mut().unwrap().history(),
            "Human: knee pain\nAI: Five cases."
        );

        session.clear();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.memory_mut().unwrap().history(), "");
    }

    #[tokio::test]
    async fn test_query_in_session_apologises_on_provider_error() {
        let (pipeline, _, _) = pipeline(case_reports(), ScriptedLLM::new().then_fail("timeout"));
        let mut session = ChatSession::new();

        let err = pipeline.query_in_session("knee pain", &mut session).await.unwrap_err();

        assert!(err.is_provider_failure());
        let last = session.messages().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.content.starts_with("Sorry, I encountered an error:"));
    }

    #[tokio::test]
    async fn test_retrieval_is_idempotent() {
        let (pipeline, _, _) = pipeline(case_reports(), ScriptedLLM::answering("same"));

        let first = pipeline.query("knee pain", "").await.unwrap();
        let second = pipeline.query("knee pain", "").await.unwrap();
        assert_eq!(first.contexts, second.contexts);
    }

    #[tokio::test]
    async fn test_passthrough_skips_retrieval() {
        let (pipeline, store, llm) = pipeline(case_reports(), ScriptedLLM::new());

        let reply = pipeline.passthrough("hello there").await.unwrap();

        assert_eq!(reply, "echo: hello there");
        assert!(store.searches().is_empty());
        assert_eq!(llm.requests()[0].messages[0].content, "hello there");
    }
}
