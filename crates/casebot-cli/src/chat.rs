//! Interactive chat loops

use colored::*;

use casebot_agent::ToolRouter;
use casebot_core::{ChatSession, Error, LLMProvider, Result, RetrievalStatus, VectorStore};
use casebot_rag::RagPipeline;

use crate::ui::{
    context_lines, print_assistant, print_error, print_explain, print_help, print_notice,
    read_input, step_lines,
};

/// What one line of user input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Exit,
    Help,
    Clear,
    ToggleExplain,
    Empty,
    Message(String),
}

impl ChatCommand {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "" => ChatCommand::Empty,
            "exit" | "quit" => ChatCommand::Exit,
            "help" => ChatCommand::Help,
            "clear" => ChatCommand::Clear,
            "explain" => ChatCommand::ToggleExplain,
            _ => ChatCommand::Message(trimmed.to_string()),
        }
    }
}

/// Rendering of a provider or other failure shown in place of an answer
pub fn apology(error: &Error) -> String {
    format!("Sorry, I encountered an error: {}", error)
}

/// Outcome of handling one control command
enum Control {
    Continue,
    Quit,
    Ask(String),
}

fn handle_command(command: ChatCommand, session: &mut ChatSession, explain: &mut bool) -> Control {
    match command {
        ChatCommand::Empty => Control::Continue,
        ChatCommand::Exit => {
            println!("{}", "Goodbye!".green());
            Control::Quit
        }
        ChatCommand::Help => {
            print_help();
            Control::Continue
        }
        ChatCommand::Clear => {
            session.clear();
            print_notice("Conversation cleared.");
            if let Some(greeting) = session.messages().first() {
                print_assistant(&greeting.content);
            }
            Control::Continue
        }
        ChatCommand::ToggleExplain => {
            *explain = !*explain;
            print_notice(if *explain { "Explain mode on." } else { "Explain mode off." });
            Control::Continue
        }
        ChatCommand::Message(text) => Control::Ask(text),
    }
}

/// Multi-turn chat over the retrieval pipeline
pub async fn run_rag_chat<V, L>(
    pipeline: &RagPipeline<V, L>,
    mut session: ChatSession,
    mut explain: bool,
) -> Result<()>
where
    V: VectorStore + ?Sized,
    L: LLMProvider + ?Sized,
{
    if let Some(greeting) = session.messages().first() {
        print_assistant(&greeting.content);
    }

    let mut history = Vec::new();
    while let Some(input) = read_input("you>", &mut history)? {
        let question = match handle_command(ChatCommand::parse(&input), &mut session, &mut explain) {
            Control::Continue => continue,
            Control::Quit => return Ok(()),
            Control::Ask(question) => question,
        };

        match pipeline.query_in_session(&question, &mut session).await {
            Ok(answer) => {
                print_assistant(&answer.answer);
                if let RetrievalStatus::Failed(reason) = &answer.retrieval {
                    print_notice(&format!("(case reports unavailable: {})", reason));
                }
                if explain {
                    print_explain(&context_lines(&answer.contexts));
                }
            }
            Err(e) => print_error(&apology(&e)),
        }
    }

    Ok(())
}

/// Multi-turn chat with the tool-calling agent
pub async fn run_agent_chat<L>(router: &ToolRouter<L>, mut explain: bool) -> Result<()>
where
    L: LLMProvider + ?Sized,
{
    let mut session = ChatSession::new();
    let mut history = Vec::new();

    while let Some(input) = read_input("you>", &mut history)? {
        let message = match handle_command(ChatCommand::parse(&input), &mut session, &mut explain) {
            Control::Continue => continue,
            Control::Quit => return Ok(()),
            Control::Ask(message) => message,
        };

        match router.run_in_session(&message, &mut session).await {
            Ok(run) => {
                if explain {
                    print_explain(&step_lines(&run.steps));
                }
                print_assistant(&run.answer);
            }
            Err(e) => print_error(&apology(&e)),
        }
    }

    Ok(())
}
