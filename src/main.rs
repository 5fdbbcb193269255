use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use casebot_agent::{AgentConfig, ToolRouter, default_registry};
use casebot_cli::{
    MemoryKind, apology, build_embedder, build_memory, connect_store, display_banner,
    print_error, run_agent_chat, run_rag_chat, truncate_chars,
};
use casebot_core::{ChatSession, LLMProvider, VectorStore, WELCOME_MESSAGE};
use casebot_openai::OpenAIClient;
use casebot_rag::{LocalVectorStore, RagConfig, RagPipeline};

#[derive(Parser)]
#[command(name = "casebot")]
#[command(about = "Question answering over medical case reports", long_about = None, version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Multi-turn chat answered from the case report store (default)
    Chat {
        /// Show the retrieved contexts behind each answer
        #[arg(long)]
        explain: bool,
        #[arg(long, value_enum, default_value_t = MemoryKind::Summary)]
        memory: MemoryKind,
    },
    /// Chat with the agent that can search case reports and send email
    Agent {
        /// Show tool calls and results behind each answer
        #[arg(long)]
        explain: bool,
    },
    /// Answer a single question and exit
    Ask {
        question: String,
        /// Print the answer, contexts and retrieval status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send text straight to the model, without retrieval
    Passthrough { text: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("casebot=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Chat {
        explain: false,
        memory: MemoryKind::Summary,
    });

    let openai = Arc::new(OpenAIClient::from_env()?);
    let llm: Arc<dyn LLMProvider> = openai.clone();
    let rag_config = RagConfig::from_env()?;

    // passthrough never searches, so skip connecting to the store
    if let Commands::Passthrough { text } = &command {
        let store: Arc<dyn VectorStore> = Arc::new(LocalVectorStore::new());
        let pipeline = RagPipeline::new(store, llm, rag_config);
        match pipeline.passthrough(text).await {
            Ok(reply) => println!("{}", reply),
            Err(e) => {
                print_error(&apology(&e));
                return Err(e.into());
            }
        }
        return Ok(());
    }

    let embedder = build_embedder(rag_config.embeddings, openai.clone());
    let store = connect_store(&rag_config, embedder).await?;

    match command {
        Commands::Chat { explain, memory } => {
            let pipeline = RagPipeline::new(store, llm.clone(), rag_config);
            let mut session = ChatSession::with_greeting(WELCOME_MESSAGE);
            if let Some(memory) = build_memory(memory, llm) {
                session = session.with_memory(memory);
            }

            display_banner(
                "casebot - case report chat",
                &[
                    "Answers grounded in the case report collection",
                    "",
                    "Commands: explain, clear, help, exit",
                ],
            );
            run_rag_chat(&pipeline, session, explain).await?;
        }
        Commands::Agent { explain } => {
            let agent_config = AgentConfig::from_env()?;
            let registry = Arc::new(default_registry(store, &agent_config)?);
            let tool_names = registry.tool_names().join(", ");
            let router = ToolRouter::new(llm, registry, agent_config);

            let tools_line = format!("Tools: {}", tool_names);
            display_banner(
                "casebot - healthcare agent",
                &[
                    "Searches case reports and sends email on request",
                    tools_line.as_str(),
                    "",
                    "Commands: explain, clear, help, exit",
                ],
            );
            run_agent_chat(&router, explain).await?;
        }
        Commands::Ask { question, json } => {
            let pipeline = RagPipeline::new(store, llm, rag_config);
            let answer = match pipeline.query(&question, "").await {
                Ok(answer) => answer,
                Err(e) => {
                    print_error(&apology(&e));
                    return Err(e.into());
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                println!("{}", answer.answer);
                if !answer.contexts.is_empty() {
                    println!();
                    println!("{}", "Contexts:".bold());
                    for (i, context) in answer.contexts.iter().enumerate() {
                        println!("  {}. {}", i + 1, truncate_chars(context, 200).dimmed());
                    }
                }
            }
        }
        Commands::Passthrough { .. } => {}
    }

    Ok(())
}
