//! Terminal interface for casebot
//!
//! Banner, line input with history, explain-mode rendering and the two
//! interactive loops: retrieval chat and agent chat.

pub mod chat;
pub mod setup;
pub mod ui;

pub use chat::{ChatCommand, apology, run_agent_chat, run_rag_chat};
pub use setup::{MemoryKind, build_embedder, build_memory, connect_store};
pub use ui::{display_banner, print_assistant, print_error, print_notice, truncate_chars};
