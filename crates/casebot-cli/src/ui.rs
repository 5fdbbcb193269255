//! UI utilities for the CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use casebot_agent::AgentStep;
use casebot_core::Result;

/// Characters shown per context or tool result in explain mode
pub const PREVIEW_CHARS: usize = 200;

/// Contexts shown per answer in explain mode
pub const PREVIEW_CONTEXTS: usize = 2;

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Display startup banner
pub fn display_banner(title: &str, features: &[&str]) {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = 67usize.min(terminal_width.saturating_sub(4)).max(20);
    let inner = banner_width - 2;

    let pad = |text: &str| " ".repeat(inner.saturating_sub(text.chars().count() + 2));
    let empty_line = format!("│{}│", " ".repeat(inner));

    println!();
    println!("{}", format!("┌{}┐", "─".repeat(inner)).blue());
    println!("{}", empty_line.blue());
    println!("{}{}{}{}", "│  ".blue(), title.blue().bold(), pad(title), "│".blue());
    println!("{}", empty_line.blue());

    for line in features.iter().copied() {
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            println!("{}", format!("│  {}{}│", line, pad(line)).blue());
        }
    }

    println!("{}", empty_line.blue());
    println!("{}", format!("└{}┘", "─".repeat(inner)).blue());
    println!();
    println!(
        "{}",
        "Tip: type your question, or 'help' for commands".dimmed()
    );
    println!();
}

fn redraw(prompt: &ColoredString, input: &str) -> io::Result<()> {
    print!("\r{} {}  \r{} {}", prompt, " ".repeat(60), prompt, input);
    io::stdout().flush()
}

/// Read one line with Up/Down history navigation.
///
/// Returns `None` at end of input (Ctrl+D, Ctrl+C, or EOF when piped).
pub fn read_input(prompt: &str, history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(Some(input));
    }

    let prompt = prompt.green().bold();
    enable_raw_mode()?;
    let result = read_raw_line(&prompt, history);
    disable_raw_mode()?;
    println!();

    let line = result?;
    if let Some(input) = &line {
        if !input.trim().is_empty() {
            history.push(input.clone());
        }
    }
    Ok(line)
}

fn read_raw_line(prompt: &ColoredString, history: &[String]) -> io::Result<Option<String>> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    print!("{} ", prompt);
    io::stdout().flush()?;

    loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        match key_event.code {
            KeyCode::Enter => return Ok(Some(input)),
            KeyCode::Char('c') | KeyCode::Char('d')
                if key_event.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return Ok(None);
            }
            KeyCode::Char(c) => {
                input.push(c);
                redraw(prompt, &input)?;
            }
            KeyCode::Backspace => {
                if input.pop().is_some() {
                    redraw(prompt, &input)?;
                }
            }
            KeyCode::Up if !history.is_empty() => {
                let new_index = match history_index {
                    None => history.len() - 1,
                    Some(idx) => idx.saturating_sub(1),
                };
                history_index = Some(new_index);
                input = history[new_index].clone();
                redraw(prompt, &input)?;
            }
            KeyCode::Down => {
                if let Some(idx) = history_index {
                    if idx + 1 < history.len() {
                        history_index = Some(idx + 1);
                        input = history[idx + 1].clone();
                    } else {
                        history_index = None;
                        input.clear();
                    }
                    redraw(prompt, &input)?;
                }
            }
            KeyCode::Esc => {
                input.clear();
                history_index = None;
                redraw(prompt, &input)?;
            }
            _ => {}
        }
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!("  {} - Ask a question about the case reports", "<question>".green());
    println!("  {} - Toggle showing how each answer was produced", "explain".green());
    println!("  {} - Start a new conversation", "clear".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  Find case reports about knee pain in runners");
    println!("  What treatments were used in those cases?");
}

pub fn print_assistant(text: &str) {
    println!("{} {}", "assistant>".cyan().bold(), text);
    println!();
}

pub fn print_error(message: &str) {
    println!("{} {}", "assistant>".red().bold(), message.red());
    println!();
}

pub fn print_notice(message: &str) {
    println!("{}", message.dimmed());
}

/// Explain-mode lines for the retrieved contexts of one answer
pub fn context_lines(contexts: &[String]) -> Vec<String> {
    if contexts.is_empty() {
        return vec!["No documents were retrieved for this answer.".to_string()];
    }

    contexts
        .iter()
        .take(PREVIEW_CONTEXTS)
        .enumerate()
        .map(|(i, context)| format!("Context {}: {}", i + 1, truncate_chars(context, PREVIEW_CHARS)))
        .collect()
}

/// Explain-mode lines for the steps of an agent run
pub fn step_lines(steps: &[AgentStep]) -> Vec<String> {
    steps
        .iter()
        .map(|step| match step {
            AgentStep::ToolCall { name, arguments } => {
                format!("Tool call: {} with input {}", name, arguments)
            }
            AgentStep::ToolResult { name, output } => {
                format!("Tool result ({}): {}", name, truncate_chars(output, PREVIEW_CHARS))
            }
            AgentStep::ModelResponse { content } => format!("Agent response: {}", content),
        })
        .collect()
}

pub fn print_explain(lines: &[String]) {
    println!("{}", "How this answer was produced:".yellow().bold());
    for line in lines {
        println!("  {}", line.dimmed());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("knee pain", 20), "knee pain");
        assert_eq!(truncate_chars("knee pain", 4), "knee...");
        assert_eq!(truncate_chars("genou douloureux é", 17), "genou douloureux ...");
        assert_eq!(truncate_chars("ééé", 2), "éé...");
    }

    #[test]
    fn test_context_lines() {
        let contexts = vec!["a".repeat(300), "second".to_string(), "third".to_string()];
        let lines = context_lines(&contexts);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!("Context 1: {}...", "a".repeat(200)));
        assert_eq!(lines[1], "Context 2: second");
        assert_eq!(context_lines(&[]).len(), 1);
    }

    #[test]
    fn test_step_lines() {
        let steps = vec![
            AgentStep::ToolCall {
                name: "vector_search".to_string(),
                arguments: json!({"query": "knee pain"}),
            },
            AgentStep::ToolResult {
                name: "vector_search".to_string(),
                output: "b".repeat(250),
            },
            AgentStep::ModelResponse {
                content: "Found it.".to_string(),
            },
        ];

        assert_eq!(
            step_lines(&steps)[0],
            r#"Tool call: vector_search with input {"query":"knee pain"}"#
        );
        assert_eq!(step_lines(&steps)[1].len(), "Tool result (vector_search): ".len() + 203);
        assert_eq!(step_lines(&steps)[2], "Agent response: Found it.");
    }
}
