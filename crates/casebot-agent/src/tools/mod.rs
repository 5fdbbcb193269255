//! Built-in tools

mod send_email;
mod vector_search;

pub use send_email::{DEFAULT_SUBJECT, EmailPayload, SendEmailTool};
pub use vector_search::{SEARCH_RESULT_LIMIT, VectorSearchTool};
