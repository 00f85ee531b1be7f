//! Auxiliary tools: web search fallback, translation, coping tips, professional
//! resources, date, and history export.

pub mod coping;
pub mod date;
pub mod error;
pub mod history;
pub mod professional;
pub mod search;
pub mod translate;

pub use error::ToolError;
pub use search::{DuckDuckGoSearch, WebSearch};
pub use translate::{Language, Translator};
