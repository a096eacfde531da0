#![forbid(unsafe_code)]

pub mod cli;
pub mod encoding;
pub mod extract;
pub mod fetch;
pub mod formats;
pub mod input;
pub mod logging;
pub mod summarize;
pub mod text;

pub use encoding::resolve_encoding;
pub use extract::extract_metadata;
pub use formats::{OgMetadata, SummaryBudget};
pub use summarize::summarize;
