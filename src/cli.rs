use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the character encoding declared by a document.
    Encoding(EncodingArgs),
    /// Print preview metadata (JSON) for a saved document.
    Extract(ExtractArgs),
    /// Condense plain-text paragraphs into a bounded description.
    Summarize(SummarizeArgs),
    /// Fetch a page and print its preview metadata (JSON).
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
pub struct EncodingArgs {
    /// Document path (`-` reads stdin).
    #[arg(long)]
    pub file: String,

    /// `Content-Type` header value sent with the document.
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Document path (`-` reads stdin).
    #[arg(long)]
    pub file: String,

    /// URL the document was fetched from (used to resolve relative links).
    #[arg(long)]
    pub url: String,

    /// `Content-Type` header value sent with the document.
    #[arg(long)]
    pub content_type: Option<String>,

    /// Encoding to try before any declared one.
    #[arg(long)]
    pub encoding: Option<String>,

    /// Description length after which no further paragraphs are added.
    #[arg(long, default_value_t = 200)]
    pub min_size: usize,

    /// Hard cap on description length, in characters.
    #[arg(long, default_value_t = 500)]
    pub max_size: usize,
}

#[derive(Debug, Args)]
pub struct SummarizeArgs {
    /// Plain-text path; paragraphs are separated by blank lines (`-` reads stdin).
    #[arg(long)]
    pub file: String,

    /// Summary length after which no further paragraphs are added.
    #[arg(long, default_value_t = 200)]
    pub min_size: usize,

    /// Hard cap on summary length, in characters.
    #[arg(long, default_value_t = 500)]
    pub max_size: usize,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Page URL (must be http/https).
    #[arg(long)]
    pub url: String,

    /// Maximum response body bytes to read.
    #[arg(long, default_value_t = 2 * 1024 * 1024)]
    pub max_bytes: usize,

    /// Request timeout.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Description length after which no further paragraphs are added.
    #[arg(long, default_value_t = 200)]
    pub min_size: usize,

    /// Hard cap on description length, in characters.
    #[arg(long, default_value_t = 500)]
    pub max_size: usize,
}
