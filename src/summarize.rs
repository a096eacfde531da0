use std::sync::LazyLock;

use regex::Regex;

use crate::cli::SummarizeArgs;
use crate::formats::SummaryBudget;
use crate::input::read_input;

/// Appended when a description had to be cut short.
pub const ELLIPSIS: char = '…';

const PARAGRAPH_SEPARATOR: &str = "\n\n";

static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\t \r\n]+").expect("valid whitespace regex"));

pub fn run(args: SummarizeArgs) -> anyhow::Result<()> {
    let budget = SummaryBudget::new(args.min_size, args.max_size)?;
    let body = read_input(&args.file)?;
    let text = String::from_utf8_lossy(&body);

    let paragraphs = split_paragraphs(&text);
    tracing::debug!(paragraphs = paragraphs.len(), ?budget, "summarizing");

    println!(
        "{}",
        summarize(&paragraphs, budget.min_size, budget.max_size)
    );
    Ok(())
}

/// Splits plain text into paragraphs separated by blank lines.
#[must_use]
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

/// Builds a description of roughly `min_size..=max_size` characters from
/// paragraphs taken in order.
///
/// Whole paragraphs are joined with a blank line until the text reaches
/// `min_size`. A paragraph that would push it past `max_size` is cut at the
/// last word that fits and followed by an ellipsis, so the result never
/// exceeds `max_size`. When not even one word of that paragraph fits, the
/// summary ends at the last whole paragraph instead. Whitespace runs inside
/// each paragraph collapse to a single space first; paragraphs left empty are
/// dropped.
#[must_use]
pub fn summarize<S: AsRef<str>>(paragraphs: &[S], min_size: usize, max_size: usize) -> String {
    let mut summary = String::new();
    let mut len = 0_usize;

    for paragraph in paragraphs {
        let paragraph = collapse_whitespace(paragraph.as_ref());
        if paragraph.is_empty() {
            continue;
        }

        let separator = if summary.is_empty() {
            ""
        } else {
            PARAGRAPH_SEPARATOR
        };
        let added = separator.len() + paragraph.chars().count();

        if len + added <= max_size {
            summary.push_str(separator);
            summary.push_str(&paragraph);
            len += added;
            if len >= min_size {
                return summary;
            }
            continue;
        }

        // One character of the budget belongs to the ellipsis.
        let truncated = match max_size.checked_sub(len + separator.len() + 1) {
            Some(remaining) => truncate_at_word(&paragraph, remaining),
            None => "",
        };
        if truncated.is_empty() && !summary.is_empty() {
            return summary;
        }
        summary.push_str(separator);
        summary.push_str(truncated);
        summary.push(ELLIPSIS);
        return summary;
    }

    summary
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(text, " ").trim().to_owned()
}

/// Cuts `text` to at most `limit` characters without splitting a word,
/// unless the first word alone is longer than `limit`.
fn truncate_at_word(text: &str, limit: usize) -> &str {
    let Some((cut, next)) = text.char_indices().nth(limit) else {
        return text;
    };
    if limit == 0 {
        return "";
    }

    let head = &text[..cut];
    if next.is_whitespace() {
        return head.trim_end();
    }
    match head.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => head[..idx].trim_end(),
        _ => head,
    }
}
