use std::borrow::Cow;
use std::sync::LazyLock;

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use regex::bytes::Regex as BytesRegex;

use crate::cli::EncodingArgs;
use crate::input::read_input;

/// Label returned when neither the document nor the header declares one.
pub const FALLBACK_ENCODING: &str = "utf-8";

/// In-document declarations must appear near the top; only this many bytes are scanned.
const HEAD_SCAN_BYTES: usize = 1024;

static META_CHARSET_RE: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r#"(?i-u)<\s*meta[^>]*charset\s*=\s*["']?([a-z0-9_:.-]+)"#)
        .expect("valid meta charset regex")
});

static XML_ENCODING_RE: LazyLock<BytesRegex> = LazyLock::new(|| {
    BytesRegex::new(r#"(?i-u)\A\s*<\s*\?\s*xml[^>]*encoding\s*=\s*["']([a-z0-9_:.-]+)["']"#)
        .expect("valid xml encoding regex")
});

static HEADER_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i);\s*charset\s*=\s*["']?([^"';\s]+)"#).expect("valid header charset regex")
});

pub fn run(args: EncodingArgs) -> anyhow::Result<()> {
    let body = read_input(&args.file)?;
    let label = resolve_encoding(&body, args.content_type.as_deref());
    println!("{label}");
    Ok(())
}

/// Determines the character encoding label for a raw HTML body.
///
/// Signals are consulted in order: `<meta charset>`, the XML declaration, the
/// `charset` parameter of the `Content-Type` header. The first one present
/// wins; `"utf-8"` is returned when none is. Labels are returned verbatim and
/// are not validated here.
#[must_use]
pub fn resolve_encoding(body: &[u8], content_type: Option<&str>) -> String {
    let head = &body[..body.len().min(HEAD_SCAN_BYTES)];

    let label = meta_charset(head)
        .or_else(|| xml_encoding(head))
        .or_else(|| content_type.and_then(header_charset));

    label.unwrap_or_else(|| FALLBACK_ENCODING.to_owned())
}

fn meta_charset(head: &[u8]) -> Option<String> {
    capture_label(&META_CHARSET_RE, head)
}

fn xml_encoding(head: &[u8]) -> Option<String> {
    capture_label(&XML_ENCODING_RE, head)
}

fn capture_label(re: &BytesRegex, head: &[u8]) -> Option<String> {
    let value = re.captures(head)?.get(1)?;
    Some(String::from_utf8_lossy(value.as_bytes()).into_owned())
}

fn header_charset(content_type: &str) -> Option<String> {
    let value = HEADER_CHARSET_RE.captures(content_type)?.get(1)?;
    Some(value.as_str().to_owned())
}

/// Looks up a decoder for `label`, if it names an encoding.
#[must_use]
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Decodes `body` as `label`, replacing malformed sequences with U+FFFD.
///
/// Unknown labels decode as UTF-8. A byte order mark overrides the label.
#[must_use]
pub fn decode_lossy<'a>(body: &'a [u8], label: &str) -> Cow<'a, str> {
    let encoding = match encoding_for_label(label) {
        Some(encoding) => encoding,
        None => {
            tracing::debug!(label, "unrecognized encoding label; decoding as utf-8");
            UTF_8
        }
    };

    let (text, used, had_errors) = encoding.decode(body);
    if had_errors {
        tracing::debug!(
            encoding = used.name(),
            "document contained malformed byte sequences"
        );
    }
    text
}
