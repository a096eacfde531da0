//! Visible-text traversal of a parsed document.
//!
//! The walk produces a flat stream of [`TextEvent`]s in document order. Inline
//! phrasing elements are transparent, so `Hello <b>World</b>` stays one run.
//! Any other element, and every comment, closes the current run. Elements that
//! never render as body text are skipped with their whole subtree.

use scraper::{ElementRef, Node};

/// Nesting beyond this depth is treated as a single boundary.
const MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEvent<'a> {
    /// A text node outside any skipped subtree.
    Text(&'a str),
    /// A block element edge or a comment.
    Boundary,
    /// A subtree that was not visited; carries the element name.
    Skipped(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Skip,
    Inline,
    Block,
}

fn element_kind(name: &str) -> ElementKind {
    match name {
        "script" | "style" | "noscript" | "template" | "header" | "nav" | "aside" | "footer" => {
            ElementKind::Skip
        }
        "a" | "abbr" | "b" | "bdi" | "bdo" | "big" | "cite" | "code" | "data" | "del" | "dfn"
        | "em" | "font" | "i" | "img" | "ins" | "kbd" | "label" | "mark" | "q" | "s" | "samp"
        | "small" | "span" | "strike" | "strong" | "sub" | "sup" | "time" | "tt" | "u"
        | "var" | "wbr" => ElementKind::Inline,
        _ => ElementKind::Block,
    }
}

/// Walks the children of `root` and returns the visible-text events.
#[must_use]
pub fn visible_text_events(root: ElementRef<'_>) -> Vec<TextEvent<'_>> {
    let mut events = Vec::new();
    walk(root, 0, &mut events);
    events
}

fn walk<'a>(element: ElementRef<'a>, depth: usize, events: &mut Vec<TextEvent<'a>>) {
    if depth > MAX_DEPTH {
        events.push(TextEvent::Boundary);
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => events.push(TextEvent::Text(text)),
            Node::Comment(_) => events.push(TextEvent::Boundary),
            Node::Element(data) => {
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                match element_kind(data.name()) {
                    ElementKind::Skip => events.push(TextEvent::Skipped(data.name())),
                    ElementKind::Inline => walk(child_element, depth + 1, events),
                    ElementKind::Block => {
                        events.push(TextEvent::Boundary);
                        walk(child_element, depth + 1, events);
                        events.push(TextEvent::Boundary);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Folds an event stream into trimmed, non-empty paragraphs.
#[must_use]
pub fn fold_paragraphs<'a, I>(events: I) -> Vec<String>
where
    I: IntoIterator<Item = TextEvent<'a>>,
{
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for event in events {
        match event {
            TextEvent::Text(text) => current.push_str(text),
            TextEvent::Boundary | TextEvent::Skipped(_) => flush(&mut current, &mut paragraphs),
        }
    }
    flush(&mut current, &mut paragraphs);

    paragraphs
}

fn flush(current: &mut String, paragraphs: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        paragraphs.push(trimmed.to_owned());
    }
    current.clear();
}

/// Visible paragraphs of the document body, in document order.
#[must_use]
pub fn body_paragraphs(document: &scraper::Html) -> Vec<String> {
    let root = document
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
        .unwrap_or_else(|| document.root_element());

    fold_paragraphs(visible_text_events(root))
}
