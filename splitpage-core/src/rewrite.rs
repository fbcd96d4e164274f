//! Streaming HTML rewriting applied to every served variant page.
//!
//! [`RewriteRules`] is the process-wide configuration. It is built once and
//! shared read-only; each call to [`RewriteRules::rewriter`] gives a new
//! `Send` rewriter its own copy of the rules and fresh per-text-node buffers,
//! so no handler state leaks between responses.

use crate::error::{CoreError, Result, TransformError};
use lol_html::html_content::{ContentType, TextChunk};
use lol_html::send::{HtmlRewriter, Settings};
use lol_html::{HandlerResult, OutputSink, element, text};
use regex_lite::Regex;

pub const DEFAULT_TITLE_TEXT: &str = "Your Variant!";
pub const DEFAULT_LINK_HREF: &str = "https://www.linkedin.com/in/linaresfelipe/";
pub const DEFAULT_LINK_TEXT: &str = "Check out my Projects and Experience!";

const TITLE_SELECTOR: &str = "title";
const HEADING_SELECTOR: &str = "h1#title";
const DESCRIPTION_SELECTOR: &str = "p#description";
const LINK_SELECTOR: &str = "a#url";

/// How the accumulated text of one text node is rewritten.
#[derive(Debug, Clone)]
pub enum TextRule {
    /// Regex substitution over the node's source text. `global` replaces every
    /// match, otherwise only the first.
    Pattern {
        regex: Regex,
        replacement: String,
        global: bool,
    },
    /// Discard the original text and emit this literal instead.
    Replace(String),
}

impl TextRule {
    pub fn pattern(pattern: &str, replacement: &str, global: bool) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| CoreError::InvalidRule(format!("{}: {}", pattern, e)))?;
        Ok(Self::Pattern {
            regex,
            replacement: replacement.to_string(),
            global,
        })
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Pattern {
                regex,
                replacement,
                global: true,
            } => regex.replace_all(text, replacement.as_str()).into_owned(),
            Self::Pattern {
                regex,
                replacement,
                global: false,
            } => regex.replace(text, replacement.as_str()).into_owned(),
            Self::Replace(literal) => literal.clone(),
        }
    }

    /// Pattern output is still source markup (entities intact); literals are plain text.
    fn content_type(&self) -> ContentType {
        match self {
            Self::Pattern { .. } => ContentType::Html,
            Self::Replace(_) => ContentType::Text,
        }
    }
}

/// Per-text-node accumulator.
///
/// A text node may arrive split across several chunks. Every chunk is appended
/// to the buffer and removed from the output; the chunk flagged as last in its
/// node is replaced by the rule applied to the whole buffer, which then resets.
pub struct TextBuffer {
    rule: TextRule,
    buffer: String,
}

impl TextBuffer {
    pub fn new(rule: TextRule) -> Self {
        Self {
            rule,
            buffer: String::new(),
        }
    }

    pub fn visit(&mut self, chunk: &mut TextChunk<'_>) -> HandlerResult {
        self.buffer.push_str(chunk.as_str());

        if chunk.last_in_text_node() {
            let rewritten = self.rule.apply(&self.buffer);
            chunk.replace(&rewritten, self.rule.content_type());
            self.buffer.clear();
        } else {
            chunk.remove();
        }

        Ok(())
    }
}

/// The literal values the rewrite rules inject.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    pub title_text: String,
    pub link_href: String,
    pub link_text: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            title_text: DEFAULT_TITLE_TEXT.to_string(),
            link_href: DEFAULT_LINK_HREF.to_string(),
            link_text: DEFAULT_LINK_TEXT.to_string(),
        }
    }
}

/// Selector bindings, in order:
///
/// | selector        | effect                                                   |
/// |-----------------|----------------------------------------------------------|
/// | `title`         | inner content becomes the title text                     |
/// | `h1#title`      | every digit `d` becomes `#d`                             |
/// | `p#description` | first `one`/`two` becomes `number one`/`number two`      |
/// | `a#url`         | `href` and text replaced by the configured link          |
#[derive(Debug, Clone)]
pub struct RewriteRules {
    title_text: String,
    heading: TextRule,
    description: TextRule,
    link_href: String,
    link_text: TextRule,
}

impl RewriteRules {
    pub fn new(options: RewriteOptions) -> Result<Self> {
        Ok(Self {
            title_text: options.title_text,
            heading: TextRule::pattern(r"(\d)", "#${1}", true)?,
            description: TextRule::pattern("(one|two)", "number ${1}", false)?,
            link_href: options.link_href,
            link_text: TextRule::Replace(options.link_text),
        })
    }

    /// Build a rewriter writing transformed bytes to `sink`, with fresh buffers.
    ///
    /// The handlers own everything they touch, so the rewriter does not borrow
    /// `self` and can travel with the response body across tasks.
    pub fn rewriter<'h, O: OutputSink>(&self, sink: O) -> HtmlRewriter<'h, O> {
        let title_text = self.title_text.clone();
        let link_href = self.link_href.clone();
        let mut heading = TextBuffer::new(self.heading.clone());
        let mut description = TextBuffer::new(self.description.clone());
        let mut link_text = TextBuffer::new(self.link_text.clone());

        HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    element!(TITLE_SELECTOR, move |el| {
                        el.set_inner_content(&title_text, ContentType::Text);
                        Ok(())
                    }),
                    text!(HEADING_SELECTOR, move |chunk| heading.visit(chunk)),
                    text!(DESCRIPTION_SELECTOR, move |chunk| description.visit(chunk)),
                    element!(LINK_SELECTOR, move |el| {
                        el.set_attribute("href", &link_href)?;
                        Ok(())
                    }),
                    text!(LINK_SELECTOR, move |chunk| link_text.visit(chunk)),
                ],
                ..Settings::new_send()
            },
            sink,
        )
    }

    /// Rewrite a document delivered as a sequence of input chunks.
    pub fn rewrite_chunks<'c, I>(&self, chunks: I) -> std::result::Result<Vec<u8>, TransformError>
    where
        I: IntoIterator<Item = &'c [u8]>,
    {
        let mut output = Vec::new();
        let mut rewriter = self.rewriter(|c: &[u8]| output.extend_from_slice(c));
        for chunk in chunks {
            rewriter.write(chunk)?;
        }
        rewriter.end()?;
        Ok(output)
    }

    pub fn rewrite_str(&self, html: &str) -> std::result::Result<String, TransformError> {
        let output = self.rewrite_chunks([html.as_bytes()])?;
        Ok(String::from_utf8_lossy(&output).into_owned())
    }
}
