//! Plain-text extraction from rendered page markup.
//!
//! The text artifact is taken from the page's "main content": the first
//! element matching one of the configured content selectors (in order),
//! falling back to `<body>`. Page chrome such as navigation, headers and
//! footers is stripped before the visible text is rendered.
//!
//! Rendering follows what `innerText` produces under the default
//! stylesheet: whitespace in normal flow collapses, block elements and
//! `<br>` break lines, paragraphs are separated by a blank line, `<pre>`
//! is kept verbatim and table cells are joined with tabs.

use crate::{Error, Result};
use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use std::fmt;

/// Elements the default stylesheet never renders
const NEVER_RENDERED: &[&str] = &[
    "head", "title", "meta", "link", "script", "style", "template", "noscript",
];

const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "caption",
    "dd",
    "details",
    "dialog",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "legend",
    "li",
    "main",
    "nav",
    "ol",
    "pre",
    "section",
    "summary",
    "table",
    "tbody",
    "tfoot",
    "thead",
    "tr",
    "ul",
];

/// Where the text artifact is taken from
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Candidate content roots, highest precedence first
    pub content_selectors: Vec<String>,
    /// Tags removed (with their subtree) before reading the text
    pub stripped_tags: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            content_selectors: vec![
                "article".to_string(),
                ".article-body".to_string(),
                "main".to_string(),
            ],
            stripped_tags: ["script", "style", "nav", "header", "footer", "aside"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl ExtractConfig {
    /// Check that every content selector parses
    pub fn validate(&self) -> Result<()> {
        for selector in &self.content_selectors {
            parse_selector(selector)?;
        }
        Ok(())
    }

    fn is_stripped(&self, tag: &str) -> bool {
        self.stripped_tags
            .iter()
            .any(|stripped| stripped.eq_ignore_ascii_case(tag))
    }
}

/// Which element the text was read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentRoot {
    /// A configured content selector matched
    Selector(String),
    /// No selector matched; the whole body was used
    Body,
    /// Frameset documents have no body
    Document,
}

impl fmt::Display for ContentRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentRoot::Selector(selector) => write!(f, "{}", selector),
            ContentRoot::Body => f.write_str("body"),
            ContentRoot::Document => f.write_str("document"),
        }
    }
}

/// Result of a text extraction
#[derive(Debug, Clone)]
pub struct Extracted {
    pub root: ContentRoot,
    pub text: String,
}

/// Extract the trimmed visible text of the page's main content
pub fn extract_text(html: &str, config: &ExtractConfig) -> Result<Extracted> {
    let document = Html::parse_document(html);
    let (root, element) = select_root(&document, config)?;

    tracing::debug!("Extracting text from content root: {}", root);

    let mut renderer = TextRenderer::new(config);
    renderer.children(element);

    Ok(Extracted {
        root,
        text: renderer.finish(),
    })
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| Error::InvalidSelector(selector.to_string()))
}

fn select_root<'a>(
    document: &'a Html,
    config: &ExtractConfig,
) -> Result<(ContentRoot, ElementRef<'a>)> {
    for candidate in &config.content_selectors {
        let selector = parse_selector(candidate)?;
        if let Some(element) = document.select(&selector).next() {
            return Ok((ContentRoot::Selector(candidate.clone()), element));
        }
    }

    let body = parse_selector("body")?;
    if let Some(element) = document.select(&body).next() {
        return Ok((ContentRoot::Body, element));
    }

    Ok((ContentRoot::Document, document.root_element()))
}

/// Separator owed before the next piece of visible text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    None,
    Space,
    Tab,
    Lines(usize),
}

struct TextRenderer<'c> {
    config: &'c ExtractConfig,
    out: String,
    pending: Separator,
    pre_depth: usize,
}

impl<'c> TextRenderer<'c> {
    fn new(config: &'c ExtractConfig) -> Self {
        Self {
            config,
            out: String::new(),
            pending: Separator::None,
            pre_depth: 0,
        }
    }

    fn finish(self) -> String {
        self.out.trim().to_string()
    }

    fn request(&mut self, sep: Separator) {
        self.pending = match (self.pending, sep) {
            (Separator::Lines(a), Separator::Lines(b)) => Separator::Lines(a.max(b)),
            (Separator::Lines(n), _) | (_, Separator::Lines(n)) => Separator::Lines(n),
            (Separator::Tab, _) | (_, Separator::Tab) => Separator::Tab,
            (Separator::Space, _) | (_, Separator::Space) => Separator::Space,
            (Separator::None, Separator::None) => Separator::None,
        };
    }

    fn flush(&mut self) {
        let pending = std::mem::replace(&mut self.pending, Separator::None);
        if self.out.is_empty() {
            return;
        }
        match pending {
            Separator::None => {}
            Separator::Space => {
                if !self.out.ends_with('\n') {
                    self.out.push(' ');
                }
            }
            Separator::Tab => self.out.push('\t'),
            Separator::Lines(n) => {
                let already = self.out.len() - self.out.trim_end_matches('\n').len();
                for _ in already..n {
                    self.out.push('\n');
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.pre_depth > 0 {
            if !text.is_empty() {
                self.flush();
                self.out.push_str(text);
            }
            return;
        }

        for c in text.chars() {
            // U+00A0 is rendered, so only ASCII whitespace collapses
            if c.is_ascii_whitespace() {
                self.request(Separator::Space);
            } else {
                self.flush();
                self.out.push(c);
            }
        }
    }

    fn children(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.element(child);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let tag = element.value().name();

        if NEVER_RENDERED.contains(&tag) || self.config.is_stripped(tag) {
            return;
        }
        if element.value().attr("hidden").is_some() {
            return;
        }

        match tag {
            "br" => {
                if self.pending == Separator::Space {
                    self.pending = Separator::None;
                }
                self.flush();
                self.out.push('\n');
            }
            "td" | "th" => {
                self.children(element);
                self.request(Separator::Tab);
            }
            "p" => {
                self.request(Separator::Lines(2));
                self.children(element);
                self.request(Separator::Lines(2));
            }
            "pre" => {
                self.request(Separator::Lines(1));
                self.pre_depth += 1;
                self.children(element);
                self.pre_depth -= 1;
                self.request(Separator::Lines(1));
            }
            _ if BLOCK_ELEMENTS.contains(&tag) => {
                self.request(Separator::Lines(1));
                self.children(element);
                self.request(Separator::Lines(1));
            }
            _ => self.children(element),
        }
    }
}
