//! Graph nodes and their match configuration.

use regex::Regex;

use crate::segment::Segment;

/// Content constraint evaluated against a candidate node's text.
#[derive(Debug, Clone, Default)]
pub enum ContentMatch {
    /// No content constraint.
    #[default]
    None,
    /// Trimmed string equality.
    Exact(String),
    /// Substring containment.
    Substring(String),
    /// Full match of the trimmed text. The pattern is compiled anchored.
    Regex(Regex),
}

/// A document-graph vertex: a segment plus match configuration.
///
/// In a document graph the match configuration is left at its defaults; in
/// a wrapper graph it carries the constraints a candidate must satisfy.
#[derive(Debug, Clone)]
pub struct Node {
    pub seg: Segment,

    /// Typographic attributes the candidate must reproduce.
    pub match_font_name: bool,
    pub match_font_size: bool,
    pub match_bold: bool,
    pub match_italic: bool,

    pub content: ContentMatch,

    /// Inclusive bounds on the candidate's trimmed text length.
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,

    /// Marks the node's text for extraction under `tag`.
    pub extract: bool,
    /// Field name for extraction, derived from the node's type tag.
    pub tag: String,

    /// Removed from the instance: ignored by matching and extraction.
    pub disabled: bool,
}

impl Node {
    pub fn new(seg: Segment) -> Self {
        Self {
            seg,
            match_font_name: false,
            match_font_size: false,
            match_bold: false,
            match_italic: false,
            content: ContentMatch::None,
            min_length: None,
            max_length: None,
            extract: false,
            tag: String::new(),
            disabled: false,
        }
    }

    /// Returns true if the underlying segment carries text.
    pub fn is_text(&self) -> bool {
        self.seg.is_text()
    }

    /// The node's trimmed text content.
    pub fn trimmed_text(&self) -> &str {
        self.seg.text_str().trim()
    }
}
