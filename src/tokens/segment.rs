use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::tokens::pattern::PatternSet;
use crate::tokens::{Text, TokenId, TokensObject};

/// Side of the split a delimiter belongs to
///
/// - `After`: the delimiter closes the preceding segment
/// - `Before`: the delimiter opens the following segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SegmentPosition {
    #[default]
    After,
    Before,
}

/// Parameters of `TokensObject::segment`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SegmentOptions {
    pub remove_delimiter: bool,
    pub position: SegmentPosition,
}

impl SegmentOptions {
    pub fn remove_delimiter(mut self, remove: bool) -> Self {
        self.remove_delimiter = remove;
        self
    }

    pub fn position(mut self, position: SegmentPosition) -> Self {
        self.position = position;
        self
    }
}

impl TokensObject {
    /// Split documents at every delimiter match; empty segments are dropped
    ///
    /// # Returns
    /// * `Vec<usize>` - 1-based source document of each segment
    ///
    /// # Errors
    /// * `TokensError::Value` - a pattern refers to an unknown id
    pub fn segment(&mut self, patterns: &PatternSet, options: &SegmentOptions) -> Result<Vec<usize>> {
        patterns.validate(self.vocab.len())?;
        let parts = self.exec.map(&self.texts, |_, text| segment_text(text, patterns, options));

        let n: usize = parts.iter().map(|p| p.len()).sum();
        let mut texts = Vec::with_capacity(n);
        let mut documents = Vec::with_capacity(n);
        for (h, segments) in parts.into_iter().enumerate() {
            documents.extend(std::iter::repeat(h + 1).take(segments.len()));
            texts.extend(segments);
        }
        debug!(ndoc_before = self.texts.len(), ndoc = texts.len(), "segmented");
        self.texts = texts;
        if options.remove_delimiter {
            self.mark_dirty(true, false);
        }
        Ok(documents)
    }
}

fn segment_text(text: &[TokenId], patterns: &PatternSet, options: &SegmentOptions) -> Vec<Text> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in patterns.find_disjoint(text) {
        let (end, next) = match (options.position, options.remove_delimiter) {
            (SegmentPosition::After, false) => (m.end, m.end),
            (SegmentPosition::Before, false) => (m.start, m.start),
            (_, true) => (m.start, m.end),
        };
        if end > start {
            out.push(text[start..end].to_vec());
        }
        start = next;
    }
    if start < text.len() {
        out.push(text[start..].to_vec());
    }
    out
}
