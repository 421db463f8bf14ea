use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::tokens::pattern::PatternSet;
use crate::tokens::TokensObject;

/// Location of one pattern match
/// every field is 1-based, `from` and `to` are inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub document: usize,
    pub from: usize,
    pub to: usize,
    pub pattern: usize,
}

impl TokensObject {
    /// Locate the matches of `patterns`
    ///
    /// A sequence shared by several patterns yields one hit per pattern.
    ///
    /// # Returns
    /// * `Vec<Hit>` - ordered by document, then position
    ///
    /// # Errors
    /// * `TokensError::Value` - a pattern refers to an unknown id
    pub fn index(&self, patterns: &PatternSet) -> Result<Vec<Hit>> {
        patterns.validate(self.vocab.len())?;
        let hits: Vec<Hit> = self
            .exec
            .map(&self.texts, |h, text| {
                patterns
                    .find(text)
                    .into_iter()
                    .flat_map(|m| {
                        m.patterns.iter().map(move |&p| Hit {
                            document: h + 1,
                            from: m.start + 1,
                            to: m.end,
                            pattern: p + 1,
                        })
                    })
                    .collect::<Vec<Hit>>()
            })
            .into_iter()
            .flatten()
            .collect();
        debug!(ndoc = self.texts.len(), nhit = hits.len(), "indexed");
        Ok(hits)
    }
}
