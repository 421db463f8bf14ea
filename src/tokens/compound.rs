use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::tokens::pattern::{OverlapPolicy, PatternSet, Window};
use crate::tokens::vocab::Vocabulary;
use crate::tokens::{Text, TokenId, TokensObject, PADDING};

/// Parameters of `TokensObject::compound`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundOptions {
    /// string joining the parts of a compound
    pub delimiter: String,
    /// merge overlapping matches into a single compound
    pub join: bool,
    /// neighbours absorbed into each compound
    pub window: Window,
    /// keep document length by writing padding into consumed positions
    pub padding: bool,
}

impl Default for CompoundOptions {
    fn default() -> Self {
        Self {
            delimiter: "_".to_string(),
            join: true,
            window: Window::default(),
            padding: false,
        }
    }
}

impl CompoundOptions {
    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    pub fn join(mut self, join: bool) -> Self {
        self.join = join;
        self
    }

    pub fn window(mut self, left: usize, right: usize) -> Self {
        self.window = Window::new(left, right);
        self
    }

    pub fn padding(mut self, padding: bool) -> Self {
        self.padding = padding;
        self
    }
}

/// Output position of a compounded document, before interning
enum Piece {
    Token(TokenId),
    Compound(String),
}

impl TokensObject {
    /// Join matched sequences into single tokens
    ///
    /// New compound types are appended to the vocabulary in order of first
    /// appearance (document index, then position); a compound equal to an
    /// existing type reuses its id.
    ///
    /// # Errors
    /// * `TokensError::Value` - a pattern refers to an unknown id
    pub fn compound(&mut self, patterns: &PatternSet, options: &CompoundOptions) -> Result<()> {
        patterns.validate(self.vocab.len())?;
        let before = self.vocab.len();

        // phase 1: spans and their strings
        let vocab = &self.vocab;
        let pieces: Vec<Vec<Piece>> = self.exec.map(&self.texts, |_, text| {
            let spans = compound_spans(text, patterns, options);
            compound_text(text, &spans, vocab, options)
        });

        // phase 2: ids in document order
        let mut vocab = std::mem::take(&mut self.vocab);
        let texts: Vec<Text> = pieces
            .into_iter()
            .map(|doc| {
                doc.into_iter()
                    .map(|piece| match piece {
                        Piece::Token(id) => id,
                        Piece::Compound(s) => vocab.intern(&s),
                    })
                    .collect()
            })
            .collect();

        self.texts = texts;
        self.vocab = vocab;
        self.mark_dirty(true, false);
        debug!(ndoc = self.texts.len(), new_types = self.vocab.len() - before, "compounded");
        Ok(())
    }
}

/// Disjoint `[start, end)` spans to compound, ascending
fn compound_spans(text: &[TokenId], patterns: &PatternSet, options: &CompoundOptions) -> Vec<(usize, usize)> {
    let len = text.len();
    let found = if options.join {
        patterns.find_with(text, OverlapPolicy::All)
    } else {
        patterns.find_disjoint(text)
    };
    let mut spans: Vec<(usize, usize)> = Vec::with_capacity(found.len());
    for m in found {
        let (s, e) = options.window.expand(m.start, m.end, len);
        let last_end = spans.last().map_or(0, |&(_, end)| end);
        if s >= last_end {
            spans.push((s, e));
        } else if options.join {
            if let Some(last) = spans.last_mut() {
                last.1 = last.1.max(e);
            }
        } else if e > last_end {
            // windows of separate matches may overlap, the earlier one wins
            spans.push((last_end, e));
        }
    }
    spans
}

fn compound_text(
    text: &[TokenId],
    spans: &[(usize, usize)],
    vocab: &Vocabulary,
    options: &CompoundOptions,
) -> Vec<Piece> {
    let mut out = Vec::with_capacity(text.len());
    let mut last = 0;
    for &(s, e) in spans {
        out.extend(text[last..s].iter().map(|&id| Piece::Token(id)));
        let parts: Vec<TokenId> = text[s..e].iter().copied().filter(|&id| id != PADDING).collect();
        let emitted = match parts.as_slice() {
            [] => 0,
            [id] => {
                out.push(Piece::Token(*id));
                1
            }
            _ => {
                let joined = parts
                    .iter()
                    .map(|&id| vocab.get(id).unwrap_or(""))
                    .collect::<Vec<&str>>()
                    .join(&options.delimiter);
                out.push(Piece::Compound(joined));
                1
            }
        };
        if options.padding {
            out.extend((emitted..e - s).map(|_| Piece::Token(PADDING)));
        }
        last = e;
    }
    out.extend(text[last..].iter().map(|&id| Piece::Token(id)));
    out
}
