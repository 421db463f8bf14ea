use ahash::RandomState;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TokensError};
use crate::tokens::vocab::Vocabulary;
use crate::tokens::{Text, TokenId, TokensObject, PADDING};

/// Ngram key
type Ngram = Box<[TokenId]>;

/// Treatment of padding inside generated windows
///
/// - `Skip`: drop every window that touches a padding position
/// - `StartOnly`: drop only windows starting on padding,
///   interior padding is rendered as an empty string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NgramPadding {
    #[default]
    Skip,
    StartOnly,
}

/// Parameters of `TokensObject::ngrams`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgramOptions {
    /// string joining the types of a window
    pub delimiter: String,
    /// window sizes
    pub ns: Vec<usize>,
    /// distances between consecutive positions, 1 is contiguous
    pub skips: Vec<usize>,
    pub padding: NgramPadding,
}

impl Default for NgramOptions {
    fn default() -> Self {
        Self {
            delimiter: "_".to_string(),
            ns: vec![2],
            skips: vec![1],
            padding: NgramPadding::default(),
        }
    }
}

impl NgramOptions {
    pub fn new(ns: Vec<usize>, skips: Vec<usize>) -> Self {
        Self { ns, skips, ..Default::default() }
    }

    pub fn delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    pub fn padding(mut self, padding: NgramPadding) -> Self {
        self.padding = padding;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.ns.is_empty() || self.ns.contains(&0) {
            return Err(TokensError::value("ns must be non-empty and positive"));
        }
        if self.skips.is_empty() || self.skips.contains(&0) {
            return Err(TokensError::value("skips must be non-empty and positive"));
        }
        Ok(())
    }
}

impl TokensObject {
    /// Replace every document by its n-grams / skip-grams
    ///
    /// Composite ids are given in order of first appearance
    /// (document index, then generation order), so the result does not
    /// depend on the number of threads. The vocabulary becomes the rendered
    /// windows; the object is left with gaps and duplicates.
    ///
    /// # Errors
    /// * `TokensError::Value` - empty or zero `ns` / `skips`
    pub fn ngrams(&mut self, options: &NgramOptions) -> Result<()> {
        options.validate()?;

        // phase 1: windows of each document
        let grams: Vec<Vec<Ngram>> = self.exec.map(&self.texts, |_, text| skipgram(text, options));

        // phase 2: ids in document order
        let mut keys: IndexSet<Ngram, RandomState> = IndexSet::with_hasher(RandomState::new());
        let texts: Vec<Text> = grams
            .into_iter()
            .map(|doc| {
                doc.into_iter()
                    .map(|gram| keys.insert_full(gram).0 as TokenId + 1)
                    .collect()
            })
            .collect();

        // phase 3: type names
        let keys: Vec<Ngram> = keys.into_iter().collect();
        let vocab = &self.vocab;
        let delim = options.delimiter.as_str();
        let types = self.exec.map(&keys, |_, key| {
            key.iter()
                .map(|&id| vocab.get(id).unwrap_or(""))
                .collect::<Vec<&str>>()
                .join(delim)
        });

        self.texts = texts;
        self.vocab = types.iter().collect::<Vocabulary>();
        self.mark_dirty(true, true);
        debug!(ndoc = self.texts.len(), ntype = self.vocab.len(), "generated ngrams");
        Ok(())
    }
}

/// All windows of one document, grouped by window size
fn skipgram(text: &[TokenId], options: &NgramOptions) -> Vec<Ngram> {
    let mut out = Vec::new();
    if text.is_empty() {
        return out;
    }
    let mut buf = Vec::new();
    for &n in &options.ns {
        if text.len() < n {
            continue;
        }
        for start in 0..=(text.len() - n) {
            if text[start] == PADDING {
                continue;
            }
            expand(text, start, n, options, &mut buf, &mut out);
        }
    }
    out
}

fn expand(
    text: &[TokenId],
    pos: usize,
    n: usize,
    options: &NgramOptions,
    buf: &mut Vec<TokenId>,
    out: &mut Vec<Ngram>,
) {
    buf.push(text[pos]);
    if buf.len() == n {
        out.push(buf.as_slice().into());
    } else {
        for &skip in &options.skips {
            let next = pos + skip;
            if next >= text.len() {
                continue;
            }
            if options.padding == NgramPadding::Skip && text[next] == PADDING {
                continue;
            }
            expand(text, next, n, options, buf, out);
        }
    }
    buf.pop();
}
