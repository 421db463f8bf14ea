pub mod vocab;
pub mod recompile;
pub mod pattern;
pub mod ngrams;
pub mod chunk;
pub mod select;
pub mod lookup;
pub mod replace;
pub mod compound;
pub mod segment;
pub mod group;
pub mod combine;
pub mod index;
pub mod serde;

use ::serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::TokensConfig;
use crate::error::{Result, TokensError};
use crate::utils::parallel::Executor;
use crate::tokens::vocab::Vocabulary;

/// Integer id of a type, 0 is padding
pub type TokenId = u32;
/// One document
pub type Text = Vec<TokenId>;
/// A corpus of documents
pub type Texts = Vec<Text>;

/// Padding id
/// marks removed or placeholder positions, never has a vocabulary entry
pub const PADDING: TokenId = 0;

/// Encoding state of a `TokensObject`
///
/// `Clean` means ids are dense, every type is used, no two types share a string,
/// and ids follow first occurrence across documents.
/// Operations that break this move the object to `Dirty`, recompilation moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokensState {
    Clean,
    Dirty { has_gap: bool, has_dup: bool },
}

impl TokensState {
    #[inline]
    pub fn is_clean(&self) -> bool {
        matches!(self, TokensState::Clean)
    }

    /// unknown input: assume the worst
    pub fn unknown() -> Self {
        TokensState::Dirty { has_gap: true, has_dup: true }
    }

    #[inline]
    pub fn has_gap(&self) -> bool {
        matches!(self, TokensState::Dirty { has_gap: true, .. })
    }

    #[inline]
    pub fn has_dup(&self) -> bool {
        matches!(self, TokensState::Dirty { has_dup: true, .. })
    }

    fn with(self, has_gap: bool, has_dup: bool) -> Self {
        let has_gap = has_gap || self.has_gap();
        let has_dup = has_dup || self.has_dup();
        if has_gap || has_dup {
            TokensState::Dirty { has_gap, has_dup }
        } else {
            self
        }
    }
}

/// Tokens Object
/// Owns a corpus of integer-coded documents and the vocabulary they refer to.
/// It is the single unit of mutation: every operation takes `&mut self`
/// and `clone` gives a fully independent copy.
///
/// Transforms may leave unused or duplicated types behind;
/// they are cleaned up lazily by `recompile`, which consuming
/// operations (`types`, `ntype`, `dfm`, ...) call on their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "crate::tokens::serde::TokensData")]
pub struct TokensObject {
    pub(crate) texts: Texts,
    pub(crate) vocab: Vocabulary,
    pub(crate) state: TokensState,
    pub(crate) config: TokensConfig,
    #[serde(skip)]
    pub(crate) exec: Executor,
}

impl TokensObject {
    /// Create a new TokensObject from documents and their types
    ///
    /// # Arguments
    /// * `texts` - documents as id sequences, ids refer to `types` (1-based)
    /// * `types` - type strings
    ///
    /// # Errors
    /// * `TokensError::Value` - a document uses an id beyond the vocabulary
    pub fn new<I, S>(texts: Texts, types: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vocab: Vocabulary = types.into_iter().collect();
        check_ids(&texts, vocab.len())?;
        Ok(Self {
            texts,
            vocab,
            state: TokensState::unknown(),
            config: TokensConfig::default(),
            exec: Executor::default(),
        })
    }

    /// Create a TokensObject from string documents, interning every token.
    /// Empty strings become padding.
    pub fn from_strings<D, S>(docs: &[D]) -> Self
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut vocab = Vocabulary::new();
        let texts = docs
            .iter()
            .map(|doc| {
                doc.as_ref()
                    .iter()
                    .map(|t| {
                        let t = t.as_ref();
                        if t.is_empty() { PADDING } else { vocab.intern(t) }
                    })
                    .collect()
            })
            .collect();
        Self {
            texts,
            vocab,
            state: TokensState::unknown(),
            config: TokensConfig::default(),
            exec: Executor::default(),
        }
    }

    /// Replace the configuration (and the worker pool built from it)
    pub fn with_config(mut self, config: TokensConfig) -> Result<Self> {
        self.exec = Executor::new(config.threads)?;
        self.config = config;
        Ok(self)
    }

    pub fn config(&self) -> &TokensConfig {
        &self.config
    }

    /// Move the object to a dirty state
    /// every transform reports what it may have broken through here
    pub(crate) fn mark_dirty(&mut self, has_gap: bool, has_dup: bool) {
        self.state = self.state.with(has_gap, has_dup);
    }

    pub(crate) fn check_id(&self, id: TokenId) -> Result<()> {
        if id as usize > self.vocab.len() {
            return Err(TokensError::value(format!(
                "id {id} is out of range (vocabulary size is {})",
                self.vocab.len()
            )));
        }
        Ok(())
    }
}

/// Accessors and counts
impl TokensObject {
    pub fn state(&self) -> TokensState {
        self.state
    }

    pub fn is_recompiled(&self) -> bool {
        self.state.is_clean()
    }

    /// Number of documents
    #[inline]
    pub fn ndoc(&self) -> usize {
        self.texts.len()
    }

    /// Number of tokens (padding included) in each document
    pub fn ntoken(&self) -> Vec<usize> {
        self.texts.iter().map(|t| t.len()).collect()
    }

    /// Total number of tokens (padding included)
    pub fn ntoken_total(&self) -> usize {
        self.texts.iter().map(|t| t.len()).sum()
    }

    /// Number of distinct types (padding excluded) in each document
    pub fn ntype(&mut self) -> Vec<usize> {
        self.recompile();
        self.exec.map(&self.texts, |_, text| {
            let mut ids = text.clone();
            ids.sort_unstable();
            ids.dedup();
            ids.len() - usize::from(ids.first() == Some(&PADDING))
        })
    }

    /// Types of the recompiled vocabulary
    pub fn types(&mut self) -> &[Box<str>] {
        self.recompile();
        self.vocab.as_slice()
    }

    /// Current vocabulary without recompiling
    /// it may contain unused or duplicated types
    pub fn types_raw(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn texts(&self) -> &[Text] {
        &self.texts
    }

    /// Replace the vocabulary, keeping the documents' ids
    ///
    /// # Errors
    /// * `TokensError::Value` - a document uses an id beyond the new vocabulary
    pub fn set_types<I, S>(&mut self, types: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vocab: Vocabulary = types.into_iter().collect();
        check_ids(&self.texts, vocab.len())?;
        self.vocab = vocab;
        self.state = TokensState::unknown();
        Ok(())
    }

    /// Documents as strings, padding as an empty string
    pub fn as_strings(&mut self) -> Vec<Vec<&str>> {
        self.recompile();
        let vocab = &self.vocab;
        self.texts
            .iter()
            .map(|text| text.iter().map(|&id| vocab.get(id).unwrap_or("")).collect())
            .collect()
    }

    /// Split into the documents and the vocabulary
    pub fn into_parts(self) -> (Texts, Vocabulary) {
        (self.texts, self.vocab)
    }
}

impl PartialEq for TokensObject {
    fn eq(&self, other: &Self) -> bool {
        self.texts == other.texts && self.vocab == other.vocab && self.state == other.state
    }
}

fn check_ids(texts: &[Text], ntype: usize) -> Result<()> {
    let max = texts.iter().flat_map(|t| t.iter()).copied().max().unwrap_or(PADDING);
    if max as usize > ntype {
        return Err(TokensError::value(format!(
            "id {max} is out of range (vocabulary size is {ntype})"
        )));
    }
    trace!(max_id = max, ntype, "ids checked");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_unknown_ids() {
        let res = TokensObject::new(vec![vec![1, 2, 3]], ["a", "b"]);
        assert!(matches!(res, Err(TokensError::Value(_))));
    }

    #[test]
    fn new_starts_dirty() {
        let toks = TokensObject::new(vec![vec![1, 2]], ["a", "b"]).unwrap();
        assert_eq!(toks.state(), TokensState::unknown());
        assert!(!toks.is_recompiled());
    }

    #[test]
    fn from_strings_interns_and_pads() {
        let mut toks = TokensObject::from_strings(&[vec!["a", "b", "", "a"], vec!["c"]]);
        assert_eq!(toks.texts(), &[vec![1, 2, 0, 1], vec![3]]);
        assert_eq!(toks.as_strings(), vec![vec!["a", "b", "", "a"], vec!["c"]]);
    }

    #[test]
    fn counts() {
        let mut toks = TokensObject::new(vec![vec![1, 2, 1, 0], vec![], vec![3]], ["a", "b", "c"]).unwrap();
        assert_eq!(toks.ndoc(), 3);
        assert_eq!(toks.ntoken(), vec![4, 0, 1]);
        assert_eq!(toks.ntoken_total(), 5);
        assert_eq!(toks.ntype(), vec![2, 0, 1]);
    }

    #[test]
    fn ntype_merges_duplicated_types() {
        let mut toks = TokensObject::new(vec![vec![1, 2, 3]], ["a", "b", "a"]).unwrap();
        assert_eq!(toks.ntype(), vec![2]);
    }

    #[test]
    fn set_types_marks_dirty_and_checks_range() {
        let mut toks = TokensObject::new(vec![vec![1, 2]], ["a", "b"]).unwrap();
        toks.recompile();
        assert!(toks.is_recompiled());
        assert!(toks.set_types(["x"]).is_err());
        toks.set_types(["x", "y"]).unwrap();
        assert!(!toks.is_recompiled());
        assert_eq!(toks.as_strings(), vec![vec!["x", "y"]]);
    }

    #[test]
    fn state_transitions_accumulate() {
        let s = TokensState::Clean.with(true, false);
        assert_eq!(s, TokensState::Dirty { has_gap: true, has_dup: false });
        let s = s.with(false, true);
        assert_eq!(s, TokensState::Dirty { has_gap: true, has_dup: true });
        assert_eq!(TokensState::Clean.with(false, false), TokensState::Clean);
    }

    #[test]
    fn clone_is_independent() {
        let mut a = TokensObject::new(vec![vec![1, 2]], ["a", "b"]).unwrap();
        let b = a.clone();
        a.subset(&[1, 1]).unwrap();
        assert_eq!(b.ndoc(), 1);
        assert_eq!(a.ndoc(), 2);
    }
}
