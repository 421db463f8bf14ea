use std::collections::HashMap;

use ahash::RandomState;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TokensError};
use crate::tokens::TokenId;

/// Vocabulary
/// Ordered list of types; the type at position `i` has id `i + 1`.
/// Id 0 is padding and is never stored here.
///
/// Duplicated strings are allowed (they appear after n-gram generation or
/// `set_types`), the string -> id lookup always answers the first occurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Box<str>>", into = "Vec<Box<str>>")]
pub struct Vocabulary {
    types: Vec<Box<str>>,
    /// canonical (first) id of each distinct string
    index: HashMap<Box<str>, TokenId, RandomState>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            index: HashMap::with_hasher(RandomState::new()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            types: Vec::with_capacity(capacity),
            index: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// number of entries, duplicates included
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Type string of an id, `None` for padding or out of range ids
    #[inline]
    pub fn get(&self, id: TokenId) -> Option<&str> {
        if id == 0 {
            return None;
        }
        self.types.get(id as usize - 1).map(|s| s.as_ref())
    }

    /// Canonical id of a type string
    #[inline]
    pub fn id_of(&self, token: &str) -> Option<TokenId> {
        self.index.get(token).copied()
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// Append a type and return its id, even if the string is already present
    pub fn push(&mut self, token: &str) -> TokenId {
        self.types.push(token.into());
        let id = self.types.len() as TokenId;
        self.index.entry(token.into()).or_insert(id);
        id
    }

    /// Return the id of `token`, appending it when unseen
    pub fn intern(&mut self, token: &str) -> TokenId {
        if let Some(&id) = self.index.get(token) {
            return id;
        }
        self.push(token)
    }

    /// true when two entries hold the same string
    #[inline]
    pub fn has_dup(&self) -> bool {
        self.index.len() != self.types.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|s| s.as_ref())
    }

    pub fn as_slice(&self) -> &[Box<str>] {
        &self.types
    }

    pub fn into_types(self) -> Vec<Box<str>> {
        self.types
    }

    /// Map every id to the id of the first entry with the same string.
    /// Index 0 (padding) maps to itself.
    pub(crate) fn canonical_ids(&self) -> Vec<TokenId> {
        let mut ids = Vec::with_capacity(self.types.len() + 1);
        ids.push(0);
        for token in &self.types {
            // index always holds every stored string
            ids.push(self.index.get(token).copied().unwrap_or(ids.len() as TokenId));
        }
        ids
    }
}

/// Type matching
impl Vocabulary {
    /// Ids of every type matching a glob pattern (`*` any run, `?` one character)
    ///
    /// # Arguments
    /// * `pattern` - glob pattern
    /// * `case_insensitive` - fold case before matching
    ///
    /// # Returns
    /// * `Vec<TokenId>` - matching ids in ascending order, duplicates included
    pub fn glob(&self, pattern: &str, case_insensitive: bool) -> Result<Vec<TokenId>> {
        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        let mut literal = String::new();
        for c in pattern.chars() {
            match c {
                '*' | '?' => {
                    expr.push_str(&regex::escape(&literal));
                    literal.clear();
                    expr.push_str(if c == '*' { ".*" } else { "." });
                }
                _ => literal.push(c),
            }
        }
        expr.push_str(&regex::escape(&literal));
        expr.push('$');
        let re = Self::build_regex(&expr, case_insensitive)?;
        Ok(self.matching(&re))
    }

    /// Ids of every type matching a regular expression (unanchored)
    pub fn regex(&self, pattern: &str, case_insensitive: bool) -> Result<Vec<TokenId>> {
        let re = Self::build_regex(pattern, case_insensitive)?;
        Ok(self.matching(&re))
    }

    fn build_regex(expr: &str, case_insensitive: bool) -> Result<Regex> {
        RegexBuilder::new(expr)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| TokensError::value(format!("invalid pattern {expr:?}: {e}")))
    }

    fn matching(&self, re: &Regex) -> Vec<TokenId> {
        self.types
            .iter()
            .enumerate()
            .filter(|(_, t)| re.is_match(t))
            .map(|(i, _)| i as TokenId + 1)
            .collect()
    }
}

impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.types == other.types
    }
}

impl Eq for Vocabulary {}

impl<S> FromIterator<S> for Vocabulary
where
    S: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut vocab = Vocabulary::new();
        for token in iter {
            vocab.push(token.as_ref());
        }
        vocab
    }
}

impl From<Vec<Box<str>>> for Vocabulary {
    fn from(types: Vec<Box<str>>) -> Self {
        types.iter().collect()
    }
}

impl From<Vocabulary> for Vec<Box<str>> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.types
    }
}
