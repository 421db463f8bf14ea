use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TokensError};
use crate::tokens::{TokenId, PADDING};

/// How matches of different patterns at the same or overlapping positions are resolved
///
/// - `Longest`: at each position take the longest matching sequence, then continue after it
/// - `First`: at each position take the sequence of the lowest pattern index, then continue after it
/// - `All`: report every match, overlapping ones included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlapPolicy {
    #[default]
    Longest,
    First,
    All,
}

/// Neighbouring tokens added to both sides of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Window {
    pub left: usize,
    pub right: usize,
}

impl Window {
    pub fn new(left: usize, right: usize) -> Self {
        Self { left, right }
    }

    /// expand `[start, end)`, clipped to a document of `len` tokens
    #[inline]
    pub fn expand(&self, start: usize, end: usize, len: usize) -> (usize, usize) {
        (start.saturating_sub(self.left), end.saturating_add(self.right).min(len))
    }
}

/// One occurrence of a pattern in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// first position (0-based)
    pub start: usize,
    /// one past the last position
    pub end: usize,
    /// pattern indices sharing the matched sequence, ascending
    pub patterns: &'a [usize],
}

/// Pattern Set
/// A list of id-sequence patterns matched against documents.
///
/// Each pattern has an index (its push order) and one or more concrete
/// id sequences. Several patterns may share a sequence; a match then
/// reports all of them.
///
/// # Examples
/// ```
/// use corpus_tokens::tokens::pattern::PatternSet;
/// let mut patterns = PatternSet::new();
/// patterns.push(&[1, 2]).unwrap();
/// patterns.push(&[3]).unwrap();
///
/// let found = patterns.find(&[3, 1, 2, 4]);
/// assert_eq!(found.len(), 2);
/// assert_eq!((found[1].start, found[1].end), (1, 3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    seqs: HashMap<Box<[TokenId]>, Vec<usize>, RandomState>,
    /// distinct sequence lengths, descending
    lengths: Vec<usize>,
    count: usize,
    max_id: TokenId,
    policy: OverlapPolicy,
}

impl PatternSet {
    pub fn new() -> Self {
        Self {
            seqs: HashMap::with_hasher(RandomState::new()),
            ..Default::default()
        }
    }

    /// Set the overlap policy
    pub fn overlap(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// number of patterns
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Build from a list of id sequences, one pattern each
    pub fn from_sequences<I, S>(seqs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[TokenId]>,
    {
        let mut set = Self::new();
        for seq in seqs {
            set.push(seq.as_ref())?;
        }
        Ok(set)
    }

    /// Add a pattern made of one id sequence
    ///
    /// # Returns
    /// * `usize` - index of the new pattern
    pub fn push(&mut self, seq: &[TokenId]) -> Result<usize> {
        check_seq(seq)?;
        let index = self.count;
        self.insert(seq.into(), index);
        self.count += 1;
        Ok(index)
    }

    /// Add a pattern whose positions each accept several ids
    /// (e.g. the result of `Vocabulary::glob`).
    /// Every combination of alternatives is registered under one pattern index;
    /// a position without alternatives makes the pattern unmatchable.
    ///
    /// # Returns
    /// * `usize` - index of the new pattern
    pub fn push_alternatives<A>(&mut self, positions: &[A]) -> Result<usize>
    where
        A: AsRef<[TokenId]>,
    {
        if positions.is_empty() {
            return Err(TokensError::value("pattern must not be empty"));
        }
        let index = self.count;
        let mut combos: Vec<Vec<TokenId>> = vec![Vec::with_capacity(positions.len())];
        for alts in positions {
            let alts = alts.as_ref();
            check_seq_ids(alts)?;
            combos = combos
                .into_iter()
                .flat_map(|prefix| {
                    alts.iter().map(move |&id| {
                        let mut next = prefix.clone();
                        next.push(id);
                        next
                    })
                })
                .collect();
        }
        for combo in combos {
            self.insert(combo.into_boxed_slice(), index);
        }
        self.count += 1;
        Ok(index)
    }

    fn insert(&mut self, seq: Box<[TokenId]>, index: usize) {
        let n = seq.len();
        self.max_id = self.max_id.max(seq.iter().copied().max().unwrap_or(PADDING));
        let indices = self.seqs.entry(seq).or_default();
        if !indices.contains(&index) {
            indices.push(index);
        }
        if let Err(pos) = self.lengths.binary_search_by(|m| n.cmp(m)) {
            self.lengths.insert(pos, n);
        }
    }

    /// Fail when a pattern refers to ids beyond a vocabulary of `ntype` types
    pub(crate) fn validate(&self, ntype: usize) -> Result<()> {
        if self.max_id as usize > ntype {
            return Err(TokensError::value(format!(
                "pattern id {} is out of range (vocabulary size is {ntype})",
                self.max_id
            )));
        }
        Ok(())
    }

    /// Find matches in a document with the set's own policy
    pub fn find<'a>(&'a self, text: &[TokenId]) -> Vec<Match<'a>> {
        self.find_with(text, self.policy)
    }

    /// Find matches with a non-overlapping policy;
    /// `All` falls back to `Longest`
    pub(crate) fn find_disjoint<'a>(&'a self, text: &[TokenId]) -> Vec<Match<'a>> {
        match self.policy {
            OverlapPolicy::All => self.find_with(text, OverlapPolicy::Longest),
            policy => self.find_with(text, policy),
        }
    }

    /// Find matches, scanning left to right
    ///
    /// # Returns
    /// * `Vec<Match>` - matches ordered by start, then by end
    pub fn find_with<'a>(&'a self, text: &[TokenId], policy: OverlapPolicy) -> Vec<Match<'a>> {
        let mut out = Vec::new();
        if self.seqs.is_empty() {
            return out;
        }
        let len = text.len();
        let mut i = 0;
        while i < len {
            // no pattern starts with padding
            if text[i] == PADDING {
                i += 1;
                continue;
            }
            let mut hits = self
                .lengths
                .iter()
                .filter(|&&n| i + n <= len)
                .filter_map(|&n| self.seqs.get(&text[i..i + n]).map(|p| (n, p.as_slice())));
            match policy {
                OverlapPolicy::Longest => match hits.next() {
                    Some((n, patterns)) => {
                        out.push(Match { start: i, end: i + n, patterns });
                        i += n;
                    }
                    None => i += 1,
                },
                OverlapPolicy::First => match hits.min_by_key(|(_, p)| p[0]) {
                    Some((n, patterns)) => {
                        out.push(Match { start: i, end: i + n, patterns });
                        i += n;
                    }
                    None => i += 1,
                },
                OverlapPolicy::All => {
                    let mut found: Vec<Match> = hits
                        .map(|(n, patterns)| Match { start: i, end: i + n, patterns })
                        .collect();
                    found.reverse();
                    out.extend(found);
                    i += 1;
                }
            }
        }
        out
    }
}

fn check_seq(seq: &[TokenId]) -> Result<()> {
    if seq.is_empty() {
        return Err(TokensError::value("pattern must not be empty"));
    }
    check_seq_ids(seq)
}

fn check_seq_ids(ids: &[TokenId]) -> Result<()> {
    if ids.contains(&PADDING) {
        return Err(TokensError::value("pattern must not contain padding"));
    }
    Ok(())
}
