use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::tokens::pattern::{PatternSet, Window};
use crate::tokens::{Text, TokenId, TokensObject, PADDING};

/// Whether matched tokens are kept or removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectMode {
    #[default]
    Keep,
    Remove,
}

/// Parameters of `TokensObject::select`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectOptions {
    pub mode: SelectMode,
    /// write padding instead of deleting dropped tokens
    pub padding: bool,
    /// neighbours selected along with each match
    pub window: Window,
    /// 1-based inclusive range a match must lie in,
    /// negative values count from the end (-1 is the last token)
    pub positions: Option<(i64, i64)>,
}

impl SelectOptions {
    pub fn keep() -> Self {
        Self::default()
    }

    pub fn remove() -> Self {
        Self { mode: SelectMode::Remove, ..Default::default() }
    }

    pub fn padding(mut self, padding: bool) -> Self {
        self.padding = padding;
        self
    }

    pub fn window(mut self, left: usize, right: usize) -> Self {
        self.window = Window::new(left, right);
        self
    }

    pub fn positions(mut self, from: i64, to: i64) -> Self {
        self.positions = Some((from, to));
        self
    }
}

impl TokensObject {
    /// Keep or remove the tokens matched by `patterns`
    ///
    /// # Arguments
    /// * `patterns` - sequences to match, resolved with the set's overlap policy
    /// * `options` - mode, padding, window and position range
    ///
    /// # Errors
    /// * `TokensError::Value` - a pattern refers to an unknown id
    pub fn select(&mut self, patterns: &PatternSet, options: &SelectOptions) -> Result<()> {
        patterns.validate(self.vocab.len())?;
        self.exec.for_each_mut(&mut self.texts, |_, text| {
            *text = select_text(text, patterns, options);
        });
        self.mark_dirty(true, false);
        debug!(ndoc = self.texts.len(), ntoken = self.ntoken_total(), mode = ?options.mode, "selected");
        Ok(())
    }
}

/// Resolve a 1-based inclusive range against a document of `len` tokens
/// into a 0-based half open one
fn resolve_range(range: Option<(i64, i64)>, len: usize) -> (usize, usize) {
    let Some((from, to)) = range else {
        return (0, len);
    };
    let n = len as i64;
    let lo = if from < 0 { n + from } else { from - 1 };
    let hi = if to < 0 { n + to + 1 } else { to };
    let lo = lo.clamp(0, n) as usize;
    let hi = hi.clamp(0, n) as usize;
    (lo, hi.max(lo))
}

fn select_text(text: &[TokenId], patterns: &PatternSet, options: &SelectOptions) -> Text {
    let len = text.len();
    let (lo, hi) = resolve_range(options.positions, len);
    let mut hit = vec![false; len];
    for m in patterns.find(&text[lo..hi]) {
        let (s, e) = options.window.expand(m.start + lo, m.end + lo, len);
        hit[s..e].fill(true);
    }
    let keep = |i: usize| match options.mode {
        SelectMode::Keep => hit[i],
        SelectMode::Remove => !hit[i],
    };
    if options.padding {
        text.iter()
            .enumerate()
            .map(|(i, &id)| if keep(i) { id } else { PADDING })
            .collect()
    } else {
        text.iter()
            .enumerate()
            .filter(|&(i, _)| keep(i))
            .map(|(_, &id)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokensError;
    use crate::tokens::pattern::OverlapPolicy;

    fn corpus() -> TokensObject {
        // a b c d a b
        TokensObject::new(vec![vec![1, 2, 3, 4, 1, 2], vec![3, 3]], ["a", "b", "c", "d"]).unwrap()
    }

    #[test]
    fn keep_matches() {
        let mut toks = corpus();
        let patterns = PatternSet::from_sequences([vec![1, 2]]).unwrap();
        toks.select(&patterns, &SelectOptions::keep()).unwrap();
        assert_eq!(toks.texts(), &[vec![1, 2, 1, 2], vec![]]);
        assert!(toks.state().has_gap());
    }

    #[test]
    fn remove_with_padding_keeps_length() {
        let mut toks = corpus();
        let patterns = PatternSet::from_sequences([vec![3]]).unwrap();
        toks.select(&patterns, &SelectOptions::remove().padding(true)).unwrap();
        assert_eq!(toks.texts(), &[vec![1, 2, 0, 4, 1, 2], vec![0, 0]]);
    }

    #[test]
    fn window_selects_neighbours() {
        let mut toks = corpus();
        let patterns = PatternSet::from_sequences([vec![4]]).unwrap();
        toks.select(&patterns, &SelectOptions::keep().window(1, 2)).unwrap();
        assert_eq!(toks.texts(), &[vec![3, 4, 1, 2], vec![]]);
    }

    #[test]
    fn positions_limit_matches() {
        let mut toks = corpus();
        let patterns = PatternSet::from_sequences([vec![1, 2]]).unwrap();
        // last two tokens only
        toks.select(&patterns, &SelectOptions::remove().positions(-2, -1)).unwrap();
        assert_eq!(toks.texts(), &[vec![1, 2, 3, 4], vec![3, 3]]);

        let mut toks = corpus();
        // a match crossing the range boundary does not count
        toks.select(&patterns, &SelectOptions::keep().positions(2, 5)).unwrap();
        assert_eq!(toks.texts(), &[Vec::<TokenId>::new(), vec![]]);
    }

    #[test]
    fn overlap_policy_applies() {
        let mut toks = TokensObject::new(vec![vec![1, 2, 3]], ["a", "b", "c"]).unwrap();
        let patterns = PatternSet::from_sequences([vec![1, 2], vec![2, 3]])
            .unwrap()
            .overlap(OverlapPolicy::All);
        toks.select(&patterns, &SelectOptions::remove()).unwrap();
        assert_eq!(toks.texts(), &[Vec::<TokenId>::new()]);
    }

    #[test]
    fn unknown_pattern_ids_are_rejected() {
        let mut toks = corpus();
        let patterns = PatternSet::from_sequences([vec![9]]).unwrap();
        let res = toks.select(&patterns, &SelectOptions::keep());
        assert!(matches!(res, Err(TokensError::Value(_))));
        assert_eq!(toks.ntoken_total(), 8);
    }

    #[test]
    fn range_resolution() {
        assert_eq!(resolve_range(None, 5), (0, 5));
        assert_eq!(resolve_range(Some((1, 3)), 5), (0, 3));
        assert_eq!(resolve_range(Some((-2, -1)), 5), (3, 5));
        assert_eq!(resolve_range(Some((4, 100)), 5), (3, 5));
        assert_eq!(resolve_range(Some((4, 2)), 5), (3, 3));
    }
}
