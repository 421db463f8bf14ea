use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TokensError};
use crate::tokens::pattern::PatternSet;
use crate::tokens::vocab::Vocabulary;
use crate::tokens::{Text, TokenId, TokensObject, PADDING};

/// Parameters of `TokensObject::lookup`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LookupOptions {
    /// id written for unmatched tokens: `Some(0)` pads,
    /// `Some(k)` writes key `k`, `None` drops them
    pub nomatch: Option<TokenId>,
}

impl LookupOptions {
    pub fn nomatch(nomatch: Option<TokenId>) -> Self {
        Self { nomatch }
    }
}

impl TokensObject {
    /// Dictionary lookup
    /// Every match is replaced by the key ids of its pattern(s); the
    /// vocabulary becomes the key types.
    ///
    /// # Arguments
    /// * `patterns` - dictionary values
    /// * `keys` - `keys[i]` are the key ids (1-based into `key_types`) of pattern `i`
    /// * `key_types` - key strings
    /// * `options` - treatment of unmatched tokens
    ///
    /// # Errors
    /// * `TokensError::Value` - `keys` and `patterns` differ in length,
    ///   a key id or `nomatch` is beyond `key_types`, or a pattern id is unknown
    pub fn lookup<A, S>(
        &mut self,
        patterns: &PatternSet,
        keys: &[A],
        key_types: &[S],
        options: &LookupOptions,
    ) -> Result<()>
    where
        A: AsRef<[TokenId]> + Sync,
        S: AsRef<str>,
    {
        patterns.validate(self.vocab.len())?;
        if keys.len() != patterns.len() {
            return Err(TokensError::value(format!(
                "{} key lists for {} patterns",
                keys.len(),
                patterns.len()
            )));
        }
        let nkey = key_types.len();
        let out_of_range = |k: TokenId| k == PADDING || k as usize > nkey;
        if let Some(&k) = keys.iter().flat_map(|k| k.as_ref()).find(|&&k| out_of_range(k)) {
            return Err(TokensError::value(format!("key id {k} is out of range ({nkey} keys)")));
        }
        if let Some(k) = options.nomatch.filter(|&k| k as usize > nkey) {
            return Err(TokensError::value(format!("nomatch id {k} is out of range ({nkey} keys)")));
        }

        self.exec.for_each_mut(&mut self.texts, |_, text| {
            *text = lookup_text(text, patterns, keys, options.nomatch);
        });
        self.vocab = key_types.iter().collect::<Vocabulary>();
        let has_dup = self.vocab.has_dup();
        self.mark_dirty(true, has_dup);
        debug!(ndoc = self.texts.len(), nkey, "looked up");
        Ok(())
    }
}

fn lookup_text<A>(text: &[TokenId], patterns: &PatternSet, keys: &[A], nomatch: Option<TokenId>) -> Text
where
    A: AsRef<[TokenId]>,
{
    let len = text.len();
    let mut starts: Vec<Vec<TokenId>> = vec![Vec::new(); len];
    let mut covered = vec![false; len];
    for m in patterns.find(text) {
        covered[m.start..m.end].fill(true);
        for &p in m.patterns {
            starts[m.start].extend_from_slice(keys[p].as_ref());
        }
    }

    let mut out = Vec::with_capacity(len);
    for (i, mut ids) in starts.into_iter().enumerate() {
        if !ids.is_empty() {
            ids.sort_unstable();
            ids.dedup();
            out.extend(ids);
        } else if covered[i] {
            continue;
        } else if text[i] == PADDING {
            out.push(PADDING);
        } else if let Some(k) = nomatch {
            out.push(k);
        }
    }
    out
}
