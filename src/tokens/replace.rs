use tracing::debug;

use crate::error::{Result, TokensError};
use crate::tokens::pattern::PatternSet;
use crate::tokens::{Text, TokenId, TokensObject};

impl TokensObject {
    /// Substitute every non-overlapping match of pattern `i` by `replacements[i]`
    ///
    /// Replacements are id sequences in the current vocabulary and may be
    /// empty or of a different length than the match. `All` is resolved as `Longest`.
    ///
    /// # Errors
    /// * `TokensError::Value` - lengths differ, or a pattern / replacement id is unknown
    pub fn replace<A>(&mut self, patterns: &PatternSet, replacements: &[A]) -> Result<()>
    where
        A: AsRef<[TokenId]> + Sync,
    {
        patterns.validate(self.vocab.len())?;
        if replacements.len() != patterns.len() {
            return Err(TokensError::value(format!(
                "{} replacements for {} patterns",
                replacements.len(),
                patterns.len()
            )));
        }
        for &id in replacements.iter().flat_map(|r| r.as_ref()) {
            self.check_id(id)?;
        }

        self.exec.for_each_mut(&mut self.texts, |_, text| {
            *text = replace_text(text, patterns, replacements);
        });
        self.mark_dirty(true, false);
        debug!(ndoc = self.texts.len(), ntoken = self.ntoken_total(), "replaced");
        Ok(())
    }
}

fn replace_text<A>(text: &[TokenId], patterns: &PatternSet, replacements: &[A]) -> Text
where
    A: AsRef<[TokenId]>,
{
    let mut out = Vec::with_capacity(text.len());
    let mut last = 0;
    for m in patterns.find_disjoint(text) {
        out.extend_from_slice(&text[last..m.start]);
        out.extend_from_slice(replacements[m.patterns[0]].as_ref());
        last = m.end;
    }
    out.extend_from_slice(&text[last..]);
    out
}
