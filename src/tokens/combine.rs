use tracing::debug;

use crate::error::{Result, TokensError};
use crate::tokens::{Text, TokenId, TokensObject, PADDING};

impl TokensObject {
    /// Append the documents of `other`
    ///
    /// Vocabularies are united by string equality; the other's ids are
    /// remapped and types new to `self` are appended in the other's id order,
    /// so the result is still recompiled.
    ///
    /// # Errors
    /// * `TokensError::Value` - either operand is not recompiled
    pub fn combine(&mut self, other: &TokensObject) -> Result<()> {
        if !self.state.is_clean() || !other.state.is_clean() {
            return Err(TokensError::value("both operands must be recompiled before they are combined"));
        }
        let mut remap: Vec<TokenId> = Vec::with_capacity(other.vocab.len() + 1);
        remap.push(PADDING);
        for token in other.vocab.iter() {
            remap.push(self.vocab.intern(token));
        }
        let appended: Vec<Text> = self.exec.map(&other.texts, |_, text| {
            text.iter().map(|&id| remap[id as usize]).collect()
        });
        self.texts.extend(appended);
        debug!(ndoc = self.texts.len(), ntype = self.vocab.len(), "combined");
        Ok(())
    }

    /// Keep the documents at `indices` (1-based), in that order; repeats are allowed
    ///
    /// # Errors
    /// * `TokensError::Range` - an index is outside `[1, ndoc]`
    pub fn subset(&mut self, indices: &[usize]) -> Result<()> {
        let ndoc = self.texts.len();
        if let Some(&index) = indices.iter().find(|&&i| i == 0 || i > ndoc) {
            return Err(TokensError::Range { index, ndoc });
        }
        let texts = &self.texts;
        self.texts = self.exec.map(indices, |_, &i| texts[i - 1].clone());
        self.mark_dirty(true, false);
        debug!(ndoc_before = ndoc, ndoc = self.texts.len(), "subset");
        Ok(())
    }
}
