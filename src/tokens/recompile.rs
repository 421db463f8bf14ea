use tracing::{debug, trace};

use crate::error::Result;
use crate::tokens::vocab::Vocabulary;
use crate::tokens::{check_ids, Text, Texts, TokenId, TokensObject, TokensState, PADDING};
use crate::utils::parallel::Executor;

impl TokensObject {
    /// Restore the clean encoding
    /// - duplicated types are merged into their first occurrence
    /// - unused types are dropped
    /// - ids are renumbered densely in order of first occurrence across documents
    ///
    /// Padding is never remapped. Calling it on a clean object does nothing.
    pub fn recompile(&mut self) {
        if self.state.is_clean() {
            trace!("already recompiled");
            return;
        }
        let before = self.vocab.len();
        self.vocab = renumber(&mut self.texts, &self.vocab, &self.exec);
        self.state = TokensState::Clean;
        debug!(ndoc = self.texts.len(), ntype_before = before, ntype = self.vocab.len(), "recompiled");
    }
}

/// Recompile a detached corpus and vocabulary
///
/// # Returns
/// * `(Texts, Vocabulary)` - rewritten documents and their dense vocabulary
///
/// # Errors
/// * `TokensError::Value` - a document uses an id beyond the vocabulary
pub fn recompile(mut texts: Texts, vocab: &Vocabulary) -> Result<(Texts, Vocabulary)> {
    check_ids(&texts, vocab.len())?;
    let vocab = renumber(&mut texts, vocab, &Executor::sequential());
    Ok((texts, vocab))
}

/// Whether `texts` and `vocab` already are in the recompiled encoding:
/// no duplicated type, every type used, ids in order of first occurrence
pub(crate) fn is_canonical(texts: &[Text], vocab: &Vocabulary) -> bool {
    if vocab.has_dup() {
        return false;
    }
    let mut next: TokenId = 1;
    for &id in texts.iter().flatten() {
        if id == next {
            next += 1;
        } else if id > next {
            return false;
        }
    }
    next as usize == vocab.len() + 1
}

/// Rewrite `texts` in place and return the vocabulary for the new ids
pub(crate) fn renumber(texts: &mut [Text], vocab: &Vocabulary, exec: &Executor) -> Vocabulary {
    // old id -> canonical old id
    let canonical = if vocab.has_dup() {
        vocab.canonical_ids()
    } else {
        (0..=vocab.len() as TokenId).collect()
    };

    // canonical old id -> new id, assigned by first occurrence
    let mut new_ids: Vec<TokenId> = vec![PADDING; vocab.len() + 1];
    let mut order: Vec<TokenId> = Vec::new();
    for text in texts.iter() {
        for &id in text {
            if id == PADDING {
                continue;
            }
            let c = canonical[id as usize];
            if new_ids[c as usize] == PADDING {
                order.push(c);
                new_ids[c as usize] = order.len() as TokenId;
            }
        }
    }

    let remap: Vec<TokenId> = canonical.iter().map(|&c| new_ids[c as usize]).collect();
    exec.for_each_mut(texts, |_, text| {
        for id in text.iter_mut() {
            *id = remap[*id as usize];
        }
    });

    order
        .iter()
        .map(|&c| vocab.get(c).unwrap_or(""))
        .collect()
}
