use std::hash::Hash;

use ahash::RandomState;
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Result, TokensError};
use crate::tokens::{Text, TokensObject};

impl TokensObject {
    /// Concatenate documents sharing a key
    ///
    /// Documents keep their original order inside a group and groups are
    /// ordered by the first occurrence of their key.
    ///
    /// # Arguments
    /// * `keys` - one key per document
    ///
    /// # Returns
    /// * `Vec<K>` - the distinct keys, in output order
    ///
    /// # Errors
    /// * `TokensError::Value` - `keys.len() != ndoc`
    pub fn group<K>(&mut self, keys: &[K]) -> Result<Vec<K>>
    where
        K: Eq + Hash + Clone,
    {
        if keys.len() != self.texts.len() {
            return Err(TokensError::value(format!(
                "{} keys for {} documents",
                keys.len(),
                self.texts.len()
            )));
        }
        let members = group_members(keys);
        let texts = &self.texts;
        let groups: Vec<Vec<usize>> = members.values().cloned().collect();
        let grouped: Vec<Text> = self.exec.map(&groups, |_, docs| {
            let mut text = Vec::with_capacity(docs.iter().map(|&d| texts[d].len()).sum());
            for &d in docs {
                text.extend_from_slice(&texts[d]);
            }
            text
        });
        debug!(ndoc_before = self.texts.len(), ndoc = grouped.len(), "grouped");
        self.texts = grouped;
        // reordering documents changes the order of first occurrence
        self.mark_dirty(true, false);
        Ok(members.into_keys().collect())
    }
}

/// Document indices of each key, keys in order of first occurrence
fn group_members<K>(keys: &[K]) -> IndexMap<K, Vec<usize>, RandomState>
where
    K: Eq + Hash + Clone,
{
    let mut members: IndexMap<K, Vec<usize>, RandomState> = IndexMap::with_hasher(RandomState::new());
    for (d, key) in keys.iter().enumerate() {
        members.entry(key.clone()).or_default().push(d);
    }
    members
}

/// Whether `values` is constant within every group of `groups`
///
/// # Errors
/// * `TokensError::Value` - `values` and `groups` differ in length
pub fn is_grouped<V, K>(values: &[V], groups: &[K]) -> Result<bool>
where
    V: PartialEq,
    K: Eq + Hash,
{
    if values.len() != groups.len() {
        return Err(TokensError::value(format!(
            "{} values for {} group keys",
            values.len(),
            groups.len()
        )));
    }
    let mut first: IndexMap<&K, &V, RandomState> = IndexMap::with_hasher(RandomState::new());
    for (value, key) in values.iter().zip(groups) {
        let seen = *first.entry(key).or_insert(value);
        if seen != value {
            return Ok(false);
        }
    }
    Ok(true)
}
