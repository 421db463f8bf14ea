use serde::Deserialize;
use tracing::debug;

use crate::config::TokensConfig;
use crate::error::{Result, TokensError};
use crate::tokens::recompile::is_canonical;
use crate::tokens::vocab::Vocabulary;
use crate::tokens::{check_ids, Texts, TokensObject, TokensState};
use crate::utils::parallel::Executor;

/// Deserialized form of a `TokensObject`
/// The worker pool is not part of the data; it is rebuilt from `config`
/// by `into_tokens_object`, which also checks every id against the vocabulary
/// and only trusts a stored `Clean` state when the encoding really is clean.
#[derive(Debug, Deserialize)]
pub struct TokensData {
    pub texts: Texts,
    pub vocab: Vocabulary,
    pub state: TokensState,
    #[serde(default)]
    pub config: TokensConfig,
}

impl TokensData {
    pub fn into_tokens_object(self) -> Result<TokensObject> {
        check_ids(&self.texts, self.vocab.len())?;
        let exec = Executor::new(self.config.threads)?;
        let state = if self.state.is_clean() && !is_canonical(&self.texts, &self.vocab) {
            TokensState::unknown()
        } else {
            self.state
        };
        Ok(TokensObject {
            texts: self.texts,
            vocab: self.vocab,
            state,
            config: self.config,
            exec,
        })
    }
}

impl TryFrom<TokensData> for TokensObject {
    type Error = TokensError;

    fn try_from(data: TokensData) -> Result<Self> {
        data.into_tokens_object()
    }
}

impl TokensObject {
    /// Encode as CBOR
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        let bytes = serde_cbor::to_vec(self)?;
        debug!(ndoc = self.texts.len(), bytes = bytes.len(), "encoded");
        Ok(bytes)
    }

    /// Decode from CBOR
    ///
    /// # Errors
    /// * `TokensError::Serialization` - malformed input
    /// * `TokensError::Value` - a document uses an id beyond the vocabulary
    pub fn from_cbor(bytes: &[u8]) -> Result<Self> {
        let data: TokensData = serde_cbor::from_slice(bytes)?;
        data.into_tokens_object()
    }
}
