/// This crate is a tokenized-corpus engine: integer-coded documents, their
/// vocabulary, and the transforms and sparse matrices built on top of them.
pub mod config;
pub mod error;
pub mod matrix;
pub mod tokens;
pub mod utils;

/// Tokens Object
/// The top-level struct of this crate. It owns a corpus of documents, each an
/// ordered sequence of integer ids, and the vocabulary the ids refer to.
///
/// Every transform is a method taking `&mut self`:
/// - `chunk`, `segment`: split documents, returning their provenance
/// - `ngrams`: n-grams and skip-grams as composite types
/// - `select`, `lookup`, `replace`, `compound`: pattern-driven rewrites
/// - `group`, `combine`, `subset`: reshape the document list
/// - `dfm`, `fcm`: sparse matrices
///
/// Transforms may leave unused or duplicated types behind; `recompile`
/// restores a dense numbering and is called by the consuming operations.
///
/// Per-document work runs on rayon according to the object's `TokensConfig`,
/// and the output never depends on the number of threads.
///
/// # Serialization
/// Supported (`to_cbor` / `from_cbor`).
/// The worker pool is not stored; it is rebuilt from the configuration.
pub use tokens::TokensObject;

/// Encoding state of a `TokensObject`
/// `Clean` or `Dirty { has_gap, has_dup }`.
pub use tokens::TokensState;

/// Token id type and the padding id (0)
pub use tokens::{TokenId, PADDING};

/// Vocabulary
/// Ordered type strings with a string -> id index.
/// Supports glob and regex matching of types to build patterns.
pub use tokens::vocab::Vocabulary;

/// Pattern Set and matching options
/// Id-sequence patterns used by `select`, `lookup`, `replace`, `compound`,
/// `segment` and `index`, with the overlap policy resolving competing matches.
pub use tokens::pattern::{OverlapPolicy, PatternSet, Window};

/// Options of the individual transforms
pub use tokens::compound::CompoundOptions;
pub use tokens::lookup::LookupOptions;
pub use tokens::ngrams::{NgramOptions, NgramPadding};
pub use tokens::segment::{SegmentOptions, SegmentPosition};
pub use tokens::select::{SelectMode, SelectOptions};
pub use matrix::fcm::FcmOptions;

/// Pattern hit reported by `TokensObject::index`
pub use tokens::index::Hit;

pub use tokens::group::is_grouped;
pub use tokens::recompile::recompile;

/// Compressed sparse column matrix
/// Output of `dfm` and `fcm`; the value type is generic over `num::Num`.
pub use matrix::CscMatrix;

pub use config::{Threads, TokensConfig};
pub use error::{Result, TokensError};
