use tracing::debug;

use crate::error::{Result, TokensError};
use crate::tokens::{Text, TokenId, TokensObject};

impl TokensObject {
    /// Split every document into windows of `size` tokens
    /// advancing by `size - overlap`; the last window may be shorter.
    /// Empty documents produce no chunk.
    ///
    /// # Arguments
    /// * `size` - chunk length
    /// * `overlap` - tokens shared by consecutive chunks
    ///
    /// # Returns
    /// * `Vec<usize>` - 1-based source document of each chunk
    ///
    /// # Errors
    /// * `TokensError::Value` - `size == 0` or `overlap >= size`
    pub fn chunk(&mut self, size: usize, overlap: usize) -> Result<Vec<usize>> {
        if size == 0 || overlap >= size {
            return Err(TokensError::value(format!(
                "invalid chunk parameters: size {size}, overlap {overlap} (overlap must be smaller than size)"
            )));
        }
        let step = size - overlap;
        let parts = self.exec.map(&self.texts, |_, text| chunk_text(text, size, step));

        let n: usize = parts.iter().map(|p| p.len()).sum();
        let mut texts = Vec::with_capacity(n);
        let mut documents = Vec::with_capacity(n);
        for (h, chunks) in parts.into_iter().enumerate() {
            documents.extend(std::iter::repeat(h + 1).take(chunks.len()));
            texts.extend(chunks);
        }
        debug!(ndoc_before = self.texts.len(), ndoc = texts.len(), size, overlap, "chunked");
        self.texts = texts;
        Ok(documents)
    }
}

fn chunk_text(text: &[TokenId], size: usize, step: usize) -> Vec<Text> {
    let len = text.len();
    let mut chunks = Vec::with_capacity(len.div_ceil(step));
    let mut i = 0;
    while i < len {
        let end = (i + size).min(len);
        chunks.push(text[i..end].to_vec());
        if end == len {
            break;
        }
        i += step;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six() -> TokensObject {
        TokensObject::new(vec![vec![1, 2, 3, 4, 5, 6]], ["a", "b", "c", "d", "e", "f"]).unwrap()
    }

    #[test]
    fn chunks_without_overlap() {
        let mut toks = six();
        let docs = toks.chunk(2, 0).unwrap();
        assert_eq!(toks.texts(), &[vec![1, 2], vec![3, 4], vec![5, 6]]);
        assert_eq!(docs, vec![1, 1, 1]);
    }

    #[test]
    fn chunks_with_overlap() {
        let mut toks = six();
        toks.chunk(2, 1).unwrap();
        assert_eq!(
            toks.texts(),
            &[vec![1, 2], vec![2, 3], vec![3, 4], vec![4, 5], vec![5, 6]]
        );
    }

    #[test]
    fn last_chunk_is_truncated() {
        let mut toks = six();
        toks.chunk(4, 0).unwrap();
        assert_eq!(toks.texts(), &[vec![1, 2, 3, 4], vec![5, 6]]);
    }

    #[test]
    fn concatenated_chunks_rebuild_the_document() {
        let original: Vec<TokenId> = (1..=23).collect();
        let mut toks = TokensObject::new(vec![original.clone()], (1..=23).map(|i| i.to_string())).unwrap();
        toks.chunk(5, 0).unwrap();
        let joined: Vec<TokenId> = toks.texts().concat();
        assert_eq!(joined, original);
    }

    #[test]
    fn provenance_and_empty_documents() {
        let mut toks = TokensObject::new(vec![vec![1, 2, 3], vec![], vec![2]], ["a", "b", "c"]).unwrap();
        let docs = toks.chunk(2, 0).unwrap();
        assert_eq!(docs, vec![1, 1, 3]);
        assert_eq!(toks.texts(), &[vec![1, 2], vec![3], vec![2]]);
    }

    #[test]
    fn degenerate_parameters() {
        let mut toks = six();
        assert!(matches!(toks.chunk(0, 0), Err(TokensError::Value(_))));
        assert!(matches!(toks.chunk(2, 2), Err(TokensError::Value(_))));
        assert_eq!(toks.ndoc(), 1);
    }
}
