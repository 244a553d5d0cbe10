/// Tokenizer seam consumed by registered preprocessing functions.
///
/// The dispatcher never inspects the tokenizer; it is handed through to the
/// resolved callable untouched.
pub trait Tokenizer {
    fn encode(&self, text: &str) -> Vec<u32>;

    fn token_count(&self, text: &str) -> usize {
        self.encode(text).len()
    }
}
