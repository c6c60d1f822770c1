/// A value that cannot be represented on the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("{container} mixes element types: expected {expected}, got {actual}")]
    MixedElementTypes {
        container: &'static str,
        expected: String,
        actual: String,
    },

    #[error("{what} length {len} does not fit the wire format")]
    LengthOverflow { what: &'static str, len: usize },
}
