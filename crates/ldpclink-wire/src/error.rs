/// Errors raised while interpreting protocol fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The device announced a block code with zero information or codeword bits.
    #[error("invalid code parameters K={k} N={n} (both must be non-zero)")]
    InvalidParameters { k: u16, n: u16 },
}

pub type Result<T> = std::result::Result<T, WireError>;
