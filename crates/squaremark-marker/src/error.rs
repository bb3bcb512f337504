use thiserror::Error;

/// Precondition failures of the marker pipeline.
///
/// Rejected candidates and unmatched signatures are not errors; they show up
/// as `None` or an empty result instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    #[error("bit count {bits} is not a perfect square between 1 and 1024")]
    InvalidBits { bits: usize },
    #[error("signature lengths differ ({left} vs {right})")]
    SignatureLength { left: usize, right: usize },
    #[error("dictionary has no entries")]
    EmptyDictionary,
    #[error("dictionary signatures have {dictionary} bits, detector samples {detector}")]
    BitsMismatch { dictionary: usize, detector: usize },
    #[error("reference image is empty ({width}x{height})")]
    EmptyReference { width: usize, height: usize },
    #[error("invalid marker code: {reason}")]
    InvalidCode { reason: String },
}
