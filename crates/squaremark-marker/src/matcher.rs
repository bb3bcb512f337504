//! Bounded Hamming matching against a marker dictionary.

use crate::{BitSignature, MarkerDictionary, MarkerError};

/// A dictionary hit for an observed signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignatureMatch {
    /// Dictionary entry index.
    pub index: usize,
    /// Hamming distance to that entry.
    pub distance: usize,
}

/// First-match lookup with a fixed Hamming tolerance.
///
/// Entries are scanned in index order and the first one within `tolerance`
/// wins, even if a later entry would be closer.
#[derive(Clone, Debug)]
pub struct Matcher {
    dictionary: MarkerDictionary,
    tolerance: usize,
}

impl Matcher {
    pub fn new(dictionary: MarkerDictionary, tolerance: usize) -> Self {
        Self {
            dictionary,
            tolerance,
        }
    }

    #[inline]
    pub fn dictionary(&self) -> &MarkerDictionary {
        &self.dictionary
    }

    #[inline]
    pub fn tolerance(&self) -> usize {
        self.tolerance
    }

    pub fn match_signature(&self, observed: &BitSignature) -> Result<Option<SignatureMatch>, MarkerError> {
        match_signature(&self.dictionary, observed, self.tolerance)
    }
}

/// Return the first entry of `dictionary` within `tolerance` of `observed`.
///
/// Fails when the signature length differs from the dictionary's.
pub fn match_signature(
    dictionary: &MarkerDictionary,
    observed: &BitSignature,
    tolerance: usize,
) -> Result<Option<SignatureMatch>, MarkerError> {
    if observed.bits() != dictionary.bits() {
        return Err(MarkerError::SignatureLength {
            left: observed.bits(),
            right: dictionary.bits(),
        });
    }

    for (index, entry) in dictionary.entries().iter().enumerate() {
        let distance = observed.hamming(&entry.signature)?;
        if distance <= tolerance {
            return Ok(Some(SignatureMatch { index, distance }));
        }
    }
    Ok(None)
}
