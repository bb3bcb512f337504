//! Per-frame marker detection.

use crate::candidates::{find_candidates, CandidateParams};
use crate::signature::SignatureSampler;
use crate::{MarkerDictionary, MarkerError, Matcher};
use serde::{Deserialize, Serialize};
use squaremark_core::{GrayImageView, Quad};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    /// Signature length; must equal the dictionary's.
    pub bits: usize,
    /// Largest accepted Hamming distance.
    pub tolerance: usize,
    /// Stop after this many markers; `0` disables the cap.
    pub max_markers: usize,
    pub candidates: CandidateParams,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            bits: 36,
            tolerance: 1,
            max_markers: 3,
            candidates: CandidateParams::default(),
        }
    }
}

/// A candidate that matched a dictionary entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognizedMarker {
    pub corners: Quad,
    /// Dictionary entry index.
    pub index: usize,
    /// Hamming distance to that entry.
    pub distance: usize,
}

/// Candidate finder, sampler and matcher wired together.
#[derive(Clone, Debug)]
pub struct MarkerDetector {
    params: DetectorParams,
    sampler: SignatureSampler,
    matcher: Matcher,
}

impl MarkerDetector {
    /// Validate `params` against `dictionary` and build a detector.
    pub fn new(dictionary: MarkerDictionary, params: DetectorParams) -> Result<Self, MarkerError> {
        if dictionary.is_empty() {
            return Err(MarkerError::EmptyDictionary);
        }
        let sampler = SignatureSampler::new(params.bits)?;
        if dictionary.bits() != params.bits {
            return Err(MarkerError::BitsMismatch {
                dictionary: dictionary.bits(),
                detector: params.bits,
            });
        }
        let matcher = Matcher::new(dictionary, params.tolerance);
        Ok(Self {
            params,
            sampler,
            matcher,
        })
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    pub fn dictionary(&self) -> &MarkerDictionary {
        self.matcher.dictionary()
    }

    /// Detect markers in scan order, up to `max_markers` of them.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "info", skip(self, img), fields(w = img.width, h = img.height))
    )]
    pub fn detect(&self, img: &GrayImageView<'_>) -> Vec<RecognizedMarker> {
        let candidates = find_candidates(img, &self.params.candidates);
        let cap = match self.params.max_markers {
            0 => usize::MAX,
            n => n,
        };

        let mut out = Vec::new();
        for quad in candidates.iter() {
            if out.len() >= cap {
                break;
            }
            let Some(signature) = self.sampler.sample(img, quad) else {
                continue;
            };
            // lengths agree by construction
            let Ok(found) = self.matcher.match_signature(&signature) else {
                continue;
            };
            match found {
                Some(m) => out.push(RecognizedMarker {
                    corners: *quad,
                    index: m.index,
                    distance: m.distance,
                }),
                None => log::trace!(
                    "no entry within {} of {}",
                    self.params.tolerance,
                    signature.to_bit_string()
                ),
            }
        }

        log::debug!(
            "{} candidates -> {} markers",
            candidates.len(),
            out.len()
        );
        out
    }
}
