//! Rotation-aware dictionaries built from reference marker images.

use crate::signature::{BitSignature, SignatureSampler};
use crate::MarkerError;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use squaremark_core::{GrayImageView, Quad};

/// Entries produced per reference image, one per quarter turn.
pub const ROTATIONS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryParams {
    /// Signature length; must be a perfect square.
    pub bits: usize,
    /// Physical side length of the printed marker, in world units.
    pub marker_side: f64,
}

impl Default for DictionaryParams {
    fn default() -> Self {
        Self {
            bits: 36,
            marker_side: 25.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub signature: BitSignature,
    /// Marker-frame corners paired with the canonical image corners.
    pub world_corners: [Point3<f64>; 4],
    /// Which reference image produced the entry.
    pub marker: usize,
    /// Clockwise quarter turns applied to the reference before sampling.
    pub rotation: u8,
}

/// Ordered dictionary; an entry's position is its identity label.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkerDictionary {
    bits: usize,
    entries: Vec<DictionaryEntry>,
}

impl MarkerDictionary {
    /// Build the four entries of a single reference image that fills its
    /// frame.
    pub fn from_reference(
        reference: &GrayImageView<'_>,
        params: &DictionaryParams,
    ) -> Result<Self, MarkerError> {
        Self::from_references(std::slice::from_ref(reference), params)
    }

    /// Concatenate the four-entry blocks of several reference images.
    ///
    /// Entry `4 * m + k` holds reference `m` rotated `k` quarter turns.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(references, params), fields(n = references.len(), bits = params.bits))
    )]
    pub fn from_references(
        references: &[GrayImageView<'_>],
        params: &DictionaryParams,
    ) -> Result<Self, MarkerError> {
        if references.is_empty() {
            return Err(MarkerError::EmptyDictionary);
        }
        let sampler = SignatureSampler::new(params.bits)?;

        let mut entries = Vec::with_capacity(references.len() * ROTATIONS);
        for (marker, reference) in references.iter().enumerate() {
            entries.extend(reference_entries(reference, marker, &sampler, params.marker_side)?);
        }

        log::debug!(
            "dictionary: {} reference(s), {} entries of {} bits",
            references.len(),
            entries.len(),
            params.bits
        );
        Ok(Self {
            bits: params.bits,
            entries,
        })
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of reference images the dictionary was built from.
    pub fn marker_count(&self) -> usize {
        self.entries.len() / ROTATIONS
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&DictionaryEntry> {
        self.entries.get(index)
    }

    pub fn world_corners(&self, index: usize) -> Option<[Point3<f64>; 4]> {
        self.entries.get(index).map(|e| e.world_corners)
    }
}

fn reference_entries(
    reference: &GrayImageView<'_>,
    marker: usize,
    sampler: &SignatureSampler,
    side: f64,
) -> Result<Vec<DictionaryEntry>, MarkerError> {
    let empty = MarkerError::EmptyReference {
        width: reference.width,
        height: reference.height,
    };
    if reference.is_empty() || reference.data.len() != reference.width * reference.height {
        return Err(empty);
    }

    let base = reference.to_owned_image();
    let mut world = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(side, 0.0, 0.0),
        Point3::new(side, side, 0.0),
        Point3::new(0.0, side, 0.0),
    ];

    let mut out = Vec::with_capacity(ROTATIONS);
    for rotation in 0..ROTATIONS as u8 {
        let turned = base.rotated_cw(rotation);
        let quad = Quad::from_size(turned.width as f32, turned.height as f32);
        let signature = sampler
            .sample(&turned.view(), &quad)
            .ok_or_else(|| empty.clone())?;
        log::trace!(
            "marker {marker} rotation {rotation}: {}",
            signature.to_bit_string()
        );

        out.push(DictionaryEntry {
            signature,
            world_corners: world,
            marker,
            rotation,
        });
        world.rotate_right(1);
    }
    Ok(out)
}
