//! JSON configuration and report types for batch detection.

use crate::marker::{
    DetectorParams, DictionaryParams, MarkerDetector, MarkerDictionary, MarkerError,
    RecognizedMarker, ROTATIONS,
};
use crate::pose::{axis_points, project_points, CameraModel, MarkerPose, PoseError};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Batch detection job: reference images, frames and parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Reference marker images; entry `4 * m + k` belongs to reference `m`.
    pub reference_paths: Vec<String>,
    pub frame_paths: Vec<String>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub dictionary: DictionaryParams,
    #[serde(default)]
    pub detector: DetectorParams,
    /// Poses are estimated only when a camera is given.
    #[serde(default)]
    pub camera: Option<CameraModel>,
}

impl DetectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_pretty(self, path)
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("squaremark_report.json"))
    }

    /// Detector parameters with the signature length taken from the
    /// dictionary section, so the two cannot disagree.
    pub fn detector_params(&self) -> DetectorParams {
        DetectorParams {
            bits: self.dictionary.bits,
            ..self.detector.clone()
        }
    }

    pub fn build_detector(&self, dictionary: MarkerDictionary) -> Result<MarkerDetector, MarkerError> {
        MarkerDetector::new(dictionary, self.detector_params())
    }
}

fn write_pretty<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseReport {
    /// Axis-angle rotation, camera from marker.
    pub rvec: [f64; 3],
    pub tvec: [f64; 3],
    pub reprojection_rmse: f64,
    /// Projected origin and x, y, z axis ends, one marker side long.
    pub axes_px: Vec<Option<[f64; 2]>>,
}

impl PoseReport {
    pub fn new(pose: &MarkerPose, camera: &CameraModel, axis_length: f64) -> Self {
        let r = pose.rvec();
        let t = pose.tvec();
        Self {
            rvec: [r.x, r.y, r.z],
            tvec: [t.x, t.y, t.z],
            reprojection_rmse: pose.reprojection_rmse,
            axes_px: project_points(pose, camera, &axis_points(axis_length))
                .into_iter()
                .map(|p| p.map(|p| [p.x, p.y]))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerReport {
    /// Dictionary entry index.
    pub index: usize,
    /// Reference image the entry came from.
    pub reference: usize,
    /// Quarter turns of that reference.
    pub rotation: u8,
    pub distance: usize,
    pub corners: [[f32; 2]; 4],
    #[serde(default)]
    pub pose: Option<PoseReport>,
    #[serde(default)]
    pub pose_error: Option<String>,
}

impl MarkerReport {
    pub fn new(marker: &RecognizedMarker, dictionary: &MarkerDictionary) -> Self {
        let (reference, rotation) = dictionary
            .entry(marker.index)
            .map(|e| (e.marker, e.rotation))
            .unwrap_or((marker.index / ROTATIONS, 0));
        Self {
            index: marker.index,
            reference,
            rotation,
            distance: marker.distance,
            corners: marker.corners.corners.map(|c| [c.x, c.y]),
            pose: None,
            pose_error: None,
        }
    }

    pub fn with_pose(
        mut self,
        pose: Result<MarkerPose, PoseError>,
        camera: &CameraModel,
        axis_length: f64,
    ) -> Self {
        match pose {
            Ok(p) => self.pose = Some(PoseReport::new(&p, camera, axis_length)),
            Err(e) => self.pose_error = Some(e.to_string()),
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub image_path: String,
    pub width: u32,
    pub height: u32,
    pub markers: Vec<MarkerReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectReport {
    pub reference_paths: Vec<String>,
    pub dictionary_entries: usize,
    pub dictionary: DictionaryParams,
    pub detector: DetectorParams,
    #[serde(default)]
    pub camera: Option<CameraModel>,
    pub frames: Vec<FrameReport>,
}

impl DetectReport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        write_pretty(self, path)
    }

    pub fn marker_count(&self) -> usize {
        self.frames.iter().map(|f| f.markers.len()).sum()
    }
}
