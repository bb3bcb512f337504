use crate::config::{DetectConfig, DetectReport, FrameReport, MarkerReport};
use crate::core::{self, GrayImageView};
use crate::marker::{
    DictionaryParams, MarkerDetector, MarkerDictionary, MarkerError, RecognizedMarker,
};
use crate::pose::{estimate_poses, PlanarHomographyPose};
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Image(#[from] ::image::ImageError),

    #[error(transparent)]
    Marker(#[from] MarkerError),
}

/// Convert an `image::GrayImage` into the lightweight `squaremark-core` view type.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Luma conversion of any decoded image.
pub fn to_gray(img: &::image::DynamicImage) -> ::image::GrayImage {
    img.to_luma8()
}

/// Decode an image file and convert it to grayscale.
pub fn load_gray(path: impl AsRef<Path>) -> Result<::image::GrayImage, DetectError> {
    Ok(to_gray(&::image::open(path)?))
}

/// Wrap a raw row-major 8-bit buffer.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<::image::GrayImage, DetectError> {
    if width == 0 || height == 0 {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    }
    let expected = width as usize * height as usize;
    if data.len() != expected {
        return Err(DetectError::InvalidGrayBuffer {
            expected,
            got: data.len(),
        });
    }
    ::image::GrayImage::from_raw(width, height, data.to_vec()).ok_or(
        DetectError::InvalidGrayBuffer {
            expected,
            got: data.len(),
        },
    )
}

/// Convert a `squaremark-core` image (e.g. a rendered marker) for saving.
pub fn from_core_image(img: &core::GrayImage) -> Result<::image::GrayImage, DetectError> {
    // oversized dimensions saturate and then fail the buffer length check
    let width = u32::try_from(img.width).unwrap_or(u32::MAX);
    let height = u32::try_from(img.height).unwrap_or(u32::MAX);
    gray_image_from_slice(width, height, &img.data)
}

/// Build a dictionary from reference images that fill their frames.
pub fn build_dictionary(
    references: &[::image::GrayImage],
    params: &DictionaryParams,
) -> Result<MarkerDictionary, DetectError> {
    let views: Vec<_> = references.iter().map(gray_view).collect();
    Ok(MarkerDictionary::from_references(&views, params)?)
}

/// Run the detector on an `image::GrayImage`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, detector), fields(width = img.width(), height = img.height()))
)]
pub fn detect_markers(img: &::image::GrayImage, detector: &MarkerDetector) -> Vec<RecognizedMarker> {
    detector.detect(&gray_view(img))
}

/// Run a whole batch job: build the dictionary, detect in every frame and,
/// when a camera is configured, estimate one pose per marker.
pub fn run_detect_config(cfg: &DetectConfig) -> Result<DetectReport, DetectError> {
    let references = cfg
        .reference_paths
        .iter()
        .map(load_gray)
        .collect::<Result<Vec<_>, _>>()?;
    let dictionary = build_dictionary(&references, &cfg.dictionary)?;
    let dictionary_entries = dictionary.len();
    let detector = cfg.build_detector(dictionary)?;
    let axis_length = cfg.dictionary.marker_side;

    let mut frames = Vec::with_capacity(cfg.frame_paths.len());
    for path in &cfg.frame_paths {
        let img = load_gray(path)?;
        let found = detect_markers(&img, &detector);
        log::info!("{path}: {} marker(s)", found.len());

        let mut markers: Vec<MarkerReport> = found
            .iter()
            .map(|m| MarkerReport::new(m, detector.dictionary()))
            .collect();
        if let Some(camera) = &cfg.camera {
            let poses = estimate_poses(&PlanarHomographyPose, camera, detector.dictionary(), &found);
            markers = markers
                .into_iter()
                .zip(poses)
                .map(|(report, pose)| report.with_pose(pose, camera, axis_length))
                .collect();
        }

        frames.push(FrameReport {
            image_path: path.clone(),
            width: img.width(),
            height: img.height(),
            markers,
        });
    }

    Ok(DetectReport {
        reference_paths: cfg.reference_paths.clone(),
        dictionary_entries,
        dictionary: cfg.dictionary,
        detector: detector.params().clone(),
        camera: cfg.camera,
        frames,
    })
}
