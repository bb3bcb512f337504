use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoseError {
    #[error("marker points do not lie on the z = 0 plane")]
    NonPlanar,
    #[error("need 4 matching correspondences, got {world} world and {image} image points")]
    Correspondences { world: usize, image: usize },
    #[error("degenerate geometry: {0}")]
    Degenerate(&'static str),
    #[error("camera intrinsics are singular")]
    Singular,
    #[error("no dictionary entry {index}")]
    UnknownEntry { index: usize },
}
