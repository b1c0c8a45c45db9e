use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a scene. All of them are fatal at
/// construction time; there is no partial-scene recovery.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to load OBJ {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("no triangles in {0}")]
    EmptyMesh(PathBuf),

    #[error("failed to decode texture {path}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to parse scene {path}: {source}")]
    Scene {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AssetResult<T> = Result<T, AssetError>;
