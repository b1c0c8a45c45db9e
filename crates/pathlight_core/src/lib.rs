//! Asset layer for the pathlight renderer.
//!
//! Loads wavefront OBJ/MTL geometry, decodes textures into samplers,
//! and parses the JSON scene description. Everything here is populated
//! before rendering starts and is read-only afterwards.

mod error;
mod material;
mod obj;
mod scene;
mod texture;

pub use error::{AssetError, AssetResult};
pub use material::Material;
pub use obj::{MaterialGroup, MeshData, Vertex};
pub use scene::{CameraDescription, MaterialOverride, MeshPlacement, RenderSettings, SceneDescription};
pub use texture::{Filter, Sampler2D, Texture, TextureCache, WrapMode, MAGENTA};
