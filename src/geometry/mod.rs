//! Platform geometry generation
//!
//! Everything here builds plain vertex/UV/index buffers from the shared curve
//! function. No renderer types leak in.

pub mod cache;
pub mod mesh;
pub mod ribbon;
pub mod surface;

pub use cache::{CacheStats, GeometryCache, GeometryKey, PlatformGeometry};
pub use mesh::MeshData;
pub use ribbon::{RibbonMesh, TextTextureRequest, build_ribbon_mesh, build_text_ribbon};
pub use surface::{HeightFn, SurfaceMesh, build_platform_surface, front_face_offset};
