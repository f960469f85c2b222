pub mod mesh;
pub mod node;
pub mod primitives;
pub mod template;
pub mod transform;

pub use mesh::SurfaceMesh;
pub use node::{GroupNode, SceneNode, SurfaceNode};
pub use template::{LeafSurface, MeshId, ModelTemplate};
pub use transform::Transform;
