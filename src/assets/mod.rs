pub mod gltf_source;
pub mod loader;

pub use gltf_source::GltfSource;
pub use loader::{AssetLoader, LoadEvent, LoadStatus, LoadTicket, ModelSource};
