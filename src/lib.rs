pub mod anchor;
pub mod assets;
pub mod camera;
pub mod collision;
pub mod config;
pub mod error;
pub mod interior;
pub mod manipulation;
pub mod math;
pub mod mode;
pub mod movement;
pub mod registry;
pub mod scene_graph;
pub mod selection;
pub mod session;
