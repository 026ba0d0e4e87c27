pub mod biome;
pub mod config;
pub mod error;
pub mod grid;
pub mod heightmap;
pub mod hydrology;
pub mod neighbors;
pub mod network;
pub mod pathfinding;
pub mod preview;
pub mod proximity;
pub mod render;
pub mod settlement;
pub mod vegetation;
pub mod world;

pub use biome::GroundType;
pub use config::GenerationConfig;
pub use error::{GenError, Result};
pub use grid::{Coord, ElementKind, SpatialGrid};
pub use render::{ElementHandle, ElementRenderer, HandleAllocator};
pub use world::{World, WorldContext, generate_world};
