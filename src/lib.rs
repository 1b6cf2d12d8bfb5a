// Copyright @yucwang 2021

pub extern crate nalgebra as na;

pub mod core;
pub mod io;
pub mod math;

pub use self::core::error::LoadError;
pub use self::core::indexing::{ BoundingStats, MeshBuffers };
pub use self::core::mesh_loader::{ LoadOptions, MeshLoader, NormalMode };
pub use self::core::vertex::Vertex;
