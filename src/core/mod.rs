// Copyright @yucwang 2021

pub mod error;
pub mod indexing;
pub mod mesh_loader;
pub mod vertex;
