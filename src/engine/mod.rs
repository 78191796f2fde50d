pub mod core;
pub mod normalize;
pub mod repo;
pub mod types;
