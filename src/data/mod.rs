//! Data module: per-simplex attribute storage

pub mod attribute;
pub mod attribute_manager;
pub mod storage;

pub use attribute::{AttributeCollection, AttributeValue};
pub use attribute_manager::{AttributeHandle, AttributeManager};
pub use storage::{Storage, VecStorage};
