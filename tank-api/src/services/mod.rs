//! Service Layer
//!
//! Business logic behind the route handlers. Services work in core types
//! and `TankError`; handlers convert at the edge.

mod image_cache_service;

pub use image_cache_service::*;
