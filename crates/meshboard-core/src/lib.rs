//! Meshboard Core - Core types shared across the meshboard crates
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Mathematical primitives (re-exported from glam)
//! - Asset identifiers
//! - Display colors and hex parsing
//! - Axis-aligned bounding boxes

pub mod bounds;
pub mod types;

pub use bounds::Aabb;
pub use glam::{Mat4, Vec3};
pub use types::{AssetId, Color, ColorParseError};
