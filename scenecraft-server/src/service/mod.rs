//! Service Module
//!
//! Business logic layer for the render server.

pub mod render;

// Re-export for convenience
pub use render as render_service;
