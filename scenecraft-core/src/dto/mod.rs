//! Data Transfer Objects
//!
//! DTOs exchanged between the execution backend and the render tool server.

pub mod render;
