//! Scenecraft Core
//!
//! Core types shared by every Scenecraft crate.
//!
//! This crate contains:
//! - Domain types: request, refined spec, code artifact, execution outcome
//! - DTOs: the render request/response exchanged with the render tool

pub mod domain;
pub mod dto;
