//! Trellis Core
//!
//! Core types and abstractions for the Trellis visual pipeline builder.
//!
//! This crate contains:
//! - Domain types: the block graph handed over by the editor, repository
//!   credentials, and deployment session results
//! - DTOs: request/response shapes for the GitHub REST API

pub mod domain;
pub mod dto;
