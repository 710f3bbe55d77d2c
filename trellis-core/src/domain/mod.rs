//! Core domain types
//!
//! This module contains the core domain structures shared by the code
//! generator, the deployment engine and the CLI. The block graph is produced
//! by an external editor; everything downstream only sees these types.

pub mod blocks;
pub mod credentials;
pub mod deployment;
