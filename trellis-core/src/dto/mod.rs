//! Data Transfer Objects for the remote CI provider
//!
//! Thin serde mirrors of the GitHub REST payloads the deployer reads and
//! writes. Only the fields the deployer uses are modelled; everything else
//! in a response is ignored during deserialization.

pub mod github;
