//! conceptvec-store: Concept embedding storage
//!
//! This crate provides the immutable in-memory store that backs analogy
//! searches:
//! - Loading id→vector and id→description artifacts from JSON
//! - O(1) id→index and id→vector lookup over a contiguous matrix
//! - Human-readable description lookup with a sentinel for absent entries

pub mod store;

pub use store::{ConceptStore, NO_DESCRIPTION, Result, StoreError};
