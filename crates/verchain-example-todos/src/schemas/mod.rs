//! Storage schemas of the todo application, one module per version.
//!
//! Maps are `BTreeMap` so encoded bytes are deterministic.

pub mod v1;
pub mod v2;
pub mod v3;
