//! Shared test utilities for tracemix integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Every harness compiles its own copy and uses a subset,
//! so helpers not needed by all of them carry `#[allow(dead_code)]`. The
//! assertion macros are `#[macro_export]`ed and need no import.

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use builders::*;
pub use fixtures::*;
