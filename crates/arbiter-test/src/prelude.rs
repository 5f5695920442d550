//! Prelude module - commonly used test utilities.
//!
//! Use `use arbiter_test::prelude::*;` to import all test helpers.

pub use crate::fixtures::*;
pub use crate::harness::*;
pub use crate::mocks::*;
