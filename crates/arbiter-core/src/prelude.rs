//! Prelude module - commonly used types for convenient import.
//!
//! Use `use arbiter_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{ConsoleError, ConsoleResult};

// Step-up credentials
pub use crate::{CODE_LENGTH, CodeFormatError, OneTimeCode, SensitiveToken};

// Resources
pub use crate::{MutationKind, ResourceKind, SensitiveAction};
