// src/resolve/mod.rs

//! Template resolution.
//!
//! - [`template`] holds the syntax: escape prefix, environment and self
//!   reference patterns, and best-effort string typing.
//! - [`resolver`] walks the implicit reference graph with memoization and
//!   cycle detection.

pub mod resolver;
pub mod template;

pub use resolver::{Resolved, Resolver, resolve};
pub use template::{NO_PARSE_PREFIX, convert_if_possible};
