//! # ngxlog Testkit
//!
//! Test utilities for the ngxlog codec.
//!
//! This crate provides:
//! - Parse/render vectors shared by every test suite
//! - Property-based test generators using proptest
//! - Fuzz testing harnesses
//!
//! ## Usage
//!
//! ```rust
//! use ngxlog_testkit::prelude::*;
//!
//! for vector in format_vectors() {
//!     let format = ngxlog_codec::compile(&vector.template).unwrap();
//!     let fields = format.parse(&vector.data).unwrap();
//!     assert_eq!(format.render(&fields), vector.rendered);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fuzz;
pub mod generators;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::vectors::*;
}

pub use fuzz::*;
pub use generators::*;
pub use vectors::*;
