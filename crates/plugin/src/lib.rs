//! Menu Bridge Plugin - FFI Layer
//!
//! This crate provides the C boundary the host plugin loader calls into.
//! It compiles to a cdylib (.so/.dll).

pub mod ffi;

pub use menubridge_core::shutdown;
