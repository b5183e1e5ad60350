//! Menu Bridge SDK - Native Menu System Type Definitions
//!
//! This crate contains opaque type definitions and ABI signatures for the
//! natively compiled menu system. It has no dependencies and compiles quickly,
//! allowing parallel compilation of dependent crates.
//!
//! # Modules
//!
//! - [`handle`] - Opaque native object handles
//! - [`interfaces`] - Opaque C++ interface types and exported function signatures
//! - [`versions`] - Factory version strings and export symbol names

pub mod handle;
pub mod interfaces;
pub mod versions;

pub use handle::NativeHandle;
pub use interfaces::*;
pub use versions::EXPORT_NAMES;
