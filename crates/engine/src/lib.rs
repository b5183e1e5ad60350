//! Menu Bridge Engine - Library Loading and Global Storage
//!
//! This crate handles:
//! - Loading the native menu library and resolving its exported functions
//! - Looking up the menu system singleton through the Metamod factory
//! - Storing both in process-wide statics
//!
//! # Architecture
//!
//! The menu system is acquired once during plugin load via [`loader::bootstrap`]
//! and stored in [`globals::BridgeGlobals`]. Access is provided via the
//! [`try_bridge()`] function.
//!
//! # Thread Safety
//!
//! The library handle and export table are initialized exactly once and are
//! read-only afterwards.

pub mod error;
pub mod exports;
pub mod globals;
pub mod loader;

pub use error::LoadError;
pub use exports::{exports, init_exports, ExportTable};
pub use globals::{try_bridge, BridgeGlobals};
pub use loader::{bootstrap, try_load, MetaFactory, NativeLibrary};
