//! Native boundary primitives
//!
//! Everything that reads native memory or transmutes addresses into callables
//! lives here:
//! - [`vtable`] - virtual table slot resolution and the `native_vtable!` binding table
//! - [`layouts`] - slot layouts of the menu system interfaces
//! - [`marshal`] - text crossing between native byte buffers and Rust strings

pub mod layouts;
pub mod marshal;
pub mod vtable;

pub use vtable::VirtualTable;
