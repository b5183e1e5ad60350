//! C-compatible exports

pub mod exports;
