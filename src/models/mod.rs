//! Backend response types shared across the console.

pub mod module;

pub use module::{Module, ModuleList};
