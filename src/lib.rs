//! Bookshelf application library
//!
//! Wires the books module into the module host and exposes the bootstrap
//! steps shared by the `bookshelf-app` and `bookshelf` binaries.

pub mod app;
pub mod modules;

pub use app::{build_registry, migrate, serve, StoreBackend};
