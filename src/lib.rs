//! Folio - portfolio site with a zoomable project image viewer
//!
//! The viewer engine lives in `folio_viewer`. This crate adds the project
//! catalog, site configuration, and the two hosts: a browser binding and a
//! headless native demo.

pub mod config;
pub mod constants;
pub mod project;

#[cfg(not(target_arch = "wasm32"))]
pub mod demo;
#[cfg(not(target_arch = "wasm32"))]
pub mod preload;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
