//! Ferreprecio — per-region minimum price discovery for the
//! mercadopublico.cl hardware catalog.
//!
//! The catalog exposes no price API, so the engine drives a headless
//! Chromium through the site's search-and-filter UI: resolve the query to
//! a product detail page, then for each region trigger the supplier table
//! reload and read the lowest valid price out of it.
//!
//! This library crate exposes the modules for integration testing; the
//! `ferreprecio` binary wires them behind a clap CLI.

pub mod batch;
pub mod browser;
pub mod cli;
pub mod engine;
pub mod region;
pub mod rest;
