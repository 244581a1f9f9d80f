//! kubetop: a live terminal dashboard of Kubernetes container CPU and memory usage.
//!
//! This library exposes the core modules for use by the binary and by tests.

pub mod model;
pub mod sort;
pub mod layout;
pub mod diff;
pub mod selection;
pub mod view;
pub mod provider;
pub mod config;
pub mod error;
pub mod logging;
pub mod app;
