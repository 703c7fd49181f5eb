//! Core types and trait definitions for the Personas record service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod attribute;
pub mod error;
pub mod person;
pub mod service;
pub mod store;
pub mod view;

pub use error::{Error, FieldError, Result};
