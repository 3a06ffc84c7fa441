//! Operation catalogs and the intent dispatcher.
//!
//! The catalogs are read-only name → endpoint mappings per backend; the
//! [`Dispatcher`] resolves a parsed intent against them and executes the
//! resulting request through the resilient client.

pub mod catalog;
mod dispatcher;

pub use dispatcher::{resolve, DispatchOutcome, Dispatcher, Resolution};
