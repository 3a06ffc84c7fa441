//! Shared vocabulary for the Mediarr control plane.
//!
//! Canonical definitions for services, operations, intents, the HTTP
//! request/response shapes used by the resilient client, the error
//! taxonomy, and suite configuration. Every other crate builds on these
//! types; nothing here performs I/O beyond reading a config file.

pub mod config;
pub mod defaults;
pub mod error;
pub mod request;
pub mod types;

pub use config::{ConfigError, ServiceSettings, SuiteConfig};
pub use error::{ClientError, ErrorKind};
pub use request::{
    AuthScheme, BackendDescriptor, ClientRequest, ClientResponse, Method, RetryPolicy,
};
pub use types::{Intent, IntentContext, OperationKind, ServiceKind};
