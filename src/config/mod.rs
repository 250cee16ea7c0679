//! Tracking configuration
//!
//! The tracking configuration lives under a reserved key of the pipeline's
//! parameter mapping:
//!
//! ```text
//! trueno_track:
//!   enabled: true              # false disables all logging
//!   params: [alpha, epochs]    # absent = log every parameter
//!   models:                    # list of outputs, or output -> spec
//!     regressor:
//!       name: price_model      # defaults to the output name
//!       input: X_test          # input used for example + signature
//!   datasets: []               # parsed, reserved for extension
//!   metrics: []
//!   artifacts: []
//!   tags: {}
//! ```
//!
//! [`resolve`] normalizes it into a [`LoggingPolicy`].

mod policy;
mod resolver;

pub use policy::{LoggingPolicy, ModelSpec};
pub use resolver::{resolve, DEFAULT_NAMESPACE};
