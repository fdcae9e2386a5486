//! Client code for pcapi.
//!
//! This crate provides the HTTP side of a postcode lookup: the reqwest-based
//! [`PostcodeClient`], quota header parsing and response mapping, shared by
//! the CLI and any other front-end that plugs it into a `Resolver`.

pub mod postcode;

pub use postcode::{LookupRequest, PostcodeClient, PostcodeConfig, PostcodeError};
