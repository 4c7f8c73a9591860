//! Token endpoint abstractions: grant requests, access token responses, and the
//! [`TokenResponseClient`] seam providers use to reach an authorization server.
//!
//! Each grant type has a dedicated request struct. Providers build the request and hand it to
//! the client configured for that grant; the crate ships an HTTP implementation in
//! [`crate::oauth`], and tests or deployments with custom endpoints plug in their own.

pub mod client;
pub mod request;
pub mod response;
pub mod strategy;

pub use client::*;
pub use request::*;
pub use response::*;
pub use strategy::*;
