//! Access/refresh token models and the redacting secret wrapper.

pub mod access;
pub mod refresh;
pub mod secret;
