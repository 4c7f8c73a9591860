//! Auth-domain identifiers, scope sets, token models, and principals.

pub mod id;
pub mod jwt;
pub mod principal;
pub mod scope;
pub mod token;

pub use id::*;
pub use jwt::*;
pub use principal::*;
pub use scope::*;
pub use token::{access::*, refresh::*, secret::*};
