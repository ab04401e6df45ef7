//! Credentials, bearer tokens and the per-operation authorization gate.

pub mod gate;
pub mod password;
pub mod token;

pub use gate::{Capability, Portal, Principal, Role};
pub use token::{Claims, IssuedToken, TokenIssuer};
