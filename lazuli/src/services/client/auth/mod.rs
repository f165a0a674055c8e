//! Authentication against the XRPC service

pub mod login;
pub use login::*;
