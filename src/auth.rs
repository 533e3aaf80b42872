//! Credential handling, caller identity, and the verification/exchange flows.

pub mod credential;
pub mod exchange;
pub mod identity;
pub mod verifier;

pub use credential::*;
pub use exchange::*;
pub use identity::*;
pub use verifier::*;
