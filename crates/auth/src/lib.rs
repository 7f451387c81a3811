//! `storefront-auth`: permission checks over an already verified caller.
//!
//! Credential verification (API keys, tokens) happens upstream; this crate only
//! models the resulting identity and answers "may this caller do X".

pub mod authorize;
pub mod permissions;
pub mod principal;

pub use authorize::{AuthzError, authorize};
pub use permissions::Permission;
pub use principal::Caller;
