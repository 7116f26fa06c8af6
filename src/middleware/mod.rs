pub mod auth;

pub use auth::{AuthEnforcer, AuthMode};
