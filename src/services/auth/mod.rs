pub mod bearer;
pub mod claims;
pub mod error;
pub mod factory;
pub mod jwt;
pub mod token_id;
pub mod token_service;

pub use claims::{Claims, Identity, TokenKind};
pub use error::TokenError;
pub use factory::build_token_service;
pub use token_service::{IssuedTokenPair, TokenService, TokenSettings};
