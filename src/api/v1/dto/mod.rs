pub mod auth_status;
pub mod refresh_request;
pub mod token_response;
