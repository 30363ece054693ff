pub mod generator;
pub mod validation;

pub use generator::generate_api_key;
pub use validation::{increment_api_key_usage, validate_api_key_and_rate_limit, KeyRejection};
