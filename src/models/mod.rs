pub mod user;
pub mod api_key;
pub mod repository;
pub mod analysis;

pub use user::*;
pub use api_key::*;
pub use repository::*;
pub use analysis::*;
