pub mod avatar;
pub mod error;
pub mod friends;
pub mod globe;
pub mod health;
pub mod profile;
pub mod routes;
pub mod state;
pub mod storage;
pub mod trips;
pub mod validation;


pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
