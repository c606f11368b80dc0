pub mod error;
pub mod requests;
pub mod responses;

pub use error::ApiError;
