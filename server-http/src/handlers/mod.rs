pub mod auth;
pub mod banners;
pub mod catalog;
pub mod health;
pub mod user_banner;

pub use auth::{login, register};
pub use banners::{create_banner, delete_banner, list_banners, update_banner};
pub use catalog::{create_feature, create_tag};
pub use health::health_check;
pub use user_banner::get_user_banner;
