pub mod admin_service;
pub mod operation;

pub use admin_service::{BannerAdminService, CacheWritePolicy};
pub use operation::BannerAdminOperations;
