pub mod operation;
pub mod read_service;

pub use operation::BannerReadOperations;
pub use read_service::BannerReadService;
