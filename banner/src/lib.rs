pub mod auth;
pub mod clock;
pub mod domain;
pub mod planes;
pub mod ports;
