pub mod credentials;
pub mod csv_service;

pub use credentials::*;
pub use csv_service::*;
