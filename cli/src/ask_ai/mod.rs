pub mod client;
pub mod formatters;
pub mod handler;
pub mod types;

pub use client::*;
pub use formatters::*;
pub use handler::*;
pub use types::*;
