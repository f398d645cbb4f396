pub mod stock_data;

pub use stock_data::*;
