//! # stockchat - price tables and chat-model analysis
//!
//! Building blocks for the stockchat dashboard:
//! - INI credentials loading for the chat-completion API key
//! - CSV price table loading (`ticker`, `date`, `open`, `close`)
//! - Prompt generation and a chat-completion client behind the
//!   [`AnalysisProvider`](ask_ai::AnalysisProvider) trait
//!
//! ## Quick Start
//!
//! ```no_run
//! use stockchat::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = load_credentials("03-config/pw-config.ini")?;
//!     let table = load_price_table("01-data/Sample.csv")?;
//!     let client = ChatCompletionClient::new(credentials, AnalysisConfig::default())?;
//!     println!("{}", analyze_or_report(&client, &table).await);
//!     Ok(())
//! }
//! ```

pub mod ask_ai;
pub mod models;
pub mod services;
pub mod utils;

pub mod prelude {
    //! Prelude module for convenient imports

    pub use crate::ask_ai::{
        analyze_or_report, AnalysisConfig, AnalysisError, AnalysisProvider, ChatCompletionClient,
    };
    pub use crate::models::{PriceRow, PriceTable};
    pub use crate::services::{load_credentials, load_price_table, Credentials, CredentialsError, DataError};
}

pub use utils::{init_logger, Logger, Timer};
