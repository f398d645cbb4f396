use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use stockchat::{
    ask_ai::{analyze_or_report, format_user_prompt, AnalysisConfig, ChatCompletionClient, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS},
    models::PriceTable,
    services::{load_credentials, load_price_table},
    utils::init_logger,
};

#[derive(Parser)]
#[command(name = "stockchat")]
#[command(about = "Load a stock price table and ask a chat model to analyze it")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the loaded price table
    Show {
        /// CSV file with ticker, date, open and close columns
        #[arg(short, long, default_value = "01-data/Sample.csv")]
        data: PathBuf,
        /// Only show rows for this ticker
        #[arg(short, long)]
        ticker: Option<String>,
    },
    /// Print the user prompt that would be sent to the model
    Prompt {
        #[arg(short, long, default_value = "01-data/Sample.csv")]
        data: PathBuf,
    },
    /// Send the price table to the model and print its analysis
    Ask {
        #[arg(short, long, default_value = "01-data/Sample.csv")]
        data: PathBuf,
        /// INI file holding [chatanalyst] api_key
        #[arg(short, long, default_value = "03-config/pw-config.ini")]
        credentials: PathBuf,
        #[arg(short, long, default_value = DEFAULT_MODEL)]
        model: String,
        #[arg(long, default_value = DEFAULT_API_BASE)]
        api_base: String,
        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Show { data, ticker } => {
            let table = load_table(&data)?;
            let table = match ticker {
                Some(ticker) => table.for_ticker(&ticker),
                None => table,
            };
            println!("{}", table.to_text_table());
        }
        Commands::Prompt { data } => {
            let table = load_table(&data)?;
            println!("{}", format_user_prompt(&table));
        }
        Commands::Ask {
            data,
            credentials,
            model,
            api_base,
            timeout,
        } => {
            let credentials = load_credentials(&credentials)
                .with_context(|| format!("loading credentials from {}", credentials.display()))?;
            let table = load_table(&data)?;
            let config = AnalysisConfig {
                model,
                api_base,
                timeout: Duration::from_secs(timeout),
                ..Default::default()
            };
            let client = ChatCompletionClient::new(credentials, config)?;
            println!("{}", analyze_or_report(&client, &table).await);
        }
    }

    Ok(())
}

fn load_table(path: &Path) -> anyhow::Result<PriceTable> {
    load_price_table(path).with_context(|| format!("loading price data from {}", path.display()))
}
