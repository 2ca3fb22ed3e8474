use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use earn_core::config::{mask_secret, parse_feature, Config};
use earn_core::domain::{EarnStats, FeatureMap};
use earn_core::services::{EarnSession, FeatureGate, PartnerConfigResolver};
use earn_core::validation::{validate_amount, validate_currency};

#[derive(Parser)]
#[command(name = "earn-cli")]
#[command(about = "Earn API client - products, balances and transactions", long_about = None)]
pub struct Cli {
    /// Partner id to resolve (defaults to EARN_PARTNER_ID)
    #[arg(long, global = true)]
    pub partner: Option<String>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override the API key
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Talk to the live API instead of mock data
    #[arg(long, global = true)]
    pub live: bool,

    /// Runtime feature override, e.g. --feature transactions=false
    #[arg(long = "feature", value_name = "NAME=BOOL", global = true)]
    pub features: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the resolved partner configuration
    PartnerConfig,

    /// List Earn products
    Products,

    /// Show balances
    Balances,

    /// Show transaction history
    Transactions,

    /// Summarize balances and earnings for one currency
    Stats {
        #[arg(long, default_value = "USDC")]
        currency: String,
    },

    /// Notify a deposit
    Deposit {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        currency: String,
    },

    /// Request a withdrawal
    Withdraw {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        currency: String,
    },

    /// Show effective feature flags and where each came from
    Flags,

    /// Print the effective configuration
    Config,
}

impl Cli {
    /// Process config with command-line overrides applied.
    pub fn effective_config(&self, mut config: Config) -> Config {
        if let Some(base_url) = self.base_url.as_deref().filter(|url| !url.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(api_key) = &self.api_key {
            config.api_key = api_key.clone();
        }
        if let Some(partner) = &self.partner {
            config.partner_id = partner.clone();
        }
        if self.live {
            config.use_mock_data = false;
        }
        config
    }

    pub fn feature_overrides(&self) -> anyhow::Result<FeatureMap> {
        self.features.iter().map(|entry| parse_feature(entry)).collect()
    }
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let config = cli.effective_config(config);
    let overrides = cli.feature_overrides()?;

    match cli.command {
        Commands::Config => handle_config(&config),
        Commands::PartnerConfig => print_json(connect(&config, &overrides).await.config()),
        Commands::Products => {
            let client = connect(&config, &overrides).await.client();
            print_json(&client.get_products().await?)
        }
        Commands::Balances => {
            let client = connect(&config, &overrides).await.client();
            print_json(&client.get_balances().await?)
        }
        Commands::Transactions => {
            let client = connect(&config, &overrides).await.client();
            print_json(&client.get_transactions().await?)
        }
        Commands::Stats { currency } => {
            let snapshot = connect(&config, &overrides).await.refresh().await?;
            let stats = EarnStats::summarize(
                &currency,
                &snapshot.balances,
                &snapshot.transactions,
                chrono::Utc::now(),
            );
            print_json(&stats)
        }
        Commands::Deposit { amount, currency } => {
            validate_amount(amount, f64::MAX)?;
            validate_currency(&currency)?;
            let client = connect(&config, &overrides).await.client();
            let tx = client
                .deposit(amount, &currency)
                .await
                .context("Deposit failed")?;
            tracing::info!("Deposit of {} {} submitted as {}", amount, currency, tx.id);
            print_json(&tx)
        }
        Commands::Withdraw { amount, currency } => {
            validate_amount(amount, f64::MAX)?;
            validate_currency(&currency)?;
            let client = connect(&config, &overrides).await.client();
            let tx = client
                .withdraw(amount, &currency)
                .await
                .context("Withdrawal failed")?;
            tracing::info!("Withdrawal of {} {} submitted as {}", amount, currency, tx.id);
            print_json(&tx)
        }
        Commands::Flags => {
            let session = connect(&config, &overrides).await;
            let gate = FeatureGate::new(config.features.clone())
                .with_partner(session.config())
                .with_overrides(overrides);
            print_json(&gate.get_all())
        }
    }
}

/// Resolves the partner and builds its session; only data commands need one.
async fn connect(config: &Config, overrides: &FeatureMap) -> EarnSession {
    let resolver = PartnerConfigResolver::new(config.clone());
    EarnSession::connect(&resolver, &config.partner_id, overrides.clone()).await
}

fn handle_config(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Base URL: {}", config.base_url);
    println!("  API Key: {}", mask_secret(&config.api_key));
    println!("  Partner ID: {}", config.partner_id);
    println!("  Mock Data: {}", config.use_mock_data);
    let mut features: Vec<_> = config.features.iter().collect();
    features.sort();
    for (name, enabled) in features {
        println!("  Feature {}: {}", name, enabled);
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_flag_disables_mock() {
        let cli = Cli::parse_from(["earn-cli", "--live", "--partner", "acme", "products"]);
        let config = cli.effective_config(Config::default());
        assert!(!config.use_mock_data);
        assert_eq!(config.partner_id, "acme");
    }

    #[test]
    fn test_feature_overrides() {
        let cli = Cli::parse_from([
            "earn-cli",
            "flags",
            "--feature",
            "transactions=false",
            "--feature",
            "staking=true",
        ]);
        let overrides = cli.feature_overrides().unwrap();
        assert_eq!(overrides.get("transactions"), Some(&false));
        assert_eq!(overrides.get("staking"), Some(&true));
    }

    #[test]
    fn test_blank_base_url_flag_is_ignored() {
        let cli = Cli::parse_from(["earn-cli", "--base-url", "", "partner-config"]);
        let config = cli.effective_config(Config::default());
        assert_eq!(config.base_url, earn_core::config::DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn test_config_command_runs_without_session() {
        let cli = Cli::parse_from(["earn-cli", "config"]);
        assert!(run(cli, Config::default()).await.is_ok());
    }

    #[test]
    fn test_help_parses_without_environment() {
        let err = match Cli::try_parse_from(["earn-cli", "--help"]) {
            Ok(_) => panic!("--help should short-circuit parsing"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_deposit_accepts_negative_amount() {
        let cli = Cli::parse_from(["earn-cli", "deposit", "-5", "USDC"]);
        assert!(matches!(cli.command, Commands::Deposit { amount, .. } if amount == -5.0));
    }
}
