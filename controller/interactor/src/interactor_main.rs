mod config;

use std::path::PathBuf;

use alloy::{
    network::EthereumWallet,
    providers::{Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common_constants::{CONFIG_FILE, DEFAULT_KEY_ENV, DEFAULT_NETWORK};
use common_proxies::{
    AddressesProviderClient, ChainlinkPriceFeedClient, Erc20Client, LendingPoolClient,
    WrappedNativeTokenClient,
};
use config::Config;
use controller::{AccountPosition, BorrowWorkflow, WorkflowReport};
use log::info;
use rust_decimal::Decimal;

type LiveWorkflow = BorrowWorkflow<
    WrappedNativeTokenClient,
    Erc20Client,
    LendingPoolClient,
    ChainlinkPriceFeedClient,
>;

#[derive(Debug, Parser)]
#[command(about = "Supply wrapped native collateral to an Aave pool, borrow against it and repay")]
struct Cli {
    /// Network table and borrow policy
    #[arg(long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Entry under `[networks]` to run against
    #[arg(long, global = true, default_value = DEFAULT_NETWORK)]
    network: String,

    /// Environment variable holding the signer's private key
    #[arg(long, global = true, default_value = DEFAULT_KEY_ENV)]
    key_env: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Wrap, supply, borrow and repay in one go
    Run {
        #[arg(long)]
        amount: Decimal,
    },
    /// Wrap native currency into the collateral token only
    Wrap {
        #[arg(long)]
        amount: Decimal,
    },
    /// Print the signer's position in the pool
    Position,
    /// Print the debt token price in native currency
    Price,
    /// Print the amount a borrow would take right now, without sending it
    Quote,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut interact = BorrowInteract::new(&cli).await?;
    match cli.command {
        Command::Run { amount } => interact.run(amount).await,
        Command::Wrap { amount } => interact.wrap(amount).await,
        Command::Position => interact.position().await,
        Command::Price => interact.price().await,
        Command::Quote => interact.quote().await,
    }
}

struct BorrowInteract {
    workflow: LiveWorkflow,
}

impl BorrowInteract {
    async fn new(cli: &Cli) -> Result<Self> {
        let config = Config::load(&cli.config)?;
        let mut network = config.network(&cli.network)?.clone();
        let policy = config.policy().clone();

        // A standalone wrap always wraps, whatever the network's default is.
        if matches!(cli.command, Command::Wrap { .. }) {
            network.wrap_native = true;
        }

        let key = std::env::var(&cli.key_env)
            .with_context(|| format!("private key variable {} is not set", cli.key_env))?;
        let signer: PrivateKeySigner = key.trim().parse().context("invalid private key")?;
        let account = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(&network.rpc_url)
            .await
            .with_context(|| format!("connecting to {}", network.rpc_url))?
            .erased();
        let chain_id = provider.get_chain_id().await.context("reading chain id")?;
        info!("Connected to {} (chain {chain_id}) as {account}", cli.network);

        let confirmations = policy.confirmations;
        let addresses_provider = AddressesProviderClient::new(
            network.pool_addresses_provider,
            provider.clone(),
            confirmations,
        );
        let collateral =
            WrappedNativeTokenClient::new(network.collateral_token, provider.clone(), confirmations);
        let debt = Erc20Client::new(network.debt_token, provider.clone(), confirmations);
        let price_feed = ChainlinkPriceFeedClient::new(network.price_feed, provider);

        let workflow = BorrowWorkflow::connect(
            &addresses_provider,
            collateral,
            debt,
            price_feed,
            account,
            network,
            policy,
        )
        .await?;

        Ok(BorrowInteract { workflow })
    }

    async fn run(&mut self, amount: Decimal) -> Result<()> {
        let report = self.workflow.run(amount).await?;
        print_report(&report);
        Ok(())
    }

    async fn wrap(&mut self, amount: Decimal) -> Result<()> {
        let tx_hash = self.workflow.acquire_collateral(amount).await?;
        match tx_hash {
            Some(tx_hash) => println!("Result: wrapped {} in {tx_hash}", amount.normalize()),
            None => println!("Result: nothing wrapped"),
        }
        Ok(())
    }

    async fn position(&self) -> Result<()> {
        let position = self.workflow.query_position().await?;
        print_position("Position", &position);
        Ok(())
    }

    async fn price(&self) -> Result<()> {
        let quote = self.workflow.quote_price().await?;
        println!(
            "Result: {} (round {}, updated at {})",
            quote.price.normalize(),
            quote.round_id,
            quote.updated_at
        );
        Ok(())
    }

    async fn quote(&self) -> Result<()> {
        let plan = self.workflow.preview_borrow().await?;
        println!("Available to borrow: {}", plan.available_to_borrow.normalize());
        println!("Price:               {}", plan.quote.price.normalize());
        println!("Safety factor:       {}", plan.safety_factor.normalize());
        println!("Result: {} ({} base units)", plan.amount, plan.amount.raw_units());
        Ok(())
    }
}

fn print_position(title: &str, position: &AccountPosition) {
    println!("{title}:");
    println!("{position}");
}

fn print_report(report: &WorkflowReport) {
    if let Some(tx_hash) = report.wrap_tx {
        println!("Wrapped in {tx_hash}");
    }
    println!("Supplied: {}", report.supplied);
    print_position("After supply", &report.after_supply);
    println!(
        "Borrow target {} at price {}",
        report.plan.target.normalize(),
        report.plan.quote.price.normalize()
    );
    println!("Borrowed: {}", report.borrowed);
    print_position("After borrow", &report.after_borrow);
    println!("Repaid: {}", report.repaid);
    print_position("After repay", &report.after_repay);
}
