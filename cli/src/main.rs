//! ACDM marketplace command line
//!
//! Every invocation loads the marketplace from the data directory, applies
//! at most one operation and writes the state back.

mod display;
mod units;

use acdm_core::{Address, Amount};
use acdm_node::{Asset, Call, Marketplace, MarketplaceConfig, MarketplaceHandle, Operation};
use acdm_storage::MarketplaceStore;
use clap::{Parser, Subcommand, ValueEnum};
use governance::{ParameterCall, Target};
use owo_colors::OwoColorize;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "acdm")]
#[command(about = "ACDM marketplace: sale and trade rounds, staking and DAO")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("ACDM_GIT_HASH"), ")"))]
struct Cli {
    /// Directory holding the marketplace state
    #[arg(short, long, value_name = "DIR", default_value = "acdm-data")]
    data_dir: PathBuf,

    /// Marketplace configuration (TOML), used by `init`
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Account submitting the operation
    #[arg(long, default_value = "owner")]
    caller: String,

    /// Timestamp of the operation in seconds (defaults to now)
    #[arg(long)]
    at: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Choice {
    For,
    Against,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh marketplace in the data directory
    Init {
        /// Also write the effective configuration to this file
        #[arg(long, value_name = "FILE")]
        write_config: Option<PathBuf>,
    },

    /// Register the caller under a referrer
    Register { referrer: String },

    /// Open the next sale phase
    StartSaleRound,

    /// Close the sale phase and open a trade phase
    StartTradeRound,

    /// Buy tokens in the sale phase
    Buy {
        /// Payment in ETH, e.g. 0.01
        payment: String,
    },

    /// List tokens for sale in the trade phase
    AddOrder {
        /// Tokens to list, e.g. 12.5
        amount: String,
        /// Price of one full token in ETH
        unit_cost: String,
    },

    /// Buy from an order
    Redeem {
        order_id: u64,
        /// Payment in ETH
        payment: String,
    },

    /// Cancel an order and take back what is left
    RemoveOrder { order_id: u64 },

    /// Withdraw accumulated referral rewards
    WithdrawReferral,

    /// Withdraw accumulated trade profit
    WithdrawProfit,

    /// Allow a spender to move the caller's tokens
    Approve {
        /// acdm, lp, xxx or eth
        asset: String,
        spender: String,
        amount: String,
    },

    /// Send tokens to another account
    Transfer {
        asset: String,
        to: String,
        amount: String,
    },

    /// Issue LP or ETH (liquidity pool and faucet accounts only)
    Mint {
        asset: String,
        to: String,
        amount: String,
    },

    /// Stake LP tokens
    Stake { amount: String },

    /// Claim staking rewards
    Claim,

    /// Withdraw the whole stake
    Unstake,

    /// Open a proposal (chairman only)
    AddProposal {
        description: String,
        /// Call to execute, e.g. set-trade-reward=30
        #[arg(required_unless_present = "payload_hex")]
        call: Option<String>,
        /// Free-form metadata stored with the proposal
        #[arg(long)]
        metadata: Option<String>,
        /// Raw payload instead of a call
        #[arg(long, requires = "target")]
        payload_hex: Option<String>,
        /// platform or staking; required with --payload-hex
        #[arg(long)]
        target: Option<String>,
    },

    /// Vote on a proposal with the caller's stake
    Vote {
        id: u64,
        #[arg(value_enum)]
        choice: Choice,
    },

    /// Finish a proposal whose voting window is over
    Finish { id: u64 },

    /// List proposals
    Proposals,

    /// Show one proposal
    Proposal { id: u64 },

    /// Show the current round and its history
    Round,

    /// List orders
    Orders {
        /// Only orders with something left to sell
        #[arg(long)]
        open: bool,
    },

    /// Show balances, earnings and stake of an account (defaults to the caller)
    Account { account: Option<String> },

    /// Show the committed operations
    Journal {
        /// Only entries submitted by this account
        #[arg(long)]
        by: Option<String>,
    },
}

fn amount(m: &Marketplace, asset: Asset, input: &str) -> Result<Amount, Box<dyn Error>> {
    Ok(units::parse_amount(input, m.ledger(asset).decimals())?)
}

/// The operation a command submits, or `None` for read-only commands.
fn operation(command: &Commands, m: &Marketplace) -> Result<Option<Operation>, Box<dyn Error>> {
    let op = match command {
        Commands::Register { referrer } => Operation::Register {
            referrer: Address::from(referrer.as_str()),
        },
        Commands::StartSaleRound => Operation::StartSaleRound,
        Commands::StartTradeRound => Operation::StartTradeRound,
        Commands::Buy { payment } => Operation::Buy {
            payment: amount(m, Asset::Payment, payment)?,
        },
        Commands::AddOrder { amount: a, unit_cost } => Operation::AddOrder {
            amount: amount(m, Asset::Tradable, a)?,
            unit_cost: amount(m, Asset::Payment, unit_cost)?,
        },
        Commands::Redeem { order_id, payment } => Operation::RedeemOrder {
            order_id: *order_id,
            payment: amount(m, Asset::Payment, payment)?,
        },
        Commands::RemoveOrder { order_id } => Operation::RemoveOrder {
            order_id: *order_id,
        },
        Commands::WithdrawReferral => Operation::WithdrawReferralReward,
        Commands::WithdrawProfit => Operation::WithdrawTradeProfit,
        Commands::Approve {
            asset,
            spender,
            amount: a,
        } => {
            let asset: Asset = asset.parse()?;
            Operation::Approve {
                asset,
                spender: Address::from(spender.as_str()),
                amount: amount(m, asset, a)?,
            }
        }
        Commands::Transfer { asset, to, amount: a } => {
            let asset: Asset = asset.parse()?;
            Operation::Transfer {
                asset,
                to: Address::from(to.as_str()),
                amount: amount(m, asset, a)?,
            }
        }
        Commands::Mint { asset, to, amount: a } => {
            let asset: Asset = asset.parse()?;
            Operation::Mint {
                asset,
                to: Address::from(to.as_str()),
                amount: amount(m, asset, a)?,
            }
        }
        Commands::Stake { amount: a } => Operation::Stake {
            amount: amount(m, Asset::Collateral, a)?,
        },
        Commands::Claim => Operation::Claim,
        Commands::Unstake => Operation::Unstake,
        Commands::AddProposal {
            description,
            call,
            metadata,
            payload_hex,
            target,
        } => {
            let (payload, target, call_text) = match (payload_hex, call) {
                (Some(raw), _) => {
                    let target: Target = target.as_deref().unwrap_or_default().parse()?;
                    let payload = hex::decode(raw.trim_start_matches("0x"))?;
                    (payload, target, String::new())
                }
                (None, Some(call)) => {
                    let call = ParameterCall::parse(call)?;
                    (call.encode()?, call.target(), call.to_string())
                }
                (None, None) => return Err("either a call or --payload-hex is required".into()),
            };
            Operation::AddProposal {
                description: description.clone(),
                action_metadata: metadata.clone().unwrap_or(call_text),
                payload,
                target,
            }
        }
        Commands::Vote { id, choice } => Operation::Vote {
            proposal_id: *id,
            in_favor: matches!(choice, Choice::For),
        },
        Commands::Finish { id } => Operation::FinishProposal { proposal_id: *id },
        Commands::Init { .. }
        | Commands::Proposals
        | Commands::Proposal { .. }
        | Commands::Round
        | Commands::Orders { .. }
        | Commands::Account { .. }
        | Commands::Journal { .. } => return Ok(None),
    };
    Ok(Some(op))
}

fn query(cli: &Cli, store: &MarketplaceStore, m: &Marketplace, now: u64) -> Result<(), Box<dyn Error>> {
    match &cli.command {
        Commands::Proposals => display::proposals(m.dao().proposals(), now),
        Commands::Proposal { id } => display::proposal(m.dao().proposal(*id)?, now),
        Commands::Round => display::round(m, now),
        Commands::Orders { open } => {
            let orders: Vec<_> = if *open {
                m.platform().open_orders().collect()
            } else {
                m.platform().orders().iter().collect()
            };
            display::orders(m, &orders);
        }
        Commands::Account { account } => {
            let account = Address::from(account.as_deref().unwrap_or(cli.caller.as_str()));
            display::account(m, &m.account(&account, now));
        }
        Commands::Journal { by } => {
            let journal = store.journal()?;
            for entry in journal.entries() {
                if by.as_deref().is_some_and(|by| entry.call.caller.as_str() != by) {
                    continue;
                }
                println!(
                    "{:>5}  {}  {:<18} {}",
                    entry.sequence.bright_black(),
                    entry.call.timestamp,
                    entry.call.op.name().bold(),
                    entry.call.caller
                );
            }
        }
        _ => {}
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let store = MarketplaceStore::open(&cli.data_dir)?;
    let now = cli
        .at
        .unwrap_or_else(|| chrono::Utc::now().timestamp().max(0) as u64);

    if let Commands::Init { write_config } = &cli.command {
        let config = match &cli.config {
            Some(path) => MarketplaceConfig::load(path)?,
            None => MarketplaceConfig::default(),
        };
        if let Some(path) = write_config {
            config.save(path)?;
            println!("Configuration written to {}", path.display());
        }
        store.init(config)?;
        println!(
            "{} Marketplace initialised in {}",
            "✓".green().bold(),
            store.data_dir().display()
        );
        return Ok(());
    }

    let marketplace = store.load()?;
    let Some(op) = operation(&cli.command, &marketplace)? else {
        return query(&cli, &store, &marketplace, now);
    };

    let call = Call::new(cli.caller.as_str(), now, op);
    let handle = MarketplaceHandle::new(marketplace);
    let receipt = handle.submit(call.clone()).await?;
    let marketplace = handle
        .into_inner()
        .ok_or("marketplace still shared after submit")?;

    store.commit(&marketplace, call, receipt.clone())?;
    display::receipt(&marketplace, &receipt);
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
