//! Terminal rendering of receipts and queries

use crate::units::format_amount;
use acdm_core::Amount;
use acdm_node::{AccountView, Asset, Marketplace, Receipt};
use acdm_platform::{Order, Phase};
use governance::{ParameterCall, Proposal, ProposalOutcome};
use owo_colors::OwoColorize;

const RULE: &str = "═══════════════════════════════════";

fn eth(m: &Marketplace, value: Amount) -> String {
    format!("{} ETH", format_amount(value, m.ledger(Asset::Payment).decimals()))
}

fn tokens(m: &Marketplace, asset: Asset, value: Amount) -> String {
    format!("{} {}", format_amount(value, m.ledger(asset).decimals()), asset)
}

fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Uninitialized => "not started",
        Phase::Sale => "sale",
        Phase::Trade => "trade",
    }
}

fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

pub fn receipt(m: &Marketplace, receipt: &Receipt) {
    let line = match receipt {
        Receipt::Registered(link) => match &link.referrer2 {
            Some(second) => format!("Registered under {} (second tier {})", link.referrer1, second),
            None => format!("Registered under {}", link.referrer1),
        },
        Receipt::RoundStarted {
            number,
            phase,
            token_price,
            token_minted,
        } => format!(
            "Round {} ({}) started at {} per token, {} minted",
            number,
            phase_name(*phase),
            eth(m, *token_price),
            tokens(m, Asset::Tradable, *token_minted)
        ),
        Receipt::Bought { amount } => format!("Bought {}", tokens(m, Asset::Tradable, *amount)),
        Receipt::OrderAdded { order_id } => format!("Order {} placed", order_id),
        Receipt::Redeemed { amount } => format!("Received {}", tokens(m, Asset::Tradable, *amount)),
        Receipt::OrderRemoved { returned } => {
            format!("Order cancelled, {} returned", tokens(m, Asset::Tradable, *returned))
        }
        Receipt::Withdrawn { amount } => format!("Withdrew {}", eth(m, *amount)),
        Receipt::Approved => "Allowance set".to_string(),
        Receipt::Transferred => "Transfer complete".to_string(),
        Receipt::Minted => "Minted".to_string(),
        Receipt::Staked { principal } => {
            format!("Staked, principal now {}", tokens(m, Asset::Collateral, *principal))
        }
        Receipt::Claimed { amount } => format!("Claimed {}", tokens(m, Asset::Reward, *amount)),
        Receipt::Unstaked { amount } => {
            format!("Unstaked {}", tokens(m, Asset::Collateral, *amount))
        }
        Receipt::ProposalAdded { proposal_id } => format!("Proposal {} opened", proposal_id),
        Receipt::Voted { weight } => format!("Vote cast with weight {}", weight),
        Receipt::ProposalFinished(outcome) => {
            println!("{} Proposal {} finished", "✓".green().bold(), outcome.proposal_id);
            self::outcome(outcome);
            return;
        }
    };
    println!("{} {}", "✓".green().bold(), line);
}

pub fn outcome(outcome: &ProposalOutcome) {
    println!("  Description:  {}", outcome.description);
    println!("  Quorum:       {}", yes_no(outcome.quorum_reached));
    println!("  Passed:       {}", yes_no(outcome.passed));
    println!("  Executed:     {}", yes_no(outcome.execution_succeeded));
    if let Some(error) = &outcome.execution_error {
        println!("  Error:        {}", error.yellow());
    }
}

pub fn round(m: &Marketplace, now: u64) {
    let platform = m.platform();
    let round = platform.round();
    let round_time = platform.config().round_time;

    println!("\n{}", "📈 Round".cyan().bold());
    println!("{}", RULE.bright_black());
    println!("Number:        {}", round.number);
    println!("Phase:         {}", phase_name(round.phase()).bold());
    if round.phase() != Phase::Uninitialized {
        let ends_at = round.ends_at(round_time);
        let state = if round.window_open(now, round_time) {
            "open".green().to_string()
        } else {
            "elapsed".yellow().to_string()
        };
        println!("Ends at:       {} ({})", ends_at, state);
    }
    println!("Price:         {}", eth(m, round.token_price));
    println!("Minted:        {}", tokens(m, Asset::Tradable, round.token_minted));
    println!("Unsold:        {}", tokens(m, Asset::Tradable, round.tokens_remaining));
    println!("Trade volume:  {}", eth(m, round.trade_proceeds));
    println!(
        "Rewards:       sale {}‰ / {}‰, trade {}‰",
        platform.sale_reward1(),
        platform.sale_reward2(),
        platform.trade_reward()
    );
    println!("Revenue:       {}", eth(m, platform.revenue()));

    if !platform.history().is_empty() {
        println!("\n{}", "History".yellow().bold());
        for summary in platform.history() {
            println!(
                "  #{:<3} {:<6} at {}  price {}  minted {}  burned {}",
                summary.number,
                phase_name(summary.phase),
                summary.started_at,
                eth(m, summary.token_price),
                tokens(m, Asset::Tradable, summary.token_minted),
                tokens(m, Asset::Tradable, summary.burned)
            );
        }
    }
    println!();
}

pub fn orders(m: &Marketplace, orders: &[&Order]) {
    println!("\n{}", "📒 Orders".cyan().bold());
    println!("{}", RULE.bright_black());
    if orders.is_empty() {
        println!("{}", "No orders".bright_black());
    }
    for order in orders {
        let status = if order.is_closed() {
            "closed".bright_black().to_string()
        } else {
            "open".green().to_string()
        };
        println!(
            "  {:>3}. {} sells {} of {} at {} [{}]",
            order.id,
            order.seller,
            tokens(m, Asset::Tradable, order.remaining_amount),
            tokens(m, Asset::Tradable, order.amount),
            eth(m, order.unit_cost),
            status
        );
    }
    println!();
}

pub fn account(m: &Marketplace, view: &AccountView) {
    println!("\n{} {}", "💰 Account".cyan().bold(), view.account.bold());
    println!("{}", RULE.bright_black());
    for (asset, balance) in &view.balances {
        println!("{:<14} {}", format!("{}:", asset), format_amount(*balance, m.ledger(*asset).decimals()));
    }
    if let Some(link) = &view.referral {
        let second = link
            .referrer2
            .as_ref()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("Referrers:     {} / {}", link.referrer1, second);
    }
    println!("Referral owed: {}", eth(m, view.earnings.referral_reward));
    println!("Trade profit:  {}", eth(m, view.earnings.trade_profit));
    match &view.stake {
        Some(stake) => {
            println!("Staked:        {}", tokens(m, Asset::Collateral, stake.principal));
            println!("Deposited at:  {}", stake.deposit_time);
            println!("Claimable:     {}", tokens(m, Asset::Reward, view.pending_reward));
            println!("Open votes:    {}", stake.voting_lock);
        }
        None => println!("Staked:        {}", "none".bright_black()),
    }
    println!();
}

pub fn proposal(proposal: &Proposal, now: u64) {
    let status = if proposal.closed {
        "closed".bright_black().to_string()
    } else if proposal.is_voting_open(now) {
        "voting".green().to_string()
    } else {
        "ready to finish".yellow().to_string()
    };
    let call = ParameterCall::decode(&proposal.payload)
        .map(|call| call.to_string())
        .unwrap_or_else(|_| format!("0x{}", hex::encode(&proposal.payload)));

    println!("\n{} {} [{}]", "🗳  Proposal".cyan().bold(), proposal.id, status);
    println!("{}", RULE.bright_black());
    println!("Description:  {}", proposal.description);
    println!("Target:       {}", proposal.target);
    println!("Call:         {}", call);
    if !proposal.action_metadata.is_empty() {
        println!("Metadata:     {}", proposal.action_metadata);
    }
    println!("Ends at:      {}", proposal.end_time);
    println!(
        "Votes:        {} for / {} against ({} voters)",
        proposal.votes_for(),
        proposal.votes_against(),
        proposal.ballots.len()
    );
    if let Some(approval) = proposal.tally.approval_percentage() {
        println!("Approval:     {}%", approval);
    }
    if let Some(participation) = proposal
        .quorum_base
        .and_then(|base| proposal.tally.participation_rate(base))
    {
        println!("Turnout:      {}% of staked supply", participation);
    }
    if let Some(outcome) = &proposal.outcome {
        self::outcome(outcome);
    }
    println!();
}

pub fn proposals(proposals: &[Proposal], now: u64) {
    println!("\n{}", "🗳  Proposals".cyan().bold());
    println!("{}", RULE.bright_black());
    if proposals.is_empty() {
        println!("{}", "No proposals".bright_black());
    }
    for proposal in proposals {
        let status = match &proposal.outcome {
            Some(outcome) if outcome.execution_succeeded => "executed".green().to_string(),
            Some(_) => "closed".bright_black().to_string(),
            None if proposal.is_voting_open(now) => "voting".yellow().to_string(),
            None => "ready to finish".yellow().to_string(),
        };
        println!(
            "  {:>3}. {} -> {} [{}]",
            proposal.id, proposal.description, proposal.target, status
        );
    }
    println!();
}
