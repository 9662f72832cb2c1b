//! Matched betting engine entry point.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use matched_betting::api::{create_router, AppState};
use matched_betting::calculator::{
    calculate, instructions_for, offer_instructions, retention_rate, BetSelection, BetType,
    StakeRequest,
};
use matched_betting::config::Config;
use matched_betting::metrics;
use matched_betting::odds::Outcome;
use matched_betting::utils::shutdown_signal;

const RULE: &str = "======================================================================";
const THIN_RULE: &str = "----------------------------------------------------------------------";

/// Matched betting calculator and recommendation service.
#[derive(Parser, Debug)]
#[command(name = "matched-betting")]
#[command(about = "Lay stake calculator, back/lay pairing and offer ranking")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// HTTP server port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Calculate lay stake and outcomes for one bet.
    Calculate {
        /// Back odds at the bookmaker.
        #[arg(long)]
        back: Decimal,

        /// Lay odds at the exchange.
        #[arg(long)]
        lay: Decimal,

        /// Back stake or free bet value.
        #[arg(long)]
        stake: Decimal,

        /// qualifying, free_bet_snr (snr) or free_bet_sr (sr).
        #[arg(long, default_value = "qualifying")]
        bet_type: BetType,

        /// Exchange commission (defaults to EXCHANGE_COMMISSION).
        #[arg(long)]
        commission: Option<Decimal>,
    },

    /// Share of a free bet's value kept as guaranteed profit.
    Retention {
        /// Free bet value.
        #[arg(long)]
        value: Decimal,

        /// Back odds at the bookmaker.
        #[arg(long)]
        back: Decimal,

        /// Lay odds at the exchange.
        #[arg(long)]
        lay: Decimal,

        /// Exchange commission (defaults to EXCHANGE_COMMISSION).
        #[arg(long)]
        commission: Option<Decimal>,
    },

    /// Print placement steps for a bet, or for a whole offer with --free-bet.
    Instructions {
        /// Home team name.
        #[arg(long)]
        home: String,

        /// Away team name.
        #[arg(long)]
        away: String,

        /// home, draw or away.
        #[arg(long, default_value = "home")]
        outcome: Outcome,

        /// Bookmaker taking the back bet.
        #[arg(long)]
        bookmaker: String,

        /// Exchange taking the lay bet.
        #[arg(long, default_value = "Betfair")]
        exchange: String,

        /// Back odds at the bookmaker.
        #[arg(long)]
        back: Decimal,

        /// Lay odds at the exchange.
        #[arg(long)]
        lay: Decimal,

        /// Back stake (qualifying stake with --free-bet).
        #[arg(long)]
        stake: Decimal,

        /// Bet type when --free-bet is not given.
        #[arg(long, default_value = "qualifying")]
        bet_type: BetType,

        /// Free bet value; prints qualifying and free bet steps together.
        #[arg(long)]
        free_bet: Option<Decimal>,

        /// Offer title.
        #[arg(long)]
        offer: Option<String>,

        /// Minimum back odds the offer demands.
        #[arg(long)]
        min_odds: Option<Decimal>,

        /// Exchange commission (defaults to EXCHANGE_COMMISSION).
        #[arg(long)]
        commission: Option<Decimal>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("matched_betting=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Calculate {
            back,
            lay,
            stake,
            bet_type,
            commission,
        }) => cmd_calculate(back, lay, stake, bet_type, commission),
        Some(Command::Retention {
            value,
            back,
            lay,
            commission,
        }) => cmd_retention(value, back, lay, commission),
        Some(Command::Instructions {
            home,
            away,
            outcome,
            bookmaker,
            exchange,
            back,
            lay,
            stake,
            bet_type,
            free_bet,
            offer,
            min_odds,
            commission,
        }) => {
            let config = load_config()?;
            let selection = BetSelection {
                home_team: home,
                away_team: away,
                outcome,
                bookmaker,
                exchange,
                back_odds: back,
                lay_odds: lay,
                commission: commission.unwrap_or(config.exchange_commission),
                offer_name: offer,
                min_odds_required: min_odds,
            };
            cmd_instructions(&selection, stake, bet_type, free_bet)
        }
        Some(Command::Serve { port }) => cmd_serve(port).await,
        None => cmd_serve(None).await,
    }
}

/// Load and validate configuration, logging failures.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("{RULE}");
    println!("MATCHED BETTING - CONFIGURATION CHECK");
    println!("{RULE}");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    let exchanges = config.exchange_keys();

    println!("{THIN_RULE}");
    println!("Configuration Summary:");
    println!("  Exchange Commission: {}", config.exchange_commission);
    println!("  Estimator Commission: {}", config.estimator_commission);
    println!("  Default Stake: {}", config.default_stake);
    println!("  Odds Range: {} - {}", config.min_odds, config.max_odds);
    println!("  Max Spread: {}%", config.max_spread_percent);
    println!("  Recommendation Limit: {}", config.recommendation_limit);
    println!("  Lay Exchange: {}", exchanges.lay_exchange);
    println!("  Exchanges: {}", exchanges.exchanges.join(", "));
    println!("  Port: {}", config.port);
    println!("{RULE}");
    println!("CONFIGURATION CHECK PASSED");
    println!("{RULE}");

    Ok(())
}

/// Print the breakdown for one bet.
fn cmd_calculate(
    back: Decimal,
    lay: Decimal,
    stake: Decimal,
    bet_type: BetType,
    commission: Option<Decimal>,
) -> anyhow::Result<()> {
    let config = load_config()?;
    let request = StakeRequest::new(
        back,
        lay,
        stake,
        bet_type,
        commission.unwrap_or(config.exchange_commission),
    );
    request.validate()?;
    let result = calculate(&request)?.rounded();

    println!("{RULE}");
    println!("MATCHED BET - {}", bet_type.to_string().to_uppercase());
    println!("{RULE}");
    println!("  Back: {} @ {}", stake, back);
    println!("  Lay:  {} @ {} ({} commission)", result.lay_stake, lay, request.commission);
    println!("  Liability: {}", result.liability);
    println!("{THIN_RULE}");
    println!("  Back wins: {}", result.back_wins_profit());
    println!("  Lay wins:  {}", result.lay_wins_profit());
    println!("  Guaranteed: {}", result.guaranteed_profit);
    println!("  Expected value: {}", result.expected_value);
    println!("  Spread: {}% ({})", result.spread_percent, result.rating);
    if bet_type.is_free_bet() {
        if let Some(retention) = result.retention_percent(stake) {
            println!("  Retention: {}%", retention.round_dp(2));
        }
    }
    println!("{RULE}");

    Ok(())
}

/// Print the retention for a free bet.
fn cmd_retention(
    value: Decimal,
    back: Decimal,
    lay: Decimal,
    commission: Option<Decimal>,
) -> anyhow::Result<()> {
    let config = load_config()?;
    let commission = commission.unwrap_or(config.exchange_commission);
    let retention = retention_rate(value, back, lay, commission)?;

    println!("{RULE}");
    println!("FREE BET RETENTION");
    println!("{RULE}");
    println!("  Free bet: {} @ {} / {}", value, back, lay);
    println!("  Guaranteed: {}", retention.guaranteed_profit.round_dp(2));
    println!("  Retention: {}% ({})", retention.percent.round_dp(2), retention.rating);
    println!("{RULE}");

    Ok(())
}

/// Print placement instructions.
fn cmd_instructions(
    selection: &BetSelection,
    stake: Decimal,
    bet_type: BetType,
    free_bet: Option<Decimal>,
) -> anyhow::Result<()> {
    match free_bet {
        Some(value) => println!("{}", offer_instructions(selection, stake, value)?),
        None => {
            let instructions = instructions_for(selection, stake, bet_type)?;
            println!("{RULE}");
            println!("{instructions}");
            println!("{THIN_RULE}");
            for tip in &instructions.tips {
                println!("  - {tip}");
            }
            println!("{RULE}");
        }
    }

    Ok(())
}

/// Serve the HTTP API until Ctrl+C or SIGTERM.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config()?;
    let port = port_override.unwrap_or(config.port);

    let handle = metrics::install_recorder()?;

    info!("Configuration loaded successfully");
    info!("Exchange commission: {}", config.exchange_commission);
    info!("Odds range: {} - {}", config.min_odds, config.max_odds);
    info!("Max spread: {}%", config.max_spread_percent);

    let app_state = AppState::new(config).with_metrics(handle);
    let router = create_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
