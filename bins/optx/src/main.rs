//! Optx command-line binary
//!
//! Loads configuration, initializes logging and dispatches to the options
//! engine. Results are printed to stdout as JSON; logs go to stderr.

use anyhow::{Context, Result};
use cli::{Cli, Commands, ContractArgs, OptionKind};
use config::{
    ensure_valid, generate_default_config, load_config, load_config_or_default, save_config, validate_config,
    OptxConfig,
};
use observability::{init_logging, init_metrics, LogFormat};
use options_engine::{
    black_scholes_greeks, black_scholes_price, implied_volatility_with_fallback, strategy::validate_legs,
    strategy_templates, template, BSInputs, ChainService, ChainSettings, InMemoryChainSource, OptionType,
    StrategyAnalyzer, StrategyLeg, StrategySettings,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let config = load_config_or_default(cli.config.as_ref())?;

    let format_name = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    let format = format_name.parse::<LogFormat>().map_err(anyhow::Error::msg)?;
    init_logging("optx", format)?;
    debug!(?cli, "CLI arguments parsed");

    // `validate` and `init` work on their own files
    if !matches!(cli.command, Commands::Validate { .. } | Commands::Init { .. }) {
        ensure_valid(&config).context("Cannot run command with this configuration")?;
    }

    if let Some(port) = config.logging.metrics_port {
        init_metrics(port)?;
    }

    match cli.command {
        Commands::Price { contract, vol } => {
            info!("Executing 'price' command");
            price_command(&config, &contract, vol)
        }
        Commands::Iv {
            contract,
            market_price,
        } => {
            info!("Executing 'iv' command");
            iv_command(&config, &contract, market_price)
        }
        Commands::Chain { snapshot, symbol } => {
            info!("Executing 'chain' command");
            chain_command(&config, &snapshot, &symbol).await
        }
        Commands::Analyze { legs, spot } => {
            info!("Executing 'analyze' command");
            let legs = read_legs(&legs)?;
            print_json(&analyzer(&config).analyze(&legs, spot))
        }
        Commands::Payoff { legs, spot } => {
            info!("Executing 'payoff' command");
            let legs = read_legs(&legs)?;
            print_json(&analyzer(&config).payoff_diagram(&legs, spot))
        }
        Commands::Templates { id } => match id {
            Some(id) => {
                let found = template(&id).with_context(|| format!("Unknown strategy template: {}", id))?;
                print_json(&found)
            }
            None => print_json(&strategy_templates()),
        },
        Commands::Validate { file } => {
            info!("Executing 'validate' command");
            validate_command(&file)
        }
        Commands::Init { output } => {
            info!("Executing 'init' command");
            init_command(&output)
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceOutput {
    option_type: &'static str,
    price: f64,
    greeks: options_engine::Greeks,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IvOutput {
    option_type: &'static str,
    market_price: f64,
    implied_volatility: f64,
}

fn option_type(kind: OptionKind) -> OptionType {
    match kind {
        OptionKind::Call => OptionType::Call,
        OptionKind::Put => OptionType::Put,
    }
}

fn contract_inputs(config: &OptxConfig, contract: &ContractArgs, vol: f64) -> BSInputs {
    BSInputs::new(
        contract.spot,
        contract.strike,
        contract.years,
        contract.rate.unwrap_or(config.engine.risk_free_rate),
        vol,
        option_type(contract.kind),
    )
}

fn chain_settings(config: &OptxConfig) -> ChainSettings {
    ChainSettings {
        risk_free_rate: config.engine.risk_free_rate,
        fallback_volatility: config.engine.fallback_volatility,
        max_expirations: config.chain.max_expirations,
        days_per_year: config.chain.days_per_year,
    }
}

fn analyzer(config: &OptxConfig) -> StrategyAnalyzer {
    StrategyAnalyzer::new(StrategySettings {
        sweep_low: config.strategy.sweep_low,
        sweep_high: config.strategy.sweep_high,
        sweep_points: config.strategy.sweep_points,
        diagram_step: config.strategy.diagram_step,
        contract_multiplier: config.strategy.contract_multiplier,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn read_legs(path: &Path) -> Result<Vec<StrategyLeg>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read legs file: {:?}", path))?;
    let legs: Vec<StrategyLeg> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse legs file: {:?}", path))?;
    validate_legs(&legs)?;
    debug!(count = legs.len(), "Strategy legs loaded");
    Ok(legs)
}

fn price_command(config: &OptxConfig, contract: &ContractArgs, vol: f64) -> Result<()> {
    if vol <= 0.0 && contract.years > 0.0 {
        anyhow::bail!("Volatility must be positive, got {}", vol);
    }
    let input = contract_inputs(config, contract, vol);
    print_json(&PriceOutput {
        option_type: contract.kind.as_str(),
        price: black_scholes_price(input),
        greeks: black_scholes_greeks(input),
    })
}

fn iv_command(config: &OptxConfig, contract: &ContractArgs, market_price: f64) -> Result<()> {
    let input = contract_inputs(config, contract, 0.0);
    let implied_volatility =
        implied_volatility_with_fallback(market_price, input, config.engine.fallback_volatility);
    print_json(&IvOutput {
        option_type: contract.kind.as_str(),
        market_price,
        implied_volatility,
    })
}

async fn chain_command(config: &OptxConfig, snapshot: &Path, symbol: &str) -> Result<()> {
    let source = Arc::new(
        InMemoryChainSource::from_json_file(snapshot)
            .with_context(|| format!("Failed to load chain snapshot: {:?}", snapshot))?,
    );

    let service = if config.cache.enabled {
        ChainService::new(source, chain_settings(config), Duration::from_secs(config.cache.ttl_seconds))
    } else {
        ChainService::without_cache(source, chain_settings(config))
    };

    match service.get_chain(symbol).await? {
        Some(response) => print_json(&response),
        None => {
            warn!(symbol, "No options data available");
            anyhow::bail!("No options data available for {}", symbol)
        }
    }
}

fn validate_command(config_path: &Path) -> Result<()> {
    info!(path = ?config_path, "Validating configuration");

    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "Failed to load configuration");
            return Err(e);
        }
    };

    let report = validate_config(&config);

    println!("\n=== Configuration Validation Report ===\n");

    if !report.defaults_applied.is_empty() {
        println!("Defaults Applied ({}):", report.defaults_applied.len());
        for default in &report.defaults_applied {
            println!("  [info] {} = {}", default.field, default.value);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings ({}):", report.warnings.len());
        for warning in &report.warnings {
            println!("  [warn] [{}] {}", warning.field, warning.message);
        }
        println!();
    }

    if !report.errors.is_empty() {
        println!("Errors ({}):", report.errors.len());
        for err in &report.errors {
            println!("  [error] {}", err);
        }
        println!();
        anyhow::bail!("Configuration validation failed");
    }

    println!("[ok] Configuration is valid!");
    println!();
    println!("Risk-free rate: {}", config.engine.risk_free_rate);
    println!("Max expirations: {}", config.chain.max_expirations);
    println!(
        "Strategy sweep: {}x - {}x over {} points",
        config.strategy.sweep_low, config.strategy.sweep_high, config.strategy.sweep_points
    );

    Ok(())
}

fn init_command(output_path: &Path) -> Result<()> {
    info!(?output_path, "Initializing new configuration file");

    let config = generate_default_config();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    save_config(&config, output_path)?;

    println!("[ok] Configuration file created: {:?}", output_path);
    println!();
    println!("Next steps:");
    println!("  1. Edit the file to adjust rates, sweep bounds or cache TTL");
    println!("  2. Run 'optx validate --file {:?}' to check it", output_path);

    Ok(())
}
