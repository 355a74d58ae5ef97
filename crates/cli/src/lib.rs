use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "optx")]
#[command(about = "Optx - option pricing, implied volatility and strategy analysis")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file (defaults are used when omitted)
    #[arg(short, long, global = true, env = "OPTX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured log format (pretty, json, compact)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Price a European option and compute its Greeks
    Price {
        #[command(flatten)]
        contract: ContractArgs,

        /// Volatility as a decimal (0.2 = 20%)
        #[arg(long)]
        vol: f64,
    },

    /// Solve the volatility implied by a market price
    Iv {
        #[command(flatten)]
        contract: ContractArgs,

        /// Observed option price
        #[arg(long)]
        market_price: f64,
    },

    /// Normalize an options chain snapshot (JSON) for a symbol
    Chain {
        /// Snapshot file holding one chain or an array of chains
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Ticker symbol to look up in the snapshot
        #[arg(long)]
        symbol: String,
    },

    /// Analyze a multi-leg strategy at expiration
    Analyze {
        /// JSON file with an array of legs
        #[arg(short, long)]
        legs: PathBuf,

        /// Current price of the underlying
        #[arg(long)]
        spot: f64,
    },

    /// Payoff diagram of a strategy at 1% spot steps
    Payoff {
        /// JSON file with an array of legs
        #[arg(short, long)]
        legs: PathBuf,

        /// Current price of the underlying
        #[arg(long)]
        spot: f64,
    },

    /// List strategy templates
    Templates {
        /// Show a single template
        #[arg(long)]
        id: Option<String>,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(short = 'f', long, default_value = "optx.yaml")]
        file: PathBuf,
    },

    /// Write a configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "optx.yaml")]
        output: PathBuf,
    },
}

/// Contract terms shared by the pricing commands
#[derive(Args, Debug, Clone)]
pub struct ContractArgs {
    /// Spot price of the underlying
    #[arg(long)]
    pub spot: f64,

    /// Strike price
    #[arg(long)]
    pub strike: f64,

    /// Time to expiry in years
    #[arg(long)]
    pub years: f64,

    /// Risk-free rate (defaults to the configured rate)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Option<f64>,

    /// Option class
    #[arg(long, value_enum, default_value = "call")]
    pub kind: OptionKind,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Call => "call",
            OptionKind::Put => "put",
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
