use crate::config::ConfigOverrides;
use beanclass_classifiers::ConfidenceMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "beanclass")]
#[command(
    author,
    version,
    about = "Dry bean classifier: web form, batch prediction, and HTTP API"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        env = "BEANCLASS_CONFIG",
        default_value = "beanclass.yaml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the prediction server with web UI
    Serve {
        /// Listen port
        #[arg(short, long, env = "BEANCLASS_PORT")]
        port: Option<u16>,

        /// Listen address
        #[arg(short, long)]
        address: Option<String>,

        /// Model artifact path
        #[arg(short, long, env = "BEANCLASS_MODEL")]
        model: Option<PathBuf>,

        /// Confidence mode: per-row or batch-max
        #[arg(long, value_parser = parse_confidence)]
        confidence: Option<ConfidenceMode>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Predict a CSV file or URL and print the results
    Predict {
        /// CSV path, or an http(s) URL
        #[arg(short, long)]
        input: String,

        /// Write the labels,confidence CSV here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Model artifact path
        #[arg(short, long, env = "BEANCLASS_MODEL")]
        model: Option<PathBuf>,

        /// Confidence mode: per-row or batch-max
        #[arg(long, value_parser = parse_confidence)]
        confidence: Option<ConfidenceMode>,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the 16 input features and their defaults
    Schema,
}

impl Commands {
    /// Configuration values given on the command line
    pub fn overrides(&self) -> ConfigOverrides {
        match self {
            Commands::Serve {
                port,
                address,
                model,
                confidence,
                ..
            } => ConfigOverrides {
                model: model.clone(),
                confidence: *confidence,
                listen: address.clone(),
                port: *port,
            },
            Commands::Predict {
                model, confidence, ..
            } => ConfigOverrides {
                model: model.clone(),
                confidence: *confidence,
                ..Default::default()
            },
            Commands::Schema => ConfigOverrides::default(),
        }
    }
}

fn parse_confidence(s: &str) -> Result<ConfidenceMode, String> {
    s.parse()
}
