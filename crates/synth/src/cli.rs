//! CLI type definitions

use clap::{Parser, Subcommand, ValueEnum};
use config::ConfigLoader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pipeline-synth")]
#[command(about = "Resolve the SWSOC pipeline configuration into resource declarations", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the pipeline configuration file
    #[arg(short, long, global = true, default_value = ConfigLoader::DEFAULT_PATH)]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Validate the configuration and print the resolved manifest
    Validate,

    /// Resolve every resource for the current environment (default)
    Plan,

    /// Write an example configuration file
    Init {
        /// Destination of the example file
        #[arg(default_value = ConfigLoader::DEFAULT_PATH)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}
