use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, Colors, ThemeMode};
use crate::generator::writer::{DEFAULT_ERROR_HELPER, DEFAULT_EXTENSION, DEFAULT_MODELS_FILE, DEFAULT_PORT_ENV};

#[derive(Parser, Debug)]
#[command(name = "oas3-js-gen")]
#[command(author, version, about = "OpenAPI to JavaScript client SDK generator")]
#[command(styles = Colors::clap_styles())]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from OpenAPI specification
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Generate JavaScript client modules and model declarations
  Generate(GenerateCommand),
}

#[derive(Args, Debug)]
pub struct GenerateCommand {
  /// Path to the OpenAPI specification file (JSON or YAML)
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,

  /// Directory where the generated files will be written
  #[arg(short, long, value_name = "DIR")]
  pub output: PathBuf,

  /// File extension of generated module files
  #[arg(long, value_name = "EXT", default_value = DEFAULT_EXTENSION)]
  pub extension: String,

  /// File name of the generated model declarations
  #[arg(long, value_name = "FILE", default_value = DEFAULT_MODELS_FILE)]
  pub models_file: String,

  /// Module specifier of the `extractErrorMessage` helper imported by every module
  #[arg(long, value_name = "PATH", default_value = DEFAULT_ERROR_HELPER)]
  pub error_helper: String,

  /// Environment variable holding the local server port
  #[arg(long, value_name = "NAME", default_value = DEFAULT_PORT_ENV)]
  pub port_env: String,

  /// Fixed base URL, replacing the port-derived `http://localhost:<port>`
  #[arg(long, value_name = "URL")]
  pub base_url: Option<String>,

  /// Enable verbose output with detailed progress information
  #[arg(short, long, default_value_t = false)]
  pub verbose: bool,

  /// Suppress non-essential output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List every operation with the module and function it generates
  Operations {
    /// Path to the OpenAPI specification file (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
  },
}
