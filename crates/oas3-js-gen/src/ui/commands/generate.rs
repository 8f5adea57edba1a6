use std::{
  ffi::OsStr,
  path::{Path, PathBuf},
};

use chrono::{Local, Timelike};
use crossterm::style::Stylize;

use crate::{
  generator::{
    document::Document,
    metrics::GenerationStats,
    orchestrator::{GeneratedOutput, Orchestrator},
    writer::{OutputLayout, PreambleConfig, write_files},
  },
  ui::{Colors, GenerateCommand},
  utils::spec::SpecLoader,
};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub input: PathBuf,
  pub output: PathBuf,
  pub preamble: PreambleConfig,
  pub layout: OutputLayout,
  pub verbose: bool,
  pub quiet: bool,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> anyhow::Result<Self> {
    let GenerateCommand {
      input,
      output,
      extension,
      models_file,
      error_helper,
      port_env,
      base_url,
      verbose,
      quiet,
    } = command;

    if verbose && quiet {
      anyhow::bail!("--verbose and --quiet cannot be used together");
    }

    let extension = extension.trim_start_matches('.').to_string();
    if extension.is_empty() {
      anyhow::bail!("Module file extension (--extension) must not be empty");
    }
    let is_bare_name = Path::new(&models_file)
      .file_name()
      .is_some_and(|name| name == OsStr::new(&models_file));
    if !is_bare_name {
      anyhow::bail!("Invalid models file name '{models_file}': expected a bare file name (e.g., Models.d.ts)");
    }
    if !is_env_name(&port_env) {
      anyhow::bail!("Invalid port environment variable '{port_env}': expected letters, digits and underscores");
    }

    let preamble = PreambleConfig::builder()
      .error_helper(error_helper)
      .port_env(port_env)
      .maybe_base_url(base_url)
      .build();
    let layout = OutputLayout::builder()
      .extension(extension)
      .models_file(models_file)
      .build();

    Ok(Self {
      input,
      output,
      preamble,
      layout,
      verbose,
      quiet,
    })
  }

  async fn load_document(&self) -> anyhow::Result<Document> {
    SpecLoader::open(&self.input).await?.parse()
  }

  fn create_orchestrator(&self, document: Document) -> Orchestrator {
    Orchestrator::new(document, self.preamble.clone(), self.layout.clone())
  }
}

/// The port name is emitted verbatim as a JavaScript `const`.
fn is_env_name(name: &str) -> bool {
  let mut chars = name.chars();
  chars
    .next()
    .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!("{} {message}", format_timestamp().with(self.colors.timestamp()));
    }
  }

  fn stat(&self, label: &str, value: String) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(
      &format!("Loading OpenAPI document from: {}", self.config.input.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_generating(&self, document: &Document) {
    self.info(
      &format!("Generating JavaScript client for {} {}...", document.title, document.version)
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn print_statistics(&self, stats: &GenerationStats) {
    if self.config.quiet {
      return;
    }

    self.stat("Modules generated:", stats.modules_generated.to_string());
    self.stat("Functions generated:", stats.functions_generated.to_string());
    if stats.duplicates_collapsed > 0 {
      self.stat("", format!("{} duplicates collapsed", stats.duplicates_collapsed));
    }
    self.stat("Models generated:", stats.models_generated.to_string());
    if stats.paths_skipped > 0 {
      self.stat("Paths skipped:", stats.paths_skipped.to_string());
    }
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len().to_string());
    }

    self.print_warnings(stats);
  }

  /// Skipped paths and warnings that break a module are always reported; the rest
  /// only with `--verbose`.
  fn print_warnings(&self, stats: &GenerationStats) {
    let mut printed_header = false;
    for warning in &stats.warnings {
      if !warning.is_skipped_item() && !warning.breaks_module() && !self.config.verbose {
        continue;
      }

      if !printed_header {
        println!();
        printed_header = true;
      }

      let label = if warning.is_skipped_item() { "Skipped:" } else { "Warning:" };
      eprintln!(
        "{} {}",
        label.with(self.colors.warning()),
        warning.to_string().with(self.colors.primary())
      );
    }
  }

  fn log_writing(&self) {
    self.info(
      &format!("Writing to: {}", self.config.output.display())
        .with(self.colors.primary())
        .to_string(),
    );
  }

  fn log_written(&self, paths: &[PathBuf]) {
    if !self.config.verbose {
      return;
    }
    for path in paths {
      println!(
        "            {} {}",
        "wrote".with(self.colors.accent()),
        path.display().to_string().with(self.colors.value())
      );
    }
  }

  fn log_success(&self, output: &GeneratedOutput) {
    if !self.config.quiet {
      let message = format!("Successfully generated {} file(s)", output.files().count());
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        message.with(self.colors.success())
      );
    }
  }
}

pub async fn generate_code(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);

  logger.log_loading();
  let document = config.load_document().await?;

  logger.log_generating(&document);
  let orchestrator = config.create_orchestrator(document);
  let source_path = config.input.display().to_string();
  let output = orchestrator.generate(&source_path);
  logger.print_statistics(&output.stats);

  logger.log_writing();
  let files: Vec<_> = output.files().cloned().collect();
  let written = write_files(&config.output, &files).await?;
  logger.log_written(&written);

  logger.log_success(&output);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn command() -> GenerateCommand {
    GenerateCommand {
      input: PathBuf::from("api.json"),
      output: PathBuf::from("out"),
      extension: "js".to_string(),
      models_file: "Models.d.ts".to_string(),
      error_helper: "~/utils/extract-error-message".to_string(),
      port_env: "DOTNET_PORT".to_string(),
      base_url: None,
      verbose: false,
      quiet: false,
    }
  }

  #[test]
  fn test_from_command_defaults() {
    let config = GenerateConfig::from_command(command()).unwrap();
    assert_eq!(config.preamble, PreambleConfig::default());
    assert_eq!(config.layout, OutputLayout::default());
  }

  #[test]
  fn test_from_command_normalizes_extension() {
    let config = GenerateConfig::from_command(GenerateCommand {
      extension: ".mjs".to_string(),
      base_url: Some("https://api.example.com".to_string()),
      ..command()
    })
    .unwrap();
    assert_eq!(config.layout.extension, "mjs");
    assert_eq!(config.preamble.base_url.as_deref(), Some("https://api.example.com"));
  }

  #[test]
  fn test_from_command_rejects_invalid_options() {
    let err = GenerateConfig::from_command(GenerateCommand {
      verbose: true,
      quiet: true,
      ..command()
    })
    .unwrap_err();
    assert!(err.to_string().contains("cannot be used together"));

    let err = GenerateConfig::from_command(GenerateCommand {
      models_file: "types/Models.d.ts".to_string(),
      ..command()
    })
    .unwrap_err();
    assert!(err.to_string().contains("Invalid models file name"));

    let err = GenerateConfig::from_command(GenerateCommand {
      port_env: "DOTNET-PORT".to_string(),
      ..command()
    })
    .unwrap_err();
    assert!(err.to_string().contains("Invalid port environment variable"));

    assert!(
      GenerateConfig::from_command(GenerateCommand {
        extension: ".".to_string(),
        ..command()
      })
      .is_err()
    );
  }

  #[test]
  fn test_is_env_name() {
    assert!(is_env_name("DOTNET_PORT"));
    assert!(is_env_name("_PORT2"));
    assert!(!is_env_name("2PORT"));
    assert!(!is_env_name(""));
  }

  #[tokio::test]
  async fn test_generate_code_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("weather.json");
    tokio::fs::write(&input, include_str!("../../../fixtures/weather_forecast.json"))
      .await
      .unwrap();

    let config = GenerateConfig::from_command(GenerateCommand {
      input,
      output: dir.path().join("out"),
      quiet: true,
      ..command()
    })
    .unwrap();
    let colors = Colors::new(false, crate::ui::colors::Theme::Dark);
    generate_code(config, &colors).await.unwrap();

    let module = tokio::fs::read_to_string(dir.path().join("out/weatherforecast.server.js"))
      .await
      .unwrap();
    assert!(module.contains("export async function today()"));
    assert!(dir.path().join("out/Models.d.ts").exists());
  }

  #[tokio::test]
  async fn test_generate_code_rejects_colliding_models_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("weather.json");
    tokio::fs::write(&input, include_str!("../../../fixtures/weather_forecast.json"))
      .await
      .unwrap();

    let config = GenerateConfig::from_command(GenerateCommand {
      input,
      output: dir.path().join("out"),
      models_file: "WeatherForecast.server.js".to_string(),
      quiet: true,
      ..command()
    })
    .unwrap();
    let colors = Colors::new(false, crate::ui::colors::Theme::Dark);
    let err = generate_code(config, &colors).await.unwrap_err();

    assert!(err.to_string().contains("more than one generated file"));
    assert!(!dir.path().join("out").exists());
  }
}
