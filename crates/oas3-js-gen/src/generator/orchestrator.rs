//! Drives a parsed [`Document`] through grouping and emission, producing one
//! [`GeneratedFile`] per module plus the shared models file.

use crate::generator::{
  document::Document,
  function_emitter::emit_module_functions,
  grouper::{GroupedModules, group_modules},
  metrics::{GenerationStats, GenerationWarning},
  model_emitter::{build_models, emit_models},
  writer::{GeneratedFile, OutputLayout, PreambleConfig},
};

const GENERATOR_NAME: &str = env!("CARGO_PKG_NAME");
const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Orchestrator {
  document: Document,
  preamble: PreambleConfig,
  layout: OutputLayout,
}

/// Document metadata shown in the banner of every generated file.
#[derive(Debug, Clone)]
pub struct CodeMetadata {
  pub title: String,
  pub version: String,
}

/// Everything one run produces, ready to be written.
#[derive(Debug, Clone)]
pub struct GeneratedOutput {
  /// One file per module, in first-seen path order.
  pub modules: Vec<GeneratedFile>,
  /// Absent when the document declares no `components.schemas`.
  pub models: Option<GeneratedFile>,
  pub stats: GenerationStats,
}

impl GeneratedOutput {
  /// Module files followed by the models file.
  pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
    self.modules.iter().chain(self.models.as_ref())
  }
}

impl Orchestrator {
  #[must_use]
  pub fn new(document: Document, preamble: PreambleConfig, layout: OutputLayout) -> Self {
    Self {
      document,
      preamble,
      layout,
    }
  }

  #[must_use]
  pub fn metadata(&self) -> CodeMetadata {
    CodeMetadata {
      title: self.document.title.clone(),
      version: self.document.version.clone(),
    }
  }

  /// Groups paths into modules and renders every output file.
  ///
  /// Missing `paths` or `components.schemas` skip the respective output with a
  /// warning. The result depends only on the document and configuration, so two
  /// runs over the same input are byte-identical.
  #[must_use]
  pub fn generate(&self, source_path: &str) -> GeneratedOutput {
    let banner = self.banner(source_path);
    let mut stats = GenerationStats::default();

    let modules = match &self.document.paths {
      Some(paths) => {
        let grouped = group_modules(paths);
        stats.record_modules(&grouped);
        self.render_modules(&banner, &grouped)
      }
      None => {
        stats.record_warning(GenerationWarning::MissingPaths);
        Vec::new()
      }
    };

    let models = match &self.document.schemas {
      Some(schemas) => {
        let models = build_models(schemas);
        stats.record_models(&models);
        let content = format!("{banner}\n{}", emit_models(&models));
        Some(GeneratedFile::new(self.layout.models_file.clone(), &content))
      }
      None => {
        stats.record_warning(GenerationWarning::MissingSchemas);
        None
      }
    };

    GeneratedOutput { modules, models, stats }
  }

  fn render_modules(&self, banner: &str, grouped: &GroupedModules) -> Vec<GeneratedFile> {
    let preamble = self.preamble.render();
    grouped
      .modules
      .iter()
      .filter(|module| !module.is_empty())
      .map(|module| {
        let content = format!("{banner}\n{preamble}\n{}", emit_module_functions(module));
        GeneratedFile::new(self.layout.module_file_name(module.name()), &content)
      })
      .collect()
  }

  fn banner(&self, source_path: &str) -> String {
    let metadata = self.metadata();
    format!(
      "// AUTO-GENERATED CODE - DO NOT EDIT!\n//\n// {}\n// Source: {source_path}\n// Version: {}\n// Generated by `{GENERATOR_NAME}` v{GENERATOR_VERSION}\n",
      single_line(&metadata.title),
      single_line(&metadata.version),
    )
  }
}

/// Keeps user-provided text inside a `//` comment line.
fn single_line(text: &str) -> String {
  text.lines().map(str::trim).filter(|line| !line.is_empty()).collect::<Vec<_>>().join(" ")
}
