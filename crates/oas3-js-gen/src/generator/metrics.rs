use strum::Display;

use crate::generator::{grouper::GroupedModules, model_emitter::Model};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationStats {
  pub modules_generated: usize,
  pub functions_generated: usize,
  pub duplicates_collapsed: usize,
  pub models_generated: usize,
  pub paths_skipped: usize,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_modules(&mut self, grouped: &GroupedModules) {
    self.modules_generated += grouped.modules.len();
    self.functions_generated += grouped.modules.iter().map(|module| module.len()).sum::<usize>();
    self.duplicates_collapsed += grouped.duplicates_collapsed;
    self.record_warnings(grouped.warnings.iter().cloned());
  }

  pub fn record_models(&mut self, models: &[Model]) {
    self.models_generated += models.len();
  }

  pub fn record_warning(&mut self, warning: GenerationWarning) {
    if warning.is_skipped_item() {
      self.paths_skipped += 1;
    }
    self.warnings.push(warning);
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    for warning in warnings {
      self.record_warning(warning);
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "Path '{path}' has {segments} segment(s); only /<module>/<function> paths are generated")]
  SkippedPath { path: String, segments: usize },
  #[strum(to_string = "Path '{path}': segment '{segment}' does not produce a valid function name")]
  EmptyFunctionName { path: String, segment: String },
  #[strum(
    to_string = "Module '{module}' exports function '{name}' more than once; the generated module will fail to load"
  )]
  DuplicateFunctionName { module: String, name: String },
  #[strum(to_string = "Document has no paths; no modules generated")]
  MissingPaths,
  #[strum(to_string = "Document has no components.schemas; models file not generated")]
  MissingSchemas,
}

impl GenerationWarning {
  /// Whether the warning means that part of the document produced no output.
  pub fn is_skipped_item(&self) -> bool {
    matches!(self, Self::SkippedPath { .. } | Self::EmptyFunctionName { .. })
  }

  /// Whether the emitted module is not valid JavaScript because of this warning.
  pub fn breaks_module(&self) -> bool {
    matches!(self, Self::DuplicateFunctionName { .. })
  }
}
