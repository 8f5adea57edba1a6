use crate::{
  generator::{
    document::Document,
    orchestrator::{GeneratedOutput, Orchestrator},
    writer::{GeneratedFile, OutputLayout, PreambleConfig},
  },
  utils::spec::parse_json,
};

pub(super) const WEATHER_FORECAST: &str = include_str!("../../../fixtures/weather_forecast.json");
pub(super) const PETSTORE: &str = include_str!("../../../fixtures/petstore.json");
pub(super) const PETSTORE_YAML: &str = include_str!("../../../fixtures/petstore.yaml");

pub(super) fn parse_document(json: &str) -> Document {
  parse_json(json.as_bytes()).expect("failed to parse test document")
}

pub(super) fn generate(json: &str) -> GeneratedOutput {
  generate_with(parse_document(json), PreambleConfig::default())
}

pub(super) fn generate_with(document: Document, preamble: PreambleConfig) -> GeneratedOutput {
  Orchestrator::new(document, preamble, OutputLayout::default()).generate("openapi.json")
}

pub(super) fn module<'a>(output: &'a GeneratedOutput, file_name: &str) -> &'a GeneratedFile {
  output
    .modules
    .iter()
    .find(|file| file.file_name == file_name)
    .unwrap_or_else(|| panic!("module file {file_name} not generated"))
}

/// The emitted function declared as `export async function <name>(`, up to its closing brace.
pub(super) fn function_source<'a>(content: &'a str, declaration: &str) -> &'a str {
  let start = content
    .find(declaration)
    .unwrap_or_else(|| panic!("declaration {declaration} not found"));
  let end = content[start..].find("\n}\n").map_or(content.len(), |offset| start + offset + 3);
  &content[start..end]
}
