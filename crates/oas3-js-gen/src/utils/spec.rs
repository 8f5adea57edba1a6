use std::{ffi::OsStr, path::Path};

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use http::Method;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
  generator::document::{
    Document, Operation, Parameter, ParameterLocation, PathItem, RequestBody, Response, SchemaNode,
  },
  utils::parse_schema_ref_path,
};

/// Type used for schemas without a usable `type` keyword.
const UNKNOWN_TYPE: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
  #[default]
  Json,
  Yaml,
}

impl SpecFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "yaml" | "yml" => Self::Yaml,
      _ => Self::Json,
    }
  }
}

pub struct SpecLoader {
  file: AsyncMmapFile,
  format: SpecFormat,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let format = path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(SpecFormat::default(), SpecFormat::from_extension);

    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("failed to open {}", path.display()))?;

    Ok(Self { file, format })
  }

  pub fn parse(&self) -> anyhow::Result<Document> {
    match self.format {
      SpecFormat::Json => parse_json(self.file.as_slice()),
      SpecFormat::Yaml => parse_yaml(self.file.as_slice()),
    }
  }
}

/// Parses an OpenAPI JSON document into the generator's object model.
///
/// Deserialization errors carry the path of the offending element.
pub fn parse_json(bytes: &[u8]) -> anyhow::Result<Document> {
  let mut deserializer = serde_json::Deserializer::from_slice(bytes);
  let raw: RawDocument = serde_path_to_error::deserialize(&mut deserializer).context("invalid OpenAPI JSON document")?;
  deserializer.end().context("trailing characters after OpenAPI JSON document")?;
  Ok(raw.into_document())
}

pub fn parse_yaml(bytes: &[u8]) -> anyhow::Result<Document> {
  let deserializer = serde_yaml::Deserializer::from_slice(bytes);
  let raw: RawDocument = serde_path_to_error::deserialize(deserializer).context("invalid OpenAPI YAML document")?;
  Ok(raw.into_document())
}

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
  #[serde(default)]
  info: RawInfo,
  paths: Option<IndexMap<String, RawPathItem>>,
  components: Option<RawComponents>,
}

#[derive(Debug, Default, Deserialize)]
struct RawInfo {
  #[serde(default)]
  title: String,
  #[serde(default)]
  version: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawComponents {
  schemas: Option<IndexMap<String, RawSchema>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPathItem {
  #[serde(default)]
  parameters: Vec<RawParameter>,
  get: Option<RawOperation>,
  put: Option<RawOperation>,
  post: Option<RawOperation>,
  delete: Option<RawOperation>,
  options: Option<RawOperation>,
  head: Option<RawOperation>,
  patch: Option<RawOperation>,
  trace: Option<RawOperation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOperation {
  summary: Option<String>,
  description: Option<String>,
  #[serde(default)]
  parameters: Vec<RawParameter>,
  request_body: Option<RawRequestBody>,
  #[serde(default)]
  responses: IndexMap<String, RawResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawParameter {
  #[serde(default)]
  name: String,
  #[serde(rename = "in", default)]
  location: String,
  schema: Option<RawSchema>,
  description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRequestBody {
  #[serde(default)]
  required: bool,
  description: Option<String>,
  #[serde(default)]
  content: IndexMap<String, RawMediaType>,
}

#[derive(Debug, Default, Deserialize)]
struct RawResponse {
  description: Option<String>,
  content: Option<IndexMap<String, RawMediaType>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMediaType {
  schema: Option<RawSchema>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawTypeSet {
  Single(String),
  Multiple(Vec<String>),
}

impl RawTypeSet {
  /// Splits the `type` keyword into the first non-null type and whether `null` is allowed.
  fn split(self) -> (Option<String>, bool) {
    match self {
      Self::Single(type_name) if type_name == "null" => (None, true),
      Self::Single(type_name) => (Some(type_name), false),
      Self::Multiple(types) => {
        let nullable = types.iter().any(|type_name| type_name == "null");
        (types.into_iter().find(|type_name| type_name != "null"), nullable)
      }
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSchema {
  #[serde(rename = "$ref")]
  reference: Option<String>,
  #[serde(rename = "type")]
  schema_type: Option<RawTypeSet>,
  items: Option<Box<RawSchema>>,
  #[serde(default)]
  properties: IndexMap<String, RawSchema>,
  #[serde(default)]
  nullable: bool,
  description: Option<String>,
  #[serde(default)]
  all_of: Vec<RawSchema>,
  #[serde(default)]
  one_of: Vec<RawSchema>,
  #[serde(default)]
  any_of: Vec<RawSchema>,
}

impl RawSchema {
  fn is_null_only(&self) -> bool {
    self.reference.is_none()
      && self.properties.is_empty()
      && matches!(self.schema_type.clone().map(RawTypeSet::split), Some((None, true)))
  }

  /// Unwraps `allOf: [{$ref}]` and `oneOf: [{$ref}, {type: null}]` style wrappers.
  fn take_single_variant(&mut self) -> Option<(RawSchema, bool)> {
    let variants = std::mem::take(&mut self.all_of)
      .into_iter()
      .chain(std::mem::take(&mut self.one_of))
      .chain(std::mem::take(&mut self.any_of));

    let (nulls, mut rest): (Vec<_>, Vec<_>) = variants.partition(RawSchema::is_null_only);
    if rest.len() == 1 {
      rest.pop().map(|variant| (variant, !nulls.is_empty()))
    } else {
      None
    }
  }

  fn into_node(mut self) -> SchemaNode {
    let (type_name, type_nullable) = self.schema_type.take().map(RawTypeSet::split).unwrap_or_default();
    let mut nullable = self.nullable || type_nullable;
    let mut description = self.description.take();

    let node = if let Some(reference) = self.reference.take() {
      parse_schema_ref_path(&reference).map_or_else(|| SchemaNode::primitive(UNKNOWN_TYPE), SchemaNode::reference)
    } else if type_name.is_none()
      && self.properties.is_empty()
      && let Some((variant, variant_nullable)) = self.take_single_variant()
    {
      let inner = variant.into_node();
      nullable |= variant_nullable || inner.nullable;
      description = description.or_else(|| inner.description.clone());
      inner
    } else {
      match type_name.as_deref() {
        Some("array") => SchemaNode::array(items_node(self.items)),
        Some("object") => SchemaNode::object(convert_properties(self.properties)),
        None if !self.properties.is_empty() => SchemaNode::object(convert_properties(self.properties)),
        None if self.items.is_some() => SchemaNode::array(items_node(self.items)),
        Some(other) => SchemaNode::primitive(other),
        None => SchemaNode::primitive(UNKNOWN_TYPE),
      }
    };

    SchemaNode {
      nullable,
      description,
      ..node
    }
  }
}

fn items_node(items: Option<Box<RawSchema>>) -> SchemaNode {
  items.map_or_else(|| SchemaNode::primitive(UNKNOWN_TYPE), |items| items.into_node())
}

fn convert_properties(properties: IndexMap<String, RawSchema>) -> IndexMap<String, SchemaNode> {
  properties
    .into_iter()
    .map(|(name, schema)| (name, schema.into_node()))
    .collect()
}

fn convert_content(content: IndexMap<String, RawMediaType>) -> IndexMap<String, SchemaNode> {
  content
    .into_iter()
    .map(|(content_type, media)| {
      let schema = media
        .schema
        .map_or_else(|| SchemaNode::primitive(UNKNOWN_TYPE), RawSchema::into_node);
      (content_type, schema)
    })
    .collect()
}

impl RawDocument {
  fn into_document(self) -> Document {
    let paths = self.paths.map(|paths| {
      paths
        .into_iter()
        .map(|(path, item)| (path, item.into_path_item()))
        .collect()
    });

    let schemas = self
      .components
      .and_then(|components| components.schemas)
      .map(convert_properties);

    Document {
      title: self.info.title,
      version: self.info.version,
      paths,
      schemas,
    }
  }
}

impl RawPathItem {
  fn into_path_item(self) -> PathItem {
    let shared = self.parameters;
    let methods = [
      (Method::GET, self.get),
      (Method::PUT, self.put),
      (Method::POST, self.post),
      (Method::DELETE, self.delete),
      (Method::OPTIONS, self.options),
      (Method::HEAD, self.head),
      (Method::PATCH, self.patch),
      (Method::TRACE, self.trace),
    ];

    let operations = methods
      .into_iter()
      .filter_map(|(method, operation)| operation.map(|operation| (method, operation.into_operation(&shared))))
      .collect();

    PathItem { operations }
  }
}

impl RawOperation {
  /// Path-level parameters apply unless the operation overrides the same name and location.
  fn into_operation(self, shared: &[RawParameter]) -> Operation {
    let inherited: Vec<RawParameter> = shared
      .iter()
      .filter(|candidate| {
        !self
          .parameters
          .iter()
          .any(|own| own.name == candidate.name && own.location == candidate.location)
      })
      .cloned()
      .collect();

    let parameters = inherited
      .into_iter()
      .chain(self.parameters)
      .filter(|parameter| !parameter.name.is_empty())
      .map(RawParameter::into_parameter)
      .collect();

    let request_body = self.request_body.map(|body| RequestBody {
      required: body.required,
      description: body.description,
      content: convert_content(body.content),
    });

    let responses = self
      .responses
      .into_iter()
      .map(|(status, response)| {
        let response = Response {
          description: response.description,
          content: response.content.map(convert_content),
        };
        (status, response)
      })
      .collect();

    Operation {
      description: self.description.or(self.summary),
      parameters,
      request_body,
      responses,
    }
  }
}

impl RawParameter {
  fn into_parameter(self) -> Parameter {
    Parameter {
      location: ParameterLocation::from_openapi(&self.location),
      schema: self
        .schema
        .map_or_else(|| SchemaNode::primitive("string"), RawSchema::into_node),
      name: self.name,
      description: self.description,
    }
  }
}
