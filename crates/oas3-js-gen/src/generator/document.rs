//! In-memory object model consumed by the generator.
//!
//! The generator never looks at raw JSON or YAML. [`crate::utils::spec::SpecLoader`]
//! resolves the raw OpenAPI document into these types once, and every later stage
//! only borrows them.

use http::Method;
use indexmap::IndexMap;
use mediatype::MediaType;

/// A parsed API description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
  pub title: String,
  pub version: String,
  /// `None` when the document declares no `paths` object at all.
  pub paths: Option<IndexMap<String, PathItem>>,
  /// `None` when the document declares no `components.schemas` object at all.
  pub schemas: Option<IndexMap<String, SchemaNode>>,
}

impl Document {
  /// Iterates every `(path, method, operation)` triple in declaration order.
  pub fn operations(&self) -> impl Iterator<Item = (&str, &Method, &Operation)> {
    self.paths.iter().flatten().flat_map(|(path, item)| {
      item
        .operations
        .iter()
        .map(move |(method, operation)| (path.as_str(), method, operation))
    })
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
  pub operations: IndexMap<Method, Operation>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
  pub description: Option<String>,
  pub parameters: Vec<Parameter>,
  pub request_body: Option<RequestBody>,
  /// Keyed by status code as written in the document (`"200"`, `"204"`, `"default"`).
  pub responses: IndexMap<String, Response>,
}

impl Operation {
  #[must_use]
  pub fn response(&self, status: &str) -> Option<&Response> {
    self.responses.get(status)
  }

  #[must_use]
  pub fn has_response(&self, status: &str) -> bool {
    self.responses.contains_key(status)
  }

  /// The JSON request body schema, when the operation accepts one.
  #[must_use]
  pub fn json_body(&self) -> Option<&SchemaNode> {
    self.request_body.as_ref().and_then(|body| json_schema(&body.content))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterLocation {
  Query,
  Path,
  #[default]
  Other,
}

impl ParameterLocation {
  #[must_use]
  pub fn from_openapi(location: &str) -> Self {
    match location {
      "query" => Self::Query,
      "path" => Self::Path,
      _ => Self::Other,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
  pub name: String,
  pub location: ParameterLocation,
  pub schema: SchemaNode,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
  pub required: bool,
  pub description: Option<String>,
  /// Content type to schema, in declaration order.
  pub content: IndexMap<String, SchemaNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
  pub description: Option<String>,
  /// `None` when the response declares no `content` object.
  pub content: Option<IndexMap<String, SchemaNode>>,
}

impl Response {
  #[must_use]
  pub fn has_content(&self) -> bool {
    self.content.as_ref().is_some_and(|content| !content.is_empty())
  }

  #[must_use]
  pub fn json_schema(&self) -> Option<&SchemaNode> {
    self.content.as_ref().and_then(json_schema)
  }
}

/// Schema description unit: a primitive, array, object or reference, plus nullability.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
  pub kind: SchemaKind,
  pub nullable: bool,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
  /// Any non-structural `type` keyword, kept verbatim (`string`, `integer`, `file`, ...).
  Primitive(String),
  Array(Box<SchemaNode>),
  Object(IndexMap<String, SchemaNode>),
  /// Name of a schema under `components.schemas`.
  Reference(String),
}

impl SchemaNode {
  pub fn primitive(type_name: impl Into<String>) -> Self {
    Self::new(SchemaKind::Primitive(type_name.into()))
  }

  #[must_use]
  pub fn array(items: SchemaNode) -> Self {
    Self::new(SchemaKind::Array(Box::new(items)))
  }

  pub fn object(properties: impl IntoIterator<Item = (String, SchemaNode)>) -> Self {
    Self::new(SchemaKind::Object(properties.into_iter().collect()))
  }

  pub fn reference(name: impl Into<String>) -> Self {
    Self::new(SchemaKind::Reference(name.into()))
  }

  #[must_use]
  pub const fn new(kind: SchemaKind) -> Self {
    Self {
      kind,
      nullable: false,
      description: None,
    }
  }

  #[cfg(test)]
  #[must_use]
  pub fn nullable(mut self) -> Self {
    self.nullable = true;
    self
  }

  #[cfg(test)]
  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }
}

/// Returns whether a content-type key denotes JSON (`application/json`, `*/*+json`).
#[must_use]
pub fn is_json_content_type(content_type: &str) -> bool {
  let Ok(media) = MediaType::parse(content_type) else {
    return false;
  };

  let suffix = media.suffix.as_ref().map(mediatype::Name::as_str);
  matches!(
    (media.ty.as_str(), media.subty.as_str(), suffix),
    ("application", "json", _) | (_, _, Some("json"))
  )
}

fn json_schema(content: &IndexMap<String, SchemaNode>) -> Option<&SchemaNode> {
  content
    .iter()
    .find(|(content_type, _)| is_json_content_type(content_type))
    .map(|(_, schema)| schema)
}
