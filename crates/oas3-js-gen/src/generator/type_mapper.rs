use crate::generator::document::{Operation, SchemaKind, SchemaNode};

/// Appended to a mapped type when the value may be `null`.
pub const NULLABLE_MARKER: &str = " | null";

/// Prefix used by JSDoc comments to reach declarations in the models file.
pub const MODELS_IMPORT_PREFIX: &str = "import('./Models').";

/// Maps schema nodes to TypeScript type expressions.
///
/// The plain mapper renders references as bare model names, which is what the
/// models file needs. A qualified mapper prefixes every model reference, so the
/// same schema can be rendered inside a JSDoc comment of a `.js` module.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeMapper<'a> {
  model_prefix: Option<&'a str>,
}

impl<'a> TypeMapper<'a> {
  #[must_use]
  pub const fn new() -> Self {
    Self { model_prefix: None }
  }

  #[must_use]
  pub const fn qualified(model_prefix: &'a str) -> Self {
    Self {
      model_prefix: Some(model_prefix),
    }
  }

  #[must_use]
  pub fn map_type(&self, schema: &SchemaNode) -> String {
    match &schema.kind {
      SchemaKind::Reference(name) => match self.model_prefix {
        Some(prefix) => format!("{prefix}{name}"),
        None => name.clone(),
      },
      SchemaKind::Array(items) => format!("{}[]", self.map_type(items)),
      SchemaKind::Object(_) => "object".to_string(),
      SchemaKind::Primitive(type_name) => map_primitive(type_name).to_string(),
    }
  }

  /// Like [`Self::map_type`], with the nullable marker when the schema is nullable.
  #[must_use]
  pub fn map_nullable_type(&self, schema: &SchemaNode) -> String {
    with_nullable_marker(self.map_type(schema), is_nullable(schema))
  }
}

fn map_primitive(type_name: &str) -> &str {
  match type_name {
    "integer" => "number",
    other => other,
  }
}

#[must_use]
pub fn map_type(schema: &SchemaNode) -> String {
  TypeMapper::new().map_type(schema)
}

#[must_use]
pub const fn is_nullable(schema: &SchemaNode) -> bool {
  schema.nullable
}

/// An operation's result may be `null` when it declares a `204` response or any
/// response without content.
#[must_use]
pub fn responses_nullable(operation: &Operation) -> bool {
  operation
    .responses
    .iter()
    .any(|(status, response)| status == "204" || !response.has_content())
}

#[must_use]
pub fn with_nullable_marker(mut type_expr: String, nullable: bool) -> String {
  if nullable {
    type_expr.push_str(NULLABLE_MARKER);
  }
  type_expr
}

/// Primitive JavaScript values are decoded from the response text; everything
/// else is parsed as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
  String,
  Number,
  Boolean,
}

impl ScalarKind {
  /// Classifies a mapped type expression.
  #[must_use]
  pub fn from_mapped(type_expr: &str) -> Option<Self> {
    match type_expr {
      "string" => Some(Self::String),
      "number" | "integer" => Some(Self::Number),
      "boolean" => Some(Self::Boolean),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use indexmap::IndexMap;

  use super::*;
  use crate::generator::document::Response;

  fn response(content: Option<SchemaNode>) -> Response {
    Response {
      description: None,
      content: content.map(|schema| [("application/json".to_string(), schema)].into_iter().collect()),
    }
  }

  #[test]
  fn test_map_type() {
    let cases = [
      (SchemaNode::primitive("integer"), "number"),
      (SchemaNode::primitive("string"), "string"),
      (SchemaNode::primitive("file"), "file"),
      (SchemaNode::array(SchemaNode::primitive("integer")), "number[]"),
      (SchemaNode::array(SchemaNode::array(SchemaNode::reference("Pet"))), "Pet[][]"),
      (SchemaNode::reference("WeatherForecast"), "WeatherForecast"),
      (SchemaNode::new(SchemaKind::Object(IndexMap::new())), "object"),
    ];
    for (schema, expected) in cases {
      assert_eq!(map_type(&schema), expected, "mapping {schema:?}");
    }
  }

  #[test]
  fn test_qualified_mapper() {
    let mapper = TypeMapper::qualified(MODELS_IMPORT_PREFIX);
    let pets = SchemaNode::array(SchemaNode::reference("Pet"));
    assert_eq!(mapper.map_type(&pets), "import('./Models').Pet[]");
    assert_eq!(mapper.map_type(&SchemaNode::primitive("integer")), "number");
    assert_eq!(
      mapper.map_nullable_type(&SchemaNode::reference("Owner").nullable()),
      "import('./Models').Owner | null"
    );
    assert_eq!(TypeMapper::new().map_nullable_type(&SchemaNode::primitive("string")), "string");
  }

  #[test]
  fn test_responses_nullable() {
    let operation_with = |responses: Vec<(&str, Response)>| Operation {
      responses: responses
        .into_iter()
        .map(|(status, response)| (status.to_string(), response))
        .collect(),
      ..Operation::default()
    };

    assert!(!responses_nullable(&operation_with(vec![(
      "200",
      response(Some(SchemaNode::reference("Pet")))
    )])));
    assert!(responses_nullable(&operation_with(vec![
      ("200", response(Some(SchemaNode::reference("Pet")))),
      ("404", response(None)),
    ])));
    assert!(responses_nullable(&operation_with(vec![(
      "204",
      response(Some(SchemaNode::primitive("string")))
    )])));
    assert!(!responses_nullable(&Operation::default()));
  }

  #[test]
  fn test_scalar_kind_from_mapped() {
    assert_eq!(ScalarKind::from_mapped("string"), Some(ScalarKind::String));
    assert_eq!(ScalarKind::from_mapped("number"), Some(ScalarKind::Number));
    assert_eq!(ScalarKind::from_mapped("integer"), Some(ScalarKind::Number));
    assert_eq!(ScalarKind::from_mapped("boolean"), Some(ScalarKind::Boolean));
    assert_eq!(ScalarKind::from_mapped("number[]"), None);
    assert_eq!(ScalarKind::from_mapped("object"), None);
    assert_eq!(ScalarKind::from_mapped("Pet"), None);
  }
}
