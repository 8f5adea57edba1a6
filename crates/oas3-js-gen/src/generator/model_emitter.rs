use indexmap::IndexMap;
use itertools::Itertools;

use crate::{
  generator::{
    document::{SchemaKind, SchemaNode},
    type_mapper::TypeMapper,
  },
  naming::identifiers::to_property_key,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProperty {
  /// Mapped type, nullable marker included.
  pub type_expr: String,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelShape {
  /// Properties in declaration order.
  Interface(IndexMap<String, ModelProperty>),
  /// Named schemas that are not objects, e.g. `export type Ids = number[];`.
  Alias(String),
}

/// A named type declaration of the models file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
  pub name: String,
  pub description: Option<String>,
  pub shape: ModelShape,
}

impl Model {
  #[must_use]
  pub fn from_schema(name: &str, schema: &SchemaNode) -> Self {
    let mapper = TypeMapper::new();
    let shape = match &schema.kind {
      SchemaKind::Object(properties) => ModelShape::Interface(
        properties
          .iter()
          .map(|(property, property_schema)| {
            let property_model = ModelProperty {
              type_expr: mapper.map_nullable_type(property_schema),
              description: property_schema.description.clone(),
            };
            (property.clone(), property_model)
          })
          .collect(),
      ),
      _ => ModelShape::Alias(mapper.map_nullable_type(schema)),
    };

    Self {
      name: name.to_string(),
      description: schema.description.clone(),
      shape,
    }
  }

  #[must_use]
  pub fn emit(&self) -> String {
    let mut lines = doc_comment(self.description.as_deref(), "");

    match &self.shape {
      ModelShape::Interface(properties) => {
        lines.push(format!("export interface {} {{", self.name));
        for (name, property) in properties {
          lines.extend(doc_comment(property.description.as_deref(), "  "));
          lines.push(format!("  {}: {};", to_property_key(name), property.type_expr));
        }
        lines.push("}".to_string());
      }
      ModelShape::Alias(type_expr) => lines.push(format!("export type {} = {type_expr};", self.name)),
    }

    let mut source = lines.join("\n");
    source.push('\n');
    source
  }
}

fn doc_comment(description: Option<&str>, indent: &str) -> Vec<String> {
  let Some(text) = description.map(str::trim).filter(|text| !text.is_empty()) else {
    return Vec::new();
  };

  let text = text.replace("*/", "*\\/");
  let body: Vec<&str> = text.lines().map(str::trim_end).collect();
  if let [single] = body.as_slice() {
    return vec![format!("{indent}/** {single} */")];
  }

  let mut lines = vec![format!("{indent}/**")];
  lines.extend(body.iter().map(|line| {
    if line.is_empty() {
      format!("{indent} *")
    } else {
      format!("{indent} * {line}")
    }
  }));
  lines.push(format!("{indent} */"));
  lines
}

/// Builds one model per named schema, in declaration order.
#[must_use]
pub fn build_models<'a>(schemas: impl IntoIterator<Item = (&'a String, &'a SchemaNode)>) -> Vec<Model> {
  schemas
    .into_iter()
    .map(|(name, schema)| Model::from_schema(name, schema))
    .collect()
}

/// Concatenates model declarations separated by blank lines.
#[must_use]
pub fn emit_models(models: &[Model]) -> String {
  models.iter().map(Model::emit).join("\n")
}
