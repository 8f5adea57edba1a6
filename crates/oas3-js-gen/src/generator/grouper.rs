use http::Method;
use indexmap::IndexMap;
use itertools::Itertools;

use crate::{
  generator::{
    document::{Operation, ParameterLocation, PathItem},
    metrics::GenerationWarning,
    type_mapper::{MODELS_IMPORT_PREFIX, ScalarKind, TypeMapper, map_type, responses_nullable},
  },
  naming::identifiers::to_function_name,
};

/// Splits `"/module/function"` into its two segments; any other shape yields `None`.
#[must_use]
pub fn split_path(path: &str) -> Option<(&str, &str)> {
  path.split('/').filter(|segment| !segment.is_empty()).collect_tuple()
}

/// A parameter of a generated wrapper function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSpec {
  /// Name on the wire (query key or path placeholder).
  pub name: String,
  /// Name of the JavaScript binding.
  pub ident: String,
  pub location: ParameterLocation,
  /// JSDoc type, nullable marker included.
  pub type_expr: String,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BodySpec {
  pub type_expr: String,
  pub required: bool,
  pub description: Option<String>,
}

/// How the generated code decodes a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyHandling {
  Text,
  Number,
  Boolean,
  Json,
  /// No `200` JSON response is declared.
  Null,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseSpec {
  /// Mapped type of the `200` JSON schema, model references unqualified.
  pub model: Option<String>,
  /// JSDoc rendering of `model`, model references qualified with the models import.
  pub doc_type: Option<String>,
  pub description: Option<String>,
  pub handling: BodyHandling,
  pub no_content: bool,
  pub nullable: bool,
}

impl ResponseSpec {
  #[must_use]
  pub fn from_operation(operation: &Operation) -> Self {
    let schema = operation.response("200").and_then(|response| response.json_schema());

    let (model, doc_type, handling) = match schema {
      Some(schema) => {
        let model = map_type(schema);
        let handling = match ScalarKind::from_mapped(&model) {
          Some(ScalarKind::String) => BodyHandling::Text,
          Some(ScalarKind::Number) => BodyHandling::Number,
          Some(ScalarKind::Boolean) => BodyHandling::Boolean,
          None => BodyHandling::Json,
        };
        let doc_type = TypeMapper::qualified(MODELS_IMPORT_PREFIX).map_type(schema);
        (Some(model), Some(doc_type), handling)
      }
      None => (None, None, BodyHandling::Null),
    };

    Self {
      model,
      doc_type,
      description: schema.and_then(|schema| schema.description.clone()),
      handling,
      no_content: operation.has_response("204"),
      nullable: responses_nullable(operation),
    }
  }
}

/// Everything needed to emit one wrapper function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionSpec {
  pub name: String,
  pub method: Method,
  /// Raw path template, e.g. `/pets/{petId}`.
  pub path: String,
  pub description: Option<String>,
  pub parameters: Vec<ParameterSpec>,
  pub body: Option<BodySpec>,
  pub response: ResponseSpec,
}

impl FunctionSpec {
  /// Builds the spec of one operation. Header and cookie parameters are not part of
  /// the generated signature.
  #[must_use]
  pub fn from_operation(name: &str, method: &Method, path: &str, operation: &Operation) -> Self {
    let doc_mapper = TypeMapper::qualified(MODELS_IMPORT_PREFIX);

    let body = operation.json_body().map(|schema| BodySpec {
      type_expr: doc_mapper.map_nullable_type(schema),
      required: operation.request_body.as_ref().is_some_and(|body| body.required),
      description: operation.request_body.as_ref().and_then(|body| body.description.clone()),
    });

    let mut bindings = Bindings::new(body.is_some());
    let parameters = operation
      .parameters
      .iter()
      .filter(|parameter| matches!(parameter.location, ParameterLocation::Query | ParameterLocation::Path))
      .enumerate()
      .map(|(index, parameter)| ParameterSpec {
        name: parameter.name.clone(),
        ident: bindings.claim(binding_name(&parameter.name, index)),
        location: parameter.location,
        type_expr: doc_mapper.map_nullable_type(&parameter.schema),
        description: parameter.description.clone(),
      })
      .collect();

    Self {
      name: name.to_string(),
      method: method.clone(),
      path: path.to_string(),
      description: operation.description.clone(),
      parameters,
      body,
      response: ResponseSpec::from_operation(operation),
    }
  }

  /// Parameter names of the generated signature, `body` last.
  pub fn signature(&self) -> impl Iterator<Item = &str> {
    self
      .parameters
      .iter()
      .map(|parameter| parameter.ident.as_str())
      .chain(self.body.as_ref().map(|_| PAYLOAD_BINDING))
  }

  pub fn query_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
    self
      .parameters
      .iter()
      .filter(|parameter| parameter.location == ParameterLocation::Query)
  }

  pub fn path_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
    self
      .parameters
      .iter()
      .filter(|parameter| parameter.location == ParameterLocation::Path)
  }
}

fn binding_name(name: &str, index: usize) -> String {
  let ident = to_function_name(name);
  if ident.is_empty() { format!("arg{index}") } else { ident }
}

/// Parameter name of the JSON request payload.
pub const PAYLOAD_BINDING: &str = "body";

/// Globals referenced inside every generated function body.
const FUNCTION_BODY_GLOBALS: [&str; 6] = [
  "BASE_URL",
  "JSON",
  "URLSearchParams",
  "encodeURIComponent",
  "extractErrorMessage",
  "fetch",
];

/// Parameter names already used by one signature. Strict-mode code rejects duplicates.
struct Bindings {
  taken: Vec<String>,
}

impl Bindings {
  fn new(has_payload: bool) -> Self {
    let taken = FUNCTION_BODY_GLOBALS
      .into_iter()
      .chain(has_payload.then_some(PAYLOAD_BINDING))
      .map(str::to_string)
      .collect();
    Self { taken }
  }

  /// Appends `_` until the name is free, then reserves it.
  fn claim(&mut self, mut name: String) -> String {
    while self.taken.contains(&name) {
      name.push('_');
    }
    self.taken.push(name.clone());
    name
  }
}

/// Structural identity of a function: name, parameters, response model, method and path.
///
/// Two operations with the same fingerprint collapse to a single emitted function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FunctionFingerprint([u8; 32]);

impl FunctionFingerprint {
  #[must_use]
  pub fn of(function: &FunctionSpec) -> Self {
    let mut hasher = blake3::Hasher::new();
    update_field(&mut hasher, &function.name);
    for parameter in function.signature() {
      update_field(&mut hasher, parameter);
    }
    update_field(&mut hasher, function.response.model.as_deref().unwrap_or_default());
    update_field(&mut hasher, function.method.as_str());
    update_field(&mut hasher, &function.path);
    Self(*hasher.finalize().as_bytes())
  }
}

/// Length-prefixed so that adjacent fields cannot run into each other.
fn update_field(hasher: &mut blake3::Hasher, value: &str) {
  hasher.update(&value.len().to_le_bytes());
  hasher.update(value.as_bytes());
}

/// A generated source file: every function derived from paths sharing a first segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
  name: String,
  functions: IndexMap<FunctionFingerprint, FunctionSpec>,
}

impl Module {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      functions: IndexMap::new(),
    }
  }

  #[must_use]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Inserts a function unless a structurally identical one exists. Returns whether it was new.
  pub fn insert(&mut self, function: FunctionSpec) -> bool {
    let fingerprint = FunctionFingerprint::of(&function);
    if self.functions.contains_key(&fingerprint) {
      return false;
    }
    self.functions.insert(fingerprint, function);
    true
  }

  pub fn functions(&self) -> impl Iterator<Item = &FunctionSpec> {
    self.functions.values()
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.functions.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.functions.is_empty()
  }
}

/// Result of grouping a document's paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedModules {
  pub modules: Vec<Module>,
  pub duplicates_collapsed: usize,
  pub warnings: Vec<GenerationWarning>,
}

/// Partitions operations into modules keyed by the first path segment, in first-seen order.
#[derive(Debug, Default)]
pub struct ModuleGrouper {
  modules: IndexMap<String, Module>,
  duplicates_collapsed: usize,
  warnings: Vec<GenerationWarning>,
}

impl ModuleGrouper {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Groups every operation of a path. Paths without exactly two segments are skipped.
  pub fn add_path(&mut self, path: &str, item: &PathItem) {
    let Some((module_name, segment)) = split_path(path) else {
      self.warnings.push(GenerationWarning::SkippedPath {
        path: path.to_string(),
        segments: path.split('/').filter(|segment| !segment.is_empty()).count(),
      });
      return;
    };

    let function_name = to_function_name(segment);
    if function_name.is_empty() {
      self.warnings.push(GenerationWarning::EmptyFunctionName {
        path: path.to_string(),
        segment: segment.to_string(),
      });
      return;
    }

    for (method, operation) in &item.operations {
      let function = FunctionSpec::from_operation(&function_name, method, path, operation);
      self.insert(module_name, function);
    }
  }

  /// Adds a function to its module, creating the module on first use.
  pub fn insert(&mut self, module_name: &str, function: FunctionSpec) -> bool {
    let module = self
      .modules
      .entry(module_name.to_string())
      .or_insert_with(|| Module::new(module_name));

    let inserted = module.insert(function);
    if !inserted {
      self.duplicates_collapsed += 1;
    }
    inserted
  }

  #[must_use]
  pub fn finish(mut self) -> GroupedModules {
    for module in self.modules.values() {
      let clashes = module
        .functions()
        .map(|function| function.name.as_str())
        .duplicates()
        .map(|name| GenerationWarning::DuplicateFunctionName {
          module: module.name().to_string(),
          name: name.to_string(),
        });
      self.warnings.extend(clashes);
    }

    GroupedModules {
      modules: self.modules.into_values().collect(),
      duplicates_collapsed: self.duplicates_collapsed,
      warnings: self.warnings,
    }
  }
}

/// Groups every path of a document.
#[must_use]
pub fn group_modules(paths: &IndexMap<String, PathItem>) -> GroupedModules {
  let mut grouper = ModuleGrouper::new();
  for (path, item) in paths {
    grouper.add_path(path, item);
  }
  grouper.finish()
}

/// The function name a path would produce, when it participates at all.
#[must_use]
pub fn function_name_for_path(path: &str) -> Option<(String, String)> {
  let (module_name, segment) = split_path(path)?;
  let function_name = to_function_name(segment);
  (!function_name.is_empty()).then(|| (module_name.to_string(), function_name))
}
