use itertools::Itertools;

use crate::{
  generator::{
    grouper::{BodyHandling, FunctionSpec, Module},
    type_mapper::with_nullable_marker,
  },
  naming::identifiers::to_property_key,
};

const INDENT: &str = "  ";

/// Synthesizes the JavaScript wrapper of one [`FunctionSpec`].
///
/// Output order: JSDoc block, declaration, URL construction, `fetch` call, error check,
/// `204` short-circuit, body decoding.
pub struct FunctionEmitter<'a> {
  function: &'a FunctionSpec,
}

impl<'a> FunctionEmitter<'a> {
  #[must_use]
  pub const fn new(function: &'a FunctionSpec) -> Self {
    Self { function }
  }

  #[must_use]
  pub fn emit(&self) -> String {
    let locals = Locals::for_function(self.function);
    let sections = [
      self.doc_block(),
      vec![self.declaration()],
      self.url_statement(&locals),
      vec![String::new()],
      self.fetch_statement(&locals),
      vec![String::new()],
      self.error_check(&locals),
      self.no_content_check(&locals),
      vec![String::new()],
      self.body_handling(&locals),
      vec!["}".to_string()],
    ];

    let mut source = sections.into_iter().flatten().join("\n");
    source.push('\n');
    source
  }

  fn doc_block(&self) -> Vec<String> {
    let function = self.function;
    let mut lines = vec!["/**".to_string()];

    if let Some(description) = function.description.as_deref().filter(|text| !text.trim().is_empty()) {
      lines.extend(description.lines().map(|line| doc_line(line.trim_end())));
    }

    for parameter in &function.parameters {
      lines.push(doc_line(&format!(
        "@param {{{}}} {}{}",
        parameter.type_expr,
        parameter.ident,
        doc_suffix(parameter.description.as_deref())
      )));
    }

    if let Some(body) = &function.body {
      let name = if body.required { "body" } else { "[body]" };
      lines.push(doc_line(&format!(
        "@param {{{}}} {name}{}",
        body.type_expr,
        doc_suffix(body.description.as_deref())
      )));
    }

    lines.push(doc_line(&self.returns_tag()));
    lines.push(" */".to_string());
    lines
  }

  fn returns_tag(&self) -> String {
    let response = &self.function.response;
    match &response.doc_type {
      Some(doc_type) => format!(
        "@returns {{Promise<{}>}}{}",
        with_nullable_marker(doc_type.clone(), response.nullable),
        doc_suffix(response.description.as_deref())
      ),
      None => "@returns {Promise<null>}".to_string(),
    }
  }

  fn declaration(&self) -> String {
    format!(
      "export async function {}({}) {{",
      self.function.name,
      self.function.signature().join(", ")
    )
  }

  fn url_statement(&self, locals: &Locals) -> Vec<String> {
    let mut template = escape_template_text(&self.function.path);
    if !template.starts_with('/') {
      template.insert(0, '/');
    }

    for parameter in self.function.path_parameters() {
      template = template.replace(
        &format!("{{{}}}", escape_template_text(&parameter.name)),
        &format!("${{encodeURIComponent({})}}", parameter.ident),
      );
    }

    let query = self
      .function
      .query_parameters()
      .map(|parameter| format!("{}: `${{{}}}`", to_property_key(&parameter.name), parameter.ident))
      .join(", ");

    let Locals { url, qs, .. } = locals;
    if query.is_empty() {
      vec![format!("{INDENT}const {url} = `${{BASE_URL}}{template}`;")]
    } else {
      vec![
        format!("{INDENT}const {qs} = new URLSearchParams({{{query}}});"),
        format!("{INDENT}const {url} = `${{BASE_URL}}{template}?${{{qs}}}`;"),
      ]
    }
  }

  fn fetch_statement(&self, locals: &Locals) -> Vec<String> {
    let method = self.function.method.as_str();
    let Locals { url, response, .. } = locals;
    let mut lines = vec![format!("{INDENT}const {response} = await fetch({url}, {{")];

    if self.function.body.is_some() {
      lines.push(format!("{INDENT}{INDENT}method: '{method}',"));
      lines.push(format!("{INDENT}{INDENT}headers: {{ 'Content-Type': 'application/json' }},"));
      lines.push(format!("{INDENT}{INDENT}body: JSON.stringify(body)"));
    } else {
      lines.push(format!("{INDENT}{INDENT}method: '{method}'"));
    }

    lines.push(format!("{INDENT}}});"));
    lines
  }

  fn error_check(&self, locals: &Locals) -> Vec<String> {
    let response = &locals.response;
    vec![
      format!("{INDENT}if (!{response}.ok) {{"),
      format!("{INDENT}{INDENT}const message = await extractErrorMessage({response});"),
      format!("{INDENT}{INDENT}throw new Error(message);"),
      format!("{INDENT}}}"),
    ]
  }

  fn no_content_check(&self, locals: &Locals) -> Vec<String> {
    if !self.function.response.no_content {
      return Vec::new();
    }

    vec![
      String::new(),
      format!("{INDENT}if ({}.status == 204) {{", locals.response),
      format!("{INDENT}{INDENT}return null;"),
      format!("{INDENT}}}"),
    ]
  }

  fn body_handling(&self, locals: &Locals) -> Vec<String> {
    let Locals { response, decoded, .. } = locals;
    let decode = |expression: &str, result: String| {
      vec![
        format!("{INDENT}const {decoded} = await {response}.{expression}();"),
        format!("{INDENT}return {result};"),
      ]
    };

    match self.function.response.handling {
      BodyHandling::Text => decode("text", decoded.clone()),
      BodyHandling::Number => decode("text", format!("+{decoded}")),
      BodyHandling::Boolean => decode("text", format!("/^true$/i.test({decoded})")),
      BodyHandling::Json => decode("json", decoded.clone()),
      BodyHandling::Null => vec![format!("{INDENT}return null;")],
    }
  }
}

/// Function-scope `const` names; a `const` may not redeclare a parameter.
struct Locals {
  qs: String,
  url: String,
  response: String,
  /// The decoded response; `data` when `body` is the request payload parameter.
  decoded: String,
}

impl Locals {
  fn for_function(function: &FunctionSpec) -> Self {
    let taken: Vec<&str> = function.signature().collect();
    let free = |base: &str| {
      let mut name = base.to_string();
      while taken.contains(&name.as_str()) {
        name.push('_');
      }
      name
    };

    Self {
      qs: free("qs"),
      url: free("url"),
      response: free("response"),
      decoded: free(if function.body.is_some() { "data" } else { "body" }),
    }
  }
}

/// Escapes text for the literal part of a JavaScript template string.
fn escape_template_text(text: &str) -> String {
  text.replace('\\', "\\\\").replace('`', "\\`").replace("${", "\\${")
}

fn doc_line(text: &str) -> String {
  let text = text.replace("*/", "*\\/");
  if text.is_empty() { " *".to_string() } else { format!(" * {text}") }
}

fn doc_suffix(description: Option<&str>) -> String {
  match description.map(str::trim) {
    Some(text) if !text.is_empty() => format!(" - {}", text.lines().map(str::trim).join(" ")),
    _ => String::new(),
  }
}

#[must_use]
pub fn emit_function(function: &FunctionSpec) -> String {
  FunctionEmitter::new(function).emit()
}

/// Emits every function of a module, separated by blank lines.
#[must_use]
pub fn emit_module_functions(module: &Module) -> String {
  module.functions().map(emit_function).join("\n")
}

#[cfg(test)]
mod tests {
  use http::Method;
  use indexmap::IndexMap;

  use super::*;
  use crate::generator::{
    document::{Operation, Parameter, ParameterLocation, RequestBody, Response, SchemaKind, SchemaNode},
    grouper::FunctionSpec,
  };

  fn json_response(schema: SchemaNode) -> Response {
    Response {
      description: Some("OK".to_string()),
      content: Some([("application/json".to_string(), schema)].into_iter().collect()),
    }
  }

  fn empty_response() -> Response {
    Response {
      description: Some("No Content".to_string()),
      content: None,
    }
  }

  fn operation_returning(schema: SchemaNode) -> Operation {
    Operation {
      responses: [("200".to_string(), json_response(schema))].into_iter().collect(),
      ..Operation::default()
    }
  }

  #[test]
  fn test_emit_json_function() {
    let operation = Operation {
      description: Some("Returns today's forecast".to_string()),
      ..operation_returning(SchemaNode::reference("WeatherForecast"))
    };
    let function = FunctionSpec::from_operation("today", &Method::GET, "/weatherforecast/today", &operation);

    let expected = "/**
 * Returns today's forecast
 * @returns {Promise<import('./Models').WeatherForecast>}
 */
export async function today() {
  const url = `${BASE_URL}/weatherforecast/today`;

  const response = await fetch(url, {
    method: 'GET'
  });

  if (!response.ok) {
    const message = await extractErrorMessage(response);
    throw new Error(message);
  }

  const body = await response.json();
  return body;
}
";
    assert_eq!(emit_function(&function), expected);
  }

  #[test]
  fn test_emit_scalar_responses() {
    let cases = [
      (SchemaNode::primitive("string"), "return body;", "response.text()"),
      (SchemaNode::primitive("integer"), "return +body;", "response.text()"),
      (SchemaNode::primitive("number"), "return +body;", "response.text()"),
      (SchemaNode::primitive("boolean"), "return /^true$/i.test(body);", "response.text()"),
      (
        SchemaNode::array(SchemaNode::primitive("integer")),
        "return body;",
        "response.json()",
      ),
    ];

    for (schema, expected_return, expected_decode) in cases {
      let function = FunctionSpec::from_operation("value", &Method::GET, "/values/value", &operation_returning(schema));
      let code = emit_function(&function);
      assert!(code.contains(expected_return), "missing {expected_return:?} in:\n{code}");
      assert!(code.contains(expected_decode), "missing {expected_decode:?} in:\n{code}");
    }
  }

  #[test]
  fn test_emit_without_success_response_returns_null() {
    let operation = Operation {
      responses: [("202".to_string(), empty_response())].into_iter().collect(),
      ..Operation::default()
    };
    let function = FunctionSpec::from_operation("queue", &Method::POST, "/jobs/queue", &operation);
    let code = emit_function(&function);

    assert!(code.contains(" * @returns {Promise<null>}"));
    assert!(code.contains("  return null;\n}"));
    assert!(!code.contains("response.json()"));
  }

  #[test]
  fn test_emit_no_content_short_circuit() {
    let operation = Operation {
      responses: [
        ("200".to_string(), json_response(SchemaNode::reference("Pet"))),
        ("204".to_string(), empty_response()),
      ]
      .into_iter()
      .collect(),
      ..Operation::default()
    };
    let function = FunctionSpec::from_operation("current", &Method::GET, "/pets/current", &operation);
    let code = emit_function(&function);

    assert!(code.contains("@returns {Promise<import('./Models').Pet | null>}"));
    assert!(code.contains("  if (response.status == 204) {\n    return null;\n  }"));
    let short_circuit = code.find("response.status == 204").unwrap();
    let decode = code.find("response.json()").unwrap();
    assert!(short_circuit < decode);
  }

  #[test]
  fn test_emit_parameters_and_body() {
    let operation = Operation {
      description: None,
      parameters: vec![
        Parameter {
          name: "petId".to_string(),
          location: ParameterLocation::Path,
          schema: SchemaNode::primitive("integer"),
          description: Some("Pet identifier".to_string()),
        },
        Parameter {
          name: "dry-run".to_string(),
          location: ParameterLocation::Query,
          schema: SchemaNode::primitive("boolean").nullable(),
          description: None,
        },
        Parameter {
          name: "X-Trace".to_string(),
          location: ParameterLocation::Other,
          schema: SchemaNode::primitive("string"),
          description: None,
        },
      ],
      request_body: Some(RequestBody {
        required: true,
        description: Some("Updated pet".to_string()),
        content: [("application/json".to_string(), SchemaNode::reference("Pet"))]
          .into_iter()
          .collect(),
      }),
      responses: [("204".to_string(), empty_response())].into_iter().collect(),
    };
    let function = FunctionSpec::from_operation("update", &Method::PUT, "/pets/{petId}", &operation);
    let code = emit_function(&function);

    assert!(code.contains(" * @param {number} petId - Pet identifier\n"));
    assert!(code.contains(" * @param {boolean | null} dryRun\n"));
    assert!(code.contains(" * @param {import('./Models').Pet} body - Updated pet\n"));
    assert!(code.contains("export async function update(petId, dryRun, body) {"));
    assert!(code.contains("  const qs = new URLSearchParams({\"dry-run\": `${dryRun}`});"));
    assert!(code.contains("  const url = `${BASE_URL}/pets/${encodeURIComponent(petId)}?${qs}`;"));
    assert!(
      code.contains("    method: 'PUT',\n    headers: { 'Content-Type': 'application/json' },\n    body: JSON.stringify(body)\n")
    );
    assert!(!code.contains("X-Trace"));
  }

  #[test]
  fn test_optional_body_uses_optional_param_syntax() {
    let operation = Operation {
      request_body: Some(RequestBody {
        required: false,
        description: None,
        content: [("application/json; charset=utf-8".to_string(), SchemaNode::primitive("string"))]
          .into_iter()
          .collect(),
      }),
      ..Operation::default()
    };
    let function = FunctionSpec::from_operation("note", &Method::POST, "/notes/note", &operation);
    let code = emit_function(&function);

    assert!(code.contains(" * @param {string} [body]\n"));
    assert!(code.contains("export async function note(body) {"));
  }

  #[test]
  fn test_non_json_body_is_not_sent() {
    let operation = Operation {
      request_body: Some(RequestBody {
        required: true,
        description: None,
        content: [("multipart/form-data".to_string(), SchemaNode::new(SchemaKind::Object(IndexMap::new())))]
          .into_iter()
          .collect(),
      }),
      ..Operation::default()
    };
    let function = FunctionSpec::from_operation("upload", &Method::POST, "/files/upload", &operation);
    let code = emit_function(&function);

    assert!(code.contains("export async function upload() {"));
    assert!(!code.contains("JSON.stringify"));
  }

  #[test]
  fn test_doc_comment_is_not_terminated_by_description() {
    let operation = Operation {
      description: Some("Closes */ early\nSecond line".to_string()),
      ..Operation::default()
    };
    let function = FunctionSpec::from_operation("close", &Method::GET, "/docs/close", &operation);
    let code = emit_function(&function);

    assert!(code.contains(" * Closes *\\/ early\n * Second line\n"));
    assert_eq!(code.matches("*/").count(), 1);
  }

  #[test]
  fn test_path_is_inert_inside_template_literal() {
    let path_param = Parameter {
      name: "id".to_string(),
      location: ParameterLocation::Path,
      schema: SchemaNode::primitive("string"),
      description: None,
    };
    let operation = Operation {
      parameters: vec![path_param],
      ..Operation::default()
    };

    let function = FunctionSpec::from_operation("x", &Method::GET, "/a/${globalThis.x}", &Operation::default());
    assert!(emit_function(&function).contains("  const url = `${BASE_URL}/a/\\${globalThis.x}`;\n"));

    let function = FunctionSpec::from_operation("raw", &Method::GET, "/files\\raw`{id}", &operation);
    assert!(
      emit_function(&function).contains("  const url = `${BASE_URL}/files\\\\raw\\`${encodeURIComponent(id)}`;\n")
    );

    let function = FunctionSpec::from_operation("id", &Method::GET, "/items/${id}", &operation);
    assert!(
      emit_function(&function).contains("  const url = `${BASE_URL}/items/\\$${encodeURIComponent(id)}`;\n")
    );
  }

  #[test]
  fn test_duplicate_parameter_names_are_disambiguated() {
    let query = |name: &str| Parameter {
      name: name.to_string(),
      location: ParameterLocation::Query,
      schema: SchemaNode::primitive("string"),
      description: None,
    };
    let operation = Operation {
      parameters: vec![query("body"), query("page_size"), query("pageSize")],
      request_body: Some(RequestBody {
        required: true,
        description: None,
        content: [("application/json".to_string(), SchemaNode::reference("Filter"))]
          .into_iter()
          .collect(),
      }),
      ..Operation::default()
    };
    let function = FunctionSpec::from_operation("b", &Method::POST, "/items/b", &operation);
    let code = emit_function(&function);

    assert!(code.contains("export async function b(body_, pageSize, pageSize_, body) {"));
    assert!(code.contains(
      "  const qs = new URLSearchParams({body: `${body_}`, page_size: `${pageSize}`, pageSize: `${pageSize_}`});"
    ));
    assert!(code.contains(" * @param {string} body_\n * @param {string} pageSize\n * @param {string} pageSize_\n"));
    assert!(code.contains("    body: JSON.stringify(body)\n"));
  }

  #[test]
  fn test_locals_do_not_redeclare_parameters() {
    let query = |name: &str| Parameter {
      name: name.to_string(),
      location: ParameterLocation::Query,
      schema: SchemaNode::primitive("string"),
      description: None,
    };
    let operation = Operation {
      parameters: vec![query("url"), query("response")],
      request_body: Some(RequestBody {
        required: true,
        description: None,
        content: [("application/json".to_string(), SchemaNode::primitive("string"))]
          .into_iter()
          .collect(),
      }),
      ..operation_returning(SchemaNode::primitive("string"))
    };
    let function = FunctionSpec::from_operation("shorten", &Method::POST, "/links/shorten", &operation);
    let code = emit_function(&function);

    assert!(code.contains("export async function shorten(url, response, body) {"));
    assert!(code.contains("  const url_ = `${BASE_URL}/links/shorten?${qs}`;"));
    assert!(code.contains("  const response_ = await fetch(url_, {"));
    assert!(code.contains("  if (!response_.ok) {"));
    assert!(code.contains("  const data = await response_.text();\n  return data;"));
  }
}
