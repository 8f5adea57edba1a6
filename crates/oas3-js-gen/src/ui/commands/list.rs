use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::{
  generator::{document::Document, grouper::function_name_for_path},
  ui::{Colors, colors::IntoComfyColor, term_width},
  utils::spec::SpecLoader,
};

const SKIPPED_MARKER: &str = "(skipped)";

#[derive(Debug, Clone, PartialEq, Eq)]
struct OperationRow {
  function: String,
  module: String,
  method: String,
  path: String,
}

impl OperationRow {
  fn is_skipped(&self) -> bool {
    self.function == SKIPPED_MARKER
  }
}

/// One row per operation, in document order; paths outside `/<module>/<function>` are marked.
fn operation_rows(document: &Document) -> Vec<OperationRow> {
  document
    .operations()
    .map(|(path, method, _)| {
      let (module, function) = function_name_for_path(path)
        .unwrap_or_else(|| (String::from("-"), SKIPPED_MARKER.to_string()));
      OperationRow {
        function,
        module,
        method: method.as_str().to_string(),
        path: path.to_string(),
      }
    })
    .collect()
}

pub async fn list_operations(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let document = SpecLoader::open(input).await?.parse()?;

  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut row = Row::new();
  for header in ["FUNCTION", "MODULE", "METHOD", "PATH"] {
    row.add_cell(Cell::new(header).fg(IntoComfyColor::into(colors.label())));
  }
  table.set_header(row);

  for operation in operation_rows(&document) {
    let function_color = if operation.is_skipped() {
      colors.warning()
    } else {
      colors.value()
    };

    let mut row = Row::new();
    row.add_cell(
      Cell::new(&operation.function)
        .fg(IntoComfyColor::into(function_color))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(Cell::new(operation.module).fg(IntoComfyColor::into(colors.primary())));
    row.add_cell(
      Cell::new(operation.method)
        .fg(IntoComfyColor::into(colors.accent()))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(operation.path).fg(IntoComfyColor::into(colors.primary())));
    table.add_row(row);
  }

  println!("{table}");

  Ok(())
}
