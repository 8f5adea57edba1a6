const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Parses a schema `$ref` path and extracts the referenced schema name.
///
/// Only internal references of the form `#/components/schemas/<name>` resolve;
/// external documents and other component kinds return `None`. JSON Pointer
/// escapes (`~1` for `/`, `~0` for `~`) are decoded.
pub fn parse_schema_ref_path(ref_path: &str) -> Option<String> {
  let name = ref_path.strip_prefix(SCHEMA_REF_PREFIX)?;
  if name.is_empty() || name.contains('/') {
    return None;
  }

  Some(name.replace("~1", "/").replace("~0", "~"))
}
