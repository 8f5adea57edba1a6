use std::{collections::HashSet, sync::LazyLock};

use any_ascii::any_ascii;

pub(crate) static FORBIDDEN_IDENTIFIERS: LazyLock<HashSet<&str>> = LazyLock::new(|| {
  [
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
  ]
  .into_iter()
  .collect()
});

/// Converts an arbitrary path segment into a lower-camel-case identifier.
///
/// # Rules:
/// 1. The input is transliterated to ASCII.
/// 2. Whitespace, underscores and punctuation separate words; apostrophes are dropped.
/// 3. Each word is split into humps at case transitions:
///    - a lowercase letter followed by an uppercase letter (`getAll` -> `get`, `All`),
///    - a letter following a digit (`a9bc` -> `a9`, `bc`),
///    - the last letter of an uppercase run of three or more that precedes a lowercase
///      letter (`ABCWord` -> `ABC`, `Word`). Shorter runs stay in one hump
///      (`ABcDEf` -> `ABc`, `DEf`).
/// 4. The first hump is lower-cased, every following hump is capitalized.
///
/// An empty or all-punctuation input yields an empty string.
pub(crate) fn to_js_identifier(input: &str) -> String {
  let ascii = any_ascii(input);
  let cleaned = ascii.replace('\'', "");

  let mut ident = String::with_capacity(cleaned.len());
  let humps = split_words(&cleaned).flat_map(split_humps);
  for (index, hump) in humps.enumerate() {
    if index == 0 {
      ident.push_str(&hump.to_ascii_lowercase());
    } else {
      push_capitalized(&mut ident, hump);
    }
  }
  ident
}

/// Converts a path segment into a name usable for an exported function.
///
/// Applies [`to_js_identifier`], prefixes identifiers starting with a digit with `_`
/// and suffixes reserved words with `_`. Returns an empty string when nothing of the
/// segment survives normalization.
pub(crate) fn to_function_name(segment: &str) -> String {
  let mut ident = to_js_identifier(segment);
  if ident.is_empty() {
    return ident;
  }

  if ident.starts_with(|c: char| c.is_ascii_digit()) {
    ident.insert(0, '_');
  }

  if FORBIDDEN_IDENTIFIERS.contains(ident.as_str()) {
    ident.push('_');
  }

  ident
}

/// Renders a property name for a TypeScript declaration, quoting it when it is not a
/// plain identifier.
pub(crate) fn to_property_key(name: &str) -> String {
  if is_plain_identifier(name) {
    name.to_string()
  } else {
    serde_json::Value::String(name.to_string()).to_string()
  }
}

fn is_plain_identifier(name: &str) -> bool {
  let mut chars = name.chars();
  chars
    .next()
    .is_some_and(|first| first.is_ascii_alphabetic() || first == '_' || first == '$')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn split_words(input: &str) -> impl Iterator<Item = &str> {
  input
    .split(|c: char| !c.is_ascii_alphanumeric())
    .filter(|word| !word.is_empty())
}

fn split_humps(word: &str) -> Vec<&str> {
  let bytes = word.as_bytes();
  let mut starts = vec![0];
  let mut upper_run = usize::from(bytes.first().is_some_and(u8::is_ascii_uppercase));

  for index in 1..bytes.len() {
    let prev = bytes[index - 1];
    let current = bytes[index];

    let boundary = if prev.is_ascii_digit() {
      current.is_ascii_alphabetic()
    } else if prev.is_ascii_lowercase() {
      current.is_ascii_uppercase()
    } else if prev.is_ascii_uppercase() && current.is_ascii_uppercase() {
      upper_run >= 2 && bytes.get(index + 1).is_some_and(u8::is_ascii_lowercase)
    } else {
      false
    };

    if boundary {
      starts.push(index);
    }

    upper_run = if current.is_ascii_uppercase() { upper_run + 1 } else { 0 };
  }

  let ends = starts.iter().skip(1).copied().chain(std::iter::once(bytes.len()));
  starts
    .iter()
    .copied()
    .zip(ends)
    .map(|(start, end)| &word[start..end])
    .collect()
}

fn push_capitalized(target: &mut String, hump: &str) {
  let mut chars = hump.chars();
  if let Some(first) = chars.next() {
    target.push(first.to_ascii_uppercase());
    target.extend(chars.map(|c| c.to_ascii_lowercase()));
  }
}

#[cfg(test)]
#[path = "tests/identifiers.rs"]
mod tests;
