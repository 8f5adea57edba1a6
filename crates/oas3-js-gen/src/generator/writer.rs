use std::path::{Path, PathBuf};

use bon::Builder;
use futures::future::try_join_all;
use itertools::Itertools;
use thiserror::Error;

pub const DEFAULT_ERROR_HELPER: &str = "~/utils/extract-error-message";
pub const DEFAULT_PORT_ENV: &str = "DOTNET_PORT";
pub const DEFAULT_EXTENSION: &str = "js";
pub const DEFAULT_MODELS_FILE: &str = "Models.d.ts";

#[derive(Debug, Error)]
pub enum WriteError {
  #[error("failed to create output directory {}", path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("more than one generated file would be written to {file_name} (names compare case-insensitively)")]
  DuplicateFile { file_name: String },
  #[error("failed to write {}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Import and base URL declarations placed at the top of every module file.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct PreambleConfig {
  /// Module specifier of the default-exported `extractErrorMessage(response)` helper.
  #[builder(into, default = DEFAULT_ERROR_HELPER.to_string())]
  pub error_helper: String,
  /// Environment variable holding the local server port.
  #[builder(into, default = DEFAULT_PORT_ENV.to_string())]
  pub port_env: String,
  /// Literal base URL; replaces the port-derived one when set.
  #[builder(into)]
  pub base_url: Option<String>,
}

impl Default for PreambleConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}

impl PreambleConfig {
  #[must_use]
  pub fn render(&self) -> String {
    let import = format!(
      "import extractErrorMessage from {};\n\n",
      js_string_literal(&self.error_helper)
    );

    let base = match &self.base_url {
      Some(base_url) => format!(
        "const BASE_URL = {};\n",
        js_string_literal(base_url.trim_end_matches('/'))
      ),
      None => {
        let port = &self.port_env;
        format!(
          "const {port} = process.env[{}];\nconst BASE_URL = `http://localhost:${{{port}}}`;\n",
          js_string_literal(port)
        )
      }
    };

    import + &base
  }
}

/// Renders a single-quoted JavaScript string literal.
fn js_string_literal(value: &str) -> String {
  let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
  format!("'{escaped}'")
}

/// File naming of the generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct OutputLayout {
  /// Extension of module files, `<module>.server.<extension>`.
  #[builder(into, default = DEFAULT_EXTENSION.to_string())]
  pub extension: String,
  #[builder(into, default = DEFAULT_MODELS_FILE.to_string())]
  pub models_file: String,
}

impl Default for OutputLayout {
  fn default() -> Self {
    Self::builder().build()
  }
}

impl OutputLayout {
  #[must_use]
  pub fn module_file_name(&self, module: &str) -> String {
    format!("{module}.server.{}", self.extension.trim_start_matches('.'))
  }
}

/// One output file, content already line-ending normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
  pub file_name: String,
  pub content: String,
}

impl GeneratedFile {
  pub fn new(file_name: impl Into<String>, content: &str) -> Self {
    Self {
      file_name: file_name.into(),
      content: normalize_line_endings(content),
    }
  }
}

/// Rewrites `\r\n` and lone `\r` to `\n`, independent of the host platform.
#[must_use]
pub fn normalize_line_endings(content: &str) -> String {
  content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Writes every file into `output_dir`, creating the directory first.
///
/// Files are written concurrently; each file is written by exactly one task. Names
/// that collide, ignoring case, are rejected before anything touches the disk.
pub async fn write_files(output_dir: &Path, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, WriteError> {
  if let Some(duplicate) = files
    .iter()
    .duplicates_by(|file| file.file_name.to_lowercase())
    .next()
  {
    return Err(WriteError::DuplicateFile {
      file_name: duplicate.file_name.clone(),
    });
  }

  tokio::fs::create_dir_all(output_dir)
    .await
    .map_err(|source| WriteError::CreateDir {
      path: output_dir.to_path_buf(),
      source,
    })?;

  let writes = files.iter().map(|file| async move {
    let path = output_dir.join(&file.file_name);
    tokio::fs::write(&path, normalize_line_endings(&file.content).as_bytes())
      .await
      .map_err(|source| WriteError::Write {
        path: path.clone(),
        source,
      })?;
    Ok::<_, WriteError>(path)
  });

  try_join_all(writes).await
}
