//! # verchain-build
//!
//! Build-script helper that bundles generated schema code for `verchain`.
//!
//! The schema compiler itself is pluggable: you hand in a *processor* that
//! turns one schema file into Rust source. `verchain-build` walks the schema
//! directory, runs the processor on every file, and writes:
//!
//! ```text
//! $OUT_DIR/
//!   v1_generated.rs        processor output for schemas/v1.bare
//!   v2_generated.rs        processor output for schemas/v2.bare
//!   combined_imports.rs    `pub mod v1 { include!(...) }` for each file
//! ```
//!
//! so the crate can pull every version in with one line:
//!
//! ```ignore
//! pub mod schemas {
//!     include!(concat!(env!("OUT_DIR"), "/combined_imports.rs"));
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! // build.rs
//! use std::path::Path;
//!
//! fn main() -> Result<(), verchain_build::BuildError> {
//!     verchain_build::process_schemas(Path::new("schemas"), |path| {
//!         my_schema_compiler::compile(path)
//!     })?;
//!     Ok(())
//! }
//! # mod my_schema_compiler {
//! #     pub fn compile(_: &std::path::Path) -> Result<String, std::io::Error> {
//! #         Ok(String::new())
//! #     }
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

/// Name of the file declaring one module per schema.
pub const COMBINED_IMPORTS: &str = "combined_imports.rs";

/// Banner written at the top of every generated file by default.
pub const DEFAULT_HEADER: &str = "// Auto-generated by verchain-build. Do not edit.\n";

/// Boxed error returned by schema processors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for the bundling process.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Reading the schema directory or writing output failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// `OUT_DIR` is not set (not running inside a build script).
    #[error("OUT_DIR is not set: {0}")]
    MissingOutDir(#[from] std::env::VarError),
    /// A schema path has no file name component (e.g. ends in `..`).
    #[error("schema path {} has no file name", .0.display())]
    NoFileName(PathBuf),
    /// A schema file has no extension to strip.
    #[error("schema file {} has no extension", .0.display())]
    NoExtension(PathBuf),
    /// A schema file name is not valid UTF-8.
    #[error("schema file name {} is not valid UTF-8", .0.display())]
    NonUtf8Name(PathBuf),
    /// A schema file stem cannot be used as a Rust module name.
    #[error("schema file {} gives invalid module name `{name}`", path.display())]
    InvalidModuleName { path: PathBuf, name: String },
    /// Two schema files map to the same module.
    #[error("schema module `{0}` is defined twice")]
    DuplicateModule(String),
    /// The processor failed on a schema file.
    #[error("processing {} failed: {source}", path.display())]
    Processor {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

/// Bundling options.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Banner prepended to every generated file. `None` writes no banner.
    pub header: Option<String>,
    /// Only files with this extension (without the dot) are processed.
    /// `None` processes every regular file.
    pub extension: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            header: Some(DEFAULT_HEADER.to_string()),
            extension: None,
        }
    }
}

impl BuildConfig {
    /// Only pick up files ending in `.{extension}`.
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: Some(extension.into()),
            ..Self::default()
        }
    }
}

/// A single generated file ready to be written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    /// Path relative to the output directory (e.g. `"v1_generated.rs"`).
    pub relative_path: String,
    /// Full file content including the banner.
    pub content: String,
}

/// Everything the bundler would write, in write order.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedOutput {
    /// Module names, one per schema file, sorted.
    pub modules: Vec<String>,
    /// Generated files, the combined imports file last.
    pub files: Vec<GeneratedFile>,
}

impl GeneratedOutput {
    /// Write every file under `out_dir`, creating it if needed.
    pub fn write_to(&self, out_dir: &Path) -> Result<(), BuildError> {
        fs::create_dir_all(out_dir).map_err(|source| BuildError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;

        for file in &self.files {
            let path = out_dir.join(&file.relative_path);
            fs::write(&path, &file.content).map_err(|source| BuildError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "wrote generated schema file");
        }
        Ok(())
    }
}

/// Run `processor` on every schema file in `schema_dir` and collect the
/// output without touching disk.
pub fn plan_schemas<P, E>(
    schema_dir: &Path,
    config: &BuildConfig,
    mut processor: P,
) -> Result<GeneratedOutput, BuildError>
where
    P: FnMut(&Path) -> Result<String, E>,
    E: Into<BoxError>,
{
    let mut schemas = Vec::new();
    for path in schema_files(schema_dir)? {
        if let Some(wanted) = &config.extension {
            if path.extension().and_then(|e| e.to_str()) != Some(wanted.as_str()) {
                tracing::trace!(path = %path.display(), "skipping file with other extension");
                continue;
            }
        }
        let name = module_name(&path)?;
        schemas.push((name, path));
    }
    schemas.sort();

    let header = config.header.as_deref().unwrap_or("");
    let mut modules: Vec<String> = Vec::with_capacity(schemas.len());
    let mut files = Vec::with_capacity(schemas.len() + 1);

    for (name, path) in schemas {
        if modules.contains(&name) {
            return Err(BuildError::DuplicateModule(name));
        }

        tracing::debug!(schema = %path.display(), module = %name, "processing schema");
        let code = processor(&path).map_err(|e| BuildError::Processor {
            path: path.clone(),
            source: e.into(),
        })?;

        files.push(GeneratedFile {
            relative_path: format!("{name}_generated.rs"),
            content: format!("{header}{code}"),
        });
        modules.push(name);
    }

    files.push(GeneratedFile {
        relative_path: COMBINED_IMPORTS.to_string(),
        content: combined_imports(header, &modules),
    });

    Ok(GeneratedOutput { modules, files })
}

/// Bundle `schema_dir` into `$OUT_DIR` with the default configuration.
///
/// Meant to be called from `build.rs`; emits `cargo:rerun-if-changed`.
pub fn process_schemas<P, E>(schema_dir: &Path, processor: P) -> Result<GeneratedOutput, BuildError>
where
    P: FnMut(&Path) -> Result<String, E>,
    E: Into<BoxError>,
{
    process_schemas_with_config(schema_dir, &BuildConfig::default(), processor)
}

/// Bundle `schema_dir` into `$OUT_DIR` using `config`.
pub fn process_schemas_with_config<P, E>(
    schema_dir: &Path,
    config: &BuildConfig,
    processor: P,
) -> Result<GeneratedOutput, BuildError>
where
    P: FnMut(&Path) -> Result<String, E>,
    E: Into<BoxError>,
{
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    println!("cargo:rerun-if-changed={}", schema_dir.display());

    let output = plan_schemas(schema_dir, config, processor)?;
    output.write_to(&out_dir)?;
    Ok(output)
}

fn schema_files(schema_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let io_err = |source| BuildError::Io {
        path: schema_dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(schema_dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            continue;
        }
        paths.push(path);
    }
    Ok(paths)
}

fn module_name(path: &Path) -> Result<String, BuildError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| BuildError::NoFileName(path.to_path_buf()))?
        .to_str()
        .ok_or_else(|| BuildError::NonUtf8Name(path.to_path_buf()))?;

    let (stem, _ext) = file_name
        .rsplit_once('.')
        .ok_or_else(|| BuildError::NoExtension(path.to_path_buf()))?;

    if !is_identifier(stem) {
        return Err(BuildError::InvalidModuleName {
            path: path.to_path_buf(),
            name: stem.to_string(),
        });
    }
    Ok(stem.to_string())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name != "_" && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn combined_imports(header: &str, modules: &[String]) -> String {
    let mut out = String::from(header);
    out.push_str("// Auto-generated module file for schemas\n");
    for name in modules {
        let include = format!(r#"include!(concat!(env!("OUT_DIR"), "/{name}_generated.rs"));"#);
        out.push_str(&format!("\npub mod {name} {{\n    {include}\n}}\n"));
    }
    out
}
