//! Tera rendering engine for VCL snippet content.
//!
//! # Template sets
//!
//! | Directory     | Types                                       |
//! |---------------|---------------------------------------------|
//! | `default`     | `recv`, `fetch`, `deliver`, `hash`, `error` |
//! | `maintenance` | `deliver`                                   |
//!
//! A template is addressed by `(directory, type)` and stored under the name
//! `<directory>/<type>.vcl.tera`. Files with the same relative name in the
//! user template directory replace the embedded ones; new names add sets.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use edgesync_core::types::Config;

use crate::context::VclContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("default/recv.vcl.tera", include_str!("templates/default/recv.vcl.tera")),
    ("default/fetch.vcl.tera", include_str!("templates/default/fetch.vcl.tera")),
    ("default/deliver.vcl.tera", include_str!("templates/default/deliver.vcl.tera")),
    ("default/hash.vcl.tera", include_str!("templates/default/hash.vcl.tera")),
    ("default/error.vcl.tera", include_str!("templates/default/error.vcl.tera")),
    (
        "maintenance/deliver.vcl.tera",
        include_str!("templates/maintenance/deliver.vcl.tera"),
    ),
];

const TEMPLATE_SUFFIX: &str = ".vcl.tera";

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

/// Registered name of the template for `(directory, kind)`.
pub fn template_name(directory: &str, kind: &str) -> String {
    normalize_template_name(Path::new(&format!("{directory}/{kind}{TEMPLATE_SUFFIX}")))
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        if !name.ends_with(TEMPLATE_SUFFIX) {
            continue;
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(
            normalize_template_name(Path::new(name)),
            (*content).to_string(),
        );
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Resolves and renders VCL snippet content by `(directory, type)`.
///
/// Built once per run; the rendering context is fixed at construction.
pub struct TemplateEngine {
    tera: Tera,
    context: tera::Context,
}

impl TemplateEngine {
    /// Construct an engine with embedded templates plus any overrides found in
    /// `user_template_dir`.
    pub fn new(user_template_dir: Option<&Path>, ctx: &VclContext) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine {
            tera,
            context: ctx.to_tera_context()?,
        })
    }

    /// Engine for a loaded config (its `template_dir` and naming).
    pub fn from_config(config: &Config) -> Result<Self, RenderError> {
        Self::new(config.template_dir.as_deref(), &VclContext::from_config(config))
    }

    pub fn has_template(&self, directory: &str, kind: &str) -> bool {
        let name = template_name(directory, kind);
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render the template for `(directory, kind)`.
    ///
    /// Returns [`RenderError::TemplateNotFound`] when no such template exists.
    /// Output line endings are normalised to LF.
    pub fn read_template(&self, directory: &str, kind: &str) -> Result<String, RenderError> {
        if !self.has_template(directory, kind) {
            return Err(RenderError::TemplateNotFound {
                directory: directory.to_string(),
                kind: kind.to_string(),
            });
        }
        let rendered = self.tera.render(&template_name(directory, kind), &self.context)?;
        Ok(rendered.replace("\r\n", "\n"))
    }

    /// All registered `(directory, type)` pairs, sorted.
    pub fn available(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .tera
            .get_template_names()
            .filter_map(|name| {
                let stem = name.strip_suffix(TEMPLATE_SUFFIX)?;
                let (dir, kind) = stem.rsplit_once('/')?;
                Some((dir.to_string(), kind.to_string()))
            })
            .collect();
        pairs.sort();
        pairs
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
