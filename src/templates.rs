//! Template loading and rendering using Tera.
//!
//! User-facing text lives in external template files, with embedded fallbacks
//! so the binary works without a templates directory on disk.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tera::{Context, Tera};

/// Default templates directory relative to the crate root.
const TEMPLATES_DIR: &str = "templates";

/// Embedded default templates for fallback when files don't exist.
static EMBEDDED_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("progress/document.tera", include_str!("../templates/progress/document.tera"));
    m.insert(
        "messages/stop/fill_in_document.tera",
        include_str!("../templates/messages/stop/fill_in_document.tera"),
    );
    m.insert(
        "messages/stop/in_progress.tera",
        include_str!("../templates/messages/stop/in_progress.tera"),
    );
    m.insert(
        "messages/stop/completed_dirty.tera",
        include_str!("../templates/messages/stop/completed_dirty.tera"),
    );

    m
});

/// Global template engine with caching.
static TERA: Lazy<RwLock<Option<Tera>>> = Lazy::new(|| RwLock::new(None));

/// Initialize the template engine with templates from the specified directory.
///
/// If the directory doesn't exist, templates will be loaded from embedded
/// defaults.
///
/// # Errors
///
/// Returns an error if the templates directory exists but contains invalid
/// templates.
///
/// # Panics
///
/// Panics if an embedded template fails to add to the engine. This should
/// never happen as embedded templates are verified by
/// `test_all_embedded_templates_render`.
pub fn init_templates(templates_dir: Option<&Path>) -> Result<()> {
    let dir = templates_dir.map_or_else(
        || std::env::current_dir().unwrap_or_default().join(TEMPLATES_DIR),
        Path::to_path_buf,
    );

    let mut tera = Tera::default();

    if dir.exists() {
        let glob_pattern = format!("{}/**/*.tera", dir.display());
        match Tera::new(&glob_pattern) {
            Ok(t) => {
                tera = t;
            }
            Err(e) => {
                return Err(Error::Template(format!(
                    "Failed to load templates from {}: {e}",
                    dir.display()
                )));
            }
        }
    }

    // Add any missing templates from embedded defaults.
    for (name, content) in EMBEDDED_TEMPLATES.iter() {
        if tera.get_template(name).is_err() {
            tera.add_raw_template(name, content)
                .expect("embedded template should be valid - verified by tests");
        }
    }

    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = Some(tera);

    Ok(())
}

/// Render a template with the given context.
///
/// Templates are lazy-loaded from the filesystem on first use, with embedded
/// defaults as fallback.
///
/// # Errors
///
/// Returns an error if the template doesn't exist or rendering fails.
pub fn render(name: &str, context: &Context) -> Result<String> {
    let needs_init = TERA.read().map_err(|e| Error::Template(e.to_string()))?.is_none();

    if needs_init {
        init_templates(None)?;
    }

    let guard = TERA.read().map_err(|e| Error::Template(e.to_string()))?;
    let tera = guard.as_ref().ok_or_else(|| Error::Template("Templates not initialized".into()))?;
    let rendered = tera
        .render(name, context)
        .map_err(|e| Error::Template(format!("Failed to render template {name}: {e}")))?;
    drop(guard);

    Ok(rendered)
}

/// Reset the template cache, forcing re-initialization on next use.
///
/// # Errors
///
/// Returns an error if the write lock cannot be acquired.
pub fn reset_cache() -> Result<()> {
    *TERA.write().map_err(|e| Error::Template(e.to_string()))? = None;
    Ok(())
}

/// Get the list of all embedded template names.
#[must_use]
pub fn embedded_template_names() -> Vec<&'static str> {
    EMBEDDED_TEMPLATES.keys().copied().collect()
}

/// Verify all embedded templates render with sample data.
///
/// # Errors
///
/// Returns an error if any template fails to render.
pub fn verify_all_templates() -> Result<()> {
    reset_cache()?;
    init_templates(Some(Path::new("/nonexistent")))?;

    for name in embedded_template_names() {
        let ctx = sample_context();
        render(name, &ctx)
            .map_err(|e| Error::Template(format!("Template {name} failed to render: {e}")))?;
    }

    Ok(())
}

/// Create a sample context with every variable a template might need.
fn sample_context() -> Context {
    let mut ctx = Context::new();
    ctx.insert("files_list", "  - [untracked] a.txt");
    ctx.insert("branch", "feature/sample");
    ctx.insert("recent_commits", "abc123 initial commit");
    ctx.insert("timestamp", "2026-01-01 00:00:00");
    ctx.insert("status_path", ".tmux-worktree/progress.md");
    ctx.insert("created", &true);
    ctx.insert("document", "# Task Progress\n\n## Status\n...");
    ctx.insert("objective", &Some("Sample objective".to_string()));
    ctx
}
