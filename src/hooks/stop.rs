//! Stop gate: decides whether a session may terminate inside a linked
//! worktree.
//!
//! The gate allows immediately unless the working directory is a task-scoped
//! linked worktree. For those, the status document governs: a missing document
//! is synthesized from a template and the stop is blocked until the agent
//! fills it in; `In Progress` blocks; `Completed` requires a clean tree;
//! `Waiting for User`, `Blocked`, and `Abandoned` are legitimate stop points.

use crate::config::GuardConfig;
use crate::error::Result;
use crate::git::{self, RepoKind, WorktreeSnapshot};
use crate::hooks::HookInput;
use crate::progress::{self, Status};
use crate::templates;
use crate::traits::CommandRunner;
use std::path::PathBuf;
use tera::Context;

/// Path segment identifying task-scoped worktrees.
///
/// The scoping guard ensures the gate only ever acts on per-task checkouts
/// under `.worktrees/`, never on the user's primary checkout.
pub const WORKTREES_SEGMENT: &str = "/.worktrees/";

/// Environment variable naming the project directory.
const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";

/// Everything the decision procedure reads from the environment, gathered up
/// front so the procedure itself is a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    /// Current working directory (the candidate worktree root).
    pub cwd: PathBuf,
    /// Project directory marker from the environment, if set.
    pub project_dir: Option<String>,
}

impl InvocationContext {
    /// Create a context from explicit values.
    #[must_use]
    pub const fn new(cwd: PathBuf, project_dir: Option<String>) -> Self {
        Self { cwd, project_dir }
    }

    /// Build the context from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            project_dir: std::env::var(PROJECT_DIR_ENV).ok(),
        }
    }

    /// Whether the project directory marker names a task-scoped worktree.
    #[must_use]
    pub fn is_task_worktree(&self) -> bool {
        self.project_dir.as_deref().is_some_and(|p| p.contains(WORKTREES_SEGMENT))
    }
}

/// Outcome of the stop gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// The session may stop; nothing is emitted.
    Allow,
    /// The stop is refused; the instructional body is relayed to the agent.
    Block(String),
}

/// Run the stop gate decision procedure.
///
/// The hook input carries no fields the decision depends on; it is accepted
/// for interface symmetry and future diagnostics.
///
/// # Errors
///
/// Returns an error if the status document cannot be read or written, or a
/// message template fails to render. Callers map any error to
/// [`StopOutcome::Allow`] (fail open).
pub fn run_stop_gate(
    ctx: &InvocationContext,
    _input: &HookInput,
    config: &GuardConfig,
    runner: &dyn CommandRunner,
) -> Result<StopOutcome> {
    // Scoping guard: only task worktrees are ever gated.
    if !ctx.is_task_worktree() {
        return Ok(StopOutcome::Allow);
    }

    match git::classify_repo(&ctx.cwd) {
        RepoKind::LinkedWorktree => {}
        RepoKind::NotARepo | RepoKind::MainRepo | RepoKind::Unrecognized => {
            return Ok(StopOutcome::Allow);
        }
    }

    let status_path = config.status_file_path(&ctx.cwd);
    let display_path =
        config.status_file.clone().unwrap_or_else(|| progress::STATUS_FILE_PATH.to_string());

    if !status_path.exists() {
        let snapshot = WorktreeSnapshot::collect(runner);
        let document = render_document(&snapshot)?;

        if let Some(parent) = status_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&status_path, &document)?;

        return Ok(StopOutcome::Block(render_fill_in(&display_path, &document, true)?));
    }

    let content = std::fs::read_to_string(&status_path)?;
    match progress::extract_status(&content) {
        Status::Blocked | Status::Abandoned | Status::WaitingForUser => Ok(StopOutcome::Allow),
        Status::Completed => {
            if git::is_clean(runner) {
                Ok(StopOutcome::Allow)
            } else {
                let mut tctx = Context::new();
                tctx.insert("status_path", &display_path);
                let reason = templates::render("messages/stop/completed_dirty.tera", &tctx)?;
                Ok(StopOutcome::Block(reason))
            }
        }
        Status::InProgress => {
            let snapshot = WorktreeSnapshot::collect(runner);
            let document = render_document(&snapshot)?;

            let mut tctx = Context::new();
            tctx.insert("status_path", &display_path);
            tctx.insert("objective", &progress::objective_excerpt(&content));
            tctx.insert("branch", &branch_or_unknown(&snapshot));
            tctx.insert("files_list", &snapshot.files_list());
            tctx.insert("document", &document);
            let reason = templates::render("messages/stop/in_progress.tera", &tctx)?;
            Ok(StopOutcome::Block(reason))
        }
        Status::Unknown => {
            // Document present but unreadable: re-prompt with the template
            // without touching what the agent may already have written.
            let snapshot = WorktreeSnapshot::collect(runner);
            let document = render_document(&snapshot)?;
            Ok(StopOutcome::Block(render_fill_in(&display_path, &document, false)?))
        }
    }
}

fn branch_or_unknown(snapshot: &WorktreeSnapshot) -> String {
    if snapshot.branch.is_empty() {
        "unknown".to_string()
    } else {
        snapshot.branch.clone()
    }
}

/// Render the status document template from a live snapshot.
fn render_document(snapshot: &WorktreeSnapshot) -> Result<String> {
    let mut tctx = Context::new();
    tctx.insert("files_list", &snapshot.files_list());
    tctx.insert("branch", &branch_or_unknown(snapshot));
    tctx.insert(
        "recent_commits",
        if snapshot.recent_commits.is_empty() { "(none)" } else { &snapshot.recent_commits },
    );
    tctx.insert("timestamp", &chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
    templates::render("progress/document.tera", &tctx)
}

fn render_fill_in(display_path: &str, document: &str, created: bool) -> Result<String> {
    let mut tctx = Context::new();
    tctx.insert("status_path", display_path);
    tctx.insert("document", document);
    tctx.insert("created", &created);
    templates::render("messages/stop/fill_in_document.tera", &tctx)
}
