//! Session stop gate for git-worktree task isolation.
//!
//! Installed as a `Stop` hook, the binary decides whether an agent session
//! running inside a task-scoped linked worktree (a checkout under
//! `.worktrees/`) may terminate. Sessions outside that scope always may. For
//! in-scope sessions the `.tmux-worktree/progress.md` status document governs:
//! the gate synthesizes it when missing, refuses to stop while work is marked
//! in progress or uncommitted, and steps aside once the document records a
//! legitimate stopping point.
//!
//! The gate fails open: any internal error produces a single stderr
//! diagnostic and allows the stop, because a broken hook must never trap a
//! session.

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod git;
pub mod hook_logging;
pub mod hooks;
pub mod progress;
pub mod templates;
pub mod testing;
pub mod traits;

/// Version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
