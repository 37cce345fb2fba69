//! Status Document parsing.
//!
//! The status document (`.tmux-worktree/progress.md`) is semi-structured
//! markdown. Only two sections matter to the stop gate: `## Status`, which
//! yields a [`Status`] value, and `## Objective` (or `## Overview`), whose
//! opening text is excerpted into block messages.
//!
//! Status extraction strips HTML comment ranges first so the keyword legend
//! inside the template cannot be mistaken for a chosen status, then prefers a
//! bold-emphasized keyword over a bare one. Within a tier, the first keyword
//! by scan position wins.

use once_cell::sync::Lazy;
use regex::Regex;

/// Default status document path, relative to the worktree root.
pub const STATUS_FILE_PATH: &str = ".tmux-worktree/progress.md";

/// Maximum number of characters retained from the objective section.
pub const OBJECTIVE_EXCERPT_CHARS: usize = 400;

static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?(-->|\z)").expect("comment regex is valid"));

static EMPHASIZED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*\s*(In Progress|Completed|Blocked|Abandoned|Waiting for User)\s*\*\*")
        .expect("emphasized status regex is valid")
});

static BARE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"In Progress|Completed|Blocked|Abandoned|Waiting for User")
        .expect("bare status regex is valid")
});

/// Task status declared in the status document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Work is ongoing; stopping is blocked.
    InProgress,
    /// Work is finished; stopping requires a clean working tree.
    Completed,
    /// Blocked on something external; stopping is allowed.
    Blocked,
    /// Task intentionally ended; stopping is allowed.
    Abandoned,
    /// Deliberately paused for user input; stopping is allowed.
    WaitingForUser,
    /// File, section, or keyword absent.
    Unknown,
}

impl Status {
    /// The keyword literal as written in the document.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Blocked => "Blocked",
            Self::Abandoned => "Abandoned",
            Self::WaitingForUser => "Waiting for User",
            Self::Unknown => "Unknown",
        }
    }

    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "In Progress" => Self::InProgress,
            "Completed" => Self::Completed,
            "Blocked" => Self::Blocked,
            "Abandoned" => Self::Abandoned,
            "Waiting for User" => Self::WaitingForUser,
            _ => Self::Unknown,
        }
    }
}

/// Remove HTML comment ranges, including an unterminated trailing one.
#[must_use]
pub fn strip_comments(content: &str) -> String {
    COMMENT_RE.replace_all(content, "").into_owned()
}

/// Parse `## `-headed sections into ordered `(name, body)` pairs.
///
/// Text before the first heading is ignored. A section body runs to the next
/// `## ` heading or end of input. Deeper headings (`###`) stay in the body.
#[must_use]
pub fn parse_sections(content: &str) -> Vec<(String, String)> {
    let mut sections: Vec<(String, String)> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("## ") {
            if let Some((name, body)) = current.take() {
                sections.push((name, body.join("\n")));
            }
            current = Some((rest.trim().to_string(), Vec::new()));
        } else if let Some((_, ref mut body)) = current {
            body.push(line);
        }
    }
    if let Some((name, body)) = current {
        sections.push((name, body.join("\n")));
    }

    sections
}

/// Find the body of the first section with the given name.
#[must_use]
pub fn section<'a>(sections: &'a [(String, String)], name: &str) -> Option<&'a str> {
    sections.iter().find(|(n, _)| n == name).map(|(_, body)| body.as_str())
}

/// Extract the declared [`Status`] from a status document.
///
/// Returns [`Status::Unknown`] when the `## Status` section is absent or
/// contains no recognized keyword.
#[must_use]
pub fn extract_status(content: &str) -> Status {
    let stripped = strip_comments(content);
    let sections = parse_sections(&stripped);
    let Some(body) = section(&sections, "Status") else {
        return Status::Unknown;
    };

    if let Some(caps) = EMPHASIZED_RE.captures(body) {
        return Status::from_keyword(caps.get(1).map_or("", |m| m.as_str()));
    }
    BARE_RE.find(body).map_or(Status::Unknown, |m| Status::from_keyword(m.as_str()))
}

/// Extract a bounded excerpt of the objective (or overview) section.
///
/// Returns `None` when neither section exists or the body is blank.
#[must_use]
pub fn objective_excerpt(content: &str) -> Option<String> {
    let stripped = strip_comments(content);
    let sections = parse_sections(&stripped);
    let body = section(&sections, "Objective").or_else(|| section(&sections, "Overview"))?;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.chars().count() <= OBJECTIVE_EXCERPT_CHARS {
        Some(trimmed.to_string())
    } else {
        let cut: String = trimmed.chars().take(OBJECTIVE_EXCERPT_CHARS).collect();
        Some(format!("{}...", cut.trim_end()))
    }
}
