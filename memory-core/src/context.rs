//! Context Detector (spec §4.9).
//!
//! Resolves the effective context for a tool call that did not supply an
//! explicit `context` argument:
//!
//! 1. explicit argument (handled by the caller, not this module)
//! 2. configured default context
//! 3. if context-from-CWD is disabled, no context applies
//! 4. the current git origin's repository name
//! 5. the basename of the working directory
//!
//! The detector is pure with respect to its config input and the
//! file-system view at call time (spec §4.9 final line) — it never mutates
//! anything and never talks to the backend.

use std::path::Path;

use crate::config::Config;

/// Resolves the effective context for a call.
#[derive(Debug, Clone)]
pub struct ContextDetector {
    default_context: Option<String>,
    context_from_cwd: bool,
}

impl ContextDetector {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            default_context: config.default_context.clone(),
            context_from_cwd: config.context_from_cwd,
        }
    }

    /// Resolves the context for a call, given an optional explicit value
    /// supplied by the caller (spec §4.9 step 1).
    #[must_use]
    pub fn resolve(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(ctx) = explicit {
            if !ctx.is_empty() {
                return Some(ctx.to_string());
            }
        }

        if let Some(default) = &self.default_context {
            return Some(default.clone());
        }

        if !self.context_from_cwd {
            return None;
        }

        git_origin_repo_name()
            .or_else(cwd_basename)
    }
}

/// Reads `.git/config` under the current working directory (walking up to
/// find it) and extracts the repository name from the `origin` remote URL,
/// handling both SSH (`git@host:owner/repo.git`) and HTTPS
/// (`https://host/owner/repo.git`) forms.
fn git_origin_repo_name() -> Option<String> {
    let cwd = std::env::current_dir().ok()?;
    let git_config_path = find_git_config(&cwd)?;
    let contents = std::fs::read_to_string(git_config_path).ok()?;
    let url = extract_origin_url(&contents)?;
    repo_name_from_url(&url)
}

fn find_git_config(start: &Path) -> Option<std::path::PathBuf> {
    let mut dir = Some(start);
    while let Some(d) = dir {
        let candidate = d.join(".git").join("config");
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = d.parent();
    }
    None
}

fn extract_origin_url(git_config_contents: &str) -> Option<String> {
    let mut in_origin_section = false;
    for line in git_config_contents.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_origin_section = trimmed == "[remote \"origin\"]";
            continue;
        }
        if in_origin_section {
            if let Some(rest) = trimmed.strip_prefix("url") {
                if let Some((_, value)) = rest.trim_start().split_once('=') {
                    return Some(value.trim().to_string());
                }
            }
        }
    }
    None
}

fn repo_name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/').trim_end_matches(".git");
    let last_segment = trimmed.rsplit(['/', ':']).next()?;
    if last_segment.is_empty() {
        None
    } else {
        Some(last_segment.to_string())
    }
}

fn cwd_basename() -> Option<String> {
    std::env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(default_context: Option<&str>, from_cwd: bool) -> ContextDetector {
        ContextDetector {
            default_context: default_context.map(str::to_string),
            context_from_cwd: from_cwd,
        }
    }

    #[test]
    fn explicit_context_wins_over_everything() {
        let d = detector(Some("configured"), true);
        assert_eq!(d.resolve(Some("explicit")), Some("explicit".to_string()));
    }

    #[test]
    fn configured_default_wins_over_cwd_detection() {
        let d = detector(Some("configured"), true);
        assert_eq!(d.resolve(None), Some("configured".to_string()));
    }

    #[test]
    fn disabled_cwd_detection_yields_no_context() {
        let d = detector(None, false);
        assert_eq!(d.resolve(None), None);
    }

    #[test]
    fn empty_explicit_context_falls_through() {
        let d = detector(Some("configured"), true);
        assert_eq!(d.resolve(Some("")), Some("configured".to_string()));
    }

    #[test]
    fn extracts_repo_name_from_ssh_url() {
        let cfg = "[remote \"origin\"]\n\turl = git@github.com:acme/widgets.git\n\tfetch = +refs/heads/*:refs/remotes/origin/*\n";
        let url = extract_origin_url(cfg).unwrap();
        assert_eq!(repo_name_from_url(&url), Some("widgets".to_string()));
    }

    #[test]
    fn extracts_repo_name_from_https_url() {
        let cfg = "[core]\n\tbare = false\n[remote \"origin\"]\n\turl = https://github.com/acme/widgets.git\n";
        let url = extract_origin_url(cfg).unwrap();
        assert_eq!(repo_name_from_url(&url), Some("widgets".to_string()));
    }

    #[test]
    fn ignores_non_origin_remotes() {
        let cfg = "[remote \"upstream\"]\n\turl = git@github.com:other/widgets.git\n";
        assert_eq!(extract_origin_url(cfg), None);
    }
}
