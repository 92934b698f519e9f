use serde::{Deserialize, Serialize};
use std::env;
use std::process::{Command, Stdio};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::ReproducibilityError;

/// How, when and from which source revision an instance was produced.
///
/// The source-control entries are absent when `git` is unavailable or the working directory is not a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reproducibility {
    /// The program invocation, shell quoted.
    pub command_line: String,
    /// RFC 3339, in local time where the offset is known.
    pub time: String,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_root: Option<String>,
    /// The https URL of the repository at the current revision (`.../tree/<hash>`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_url: Option<String>,
    #[allow(missing_docs)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_has_uncommitted_changes: Option<bool>,
}

impl Reproducibility {
    /// Capture the record of the running process.
    pub fn current() -> Self {
        let command_line = env::args()
            .map(|arg| shell_quote(&arg))
            .collect::<Vec<String>>()
            .join(" ");
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        let git_url = git(&["remote", "get-url", "origin"])
            .zip(git(&["rev-parse", "HEAD"]))
            .map(|(remote, hash)| format!("{}/tree/{hash}", https_url(&remote)));

        Self {
            command_line,
            time: now.format(&Rfc3339).unwrap_or_default(),
            git_root: git(&["rev-parse", "--show-toplevel"]),
            git_url,
            git_has_uncommitted_changes: git(&["status", "--porcelain"])
                .map(|status| !status.is_empty()),
        }
    }

    /// Check that `saved` was produced from the same clean revision as `self`.
    pub fn enforce(&self, saved: Option<&Reproducibility>) -> Result<(), ReproducibilityError> {
        let saved = saved.ok_or(ReproducibilityError::MissingRecord)?;
        let saved_url = saved
            .git_url
            .as_ref()
            .ok_or(ReproducibilityError::MissingSavedUrl)?;
        let current_url = self
            .git_url
            .as_ref()
            .ok_or(ReproducibilityError::MissingCurrentUrl)?;

        if saved_url != current_url {
            return Err(ReproducibilityError::UrlMismatch {
                saved: saved_url.clone(),
                current: current_url.clone(),
            });
        }

        if saved.git_has_uncommitted_changes.unwrap_or(false) {
            return Err(ReproducibilityError::UncommittedChanges("saved"));
        }

        if self.git_has_uncommitted_changes.unwrap_or(false) {
            return Err(ReproducibilityError::UncommittedChanges("current"));
        }

        Ok(())
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

// `git@host:owner/repo.git` and `https://host/owner/repo.git` both become `https://host/owner/repo`.
fn https_url(remote: &str) -> String {
    let remote = remote.strip_suffix(".git").unwrap_or(remote);

    match remote
        .strip_prefix("git@")
        .and_then(|rest| rest.split_once(':'))
    {
        Some((domain, path)) => format!("https://{domain}/{path}"),
        None => remote.to_string(),
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));

    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(url: Option<&str>, dirty: bool) -> Reproducibility {
        Reproducibility {
            command_line: "program --a 1".to_string(),
            time: "2024-01-01T00:00:00Z".to_string(),
            git_root: Some("/repo".to_string()),
            git_url: url.map(str::to_string),
            git_has_uncommitted_changes: Some(dirty),
        }
    }

    #[rstest]
    #[case("git@github.com:owner/repo.git", "https://github.com/owner/repo")]
    #[case("https://github.com/owner/repo.git", "https://github.com/owner/repo")]
    #[case("https://github.com/owner/repo", "https://github.com/owner/repo")]
    fn https(#[case] remote: &str, #[case] expected: &str) {
        assert_eq!(https_url(remote), expected);
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("--a=1", "--a=1")]
    #[case("two words", "'two words'")]
    #[case("it's", r"'it'\''s'")]
    #[case("", "''")]
    fn quote(#[case] arg: &str, #[case] expected: &str) {
        assert_eq!(shell_quote(arg), expected);
    }

    #[test]
    fn enforce_matching() {
        let current = record(Some("https://host/repo/tree/abc"), false);
        assert_eq!(current.enforce(Some(&current.clone())), Ok(()));
    }

    #[rstest]
    #[case(None, record(Some("u"), false), ReproducibilityError::MissingRecord)]
    #[case(Some(record(None, false)), record(Some("u"), false), ReproducibilityError::MissingSavedUrl)]
    #[case(Some(record(Some("u"), false)), record(None, false), ReproducibilityError::MissingCurrentUrl)]
    #[case(
        Some(record(Some("u/tree/a"), false)),
        record(Some("u/tree/b"), false),
        ReproducibilityError::UrlMismatch { saved: "u/tree/a".to_string(), current: "u/tree/b".to_string() }
    )]
    #[case(Some(record(Some("u"), true)), record(Some("u"), false), ReproducibilityError::UncommittedChanges("saved"))]
    #[case(Some(record(Some("u"), false)), record(Some("u"), true), ReproducibilityError::UncommittedChanges("current"))]
    fn enforce_failures(
        #[case] saved: Option<Reproducibility>,
        #[case] current: Reproducibility,
        #[case] expected: ReproducibilityError,
    ) {
        assert_eq!(current.enforce(saved.as_ref()), Err(expected));
    }

    #[test]
    fn current_has_time() {
        let current = Reproducibility::current();

        assert!(!current.time.is_empty());
        assert!(!current.command_line.is_empty());
    }
}
