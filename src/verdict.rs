//! Verdict types — per-file and per-package classification
//!
//! A file verdict is the scored outcome for one source file; the package
//! verdict is a max-severity reduction over them. Files that could not be
//! read at all are carried as Unknown rather than silently dropped, so a
//! package verdict always accounts for every file the walk found.

use crate::rules::{Finding, Severity};
use crate::WormsignResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ─── Tier ──────────────────────────────────────────────────────────

/// Final classification tier, ordered from benign to worst
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Tier {
    Clean,
    Suspicious,
    Malicious,
    /// The file could not be read; no claim is made either way
    Unknown,
}

impl Tier {
    /// Process exit code for CLI-style consumers
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::Suspicious => 1,
            Self::Malicious => 2,
            Self::Unknown => 3,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Clean => "clean",
            Self::Suspicious => "suspicious",
            Self::Malicious => "malicious",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

// ─── File Verdict ──────────────────────────────────────────────────

/// How the scan of one file went
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FileStatus {
    /// Fully parsed and evaluated
    Scanned,
    /// Lexing failed; the file was still classified from an empty fact set
    ParseWarning(String),
    /// The file could not be read from disk
    FileError(String),
}

/// Scored outcome for one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileVerdict {
    pub path: PathBuf,
    pub tier: Tier,
    pub max_severity: Option<Severity>,
    pub findings: Vec<Finding>,
    pub status: FileStatus,
}

impl FileVerdict {
    /// JSON report form, for the external reporting layer
    pub fn to_json(&self) -> WormsignResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn unreadable(path: PathBuf, error: String) -> Self {
        Self {
            path,
            tier: Tier::Unknown,
            max_severity: None,
            findings: Vec::new(),
            status: FileStatus::FileError(error),
        }
    }
}

// ─── Package Verdict ───────────────────────────────────────────────

/// Max-severity reduction over a package's file verdicts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageVerdict {
    pub tier: Tier,
    pub files_total: usize,
    pub files_clean: usize,
    pub files_suspicious: usize,
    pub files_malicious: usize,
    pub files_unknown: usize,
}

impl PackageVerdict {
    /// JSON report form, for the external reporting layer
    pub fn to_json(&self) -> WormsignResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Aggregate file verdicts. Unknown files are counted but never lift
    /// the package tier; a package whose every file is unreadable is
    /// itself Unknown.
    pub fn aggregate(verdicts: &[FileVerdict]) -> Self {
        let mut counts = [0usize; 4];
        let mut worst = None;
        for v in verdicts {
            match v.tier {
                Tier::Clean => counts[0] += 1,
                Tier::Suspicious => counts[1] += 1,
                Tier::Malicious => counts[2] += 1,
                Tier::Unknown => counts[3] += 1,
            }
            if v.tier != Tier::Unknown {
                worst = Some(worst.map_or(v.tier, |w: Tier| w.max(v.tier)));
            }
        }
        let tier = match worst {
            Some(t) => t,
            None if verdicts.is_empty() => Tier::Clean,
            None => Tier::Unknown,
        };
        Self {
            tier,
            files_total: verdicts.len(),
            files_clean: counts[0],
            files_suspicious: counts[1],
            files_malicious: counts[2],
            files_unknown: counts[3],
        }
    }
}
