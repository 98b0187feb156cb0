//! Signal taxonomy — typed, located facts about potentially sensitive operations
//!
//! Signals are the middle currency of the pipeline: the structural extractor
//! produces syntax facts, this module maps them to a closed set of typed
//! [`SignalKind`]s, and the rule engine correlates them into findings.
//! Recognized APIs are resolved by call-chain pattern matching against the
//! pattern tables — the same call is recognized as a filesystem/network/
//! process primitive regardless of how it was imported.
//!
//! Signals are immutable, created once per scan, and never shared across
//! files.

pub mod extract;
pub mod tables;

pub use extract::extract_signals;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Whether a matched construct is part of executable code or disabled
/// (commented-out). Dead signals retain full value but score lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Liveness {
    Live,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Other,
}

/// The closed set of signal kinds the rule engine understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalKind {
    /// Filesystem read reaching a credential-bearing path pattern
    FileRead { pattern: String },
    /// Single named environment variable read
    EnvRead { name: String, sensitive: bool },
    /// Enumeration or serialization of the whole environment object
    EnvBulkRead,
    /// HTTP client call with a resolvable target
    NetworkCall {
        host: String,
        method: HttpMethod,
        write_endpoint: bool,
        metadata_service: bool,
    },
    /// Process execution (or destructive filesystem call) matching a known
    /// command pattern
    ProcessExec { pattern: String },
    /// Nested encode/decode of the same buffer (depth ≥ 2)
    EncodeChain { depth: usize },
    /// Known campaign marker phrase in a live string literal
    MarkerString { value: String },
    /// Known indicator-artifact filename
    IocFilename { value: String },
    /// Branch condition testing a CI-indicator environment name
    CiBranch { name: String },
    /// Reference to a credential-bearing value (member naming)
    CredentialRef { name: String },
    /// package.json lifecycle hook running a recognized command pattern
    InstallScript { hook: String, pattern: String },
    /// Known-hostile shape in a CI workflow file
    WorkflowPattern { name: String },
}

impl SignalKind {
    /// Short stable name for logs and evidence
    pub fn label(&self) -> &'static str {
        match self {
            Self::FileRead { .. } => "FILE_READ",
            Self::EnvRead { .. } => "ENV_READ",
            Self::EnvBulkRead => "ENV_BULK_READ",
            Self::NetworkCall { .. } => "NETWORK_CALL",
            Self::ProcessExec { .. } => "PROCESS_EXEC",
            Self::EncodeChain { .. } => "ENCODE_CHAIN",
            Self::MarkerString { .. } => "MARKER_STRING",
            Self::IocFilename { .. } => "IOC_FILENAME",
            Self::CiBranch { .. } => "CI_BRANCH",
            Self::CredentialRef { .. } => "CREDENTIAL_REF",
            Self::InstallScript { .. } => "INSTALL_SCRIPT",
            Self::WorkflowPattern { .. } => "WORKFLOW_PATTERN",
        }
    }
}

/// Where a signal was observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub line_start: usize,
    pub line_end: usize,
}

impl Location {
    pub fn line(file: &std::path::Path, line: usize) -> Self {
        Self {
            file: file.to_path_buf(),
            line_start: line,
            line_end: line,
        }
    }
}

/// A typed, located fact extracted from source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub location: Location,
    pub liveness: Liveness,
    /// Extraction confidence 0.0 - 1.0
    pub confidence: f64,
}

impl Signal {
    pub fn is_live(&self) -> bool {
        self.liveness == Liveness::Live
    }
}
