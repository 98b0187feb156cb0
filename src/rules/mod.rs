//! Rule engine — signals in, findings out
//!
//! Detectors are pure functions over one file's signal set. Each detector
//! owns one category of behavior, declares a base severity, and applies its
//! own suppressions (a lone CI branch test, single environment reads, a
//! read-only code-hosting call) before emitting anything. Detectors never
//! see other files and never mutate shared state, so files evaluate in any
//! order with identical results.
//!
//! Every finding carries the signals that produced it plus an evidence
//! excerpt of the source line, hashed for stable reporting.

pub mod detectors;

use crate::signal::tables::PatternTables;
use crate::signal::{Location, Signal, SignalKind};
use crate::{WormsignError, WormsignResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

// ─── Severity ──────────────────────────────────────────────────────

/// Finding severity, ordered. Comparison order is the scoring order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// One tier up, saturating at Critical
    pub fn escalate(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Critical => Self::Critical,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        write!(f, "{}", s)
    }
}

// ─── Categories ────────────────────────────────────────────────────

/// Behavior categories findings are grouped under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    CredentialTheft,
    EnvironmentScraping,
    CiEvasion,
    Exfiltration,
    DestructivePayload,
    ObfuscatedEncoding,
    IocArtifact,
    InstallAbuse,
    WorkflowTampering,
    /// Recategorization applied by the scorer to findings whose every
    /// matched signal is dead: the behavior is present but disabled
    DormantPayload,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CredentialTheft => "credential-theft",
            Self::EnvironmentScraping => "environment-scraping",
            Self::CiEvasion => "ci-evasion",
            Self::Exfiltration => "exfiltration",
            Self::DestructivePayload => "destructive-payload",
            Self::ObfuscatedEncoding => "obfuscated-encoding",
            Self::IocArtifact => "ioc-artifact",
            Self::InstallAbuse => "install-abuse",
            Self::WorkflowTampering => "workflow-tampering",
            Self::DormantPayload => "dormant-payload",
        };
        write!(f, "{}", s)
    }
}

// ─── Findings ──────────────────────────────────────────────────────

/// Source-line excerpt backing a finding, content-hashed for stable
/// cross-run comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub excerpt: String,
    pub sha256: String,
}

impl Evidence {
    pub fn from_excerpt(excerpt: &str) -> Self {
        let trimmed = excerpt.trim();
        let mut hasher = Sha256::new();
        hasher.update(trimmed.as_bytes());
        Self {
            excerpt: trimmed.to_string(),
            sha256: hex::encode(hasher.finalize()),
        }
    }
}

/// One detected behavior in one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub detector_id: String,
    pub category: Category,
    pub severity: Severity,
    pub location: Location,
    pub detail: String,
    pub evidence: Evidence,
    pub matched_signals: Vec<Signal>,
    pub confidence: f64,
}

impl Finding {
    /// A finding backed exclusively by dead (commented-out) signals
    pub fn dead_only(&self) -> bool {
        !self.matched_signals.is_empty() && self.matched_signals.iter().all(|s| !s.is_live())
    }
}

// ─── Evaluation Context ────────────────────────────────────────────

/// Everything a detector may look at for one file
pub struct EvalContext<'a> {
    pub path: &'a Path,
    pub signals: &'a [Signal],
    pub tables: &'a PatternTables,
    lines: Vec<&'a str>,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        path: &'a Path,
        content: &'a str,
        signals: &'a [Signal],
        tables: &'a PatternTables,
    ) -> Self {
        Self {
            path,
            signals,
            tables,
            lines: content.lines().collect(),
        }
    }

    /// Evidence excerpt for a 1-based source line
    pub fn evidence_at(&self, line: usize) -> Evidence {
        let excerpt = self
            .lines
            .get(line.saturating_sub(1))
            .copied()
            .unwrap_or_default();
        Evidence::from_excerpt(excerpt)
    }

    /// Highest extraction confidence among a finding's signals
    pub fn max_confidence(signals: &[Signal]) -> f64 {
        signals
            .iter()
            .map(|s| s.confidence)
            .fold(0.0, f64::max)
    }
}

// ─── Suppressions ──────────────────────────────────────────────────

/// Declarative legitimate-use gates. A detector whose any suppression
/// holds over the file's signal set is skipped entirely — these encode
/// the known-benign shapes of otherwise-sensitive API use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// Named environment reads with no whole-environment enumeration
    SingleEnvReadsOnly,
    /// CI-indicator branching with no read or network activity to hide
    UncorrelatedCiBranch,
    /// Code-hosting traffic that never touches a write endpoint
    ReadOnlyHostingCalls,
    /// A hosting write with no credential source anywhere in the file
    UncorroboratedHostingWrite,
}

impl Suppression {
    pub fn suppresses(&self, signals: &[Signal]) -> bool {
        match self {
            Self::SingleEnvReadsOnly => {
                !signals.iter().any(|s| matches!(s.kind, SignalKind::EnvBulkRead))
            }
            Self::UncorrelatedCiBranch => !signals.iter().any(|s| {
                matches!(
                    s.kind,
                    SignalKind::EnvBulkRead
                        | SignalKind::FileRead { .. }
                        | SignalKind::NetworkCall { .. }
                )
            }),
            Self::ReadOnlyHostingCalls => !signals.iter().any(|s| {
                matches!(
                    s.kind,
                    SignalKind::NetworkCall {
                        write_endpoint: true,
                        ..
                    }
                )
            }),
            Self::UncorroboratedHostingWrite => !signals.iter().any(|s| {
                matches!(
                    s.kind,
                    SignalKind::CredentialRef { .. }
                        | SignalKind::MarkerString { .. }
                        | SignalKind::FileRead { .. }
                        | SignalKind::EnvRead {
                            sensitive: true,
                            ..
                        }
                )
            }),
        }
    }
}

// ─── Detector Registry ─────────────────────────────────────────────

/// One registered detector: an id, the category it reports under, its
/// suppression gates, and its evaluation function
pub struct Detector {
    pub id: &'static str,
    pub category: Category,
    pub base_severity: Severity,
    pub suppressions: &'static [Suppression],
    pub evaluate: fn(&Detector, &EvalContext<'_>) -> Vec<Finding>,
}

static REGISTRY: OnceLock<Result<Vec<Detector>, String>> = OnceLock::new();

/// The detector registry, built once. Duplicate ids are a fatal
/// configuration error.
pub fn registry() -> WormsignResult<&'static [Detector]> {
    let built = REGISTRY.get_or_init(|| {
        let detectors = detectors::all();
        let mut ids: Vec<&str> = detectors.iter().map(|d| d.id).collect();
        ids.sort_unstable();
        for pair in ids.windows(2) {
            if pair[0] == pair[1] {
                return Err(format!("duplicate detector id '{}'", pair[0]));
            }
        }
        Ok(detectors)
    });
    match built {
        Ok(d) => Ok(d.as_slice()),
        Err(msg) => Err(WormsignError::PatternTable(msg.clone())),
    }
}

/// Run every registered detector over one file's context. Findings come
/// back sorted by severity (highest first), then source line.
pub fn evaluate_all(ctx: &EvalContext<'_>) -> WormsignResult<Vec<Finding>> {
    let mut findings = Vec::new();
    for det in registry()? {
        if det.suppressions.iter().any(|s| s.suppresses(ctx.signals)) {
            continue;
        }
        let mut produced = (det.evaluate)(det, ctx);
        if !produced.is_empty() {
            tracing::debug!(
                "{}: detector '{}' produced {} finding(s)",
                ctx.path.display(),
                det.id,
                produced.len()
            );
        }
        findings.append(&mut produced);
    }
    sort_findings(&mut findings);
    Ok(findings)
}

/// Severity-descending report order, ties broken by source line then
/// detector id. Re-applied after any pass that rewrites severities.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(a.location.line_start.cmp(&b.location.line_start))
            .then(a.detector_id.cmp(&b.detector_id))
    });
}
