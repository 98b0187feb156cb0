//! The built-in detector set
//!
//! One function per behavior category. Detectors fold or fan out as the
//! behavior demands: credential path reads report one finding per path
//! pattern, while whole-environment scraping folds every bulk read into a
//! single finding. Corroborating signals (credential references, campaign
//! markers) ride along in `matched_signals` without producing findings of
//! their own.

use crate::rules::{Category, Detector, EvalContext, Finding, Severity, Suppression};
use crate::signal::{Signal, SignalKind};

/// All built-in detectors, in evaluation order
pub(crate) fn all() -> Vec<Detector> {
    vec![
        Detector {
            id: "credential-file-theft",
            category: Category::CredentialTheft,
            base_severity: Severity::High,
            suppressions: &[],
            evaluate: credential_file_theft,
        },
        Detector {
            id: "secret-scanner-exec",
            category: Category::CredentialTheft,
            base_severity: Severity::High,
            suppressions: &[],
            evaluate: secret_scanner_exec,
        },
        Detector {
            id: "metadata-service-access",
            category: Category::Exfiltration,
            base_severity: Severity::Critical,
            suppressions: &[],
            evaluate: metadata_service_access,
        },
        Detector {
            id: "environment-scraping",
            category: Category::EnvironmentScraping,
            base_severity: Severity::Medium,
            suppressions: &[Suppression::SingleEnvReadsOnly],
            evaluate: environment_scraping,
        },
        Detector {
            id: "ci-environment-evasion",
            category: Category::CiEvasion,
            base_severity: Severity::Low,
            suppressions: &[Suppression::UncorrelatedCiBranch],
            evaluate: ci_environment_evasion,
        },
        Detector {
            id: "hosting-api-exfiltration",
            category: Category::Exfiltration,
            base_severity: Severity::Critical,
            suppressions: &[Suppression::ReadOnlyHostingCalls, Suppression::UncorroboratedHostingWrite],
            evaluate: hosting_api_exfiltration,
        },
        Detector {
            id: "destructive-commands",
            category: Category::DestructivePayload,
            base_severity: Severity::Critical,
            suppressions: &[],
            evaluate: destructive_commands,
        },
        Detector {
            id: "obfuscated-encoding",
            category: Category::ObfuscatedEncoding,
            base_severity: Severity::Medium,
            suppressions: &[],
            evaluate: obfuscated_encoding,
        },
        Detector {
            id: "ioc-artifacts",
            category: Category::IocArtifact,
            base_severity: Severity::High,
            suppressions: &[],
            evaluate: ioc_artifacts,
        },
        Detector {
            id: "install-script-commands",
            category: Category::InstallAbuse,
            base_severity: Severity::High,
            suppressions: &[],
            evaluate: install_script_commands,
        },
        Detector {
            id: "workflow-tampering",
            category: Category::WorkflowTampering,
            base_severity: Severity::High,
            suppressions: &[],
            evaluate: workflow_tampering,
        },
    ]
}

fn finding(
    det: &Detector,
    ctx: &EvalContext<'_>,
    detail: String,
    matched: Vec<Signal>,
) -> Finding {
    let line = matched.first().map(|s| s.location.line_start).unwrap_or(1);
    Finding {
        detector_id: det.id.to_string(),
        category: det.category,
        severity: det.base_severity,
        location: crate::signal::Location::line(ctx.path, line),
        detail,
        evidence: ctx.evidence_at(line),
        confidence: EvalContext::max_confidence(&matched),
        matched_signals: matched,
    }
}

// ─── Credential Theft ──────────────────────────────────────────────

/// One finding per credential-bearing path pattern read in the file.
fn credential_file_theft(det: &Detector, ctx: &EvalContext<'_>) -> Vec<Finding> {
    ctx.signals
        .iter()
        .filter_map(|s| match &s.kind {
            SignalKind::FileRead { pattern } => Some(finding(
                det,
                ctx,
                format!("reads credential-bearing path ({})", pattern),
                vec![s.clone()],
            )),
            _ => None,
        })
        .collect()
}

/// Running a secret scanner against the local filesystem is credential
/// harvesting, not security tooling, in a package install context.
fn secret_scanner_exec(det: &Detector, ctx: &EvalContext<'_>) -> Vec<Finding> {
    ctx.signals
        .iter()
        .filter_map(|s| match &s.kind {
            SignalKind::ProcessExec { pattern }
                if ctx.tables.is_secret_scanner_pattern(pattern) =>
            {
                Some(finding(
                    det,
                    ctx,
                    format!("invokes secret scanner ({})", pattern),
                    vec![s.clone()],
                ))
            }
            _ => None,
        })
        .collect()
}

// ─── Cloud Credential Harvesting ───────────────────────────────────

/// Any call to a link-local instance metadata service. No package has a
/// legitimate reason to fetch instance credentials at install time.
fn metadata_service_access(det: &Detector, ctx: &EvalContext<'_>) -> Vec<Finding> {
    ctx.signals
        .iter()
        .filter_map(|s| match &s.kind {
            SignalKind::NetworkCall {
                host,
                metadata_service: true,
                ..
            } => Some(finding(
                det,
                ctx,
                format!("queries instance metadata service at {}", host),
                vec![s.clone()],
            )),
            _ => None,
        })
        .collect()
}

// ─── Environment Scraping ──────────────────────────────────────────

/// Whole-environment enumeration. Every bulk read folds into one finding;
/// sensitive single reads ride along as corroboration. Plain single
/// environment reads alone never fire.
fn environment_scraping(det: &Detector, ctx: &EvalContext<'_>) -> Vec<Finding> {
    let bulk: Vec<Signal> = ctx
        .signals
        .iter()
        .filter(|s| matches!(s.kind, SignalKind::EnvBulkRead))
        .cloned()
        .collect();
    if bulk.is_empty() {
        return Vec::new();
    }
    let mut matched = bulk;
    matched.extend(
        ctx.signals
            .iter()
            .filter(|s| matches!(s.kind, SignalKind::EnvRead { sensitive: true, .. }))
            .cloned(),
    );
    let count = matched
        .iter()
        .filter(|s| matches!(s.kind, SignalKind::EnvBulkRead))
        .count();
    vec![finding(
        det,
        ctx,
        format!("enumerates the full process environment ({} bulk reads)", count),
        matched,
    )]
}

// ─── CI Evasion ────────────────────────────────────────────────────

/// CI-indicator branching. The lone-CI-check case (ordinary build
/// configuration) is gated out by [`Suppression::UncorrelatedCiBranch`]
/// before this runs.
fn ci_environment_evasion(det: &Detector, ctx: &EvalContext<'_>) -> Vec<Finding> {
    let branches: Vec<Signal> = ctx
        .signals
        .iter()
        .filter(|s| matches!(s.kind, SignalKind::CiBranch { .. }))
        .cloned()
        .collect();
    if branches.is_empty() {
        return Vec::new();
    }
    let names: Vec<&str> = branches
        .iter()
        .filter_map(|s| match &s.kind {
            SignalKind::CiBranch { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    vec![finding(
        det,
        ctx,
        format!(
            "branches on CI indicators ({}) alongside sensitive operations",
            names.join(", ")
        ),
        branches,
    )]
}

// ─── Exfiltration ──────────────────────────────────────────────────

/// Writes to code-hosting APIs (repo creation, runner registration,
/// secrets endpoints), corroborated by a credential source in the same
/// file: a credential reference, a credential path read, a sensitive
/// environment read, or a campaign marker. The read-only and
/// uncorroborated cases are gated out by this detector's suppressions.
fn hosting_api_exfiltration(det: &Detector, ctx: &EvalContext<'_>) -> Vec<Finding> {
    let corroborating: Vec<Signal> = ctx
        .signals
        .iter()
        .filter(|s| {
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
        })
        .cloned()
        .collect();

    ctx.signals
        .iter()
        .filter_map(|s| match &s.kind {
            SignalKind::NetworkCall {
                host,
                write_endpoint: true,
                ..
            } => {
                let mut matched = vec![s.clone()];
                matched.extend(corroborating.iter().cloned());
                Some(finding(
                    det,
                    ctx,
                    format!("writes to code-hosting API at {}", host),
                    matched,
                ))
            }
            _ => None,
        })
        .collect()
}

// ─── Destructive Payload ───────────────────────────────────────────

/// Known destructive command patterns reaching process execution or
/// destructive filesystem APIs. Dead-only matches are reported but capped
/// at dormant severity by the scorer.
fn destructive_commands(det: &Detector, ctx: &EvalContext<'_>) -> Vec<Finding> {
    ctx.signals
        .iter()
        .filter_map(|s| match &s.kind {
            SignalKind::ProcessExec { pattern }
                if !ctx.tables.is_secret_scanner_pattern(pattern) =>
            {
                Some(finding(
                    det,
                    ctx,
                    format!("destructive command pattern ({})", pattern),
                    vec![s.clone()],
                ))
            }
            _ => None,
        })
        .collect()
}

// ─── Obfuscation ───────────────────────────────────────────────────

fn obfuscated_encoding(det: &Detector, ctx: &EvalContext<'_>) -> Vec<Finding> {
    ctx.signals
        .iter()
        .filter_map(|s| match &s.kind {
            SignalKind::EncodeChain { depth } => Some(finding(
                det,
                ctx,
                format!("nested encoding chain (depth {})", depth),
                vec![s.clone()],
            )),
            _ => None,
        })
        .collect()
}

// ─── Install Scripts ───────────────────────────────────────────────

/// A lifecycle hook in package.json running a recognized dropper,
/// fetch-and-pipe, or publish command. One finding per hooked command.
fn install_script_commands(det: &Detector, ctx: &EvalContext<'_>) -> Vec<Finding> {
    ctx.signals
        .iter()
        .filter_map(|s| match &s.kind {
            SignalKind::InstallScript { hook, pattern } => Some(finding(
                det,
                ctx,
                format!("'{}' hook runs a suspicious command ({})", hook, pattern),
                vec![s.clone()],
            )),
            _ => None,
        })
        .collect()
}

// ─── Workflow Tampering ────────────────────────────────────────────

/// Known-hostile CI workflow shapes: discussion-body injection,
/// self-hosted runner registration, secrets artifacts.
fn workflow_tampering(det: &Detector, ctx: &EvalContext<'_>) -> Vec<Finding> {
    ctx.signals
        .iter()
        .filter_map(|s| match &s.kind {
            SignalKind::WorkflowPattern { name } => Some(finding(
                det,
                ctx,
                format!("suspicious workflow pattern ({})", name),
                vec![s.clone()],
            )),
            _ => None,
        })
        .collect()
}

// ─── IOC Artifacts ─────────────────────────────────────────────────

/// Campaign markers and indicator-artifact filenames, one finding per
/// distinct value.
fn ioc_artifacts(det: &Detector, ctx: &EvalContext<'_>) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen: Vec<&str> = Vec::new();

    for s in ctx.signals {
        let (value, what) = match &s.kind {
            SignalKind::IocFilename { value } => (value.as_str(), "indicator artifact filename"),
            SignalKind::MarkerString { value } => (value.as_str(), "campaign marker"),
            _ => continue,
        };
        if seen.contains(&value) {
            continue;
        }
        seen.push(value);
        findings.push(finding(
            det,
            ctx,
            format!("{} '{}'", what, value),
            vec![s.clone()],
        ));
    }
    findings
}
