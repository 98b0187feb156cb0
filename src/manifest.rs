//! package.json and CI workflow scanning
//!
//! The payload of a supply-chain attack rarely lives only in JavaScript:
//! the dropper is wired into an install-time lifecycle script
//! (`"postinstall": "node setup_bun.js"`) or into a GitHub Actions
//! workflow that triggers on discussion events or registers self-hosted
//! runners. Neither file is lexable JS, so they get their own extraction
//! paths: the manifest is parsed as JSON and its lifecycle scripts
//! interrogated, workflows are scanned line by line against the workflow
//! pattern table. Both feed the same signal stream the rule engine
//! already evaluates.

use crate::signal::tables::PatternTables;
use crate::signal::{Liveness, Location, Signal, SignalKind};
use std::path::Path;

const CONF_MANIFEST: f64 = 0.9;

/// A package manifest eligible for lifecycle-script scanning
pub fn is_manifest_file(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some("package.json")
}

/// A GitHub Actions workflow definition (`.github/workflows/*.yml`)
pub fn is_workflow_file(path: &Path) -> bool {
    let ext_ok = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    );
    ext_ok
        && path
            .parent()
            .is_some_and(|p| p.ends_with(".github/workflows"))
}

/// Signals from a package manifest's install-time lifecycle scripts.
///
/// A manifest that is not valid JSON yields no signals and a parse
/// warning; scripts under non-hook keys (`build`, `test`) are never
/// inspected.
pub fn extract_manifest_signals(
    path: &Path,
    content: &str,
    tables: &PatternTables,
) -> (Vec<Signal>, Option<String>) {
    let parsed: serde_json::Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => return (Vec::new(), Some(format!("invalid package.json: {}", e))),
    };

    let mut signals = Vec::new();
    let scripts = parsed.get("scripts").and_then(|s| s.as_object());
    for (hook, value) in scripts.into_iter().flatten() {
        if !tables.is_install_hook(hook) {
            continue;
        }
        let Some(command) = value.as_str() else {
            continue;
        };
        let line = line_of(content, command);
        if let Some(p) = tables.match_install_script(command) {
            signals.push(signal(
                SignalKind::InstallScript {
                    hook: hook.clone(),
                    pattern: p.name.clone(),
                },
                path,
                line,
            ));
        }
        if let Some(p) = tables
            .match_destructive(command)
            .or_else(|| tables.match_secret_scanner(command))
        {
            signals.push(signal(
                SignalKind::ProcessExec {
                    pattern: p.name.clone(),
                },
                path,
                line,
            ));
        }
        for name in tables.find_ioc_filenames(command) {
            signals.push(signal(
                SignalKind::IocFilename {
                    value: name.to_string(),
                },
                path,
                line,
            ));
        }
        for marker in tables.find_markers(command) {
            signals.push(signal(
                SignalKind::MarkerString {
                    value: marker.to_string(),
                },
                path,
                line,
            ));
        }
    }
    (signals, None)
}

/// Signals from a workflow file: per-line workflow patterns, campaign
/// markers, and indicator filenames, plus anchored patterns against the
/// workflow's own filename.
pub fn extract_workflow_signals(
    path: &Path,
    content: &str,
    tables: &PatternTables,
) -> Vec<Signal> {
    let mut signals = Vec::new();

    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        if let Some(p) = tables.match_workflow(name) {
            signals.push(signal(
                SignalKind::WorkflowPattern {
                    name: p.name.clone(),
                },
                path,
                1,
            ));
        }
    }

    for (idx, text) in content.lines().enumerate() {
        let line = idx + 1;
        if let Some(p) = tables.match_workflow(text) {
            signals.push(signal(
                SignalKind::WorkflowPattern {
                    name: p.name.clone(),
                },
                path,
                line,
            ));
        }
        for marker in tables.find_markers(text) {
            signals.push(signal(
                SignalKind::MarkerString {
                    value: marker.to_string(),
                },
                path,
                line,
            ));
        }
        for name in tables.find_ioc_filenames(text) {
            signals.push(signal(
                SignalKind::IocFilename {
                    value: name.to_string(),
                },
                path,
                line,
            ));
        }
    }
    signals
}

fn signal(kind: SignalKind, path: &Path, line: usize) -> Signal {
    Signal {
        kind,
        location: Location::line(path, line),
        liveness: Liveness::Live,
        confidence: CONF_MANIFEST,
    }
}

/// 1-based line of the first occurrence, for evidence excerpts. Falls
/// back to line 1 when JSON escaping obscures the raw text.
fn line_of(content: &str, needle: &str) -> usize {
    content
        .lines()
        .position(|l| l.contains(needle))
        .map(|i| i + 1)
        .unwrap_or(1)
}
