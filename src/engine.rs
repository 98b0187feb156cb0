//! Scan orchestration
//!
//! The engine owns the loaded pattern tables and detector registry, both
//! validated at construction — a malformed table or duplicate detector id
//! refuses to start rather than scanning with partial rules. After that,
//! scanning is embarrassingly parallel: files are independent, so the
//! package scan fans out over rayon and reduces to a package verdict.
//!
//! Cancellation is cooperative and file-granular: the flag is checked
//! before each file, in-flight files finish, and the partial run is
//! returned marked cancelled.

use crate::manifest;
use crate::rules::{self, EvalContext};
use crate::scoring;
use crate::signal::tables::PatternTables;
use crate::signal::extract_signals;
use crate::structural;
use crate::verdict::{FileStatus, FileVerdict, PackageVerdict};
use crate::WormsignResult;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use walkdir::WalkDir;

const SOURCE_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs"];

// ─── Configuration ─────────────────────────────────────────────────

/// Engine configuration
pub struct ScanConfig {
    /// Findings below this confidence are dropped before scoring
    pub min_confidence: f64,
    /// Replacement pattern tables; None uses the embedded set
    pub tables: Option<PatternTables>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            tables: None,
        }
    }
}

/// One source file already loaded into memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

/// Outcome of one package scan
#[derive(Debug, Clone)]
pub struct ScanRun {
    pub verdicts: Vec<FileVerdict>,
    pub package: PackageVerdict,
    pub files_scanned: usize,
    pub duration_ms: u128,
    pub cancelled: bool,
}

// ─── Engine ────────────────────────────────────────────────────────

enum TableSource {
    Embedded(&'static PatternTables),
    External(Box<PatternTables>),
}

pub struct Engine {
    tables: TableSource,
    min_confidence: f64,
}

impl Engine {
    /// Build an engine, loading and validating tables and the detector
    /// registry. Any validation failure is fatal here, never mid-scan.
    pub fn new(config: ScanConfig) -> WormsignResult<Self> {
        let tables = match config.tables {
            Some(t) => TableSource::External(Box::new(t)),
            None => TableSource::Embedded(PatternTables::global()?),
        };
        rules::registry()?;
        Ok(Self {
            tables,
            min_confidence: config.min_confidence,
        })
    }

    fn tables(&self) -> &PatternTables {
        match &self.tables {
            TableSource::Embedded(t) => t,
            TableSource::External(t) => t,
        }
    }

    /// Scan one in-memory source file.
    ///
    /// Dispatches on file kind: JS/TS sources go through the structural
    /// pipeline, package manifests and workflow files through their own
    /// extraction paths. A file that fails to parse still gets a verdict:
    /// clean, with a parse warning in its status.
    pub fn scan_source(&self, path: &Path, content: &str) -> WormsignResult<FileVerdict> {
        let tables = self.tables();
        let (signals, status) = match classify(path).unwrap_or(SourceKind::Script) {
            SourceKind::Manifest => {
                let (signals, warning) = manifest::extract_manifest_signals(path, content, tables);
                let status = match warning {
                    Some(w) => {
                        tracing::warn!("{}: {}", path.display(), w);
                        FileStatus::ParseWarning(w)
                    }
                    None => FileStatus::Scanned,
                };
                (signals, status)
            }
            SourceKind::Workflow => (
                manifest::extract_workflow_signals(path, content, tables),
                FileStatus::Scanned,
            ),
            SourceKind::Script => {
                let facts = structural::extract(path, content);
                let status = match &facts.parse_warning {
                    Some(w) => {
                        tracing::warn!(
                            "{}: parse warning at line {}: {}",
                            path.display(),
                            w.line,
                            w.message
                        );
                        FileStatus::ParseWarning(format!("line {}: {}", w.line, w.message))
                    }
                    None => FileStatus::Scanned,
                };
                (extract_signals(&facts, tables), status)
            }
        };
        let ctx = EvalContext::new(path, content, &signals, tables);

        let mut findings = rules::evaluate_all(&ctx)?;
        findings.retain(|f| f.confidence >= self.min_confidence);
        // The cap can lower a finding below its neighbors, so the report
        // order has to be re-established afterwards.
        scoring::apply_dormancy_cap(&mut findings);
        rules::sort_findings(&mut findings);

        let max_severity = scoring::file_severity(&findings);
        let tier = scoring::tier_for(max_severity);

        Ok(FileVerdict {
            path: path.to_path_buf(),
            tier,
            max_severity,
            findings,
            status,
        })
    }

    /// Scan a set of loaded sources in parallel.
    pub fn scan_sources(
        &self,
        sources: &[SourceFile],
        cancel: &AtomicBool,
    ) -> WormsignResult<ScanRun> {
        let started = Instant::now();
        tracing::info!("Scanning {} source file(s)", sources.len());

        let verdicts: Vec<FileVerdict> = sources
            .par_iter()
            .filter_map(|src| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                Some(self.scan_source(&src.path, &src.content))
            })
            .collect::<WormsignResult<Vec<_>>>()?;

        let cancelled = cancel.load(Ordering::Relaxed);
        let package = PackageVerdict::aggregate(&verdicts);
        let duration_ms = started.elapsed().as_millis();
        tracing::info!(
            "Scan finished: {} file(s) in {}ms, package tier {}{}",
            verdicts.len(),
            duration_ms,
            package.tier,
            if cancelled { " (cancelled)" } else { "" }
        );

        Ok(ScanRun {
            files_scanned: verdicts.len(),
            verdicts,
            package,
            duration_ms,
            cancelled,
        })
    }

    /// Walk a package directory and scan every source file, package
    /// manifest, and workflow file in it.
    ///
    /// Skips `node_modules` and hidden directories, except `.github` so
    /// workflows are reachable. Unreadable files get an Unknown verdict
    /// instead of aborting the run.
    pub fn scan_dir(&self, root: &Path, cancel: &AtomicBool) -> WormsignResult<ScanRun> {
        let started = Instant::now();
        let mut sources = Vec::new();
        let mut unreadable = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e));
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    tracing::warn!("{}: walk error: {}", root.display(), err);
                    continue;
                }
            };
            if !entry.file_type().is_file() || classify(entry.path()).is_none() {
                continue;
            }
            match std::fs::read_to_string(entry.path()) {
                Ok(content) => sources.push(SourceFile {
                    path: entry.path().to_path_buf(),
                    content,
                }),
                Err(err) => {
                    tracing::warn!("{}: unreadable: {}", entry.path().display(), err);
                    unreadable.push(FileVerdict::unreadable(
                        entry.path().to_path_buf(),
                        err.to_string(),
                    ));
                }
            }
        }

        let mut run = self.scan_sources(&sources, cancel)?;
        if !unreadable.is_empty() {
            run.verdicts.extend(unreadable);
            run.verdicts.sort_by(|a, b| a.path.cmp(&b.path));
            run.package = PackageVerdict::aggregate(&run.verdicts);
            run.duration_ms = started.elapsed().as_millis();
        }
        Ok(run)
    }
}

enum SourceKind {
    Script,
    Manifest,
    Workflow,
}

fn classify(path: &Path) -> Option<SourceKind> {
    if manifest::is_manifest_file(path) {
        Some(SourceKind::Manifest)
    } else if manifest::is_workflow_file(path) {
        Some(SourceKind::Workflow)
    } else if is_source_file(path) {
        Some(SourceKind::Script)
    } else {
        None
    }
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    // depth 0 is the walk root itself, never skipped
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    match entry.file_name().to_str() {
        // .github stays: workflow files live under it
        Some(name) => name == "node_modules" || (name.starts_with('.') && name != ".github"),
        None => false,
    }
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}
