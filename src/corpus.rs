//! Corpus evaluation — scan a labeled fixture tree and grade the verdicts
//!
//! Fixtures live in a directory with `clean/` and `malicious/` subtrees;
//! the subtree name is the expected label. A clean fixture must come back
//! exactly Clean. A malicious fixture must be flagged — Suspicious or
//! Malicious both count, since dormant payloads legitimately land below
//! the top tier.

use crate::engine::{Engine, ScanConfig, SourceFile};
use crate::verdict::Tier;
use crate::{WormsignError, WormsignResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use walkdir::WalkDir;

// ─── Cases ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExpectedLabel {
    Clean,
    Malicious,
}

/// One labeled fixture file
#[derive(Debug, Clone, Serialize)]
pub struct FixtureCase {
    pub path: PathBuf,
    pub expected: ExpectedLabel,
}

impl FixtureCase {
    fn label_of(path: &Path) -> Option<ExpectedLabel> {
        let parent = path.parent()?.file_name()?.to_str()?;
        match parent {
            "clean" => Some(ExpectedLabel::Clean),
            "malicious" => Some(ExpectedLabel::Malicious),
            _ => None,
        }
    }

    /// Discover fixture cases under a root, sorted by path
    pub fn discover(root: &Path) -> WormsignResult<Vec<FixtureCase>> {
        let mut cases = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry
                .map_err(|e| WormsignError::Corpus(format!("fixture walk failed: {}", e)))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(expected) = Self::label_of(entry.path()) {
                cases.push(FixtureCase {
                    path: entry.path().to_path_buf(),
                    expected,
                });
            }
        }
        if cases.is_empty() {
            return Err(WormsignError::Corpus(format!(
                "no labeled fixtures under {}",
                root.display()
            )));
        }
        Ok(cases)
    }
}

// ─── Report ────────────────────────────────────────────────────────

/// Graded outcome for one fixture
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub path: PathBuf,
    pub expected: ExpectedLabel,
    pub tier: Tier,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CorpusReport {
    pub outcomes: Vec<CaseOutcome>,
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl CorpusReport {
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Every fixture graded as expected
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn failures(&self) -> Vec<&CaseOutcome> {
        self.outcomes.iter().filter(|o| !o.passed).collect()
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        1.0
    } else {
        num as f64 / denom as f64
    }
}

// ─── Evaluator ─────────────────────────────────────────────────────

pub struct CorpusEvaluator {
    engine: Engine,
}

impl CorpusEvaluator {
    pub fn new(config: ScanConfig) -> WormsignResult<Self> {
        Ok(Self {
            engine: Engine::new(config)?,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Scan every case and grade it against its label. Fixtures go through
    /// the engine's parallel scan path, same as a package scan.
    pub fn evaluate(&self, cases: &[FixtureCase]) -> WormsignResult<CorpusReport> {
        let sources = cases
            .iter()
            .map(|case| {
                let content = std::fs::read_to_string(&case.path).map_err(|e| {
                    WormsignError::Corpus(format!("cannot read {}: {}", case.path.display(), e))
                })?;
                Ok(SourceFile {
                    path: case.path.clone(),
                    content,
                })
            })
            .collect::<WormsignResult<Vec<_>>>()?;
        let run = self.engine.scan_sources(&sources, &AtomicBool::new(false))?;

        let mut outcomes = Vec::with_capacity(cases.len());
        let (mut tp, mut fp, mut tn, mut fneg) = (0usize, 0usize, 0usize, 0usize);

        for (case, verdict) in cases.iter().zip(&run.verdicts) {
            let flagged = verdict.tier >= Tier::Suspicious && verdict.tier != Tier::Unknown;
            let passed = match case.expected {
                ExpectedLabel::Clean => verdict.tier == Tier::Clean,
                ExpectedLabel::Malicious => flagged,
            };
            match (case.expected, flagged) {
                (ExpectedLabel::Malicious, true) => tp += 1,
                (ExpectedLabel::Malicious, false) => fneg += 1,
                (ExpectedLabel::Clean, true) => fp += 1,
                (ExpectedLabel::Clean, false) => tn += 1,
            }
            if !passed {
                tracing::warn!(
                    "corpus miss: {} expected {:?}, got {}",
                    case.path.display(),
                    case.expected,
                    verdict.tier
                );
            }
            outcomes.push(CaseOutcome {
                path: case.path.clone(),
                expected: case.expected,
                tier: verdict.tier,
                passed,
            });
        }

        Ok(CorpusReport {
            outcomes,
            true_positives: tp,
            false_positives: fp,
            true_negatives: tn,
            false_negatives: fneg,
        })
    }

    /// Discover and evaluate in one step.
    pub fn evaluate_dir(&self, root: &Path) -> WormsignResult<CorpusReport> {
        let cases = FixtureCase::discover(root)?;
        self.evaluate(&cases)
    }
}
