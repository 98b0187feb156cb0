//! # wormsign — Static Supply-Chain Attack Detection Engine
//!
//! Scans JavaScript package/source trees and classifies each file as clean,
//! suspicious, or malicious — without ever executing any of the code. The
//! signal taxonomy covers the behaviors observed in npm worm campaigns:
//! credential theft, cloud credential harvesting, destructive commands,
//! environment scraping, exfiltration through code-hosting APIs, and
//! indicator-of-compromise artifact writing. Package manifests and CI
//! workflow files are scanned alongside the sources, since droppers are
//! usually wired in through an install hook or a workflow trigger.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Engine                                │
//! │  ┌────────────┐  ┌──────────┐  ┌───────────┐  ┌──────────┐   │
//! │  │ Structural │→ │  Signal  │→ │   Rule    │→ │  Scorer  │   │
//! │  │ Extractor  │  │ Extractor│  │  Engine   │  │          │   │
//! │  └────────────┘  └────┬─────┘  └─────┬─────┘  └────┬─────┘   │
//! │                       │              │             │         │
//! │              Pattern Tables    Detector Registry   ▼         │
//! │              (read-only)       (immutable)    Verdict per    │
//! │                                               file + package │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Data flows strictly forward: file → structural facts → signals →
//! findings → verdict. Files are embarrassingly parallel — the detector
//! registry and pattern tables are read-only for the scan's duration and
//! nothing is shared across files, so the engine scans with a rayon pool
//! and no locks.
//!
//! The distinction that carries the real difficulty: legitimate use of
//! sensitive APIs (reading `process.env.CI`, loading a config file, calling
//! a public API) versus malicious use of the *same* APIs. Detectors
//! therefore fire on signal *combinations*, with declarative suppression
//! rules encoding the known-legitimate patterns.

pub mod structural;
pub mod signal;
pub mod manifest;
pub mod rules;
pub mod scoring;
pub mod verdict;
pub mod engine;
pub mod corpus;

// Re-exports for convenience
pub use signal::{Signal, SignalKind, Liveness, Location};
pub use signal::tables::PatternTables;
pub use rules::{Category, Detector, Evidence, Finding, Severity, Suppression};
pub use verdict::{FileStatus, FileVerdict, PackageVerdict, Tier};
pub use engine::{Engine, ScanConfig, ScanRun, SourceFile};
pub use corpus::{CorpusEvaluator, CorpusReport, FixtureCase};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WormsignError {
    /// Malformed pattern table or detector registry — fatal at startup,
    /// since an incomplete registry would silently under-detect.
    #[error("Pattern table error: {0}")]
    PatternTable(String),

    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type WormsignResult<T> = Result<T, WormsignError>;
