//! Scoring — findings to a file severity and tier
//!
//! Three rules, applied in order:
//!
//!   1. Dormancy cap: a finding backed only by dead (commented-out)
//!      signals is capped at Medium. Disabled malware is worth flagging
//!      but is not an active payload.
//!   2. Breadth escalation: three or more distinct behavior categories in
//!      one file escalate the file severity one tier. Campaign payloads
//!      combine behaviors; isolated findings usually don't.
//!   3. Tier mapping: no findings or Low maps to Clean, Medium to
//!      Suspicious, High and Critical to Malicious.
//!
//! Adding a finding can therefore never lower a file's tier.

use crate::rules::{Category, Finding, Severity};
use crate::verdict::Tier;
use std::collections::HashSet;

const ESCALATION_CATEGORY_COUNT: usize = 3;

/// Severity of one finding after the dormancy cap
pub fn effective_severity(finding: &Finding) -> Severity {
    if finding.dead_only() {
        finding.severity.min(Severity::Medium)
    } else {
        finding.severity
    }
}

/// Rewrite each finding to its dormant form where the cap applies: the
/// severity drops to its effective value and the category becomes
/// DormantPayload. Run once, before aggregation, so reported and scored
/// findings agree.
pub fn apply_dormancy_cap(findings: &mut [Finding]) {
    for f in findings.iter_mut() {
        if f.dead_only() {
            f.severity = effective_severity(f);
            f.category = Category::DormantPayload;
        }
    }
}

/// File severity: max over findings, escalated one tier when findings
/// span three or more distinct categories
pub fn file_severity(findings: &[Finding]) -> Option<Severity> {
    let max = findings.iter().map(|f| f.severity).max()?;
    let categories: HashSet<_> = findings.iter().map(|f| f.category).collect();
    if categories.len() >= ESCALATION_CATEGORY_COUNT {
        Some(max.escalate())
    } else {
        Some(max)
    }
}

pub fn tier_for(severity: Option<Severity>) -> Tier {
    match severity {
        None | Some(Severity::Low) => Tier::Clean,
        Some(Severity::Medium) => Tier::Suspicious,
        Some(Severity::High) | Some(Severity::Critical) => Tier::Malicious,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Category, Evidence};
    use crate::signal::{Liveness, Location, Signal, SignalKind};
    use std::path::Path;

    fn signal(liveness: Liveness) -> Signal {
        Signal {
            kind: SignalKind::ProcessExec {
                pattern: "recursive-home-delete".to_string(),
            },
            location: Location::line(Path::new("a.js"), 1),
            liveness,
            confidence: 0.95,
        }
    }

    fn finding(category: Category, severity: Severity, liveness: Liveness) -> Finding {
        Finding {
            detector_id: "test".to_string(),
            category,
            severity,
            location: Location::line(Path::new("a.js"), 1),
            detail: String::new(),
            evidence: Evidence::from_excerpt("x"),
            matched_signals: vec![signal(liveness)],
            confidence: 0.95,
        }
    }

    #[test]
    fn test_dead_only_critical_caps_at_medium() {
        let f = finding(Category::DestructivePayload, Severity::Critical, Liveness::Dead);
        assert_eq!(effective_severity(&f), Severity::Medium);
    }

    #[test]
    fn test_live_critical_is_uncapped() {
        let f = finding(Category::DestructivePayload, Severity::Critical, Liveness::Live);
        assert_eq!(effective_severity(&f), Severity::Critical);
    }

    #[test]
    fn test_dead_only_low_stays_low() {
        let f = finding(Category::ObfuscatedEncoding, Severity::Low, Liveness::Dead);
        assert_eq!(effective_severity(&f), Severity::Low);
    }

    #[test]
    fn test_dormancy_cap_recategorizes() {
        let mut findings = vec![
            finding(Category::DestructivePayload, Severity::Critical, Liveness::Dead),
            finding(Category::CredentialTheft, Severity::High, Liveness::Live),
        ];
        apply_dormancy_cap(&mut findings);
        assert_eq!(findings[0].category, Category::DormantPayload);
        assert_eq!(findings[0].severity, Severity::Medium);
        assert_eq!(findings[1].category, Category::CredentialTheft);
        assert_eq!(findings[1].severity, Severity::High);
    }

    #[test]
    fn test_tier_mapping() {
        assert_eq!(tier_for(None), Tier::Clean);
        assert_eq!(tier_for(Some(Severity::Low)), Tier::Clean);
        assert_eq!(tier_for(Some(Severity::Medium)), Tier::Suspicious);
        assert_eq!(tier_for(Some(Severity::High)), Tier::Malicious);
        assert_eq!(tier_for(Some(Severity::Critical)), Tier::Malicious);
    }

    #[test]
    fn test_three_categories_escalate() {
        let findings = vec![
            finding(Category::CredentialTheft, Severity::High, Liveness::Live),
            finding(Category::IocArtifact, Severity::High, Liveness::Live),
            finding(Category::ObfuscatedEncoding, Severity::Medium, Liveness::Live),
        ];
        assert_eq!(file_severity(&findings), Some(Severity::Critical));
    }

    #[test]
    fn test_two_categories_do_not_escalate() {
        let findings = vec![
            finding(Category::CredentialTheft, Severity::High, Liveness::Live),
            finding(Category::IocArtifact, Severity::High, Liveness::Live),
        ];
        assert_eq!(file_severity(&findings), Some(Severity::High));
    }

    #[test]
    fn test_adding_a_finding_never_lowers_severity() {
        let mut findings = vec![finding(Category::CredentialTheft, Severity::High, Liveness::Live)];
        let before = file_severity(&findings);
        findings.push(finding(Category::ObfuscatedEncoding, Severity::Low, Liveness::Live));
        let after = file_severity(&findings);
        assert!(after >= before);
    }

    #[test]
    fn test_no_findings_is_clean() {
        assert_eq!(file_severity(&[]), None);
        assert_eq!(tier_for(file_severity(&[])), Tier::Clean);
    }
}
