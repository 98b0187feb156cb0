//! Data-driven pattern tables loaded from TOML files
//!
//! ALL recognition patterns live in external TOML files under
//! `data/patterns/`. They are embedded at compile time via `include_str!()`
//! so the library is self-contained, but adding a new credential path,
//! campaign marker, or command pattern only requires editing TOML — zero
//! Rust code changes. `PatternTables::from_toml` accepts replacement tables
//! at startup for externally configured deployments.
//!
//! The tables are process-wide and read-only: loaded once, shared by every
//! concurrent file scan. A malformed entry is a fatal configuration error —
//! the engine refuses to start rather than silently under-detect.

use crate::signal::HttpMethod;
use crate::{WormsignError, WormsignResult};
use aho_corasick::AhoCorasick;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

// ─── Embedded TOML Data ────────────────────────────────────────────

const CREDENTIALS_TOML: &str = include_str!("../../data/patterns/credentials.toml");
const CAMPAIGN_TOML: &str = include_str!("../../data/patterns/campaign.toml");
const EXECUTION_TOML: &str = include_str!("../../data/patterns/execution.toml");
const NETWORK_TOML: &str = include_str!("../../data/patterns/network.toml");

// ─── Table Types ───────────────────────────────────────────────────

/// A named set of path fragments considered credential-bearing
#[derive(Debug, Clone)]
pub struct SensitivePathPattern {
    pub name: String,
    pub fragments: Vec<String>,
}

/// Named command regex (destructive command, secret-scanner invocation)
#[derive(Debug)]
pub struct CommandPattern {
    pub name: String,
    pub regex: Regex,
}

/// Recognized HTTP client call chain with an optional implied method
#[derive(Debug, Clone)]
pub struct HttpClientPattern {
    pub chain: String,
    pub method: Option<HttpMethod>,
}

/// The full, immutable pattern registry
#[derive(Debug)]
pub struct PatternTables {
    pub sensitive_paths: Vec<SensitivePathPattern>,
    pub ci_indicator_names: Vec<String>,
    pub sensitive_env_names: Vec<String>,
    pub credential_name_fragments: Vec<String>,
    pub markers: Vec<String>,
    pub ioc_filenames: Vec<String>,
    pub fs_read_callees: Vec<String>,
    pub exec_callees: Vec<String>,
    pub encode_callees: Vec<String>,
    pub install_hooks: Vec<String>,
    pub destructive_commands: Vec<CommandPattern>,
    pub secret_scanner_commands: Vec<CommandPattern>,
    pub install_script_commands: Vec<CommandPattern>,
    pub workflow_commands: Vec<CommandPattern>,
    pub http_clients: Vec<HttpClientPattern>,
    pub metadata_hosts: Vec<String>,
    pub code_hosting_hosts: Vec<String>,
    pub write_endpoint_fragments: Vec<String>,
    marker_search: AhoCorasick,
    ioc_search: AhoCorasick,
}

// ─── Singleton ─────────────────────────────────────────────────────

static TABLES: OnceLock<Result<PatternTables, String>> = OnceLock::new();

impl PatternTables {
    /// The embedded pattern tables (loaded once, cached forever).
    ///
    /// Fails if any embedded table is malformed — a startup-fatal
    /// configuration error.
    pub fn global() -> WormsignResult<&'static PatternTables> {
        let loaded = TABLES.get_or_init(|| {
            Self::from_toml(CREDENTIALS_TOML, CAMPAIGN_TOML, EXECUTION_TOML, NETWORK_TOML)
                .map_err(|e| e.to_string())
        });
        match loaded {
            Ok(t) => Ok(t),
            Err(msg) => Err(WormsignError::PatternTable(msg.clone())),
        }
    }

    /// Load replacement tables from a directory holding the four TOML
    /// files (`credentials.toml`, `campaign.toml`, `execution.toml`,
    /// `network.toml`). Same validation as the embedded set.
    pub fn load_external(dir: &Path) -> WormsignResult<Self> {
        let read = |name: &str| -> WormsignResult<String> {
            std::fs::read_to_string(dir.join(name)).map_err(|e| {
                WormsignError::PatternTable(format!(
                    "cannot read {} from {}: {}",
                    name,
                    dir.display(),
                    e
                ))
            })
        };
        let credentials = read("credentials.toml")?;
        let campaign = read("campaign.toml")?;
        let execution = read("execution.toml")?;
        let network = read("network.toml")?;
        Self::from_toml(&credentials, &campaign, &execution, &network)
    }

    /// Parse and validate a full table set from TOML sources.
    pub fn from_toml(
        credentials: &str,
        campaign: &str,
        execution: &str,
        network: &str,
    ) -> WormsignResult<Self> {
        let creds: CredentialsFile = parse("credentials", credentials)?;
        let camp: CampaignFile = parse("campaign", campaign)?;
        let exec: ExecutionFile = parse("execution", execution)?;
        let net: NetworkFile = parse("network", network)?;

        let sensitive_paths: Vec<SensitivePathPattern> = creds
            .path
            .into_iter()
            .map(|p| SensitivePathPattern {
                name: p.name,
                fragments: p.fragments,
            })
            .collect();

        for p in &sensitive_paths {
            if p.name.is_empty() || p.fragments.is_empty() || p.fragments.iter().any(|f| f.len() < 3)
            {
                return Err(WormsignError::PatternTable(format!(
                    "sensitive path pattern '{}' has an empty or too-short fragment",
                    p.name
                )));
            }
        }
        for m in &camp.markers {
            if m.len() < 4 {
                return Err(WormsignError::PatternTable(format!(
                    "campaign marker '{}' too short to be meaningful",
                    m
                )));
            }
        }

        let destructive_commands = compile_commands("destructive", exec.destructive)?;
        let secret_scanner_commands = compile_commands("secret_scanner", exec.secret_scanner)?;
        let install_script_commands = compile_commands("install_script", exec.install_script)?;
        let workflow_commands = compile_commands("workflow", camp.workflow)?;

        let marker_search = AhoCorasick::new(&camp.markers).map_err(|e| {
            WormsignError::PatternTable(format!("marker automaton build failed: {}", e))
        })?;
        let ioc_search = AhoCorasick::new(&camp.ioc_filenames).map_err(|e| {
            WormsignError::PatternTable(format!("IOC filename automaton build failed: {}", e))
        })?;

        let http_clients = net
            .client
            .into_iter()
            .map(|c| {
                let method = match c.method.as_deref() {
                    None => Ok(None),
                    Some("GET") => Ok(Some(HttpMethod::Get)),
                    Some("POST") => Ok(Some(HttpMethod::Post)),
                    Some("PUT") => Ok(Some(HttpMethod::Put)),
                    Some("DELETE") => Ok(Some(HttpMethod::Delete)),
                    Some(other) => Err(WormsignError::PatternTable(format!(
                        "unknown HTTP method '{}' for client '{}'",
                        other, c.chain
                    ))),
                }?;
                Ok(HttpClientPattern {
                    chain: c.chain,
                    method,
                })
            })
            .collect::<WormsignResult<Vec<_>>>()?;

        let tables = Self {
            sensitive_paths,
            ci_indicator_names: creds.ci_indicator_names,
            sensitive_env_names: creds.sensitive_env_names,
            credential_name_fragments: creds.credential_name_fragments,
            markers: camp.markers,
            ioc_filenames: camp.ioc_filenames,
            fs_read_callees: exec.fs_read_callees,
            exec_callees: exec.exec_callees,
            encode_callees: exec.encode_callees,
            install_hooks: exec.install_hooks,
            destructive_commands,
            secret_scanner_commands,
            install_script_commands,
            workflow_commands,
            http_clients,
            metadata_hosts: net.metadata_hosts,
            code_hosting_hosts: net.code_hosting_hosts,
            write_endpoint_fragments: net.write_endpoint_fragments,
            marker_search,
            ioc_search,
        };

        tracing::info!(
            "Pattern tables loaded: {} sensitive paths, {} markers, {} IOC filenames, \
             {} command patterns, {} HTTP clients",
            tables.sensitive_paths.len(),
            tables.markers.len(),
            tables.ioc_filenames.len(),
            tables.destructive_commands.len()
                + tables.secret_scanner_commands.len()
                + tables.install_script_commands.len()
                + tables.workflow_commands.len(),
            tables.http_clients.len(),
        );

        Ok(tables)
    }

    // ─── Lookups ───────────────────────────────────────────────────

    /// First sensitive path pattern with a fragment contained in `text`
    pub fn match_sensitive_path(&self, text: &str) -> Option<&SensitivePathPattern> {
        self.sensitive_paths
            .iter()
            .find(|p| p.fragments.iter().any(|f| text.contains(f.as_str())))
    }

    pub fn is_fs_read_callee(&self, callee: &str) -> bool {
        self.fs_read_callees.iter().any(|c| c == callee)
    }

    pub fn is_exec_callee(&self, callee: &str) -> bool {
        self.exec_callees.iter().any(|c| c == callee)
    }

    pub fn is_encode_callee(&self, callee: &str) -> bool {
        self.encode_callees.iter().any(|c| c == callee)
    }

    pub fn is_ci_indicator(&self, name: &str) -> bool {
        self.ci_indicator_names.iter().any(|n| n == name)
    }

    pub fn is_sensitive_env(&self, name: &str) -> bool {
        self.sensitive_env_names.iter().any(|n| n == name)
    }

    /// Case-insensitive fragment match against a member/identifier name
    pub fn is_credential_name(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.credential_name_fragments
            .iter()
            .any(|f| lower.contains(f.as_str()))
    }

    pub fn match_destructive(&self, text: &str) -> Option<&CommandPattern> {
        self.destructive_commands.iter().find(|p| p.regex.is_match(text))
    }

    pub fn match_secret_scanner(&self, text: &str) -> Option<&CommandPattern> {
        self.secret_scanner_commands
            .iter()
            .find(|p| p.regex.is_match(text))
    }

    pub fn is_secret_scanner_pattern(&self, name: &str) -> bool {
        self.secret_scanner_commands.iter().any(|p| p.name == name)
    }

    /// Whether a package.json script key is an install-time lifecycle hook
    pub fn is_install_hook(&self, name: &str) -> bool {
        self.install_hooks.iter().any(|h| h == name)
    }

    pub fn match_install_script(&self, text: &str) -> Option<&CommandPattern> {
        self.install_script_commands
            .iter()
            .find(|p| p.regex.is_match(text))
    }

    pub fn match_workflow(&self, text: &str) -> Option<&CommandPattern> {
        self.workflow_commands.iter().find(|p| p.regex.is_match(text))
    }

    pub fn match_http_client(&self, callee: &str) -> Option<&HttpClientPattern> {
        self.http_clients.iter().find(|c| c.chain == callee)
    }

    pub fn is_metadata_host(&self, host: &str) -> bool {
        self.metadata_hosts.iter().any(|h| h == host)
    }

    pub fn is_code_hosting_host(&self, host: &str) -> bool {
        self.code_hosting_hosts.iter().any(|h| h == host)
    }

    pub fn has_write_endpoint_fragment(&self, path: &str) -> bool {
        self.write_endpoint_fragments
            .iter()
            .any(|f| path.contains(f.as_str()))
    }

    /// Campaign markers present in `text`, word-boundary guarded
    pub fn find_markers<'a>(&'a self, text: &str) -> Vec<&'a str> {
        bounded_matches(&self.marker_search, &self.markers, text)
    }

    /// IOC artifact filenames present in `text`, word-boundary guarded
    pub fn find_ioc_filenames<'a>(&'a self, text: &str) -> Vec<&'a str> {
        bounded_matches(&self.ioc_search, &self.ioc_filenames, text)
    }
}

/// Multi-pattern search rejecting matches glued to surrounding identifier
/// characters (`soundcloud.json` must not match `cloud.json`).
fn bounded_matches<'a>(ac: &AhoCorasick, patterns: &'a [String], text: &str) -> Vec<&'a str> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    for m in ac.find_iter(text) {
        let before_ok = m.start() == 0 || !bytes[m.start() - 1].is_ascii_alphanumeric();
        let after_ok = m.end() >= bytes.len() || !bytes[m.end()].is_ascii_alphanumeric();
        if before_ok && after_ok {
            let pat = patterns[m.pattern().as_usize()].as_str();
            if !found.contains(&pat) {
                found.push(pat);
            }
        }
    }
    found
}

fn parse<T: serde::de::DeserializeOwned>(table: &str, toml_src: &str) -> WormsignResult<T> {
    toml::from_str(toml_src).map_err(|e| {
        WormsignError::PatternTable(format!("failed to parse {} table: {}", table, e))
    })
}

fn compile_commands(
    table: &str,
    entries: Vec<CommandEntry>,
) -> WormsignResult<Vec<CommandPattern>> {
    entries
        .into_iter()
        .map(|e| {
            let regex = Regex::new(&e.pattern).map_err(|err| {
                WormsignError::PatternTable(format!(
                    "invalid {} pattern '{}': {}",
                    table, e.name, err
                ))
            })?;
            Ok(CommandPattern {
                name: e.name,
                regex,
            })
        })
        .collect()
}

// ─── TOML Schemas ──────────────────────────────────────────────────

#[derive(Deserialize)]
struct CredentialsFile {
    ci_indicator_names: Vec<String>,
    sensitive_env_names: Vec<String>,
    credential_name_fragments: Vec<String>,
    #[serde(default)]
    path: Vec<PathEntry>,
}

#[derive(Deserialize)]
struct PathEntry {
    name: String,
    fragments: Vec<String>,
}

#[derive(Deserialize)]
struct CampaignFile {
    markers: Vec<String>,
    ioc_filenames: Vec<String>,
    #[serde(default)]
    workflow: Vec<CommandEntry>,
}

#[derive(Deserialize)]
struct ExecutionFile {
    fs_read_callees: Vec<String>,
    exec_callees: Vec<String>,
    encode_callees: Vec<String>,
    #[serde(default)]
    install_hooks: Vec<String>,
    #[serde(default)]
    destructive: Vec<CommandEntry>,
    #[serde(default)]
    secret_scanner: Vec<CommandEntry>,
    #[serde(default)]
    install_script: Vec<CommandEntry>,
}

#[derive(Deserialize)]
struct CommandEntry {
    name: String,
    pattern: String,
}

#[derive(Deserialize)]
struct NetworkFile {
    metadata_hosts: Vec<String>,
    code_hosting_hosts: Vec<String>,
    write_endpoint_fragments: Vec<String>,
    #[serde(default)]
    client: Vec<ClientEntry>,
}

#[derive(Deserialize)]
struct ClientEntry {
    chain: String,
    #[serde(default)]
    method: Option<String>,
}
