//! Structural extraction — one source file in, ordered structural facts out
//!
//! Parses a JavaScript/TypeScript source file into the lightweight facts the
//! signal extractor consumes: call expressions (callee chain plus argument
//! literals), member-access chains, string and template literals, import
//! targets, and comment byte ranges.
//!
//! Liveness is structural, not lexical: the lexer records every comment
//! range, then each comment body is re-lexed as code so that commented-out
//! calls still yield facts — tagged dead. A dangerous literal inside an
//! otherwise-live argument stays live.
//!
//! A file that cannot be lexed (unterminated string, template, or block
//! comment) is recoverable at the file level: it yields an empty fact set
//! plus a [`ParseWarning`] and the scan of other files continues.

mod lexer;
mod parser;

pub use lexer::ParseError;

use std::path::{Path, PathBuf};

// ─── Structural Facts ──────────────────────────────────────────────

/// Byte range of a comment in the original source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

/// A string or template literal appearing as a direct call argument
#[derive(Debug, Clone)]
pub struct StringLit {
    pub value: String,
    pub template: bool,
}

/// One call expression: `a.b.c(args...)`
///
/// `callee` is the dotted chain; a chain hanging off a call result is
/// prefixed `().` (e.g. `().toString` for `Buffer.from(x).toString()`).
/// `arg_text` is the raw source slice between the parentheses, so nested
/// expressions stay inspectable without full expression parsing.
#[derive(Debug, Clone)]
pub struct CallFact {
    pub callee: String,
    pub literal_args: Vec<StringLit>,
    pub arg_text: String,
    pub line: usize,
    pub live: bool,
    pub in_condition: bool,
}

/// A dotted member-access chain that is not (directly) called
#[derive(Debug, Clone)]
pub struct MemberFact {
    pub chain: String,
    pub line: usize,
    pub live: bool,
    pub in_condition: bool,
}

/// Any string or template literal in the file, in source order
#[derive(Debug, Clone)]
pub struct StringFact {
    pub value: String,
    pub template: bool,
    pub line: usize,
    pub live: bool,
}

/// `require('x')` / `import ... from 'x'` target
#[derive(Debug, Clone)]
pub struct ImportFact {
    pub target: String,
    pub line: usize,
    pub live: bool,
}

/// Recoverable parse failure, recorded alongside an empty fact set
#[derive(Debug, Clone)]
pub struct ParseWarning {
    pub message: String,
    pub line: usize,
}

/// Ordered structural facts for one source file
#[derive(Debug, Clone)]
pub struct SourceFacts {
    pub path: PathBuf,
    pub calls: Vec<CallFact>,
    pub members: Vec<MemberFact>,
    pub strings: Vec<StringFact>,
    pub imports: Vec<ImportFact>,
    pub comments: Vec<ByteRange>,
    pub parse_warning: Option<ParseWarning>,
}

impl SourceFacts {
    fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            calls: Vec::new(),
            members: Vec::new(),
            strings: Vec::new(),
            imports: Vec::new(),
            comments: Vec::new(),
            parse_warning: None,
        }
    }
}

// ─── Entry Point ───────────────────────────────────────────────────

/// Extract structural facts from one source file.
///
/// Pure function of the content: identical input text always yields an
/// identical, identically-ordered fact set. Never fails hard — a lex error
/// is downgraded to a [`ParseWarning`] on an empty fact set.
pub fn extract(path: &Path, content: &str) -> SourceFacts {
    let lexed = match lexer::lex(content) {
        Ok(l) => l,
        Err(e) => {
            let mut facts = SourceFacts::empty(path);
            facts.parse_warning = Some(ParseWarning {
                message: e.message,
                line: e.line,
            });
            return facts;
        }
    };

    let mut facts = SourceFacts::empty(path);
    facts.comments = lexed
        .comments
        .iter()
        .map(|c| ByteRange {
            start: c.start,
            end: c.end,
        })
        .collect();

    parser::build_facts(content, &lexed.tokens, true, 0, &mut facts);

    // Re-lex each comment body so commented-out code still yields facts,
    // tagged dead. A comment body that is not code simply produces none.
    for comment in &lexed.comments {
        let body = &content[comment.start..comment.end];
        if let Ok(dead) = lexer::lex(body) {
            parser::build_facts(body, &dead.tokens, false, comment.line - 1, &mut facts);
        }
    }

    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn facts_of(src: &str) -> SourceFacts {
        extract(Path::new("test.js"), src)
    }

    #[test]
    fn test_call_with_literal_arg() {
        let facts = facts_of(r#"fs.readFileSync('/etc/passwd', 'utf8');"#);
        let call = facts
            .calls
            .iter()
            .find(|c| c.callee == "fs.readFileSync")
            .expect("readFileSync call fact");
        assert_eq!(call.literal_args.len(), 2);
        assert_eq!(call.literal_args[0].value, "/etc/passwd");
        assert!(call.live);
    }

    #[test]
    fn test_nested_call_facts_both_recorded() {
        let facts = facts_of(r#"outer(inner('x'), 'y');"#);
        assert!(facts.calls.iter().any(|c| c.callee == "outer"));
        assert!(facts.calls.iter().any(|c| c.callee == "inner"));
        let outer = facts.calls.iter().find(|c| c.callee == "outer").unwrap();
        assert!(outer.arg_text.contains("inner('x')"));
    }

    #[test]
    fn test_commented_out_call_is_dead() {
        let src = "// execSync('rm -rf $HOME');\nconsole.log('ok');";
        let facts = facts_of(src);
        let exec = facts
            .calls
            .iter()
            .find(|c| c.callee == "execSync")
            .expect("dead execSync fact");
        assert!(!exec.live, "commented-out call must be dead");
        let log = facts.calls.iter().find(|c| c.callee == "console.log").unwrap();
        assert!(log.live);
    }

    #[test]
    fn test_member_chain_in_if_condition() {
        let facts = facts_of("if (process.env.CI) { doThing(); }");
        let m = facts
            .members
            .iter()
            .find(|m| m.chain == "process.env.CI")
            .expect("member fact");
        assert!(m.in_condition);
    }

    #[test]
    fn test_member_chain_outside_condition() {
        let facts = facts_of("const home = process.env.HOME;");
        let m = facts.members.iter().find(|m| m.chain == "process.env.HOME").unwrap();
        assert!(!m.in_condition);
    }

    #[test]
    fn test_template_literal_recorded() {
        let facts = facts_of("const url = `https://api.github.com/repos/${owner}/${repo}`;");
        let s = facts
            .strings
            .iter()
            .find(|s| s.value.starts_with("https://api.github.com"))
            .expect("template string fact");
        assert!(s.template);
    }

    #[test]
    fn test_require_import_target() {
        let facts = facts_of("const fs = require('fs');");
        assert_eq!(facts.imports.len(), 1);
        assert_eq!(facts.imports[0].target, "fs");
    }

    #[test]
    fn test_unterminated_string_yields_parse_warning() {
        let facts = facts_of("const x = 'oops\nconsole.log(x);");
        assert!(facts.parse_warning.is_some());
        assert!(facts.calls.is_empty());
        assert!(facts.strings.is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let src = std::concat!(
            "const fs = require('fs');\n",
            "// execSync('rm -rf $HOME');\n",
            "if (process.env.CI) { fs.readFileSync('a.json'); }\n",
        );
        let a = facts_of(src);
        let b = facts_of(src);
        assert_eq!(a.calls.len(), b.calls.len());
        for (x, y) in a.calls.iter().zip(&b.calls) {
            assert_eq!(x.callee, y.callee);
            assert_eq!(x.line, y.line);
            assert_eq!(x.live, y.live);
        }
        assert_eq!(a.strings.len(), b.strings.len());
    }

    #[test]
    fn test_dead_facts_line_numbers_offset_by_comment_line() {
        let src = "line1();\nline2();\n// execSync('x');\n";
        let facts = facts_of(src);
        let dead = facts.calls.iter().find(|c| !c.live).unwrap();
        assert_eq!(dead.line, 3);
    }
}
