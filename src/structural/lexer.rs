//! Minimal JavaScript lexer — just enough structure for fact extraction
//!
//! Produces identifiers, string/template literals, and single-character
//! punctuation, plus the byte range of every comment. Numbers, keywords,
//! and operators beyond single characters carry no signal value and are
//! reduced to punctuation or skipped.

/// Lex failure — unterminated string, template, or block comment.
///
/// Recoverable at the file level: the caller records a parse warning and
/// continues with the rest of the scan.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str { value: String, template: bool },
    Punct(char),
}

#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
    /// Byte offset just past the token (used for argument-span slicing)
    pub start: usize,
    pub end: usize,
}

/// Comment body range (markers excluded) plus the line it starts on
#[derive(Debug, Clone)]
pub(crate) struct CommentSpan {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LexOutput {
    pub tokens: Vec<Token>,
    pub comments: Vec<CommentSpan>,
}

pub(crate) fn lex(src: &str) -> Result<LexOutput, ParseError> {
    let bytes = src.as_bytes();
    let mut out = LexOutput::default();
    let mut pos = 0usize;
    let mut line = 1usize;

    while pos < bytes.len() {
        let c = bytes[pos];

        match c {
            b'\n' => {
                line += 1;
                pos += 1;
            }
            b' ' | b'\t' | b'\r' => pos += 1,

            // ── Comments ──
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                let body_start = pos + 2;
                let mut end = body_start;
                while end < bytes.len() && bytes[end] != b'\n' {
                    end += 1;
                }
                out.comments.push(CommentSpan {
                    start: body_start,
                    end,
                    line,
                });
                pos = end;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                let body_start = pos + 2;
                let start_line = line;
                let mut end = body_start;
                loop {
                    if end + 1 >= bytes.len() {
                        return Err(ParseError {
                            message: "unterminated block comment".into(),
                            line: start_line,
                        });
                    }
                    if bytes[end] == b'*' && bytes[end + 1] == b'/' {
                        break;
                    }
                    if bytes[end] == b'\n' {
                        line += 1;
                    }
                    end += 1;
                }
                out.comments.push(CommentSpan {
                    start: body_start,
                    end,
                    line: start_line,
                });
                pos = end + 2;
            }

            // ── String literals ──
            b'\'' | b'"' => {
                let quote = c;
                let start_line = line;
                let start = pos;
                let mut end = pos + 1;
                loop {
                    match bytes.get(end) {
                        None | Some(b'\n') => {
                            return Err(ParseError {
                                message: "unterminated string literal".into(),
                                line: start_line,
                            });
                        }
                        Some(b'\\') => end += 2,
                        Some(&b) if b == quote => break,
                        Some(_) => end += 1,
                    }
                }
                let value = src[start + 1..end].to_string();
                out.tokens.push(Token {
                    kind: TokenKind::Str {
                        value,
                        template: false,
                    },
                    line: start_line,
                    start,
                    end: end + 1,
                });
                pos = end + 1;
            }

            // ── Template literals ──
            b'`' => {
                let start_line = line;
                let start = pos;
                let mut end = pos + 1;
                let mut brace_depth = 0usize;
                loop {
                    match bytes.get(end) {
                        None => {
                            return Err(ParseError {
                                message: "unterminated template literal".into(),
                                line: start_line,
                            });
                        }
                        Some(b'\\') => end += 2,
                        Some(b'\n') => {
                            line += 1;
                            end += 1;
                        }
                        Some(b'$') if bytes.get(end + 1) == Some(&b'{') => {
                            brace_depth += 1;
                            end += 2;
                        }
                        Some(b'}') if brace_depth > 0 => {
                            brace_depth -= 1;
                            end += 1;
                        }
                        Some(b'`') if brace_depth == 0 => break,
                        Some(_) => end += 1,
                    }
                }
                let value = src[start + 1..end].to_string();
                out.tokens.push(Token {
                    kind: TokenKind::Str {
                        value,
                        template: true,
                    },
                    line: start_line,
                    start,
                    end: end + 1,
                });
                pos = end + 1;
            }

            // ── Identifiers ──
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => {
                let start = pos;
                let mut end = pos + 1;
                while end < bytes.len() && matches!(bytes[end], b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'$') {
                    end += 1;
                }
                out.tokens.push(Token {
                    kind: TokenKind::Ident(src[start..end].to_string()),
                    line,
                    start,
                    end,
                });
                pos = end;
            }

            // ── Numbers: skipped, they carry no signal ──
            b'0'..=b'9' => {
                let mut end = pos + 1;
                while end < bytes.len()
                    && matches!(bytes[end], b'0'..=b'9' | b'.' | b'x' | b'e' | b'E' | b'a'..=b'f' | b'A'..=b'F' | b'_')
                {
                    end += 1;
                }
                pos = end;
            }

            // ── Everything else is punctuation ──
            _ => {
                out.tokens.push(Token {
                    kind: TokenKind::Punct(c as char),
                    line,
                    start: pos,
                    end: pos + 1,
                });
                pos += 1;
            }
        }
    }

    Ok(out)
}
