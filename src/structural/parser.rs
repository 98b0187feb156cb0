//! Token stream → structural facts
//!
//! No AST: a single forward pass recognizes dotted callee chains, call
//! expressions with their raw argument spans, member accesses, and import
//! targets. Nested calls are visited by continuing the scan inside argument
//! spans rather than consuming them.

use super::lexer::{Token, TokenKind};
use super::{CallFact, ImportFact, MemberFact, SourceFacts, StringFact, StringLit};

/// Keywords that can precede `(` without being a callee
const NON_CALLEE_KEYWORDS: &[&str] = &[
    "if", "while", "for", "switch", "catch", "return", "function", "else", "do", "typeof",
];

/// Build facts from a token stream and append them to `facts`.
///
/// `live` tags every produced fact; `line_offset` shifts line numbers when
/// the tokens come from a re-lexed comment body.
pub(crate) fn build_facts(
    src: &str,
    tokens: &[Token],
    live: bool,
    line_offset: usize,
    facts: &mut SourceFacts,
) {
    let in_cond = condition_mask(tokens);

    // Every string literal, in source order
    for t in tokens {
        if let TokenKind::Str { value, template } = &t.kind {
            facts.strings.push(StringFact {
                value: value.clone(),
                template: *template,
                line: t.line + line_offset,
                live,
            });
        }
    }

    let mut i = 0usize;
    while i < tokens.len() {
        let t = &tokens[i];

        // ES import targets: `import 'x'` / `import ... from 'x'`
        if let TokenKind::Ident(word) = &t.kind {
            if word == "from" || word == "import" {
                if let Some(Token {
                    kind: TokenKind::Str { value, .. },
                    line,
                    ..
                }) = tokens.get(i + 1)
                {
                    facts.imports.push(ImportFact {
                        target: value.clone(),
                        line: line + line_offset,
                        live,
                    });
                    i += 2;
                    continue;
                }
            }
        }

        let first_seg = match &t.kind {
            TokenKind::Ident(s) if !NON_CALLEE_KEYWORDS.contains(&s.as_str()) => s,
            _ => {
                i += 1;
                continue;
            }
        };

        // A chain hanging off a call result keeps a `().` prefix so the
        // extractor can tell `Buffer.from(x).toString()` from `x.toString()`.
        let off_call_result = i >= 2
            && matches!(tokens[i - 1].kind, TokenKind::Punct('.'))
            && matches!(tokens[i - 2].kind, TokenKind::Punct(')'));

        // Collect the dotted chain
        let mut chain = String::new();
        if off_call_result {
            chain.push_str("().");
        }
        chain.push_str(first_seg);
        let mut j = i + 1;
        while j + 1 < tokens.len()
            && matches!(tokens[j].kind, TokenKind::Punct('.'))
            && matches!(tokens[j + 1].kind, TokenKind::Ident(_))
        {
            if let TokenKind::Ident(seg) = &tokens[j + 1].kind {
                chain.push('.');
                chain.push_str(seg);
            }
            j += 2;
        }

        let line = t.line + line_offset;
        let condition = in_cond[i];

        if matches!(tokens.get(j).map(|t| &t.kind), Some(TokenKind::Punct('('))) {
            // Call expression: find the matching close paren, collecting
            // string literals at argument top level on the way.
            let open = j;
            let mut depth = 1usize;
            let mut k = open + 1;
            let mut literal_args = Vec::new();
            let mut close = None;
            while k < tokens.len() {
                match &tokens[k].kind {
                    TokenKind::Punct('(') => depth += 1,
                    TokenKind::Punct(')') => {
                        depth -= 1;
                        if depth == 0 {
                            close = Some(k);
                            break;
                        }
                    }
                    TokenKind::Str { value, template } if depth == 1 => {
                        literal_args.push(StringLit {
                            value: value.clone(),
                            template: *template,
                        });
                    }
                    _ => {}
                }
                k += 1;
            }

            let arg_text = match close {
                Some(c) => src[tokens[open].end..tokens[c].start].to_string(),
                // Unbalanced (possible in a re-lexed comment fragment):
                // keep the rest of the span as the argument text.
                None => src[tokens[open].end..].to_string(),
            };

            if chain == "require" && literal_args.len() == 1 {
                facts.imports.push(ImportFact {
                    target: literal_args[0].value.clone(),
                    line,
                    live,
                });
            }

            facts.calls.push(CallFact {
                callee: chain,
                literal_args,
                arg_text,
                line,
                live,
                in_condition: condition,
            });

            // Continue *inside* the argument span so nested calls are
            // recorded as facts of their own.
            i = open + 1;
        } else {
            if chain.contains('.') && !chain.starts_with("().") {
                facts.members.push(MemberFact {
                    chain,
                    line,
                    live,
                    in_condition: condition,
                });
            }
            i = j;
        }
    }
}

/// For each token, whether it sits inside an `if (...)` / `while (...)`
/// condition span or a ternary guard.
fn condition_mask(tokens: &[Token]) -> Vec<bool> {
    let mut mask = vec![false; tokens.len()];
    let mut depth = 0usize;
    let mut cond_depths: Vec<usize> = Vec::new();
    let mut pending_branch = false;

    for (i, t) in tokens.iter().enumerate() {
        match &t.kind {
            TokenKind::Ident(s) if s == "if" || s == "while" => pending_branch = true,
            TokenKind::Punct('(') => {
                depth += 1;
                if pending_branch {
                    cond_depths.push(depth);
                    pending_branch = false;
                }
            }
            TokenKind::Punct(')') => {
                if cond_depths.last() == Some(&depth) {
                    cond_depths.pop();
                }
                depth = depth.saturating_sub(1);
            }
            TokenKind::Punct('?') if is_ternary(tokens, i) => mark_ternary_guard(tokens, i, &mut mask),
            TokenKind::Ident(_) => pending_branch = false,
            _ => {}
        }
        mask[i] = !cond_depths.is_empty();
    }

    mask
}

/// A lone `?` — not the `?.` optional-chaining or `??` nullish operator.
fn is_ternary(tokens: &[Token], i: usize) -> bool {
    let adjacent_q = |t: Option<&Token>| {
        matches!(
            t.map(|t| &t.kind),
            Some(TokenKind::Punct('.')) | Some(TokenKind::Punct('?'))
        )
    };
    !adjacent_q(tokens.get(i + 1)) && !(i > 0 && adjacent_q(tokens.get(i - 1)))
}

/// Mark the guard expression preceding a ternary `?`, walking back to the
/// nearest expression boundary. Comparison runs (`===`, `!=`, `<=`) are
/// stepped over; a bare `=` is an assignment and ends the guard.
fn mark_ternary_guard(tokens: &[Token], q: usize, mask: &mut [bool]) {
    let mut k = q;
    while k > 0 {
        match &tokens[k - 1].kind {
            TokenKind::Punct(c)
                if matches!(*c, ';' | '{' | '}' | '(' | '[' | ',' | ':' | '?') =>
            {
                break
            }
            TokenKind::Punct('=') if !is_comparison_eq(tokens, k - 1) => break,
            _ => {}
        }
        k -= 1;
        mask[k] = true;
    }
}

fn is_comparison_eq(tokens: &[Token], at: usize) -> bool {
    let cmp_part = |t: Option<&Token>| {
        matches!(
            t.map(|t| &t.kind),
            Some(TokenKind::Punct('='))
                | Some(TokenKind::Punct('!'))
                | Some(TokenKind::Punct('<'))
                | Some(TokenKind::Punct('>'))
        )
    };
    (at > 0 && cmp_part(tokens.get(at - 1))) || cmp_part(tokens.get(at + 1))
}
