//! Canonical template formatting.
//!
//! Splits a template into text runs and tags, then re-emits it with each
//! tag on its own line, indented by block depth. Whitespace-control
//! markers (`-`) are added exactly where the formatter introduces
//! whitespace the source did not contain, so under the playground
//! environment (trim_blocks + lstrip_blocks, see [`super::playground_env`])
//! the canonical form renders byte-identically to the input.
//!
//! Boundaries that already carry whitespace are left verbatim, which also
//! makes formatting idempotent. Raw blocks are never touched.

use thiserror::Error;

use super::playground_env;

const INDENT: &str = "    ";

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("{0}")]
    Parse(#[from] minijinja::Error),
    #[error("unterminated tag in template")]
    UnterminatedTag,
}

/// Produce the canonical form of `source`, or fail without side effects.
pub fn format_template(source: &str) -> Result<String, FormatError> {
    // The engine validates first; an unparseable template is a format
    // error and the caller keeps its text unchanged.
    let env = playground_env();
    env.template_from_str(source)?;

    let segments = scan(source)?;
    Ok(emit(&segments))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Block,
    Expr,
    Comment,
}

impl TagKind {
    fn open(self) -> &'static str {
        match self {
            TagKind::Block => "{%",
            TagKind::Expr => "{{",
            TagKind::Comment => "{#",
        }
    }

    fn close(self) -> &'static str {
        match self {
            TagKind::Block => "%}",
            TagKind::Expr => "}}",
            TagKind::Comment => "#}",
        }
    }
}

#[derive(Debug)]
enum Segment<'a> {
    Text(&'a str),
    Tag {
        kind: TagKind,
        body: &'a str,
        lmark: Option<char>,
        rmark: Option<char>,
    },
}

fn scan(source: &str) -> Result<Vec<Segment<'_>>, FormatError> {
    let bytes = source.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    let mut in_raw = false;

    while i + 1 < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        let kind = match bytes[i + 1] {
            b'%' => TagKind::Block,
            b'{' => TagKind::Expr,
            b'#' => TagKind::Comment,
            _ => {
                i += 1;
                continue;
            }
        };
        if in_raw {
            // Inside a raw block only `{% endraw %}` terminates; everything
            // else is literal text.
            if kind != TagKind::Block {
                i += 1;
                continue;
            }
            let Ok((segment, next)) = scan_tag(source, i, kind) else {
                i += 1;
                continue;
            };
            let is_endraw = matches!(
                &segment,
                Segment::Tag { body, .. } if keyword(body) == Some("endraw")
            );
            if !is_endraw {
                i += 1;
                continue;
            }
            if text_start < i {
                segments.push(Segment::Text(&source[text_start..i]));
            }
            segments.push(segment);
            in_raw = false;
            i = next;
            text_start = next;
            continue;
        }

        if text_start < i {
            segments.push(Segment::Text(&source[text_start..i]));
        }
        let (segment, next) = scan_tag(source, i, kind)?;
        if let Segment::Tag { kind: TagKind::Block, body, .. } = &segment {
            if keyword(body) == Some("raw") {
                in_raw = true;
            }
        }
        segments.push(segment);
        i = next;
        text_start = next;
    }

    if text_start < source.len() {
        segments.push(Segment::Text(&source[text_start..]));
    }
    if in_raw {
        return Err(FormatError::UnterminatedTag);
    }
    Ok(segments)
}

fn scan_tag(source: &str, start: usize, kind: TagKind) -> Result<(Segment<'_>, usize), FormatError> {
    let bytes = source.as_bytes();
    let mut i = start + 2;
    let mut lmark = None;
    if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
        lmark = Some(bytes[i] as char);
        i += 1;
    }
    let body_start = i;

    let close_at = if kind == TagKind::Comment {
        // Comments carry no string literals; scan straight for `#}`.
        let mut j = i;
        loop {
            if j + 1 >= bytes.len() {
                return Err(FormatError::UnterminatedTag);
            }
            if bytes[j] == b'#' && bytes[j + 1] == b'}' {
                break j;
            }
            j += 1;
        }
    } else {
        scan_tag_close(bytes, i, kind)?
    };

    let mut body_end = close_at;
    let mut rmark = None;
    if body_end > body_start && (bytes[body_end - 1] == b'-' || bytes[body_end - 1] == b'+') {
        rmark = Some(bytes[body_end - 1] as char);
        body_end -= 1;
    }

    let segment = Segment::Tag {
        kind,
        body: source[body_start..body_end].trim(),
        lmark,
        rmark,
    };
    Ok((segment, close_at + 2))
}

/// Find the closing delimiter of a block or expression tag, skipping
/// string literals and balanced brackets.
fn scan_tag_close(bytes: &[u8], from: usize, kind: TagKind) -> Result<usize, FormatError> {
    let mut i = from;
    let mut depth = 0usize;
    let mut in_str: Option<u8> = None;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(quote) = in_str {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == quote {
                in_str = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' => {
                in_str = Some(b);
                i += 1;
            }
            b'{' | b'[' | b'(' => {
                depth += 1;
                i += 1;
            }
            b']' | b')' => {
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b'}' => {
                if kind == TagKind::Expr
                    && depth == 0
                    && i + 1 < bytes.len()
                    && bytes[i + 1] == b'}'
                {
                    return Ok(i);
                }
                depth = depth.saturating_sub(1);
                i += 1;
            }
            b'%' => {
                if kind == TagKind::Block && depth == 0 && i + 1 < bytes.len() && bytes[i + 1] == b'}'
                {
                    return Ok(i);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    Err(FormatError::UnterminatedTag)
}

fn keyword(body: &str) -> Option<&str> {
    body.split_whitespace().next()
}

struct DepthChange {
    dedent_before: bool,
    indent_after: bool,
}

fn classify(kind: TagKind, body: &str) -> DepthChange {
    if kind != TagKind::Block {
        return DepthChange {
            dedent_before: false,
            indent_after: false,
        };
    }
    match keyword(body) {
        Some(kw) if kw.starts_with("end") => DepthChange {
            dedent_before: true,
            indent_after: false,
        },
        Some("elif") | Some("else") => DepthChange {
            dedent_before: true,
            indent_after: true,
        },
        Some("for") | Some("if") | Some("macro") | Some("call") | Some("filter")
        | Some("block") | Some("raw") => DepthChange {
            dedent_before: false,
            indent_after: true,
        },
        // Inline `set x = ...` stays flat; the block form opens a scope.
        Some("set") if !body.contains('=') => DepthChange {
            dedent_before: false,
            indent_after: true,
        },
        _ => DepthChange {
            dedent_before: false,
            indent_after: false,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Keep,
    Insert,
}

fn emit(segments: &[Segment<'_>]) -> String {
    let n = segments.len();
    let mut actions = vec![Boundary::Keep; n];
    let mut ltrim_extra = vec![false; n];
    let mut rtrim_extra = vec![false; n];

    for i in 1..n {
        actions[i] = match (&segments[i - 1], &segments[i]) {
            (Segment::Text(text), Segment::Tag { body, lmark, .. }) => {
                let ends_ws = text
                    .chars()
                    .last()
                    .map(char::is_whitespace)
                    .unwrap_or(false);
                if ends_ws || *lmark == Some('+') || keyword(body) == Some("endraw") {
                    Boundary::Keep
                } else {
                    if lmark.is_none() {
                        ltrim_extra[i] = true;
                    }
                    Boundary::Insert
                }
            }
            (Segment::Tag { body, rmark, .. }, Segment::Text(text)) => {
                let starts_ws = text
                    .chars()
                    .next()
                    .map(char::is_whitespace)
                    .unwrap_or(false);
                if starts_ws || *rmark == Some('+') || keyword(body) == Some("raw") {
                    Boundary::Keep
                } else {
                    if rmark.is_none() {
                        rtrim_extra[i - 1] = true;
                    }
                    Boundary::Insert
                }
            }
            (Segment::Tag { rmark, .. }, Segment::Tag { lmark, .. }) => {
                if *rmark == Some('-') || *lmark == Some('-') {
                    Boundary::Insert
                } else if *rmark == Some('+') && *lmark == Some('+') {
                    Boundary::Keep
                } else if *lmark == Some('+') {
                    rtrim_extra[i - 1] = true;
                    Boundary::Insert
                } else {
                    ltrim_extra[i] = true;
                    Boundary::Insert
                }
            }
            (Segment::Text(_), Segment::Text(_)) => Boundary::Keep,
        };
    }

    let mut out = String::new();
    let mut depth = 0usize;
    for (i, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Text(text) => {
                if actions[i] == Boundary::Insert {
                    break_line(&mut out, depth);
                }
                out.push_str(text);
            }
            Segment::Tag {
                kind,
                body,
                lmark,
                rmark,
            } => {
                let change = classify(*kind, body);
                if change.dedent_before {
                    depth = depth.saturating_sub(1);
                }
                if actions[i] == Boundary::Insert {
                    break_line(&mut out, depth);
                }
                let left = if ltrim_extra[i] { Some('-') } else { *lmark };
                let right = if rtrim_extra[i] { Some('-') } else { *rmark };
                out.push_str(kind.open());
                if let Some(mark) = left {
                    out.push(mark);
                }
                out.push(' ');
                out.push_str(body);
                out.push(' ');
                if let Some(mark) = right {
                    out.push(mark);
                }
                out.push_str(kind.close());
                if change.indent_after {
                    depth += 1;
                }
            }
        }
    }
    out
}

fn break_line(out: &mut String, depth: usize) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
