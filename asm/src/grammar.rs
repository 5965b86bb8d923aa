//! Syntax-level parsing of a single operation body, e.g.
//! `"d0,data=!0x10?gt"`, into its named pieces. Mirrors the original's two
//! regexes (`_re_label` is `line::split_label`; `_re_op` is [`parse_op`])
//! without depending on the `regex` crate — the grammar is simple enough to
//! hand-split.

/// The syntactic pieces of a general-form operation line, before any
/// mnemonic is looked up against a table.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedOp {
    pub dst: String,
    pub dst_b: Option<String>,
    pub src: String,
    pub cond: Option<String>,
    pub cond_src: Option<String>,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

fn is_src_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '@' | '!' | ' ')
}

/// Parse `dst[,dst2]=src[?cond[,cond_src]]`. Returns `None` on any syntax
/// mismatch (equivalent to the original `_re_op` failing to match), which
/// the caller reports as a "Syntax Error" compile error.
#[must_use]
pub fn parse_op(op: &str) -> Option<ParsedOp> {
    let (dst_part, rest) = op.split_once('=')?;

    let (dst, dst_b) = match dst_part.split_once(',') {
        Some((a, b)) => (a, Some(b)),
        None => (dst_part, None),
    };
    if dst.is_empty() || !dst.chars().all(is_word_char) {
        return None;
    }
    if let Some(b) = dst_b
        && (b.is_empty() || !b.chars().all(is_word_char))
    {
        return None;
    }

    let (src_part, cond_part) = match rest.split_once('?') {
        Some((a, b)) => (a, Some(b)),
        None => (rest, None),
    };
    if src_part.is_empty() || !src_part.chars().all(is_src_char) {
        return None;
    }

    let (cond, cond_src) = match cond_part {
        None => (None, None),
        Some(c) => {
            let (cond, cond_src) = match c.split_once(',') {
                Some((a, b)) => (a, Some(b)),
                None => (c, None),
            };
            if cond.is_empty() || !cond.chars().all(|ch| ch.is_ascii_alphabetic()) {
                return None;
            }
            if let Some(cs) = cond_src
                && (cs.is_empty() || !cs.chars().all(is_word_char))
            {
                return None;
            }
            (Some(cond.to_string()), cond_src.map(str::to_string))
        }
    };

    Some(ParsedOp { dst: dst.to_string(), dst_b: dst_b.map(str::to_string), src: src_part.to_string(), cond, cond_src })
}
