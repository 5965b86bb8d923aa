//! Line-oriented source tokenizing: strips comments, pairs each line with
//! its effective labels (user-written, or an auto-generated `name+N` for the
//! Nth line following a user label), and lowercases the operation body
//! (mnemonics are case-insensitive).

/// One logical source line ready for grammar parsing.
pub struct SourceLine {
    /// Zero-based line number in the original source file.
    pub line_no: usize,
    /// The labels bound to this line — usually zero or one, but several
    /// bare `label:` lines in a row all bind to the same next line, so a
    /// line can carry more than one name for the same address.
    pub labels: Vec<String>,
    /// The lowercased, comment-and-whitespace-stripped operation text.
    pub op: String,
}

/// Strip a `#`-to-end-of-line comment, then trim surrounding whitespace.
fn strip_comment(raw: &str) -> &str {
    let code = match raw.find('#') {
        Some(i) => &raw[..i],
        None => raw,
    };
    code.trim()
}

/// Split a line into `(label, rest)` if it starts with `word-chars:`.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let colon = line.find(':')?;
    let (label, rest) = line.split_at(colon);
    if label.is_empty() || !label.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some((label, &rest[1..]))
}

/// Tokenize a full source file into labeled, comment-free operation lines.
///
/// A `label:` with no trailing instruction binds that label to whichever
/// line comes next (spec: "may be followed by the instruction on the same
/// line or bind to the next one"), rather than occupying a line of its own
/// — a bare label carries no address by itself. Several bare labels in a
/// row all bind to the same next line, as additional names for the same
/// address, not as separate (and wrongly word-counted) lines.
#[must_use]
pub fn tokenize(source: &str) -> Vec<SourceLine> {
    let mut lines = Vec::new();
    let mut last_label: Option<String> = None;
    let mut last_label_offset = 0usize;
    let mut pending_labels: Vec<String> = Vec::new();

    for (line_no, raw) in source.lines().enumerate() {
        let stripped = strip_comment(raw);
        if stripped.is_empty() {
            continue;
        }

        if let Some((label, rest)) = split_label(stripped) {
            let rest = rest.trim();
            let label = label.to_lowercase();
            if rest.is_empty() {
                pending_labels.push(label);
                continue;
            }
            pending_labels.push(label.clone());
            last_label = Some(label);
            last_label_offset = 0;
            lines.push(SourceLine { line_no, labels: std::mem::take(&mut pending_labels), op: rest.to_lowercase() });
        } else if !pending_labels.is_empty() {
            last_label = pending_labels.last().cloned();
            last_label_offset = 0;
            lines.push(SourceLine { line_no, labels: std::mem::take(&mut pending_labels), op: stripped.to_lowercase() });
        } else if let Some(base) = &last_label {
            last_label_offset += 1;
            lines.push(SourceLine {
                line_no,
                labels: vec![format!("{base}+{last_label_offset}")],
                op: stripped.to_lowercase(),
            });
        } else {
            lines.push(SourceLine { line_no, labels: Vec::new(), op: stripped.to_lowercase() });
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_and_comments_are_dropped() {
        let lines = tokenize("\n# just a comment\n  \nhlt # trailing comment\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].op, "hlt");
    }

    #[test]
    fn a_user_label_attaches_to_its_own_line() {
        let lines = tokenize("loop: d0=!1\nhlt\n");
        assert_eq!(lines[0].labels, vec!["loop".to_string()]);
        assert_eq!(lines[0].op, "d0=!1");
    }

    #[test]
    fn a_bare_label_binds_to_the_next_line() {
        let lines = tokenize("loop:\nd0=!1\nd1=!2\nhlt\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].labels, vec!["loop".to_string()]);
        assert_eq!(lines[1].labels, vec!["loop+1".to_string()]);
        assert_eq!(lines[2].labels, vec!["loop+2".to_string()]);
    }

    #[test]
    fn consecutive_bare_labels_both_bind_to_the_same_next_line() {
        let lines = tokenize("a:\nb:\nhlt\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].labels, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(lines[0].op, "hlt");
    }

    #[test]
    fn lines_before_any_label_have_none() {
        let lines = tokenize("hlt\n");
        assert_eq!(lines[0].labels, Vec::<String>::new());
    }
}
