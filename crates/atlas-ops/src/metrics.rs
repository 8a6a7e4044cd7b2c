//! Static per-file metrics.
//!
//! Line count and a branch-token complexity heuristic, both computed from
//! raw text. The heuristic is a proxy for cyclomatic complexity, not a
//! control-flow analysis: it counts whole-word branching keywords plus
//! short-circuit and ternary operators, starting from a floor of 1.

/// Branching keywords counted with whole-word boundaries.
const BRANCH_WORDS: &[&str] = &["if", "else", "for", "while", "case", "switch", "catch"];

/// Static metrics for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetrics {
    /// Newline-delimited segment count, always >= 1.
    pub loc: usize,
    /// Complexity heuristic, always >= 1.
    pub complexity: usize,
}

/// Compute both metrics over raw file content.
pub fn extract(content: &str) -> FileMetrics {
    FileMetrics {
        loc: line_count(content),
        complexity: complexity(content),
    }
}

/// Number of newline-delimited segments.
///
/// A final segment without a trailing newline still counts, so this is
/// never below 1 even for empty content.
pub fn line_count(content: &str) -> usize {
    content.split('\n').count().max(1)
}

/// 1 + occurrences of branching/looping/short-circuit tokens.
///
/// Keyword tokens match on word boundaries only, so `notify` or `forEach`
/// never contribute an `if`/`for` hit. The operator tokens (`&&`, `||`,
/// `?`) are counted as raw occurrences.
pub fn complexity(content: &str) -> usize {
    let keyword_hits = content
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|word| BRANCH_WORDS.contains(word))
        .count();

    let operator_hits = content.matches("&&").count()
        + content.matches("||").count()
        + content.matches('?').count();

    1 + keyword_hits + operator_hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_count_includes_unterminated_tail() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("one line"), 1);
        assert_eq!(line_count("a\nb"), 2);
        // A trailing newline opens one more (empty) segment.
        assert_eq!(line_count("a\nb\n"), 3);
    }

    #[test]
    fn complexity_floor_is_one() {
        assert_eq!(complexity(""), 1);
        assert_eq!(complexity("const x = 1;"), 1);
    }

    #[test]
    fn complexity_counts_branch_keywords() {
        let source = "if (a) { for (;;) { while (b) { } } } else { }";
        // if + for + while + else = 4 hits.
        assert_eq!(complexity(source), 5);
    }

    #[test]
    fn complexity_ignores_keywords_inside_identifiers() {
        // "notify", "forEach", "whilelist" must not match.
        let source = "notify(); items.forEach(x => x); const whilelist = 1;";
        assert_eq!(complexity(source), 1);
    }

    #[test]
    fn complexity_counts_operators() {
        let source = "const x = a && b || c ? d : e;";
        // && + || + ? = 3 hits.
        assert_eq!(complexity(source), 4);
    }

    #[test]
    fn extract_combines_both_metrics() {
        let m = extract("if (x) {\n  y();\n}\n");
        assert_eq!(m.loc, 4);
        assert_eq!(m.complexity, 2);
    }
}
