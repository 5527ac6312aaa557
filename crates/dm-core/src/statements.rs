//! Statement splitting for migration files.
//!
//! Boundaries are purely syntactic: the text is cut on every `;`, including
//! one inside a string literal or a comment. Migration authors must keep the
//! separator out of statement bodies.

/// Statement terminator recognised in migration files.
pub const STATEMENT_SEPARATOR: char = ';';

/// Split migration text into trimmed, non-empty statements in file order.
pub fn split_statements(content: &str) -> Vec<&str> {
    content
        .split(STATEMENT_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims() {
        let sql = "CREATE TABLE a (id INT);\n  INSERT INTO a VALUES (1) ;\n";
        assert_eq!(
            split_statements(sql),
            vec!["CREATE TABLE a (id INT)", "INSERT INTO a VALUES (1)"]
        );
    }

    #[test]
    fn drops_empty_fragments() {
        assert!(split_statements("").is_empty());
        assert!(split_statements(" ;\n;\t; ").is_empty());
        assert_eq!(split_statements(";;SELECT 1;;"), vec!["SELECT 1"]);
    }

    #[test]
    fn last_statement_without_terminator_is_kept() {
        assert_eq!(
            split_statements("SELECT 1; SELECT 2"),
            vec!["SELECT 1", "SELECT 2"]
        );
    }

    #[test]
    fn separator_inside_literal_still_splits() {
        assert_eq!(
            split_statements("INSERT INTO t VALUES ('a;b')"),
            vec!["INSERT INTO t VALUES ('a", "b')"]
        );
    }
}
