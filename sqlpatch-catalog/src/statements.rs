const STATEMENT_SEPARATOR: char = ';';

/// Splits a SQL script on `;`, trimming each statement and dropping empty ones.
///
/// The split is purely lexical: a `;` inside a string literal also separates.
pub fn split_statements(script: &str) -> Vec<String> {
    script
        .split(STATEMENT_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_statements_trims_and_drops_empty_pieces() {
        let script = "\n  CREATE TABLE t(id INT);\n\n;INSERT INTO t VALUES (1) ;  \n";

        assert_eq!(
            split_statements(script),
            vec!["CREATE TABLE t(id INT)", "INSERT INTO t VALUES (1)"]
        );
    }

    #[test]
    fn split_statements_of_blank_script_is_empty() {
        assert!(split_statements("  \n ; ;\t").is_empty());
    }

    #[test]
    fn split_statements_keeps_trailing_statement_without_separator() {
        assert_eq!(split_statements("DROP TABLE t"), vec!["DROP TABLE t"]);
    }
}
