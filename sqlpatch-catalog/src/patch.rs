use serde::{Deserialize, Serialize};

/// One atomic group of statements plus the statements that undo it.
///
/// `rollbacks` are authored alongside `queries`; nothing derives them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Statements applied inside a single database transaction.
    #[serde(default)]
    pub queries: Vec<String>,

    /// Statements that logically undo `queries`, run in stored order.
    #[serde(default)]
    pub rollbacks: Vec<String>,
}

impl Transaction {
    pub fn new(queries: Vec<String>, rollbacks: Vec<String>) -> Self {
        Self { queries, rollbacks }
    }
}

/// A named, ordered set of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub name: String,
    pub transactions: Vec<Transaction>,
}

impl Patch {
    pub fn new(name: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        Self {
            name: name.into(),
            transactions,
        }
    }

    /// Parses a patch document: a JSON array of `{ "queries": [..], "rollbacks": [..] }`.
    pub fn from_json(name: impl Into<String>, raw: &str) -> Result<Self, serde_json::Error> {
        let transactions: Vec<Transaction> = serde_json::from_str(raw)?;
        Ok(Self::new(name, transactions))
    }

    /// Total number of apply statements across all transactions.
    pub fn query_count(&self) -> usize {
        self.transactions.iter().map(|tx| tx.queries.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_keeps_transaction_and_statement_order() {
        let raw = r#"[
            {"queries": ["CREATE TABLE a(id INT)", "CREATE INDEX a_id ON a(id)"], "rollbacks": ["DROP TABLE a"]},
            {"queries": ["CREATE TABLE b(id INT)"], "rollbacks": ["DROP TABLE b"]}
        ]"#;

        let patch = Patch::from_json("001_tables", raw).expect("parse patch");

        assert_eq!(patch.name, "001_tables");
        assert_eq!(patch.transactions.len(), 2);
        assert_eq!(
            patch.transactions[0].queries,
            vec!["CREATE TABLE a(id INT)", "CREATE INDEX a_id ON a(id)"]
        );
        assert_eq!(patch.transactions[1].rollbacks, vec!["DROP TABLE b"]);
        assert_eq!(patch.query_count(), 3);
    }

    #[test]
    fn from_json_defaults_missing_lists_to_empty() {
        let raw = r#"[{"queries": ["INSERT INTO t VALUES (1)"]}, {}]"#;

        let patch = Patch::from_json("002_seed", raw).expect("parse patch");

        assert!(patch.transactions[0].rollbacks.is_empty());
        assert_eq!(patch.transactions[1], Transaction::default());
    }

    #[test]
    fn from_json_rejects_non_array_documents() {
        let raw = r#"{"queries": ["SELECT 1"]}"#;
        assert!(Patch::from_json("bad", raw).is_err());
    }

    #[test]
    fn from_json_rejects_non_string_statements() {
        let raw = r#"[{"queries": [42]}]"#;
        assert!(Patch::from_json("bad", raw).is_err());
    }
}
