//! Mock warehouse for testing.
//!
//! Records every executed statement in order and serves canned count
//! results, so tests can assert on the exact SQL sequence a task issues
//! without a live warehouse.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::WarehouseError;

use super::Warehouse;

/// In-memory [`Warehouse`] that records statements and scripts responses.
///
/// Matching is by substring: the first scripted entry whose key appears in
/// the incoming SQL wins. Unscripted count queries return a single row with
/// a single `1`, so happy-path tests only script the tables they care about.
#[derive(Default)]
pub struct MockWarehouse {
    executed: Mutex<Vec<String>>,
    affected: Mutex<Vec<(String, u64)>>,
    counts: Mutex<Vec<(String, Vec<Vec<i64>>)>>,
    failures: Mutex<Vec<String>>,
}

impl MockWarehouse {
    /// Create a mock with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the affected-row count for statements containing `pattern`.
    pub fn script_affected(&self, pattern: impl Into<String>, rows: u64) {
        self.affected.lock().unwrap().push((pattern.into(), rows));
    }

    /// Script the result rows for count queries containing `pattern`.
    pub fn script_counts(&self, pattern: impl Into<String>, rows: Vec<Vec<i64>>) {
        self.counts.lock().unwrap().push((pattern.into(), rows));
    }

    /// Fail any statement or query containing `pattern`.
    pub fn fail_matching(&self, pattern: impl Into<String>) {
        self.failures.lock().unwrap().push(pattern.into());
    }

    /// Snapshot of every statement executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    /// Number of executed statements containing `pattern`.
    pub fn count_matching(&self, pattern: &str) -> usize {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .filter(|sql| sql.contains(pattern))
            .count()
    }

    fn check_failure(&self, sql: &str) -> Result<(), WarehouseError> {
        let failures = self.failures.lock().unwrap();
        if let Some(pattern) = failures.iter().find(|p| sql.contains(p.as_str())) {
            return Err(WarehouseError::Failure {
                message: format!("scripted failure for '{pattern}'"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Warehouse for MockWarehouse {
    async fn execute(&self, sql: &str) -> Result<u64, WarehouseError> {
        self.check_failure(sql)?;
        self.executed.lock().unwrap().push(sql.to_string());

        let affected = self.affected.lock().unwrap();
        let rows = affected
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, rows)| *rows)
            .unwrap_or(0);
        Ok(rows)
    }

    async fn query_counts(&self, sql: &str) -> Result<Vec<Vec<i64>>, WarehouseError> {
        self.check_failure(sql)?;
        self.executed.lock().unwrap().push(sql.to_string());

        let counts = self.counts.lock().unwrap();
        let rows = counts
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_else(|| vec![vec![1]]);
        Ok(rows)
    }
}
