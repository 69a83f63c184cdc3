//! Batch statement executor.
//!
//! Runs generated DDL/DML scripts against a pool one statement at a time.
//! Each statement executes independently; there is no surrounding
//! transaction, matching how most databases treat DDL anyway.

use sqlx::sqlite::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::Result;

/// Outcome of one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// Statements that executed successfully.
    pub executed: usize,
    /// Statements that failed (only populated with `continue_on_error`).
    pub errors: usize,
}

/// Executes statement batches against a borrowed pool.
///
/// Script text is split on the statement delimiter; blank and comment-only
/// fragments are skipped, so the differ's advisory comments pass through
/// harmlessly. With `continue_on_error` a failed statement is counted and the
/// batch continues; otherwise the first failure aborts the run.
pub struct BatchExecutor<'a> {
    pool: &'a SqlitePool,
    delimiter: String,
    comment_prefix: String,
    continue_on_error: bool,
}

impl<'a> BatchExecutor<'a> {
    /// Creates an executor with the default `;` delimiter and `--` comments.
    #[must_use]
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            delimiter: ";".to_string(),
            comment_prefix: "--".to_string(),
            continue_on_error: false,
        }
    }

    /// Sets the statement delimiter the script is split on.
    #[must_use]
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Sets the line-comment prefix used to recognize comment-only fragments.
    #[must_use]
    pub fn comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.comment_prefix = prefix.into();
        self
    }

    /// Counts failed statements instead of aborting on the first one.
    #[must_use]
    pub fn continue_on_error(mut self, enabled: bool) -> Self {
        self.continue_on_error = enabled;
        self
    }

    /// Splits `script` on the delimiter and executes each fragment.
    pub async fn execute_script(&self, script: &str) -> Result<BatchReport> {
        let statements: Vec<String> = script
            .split(&self.delimiter)
            .map(str::to_string)
            .collect();
        self.execute_statements(&statements).await
    }

    /// Executes a pre-split statement list.
    pub async fn execute_statements(&self, statements: &[String]) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        for statement in statements {
            let trimmed = statement.trim();
            if trimmed.is_empty() || self.is_comment_only(trimmed) {
                continue;
            }

            debug!(sql = %trimmed, "executing statement");
            match sqlx::query(trimmed).execute(self.pool).await {
                Ok(_) => report.executed += 1,
                Err(err) if self.continue_on_error => {
                    warn!(sql = %trimmed, error = %err, "statement failed, continuing");
                    report.errors += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
        info!(
            executed = report.executed,
            errors = report.errors,
            "batch complete"
        );
        Ok(report)
    }

    /// Executes one data-manipulation statement, checking the affected row
    /// count. A mismatch is logged as a warning, never raised as an error.
    pub async fn execute_dml(&self, sql: &str, expected_rows: u64) -> Result<u64> {
        debug!(sql = %sql, "executing DML statement");
        let result = sqlx::query(sql).execute(self.pool).await?;
        let affected = result.rows_affected();
        if affected != expected_rows {
            warn!(
                sql = %sql,
                expected = expected_rows,
                affected,
                "affected row count differs from expectation"
            );
        }
        Ok(affected)
    }

    fn is_comment_only(&self, fragment: &str) -> bool {
        fragment
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .all(|line| line.starts_with(&self.comment_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_script_split_and_skip() {
        let pool = pool().await;
        let executor = BatchExecutor::new(&pool);

        let script = "CREATE TABLE t (id INTEGER PRIMARY KEY);\n\
                      -- just a note;\n\
                      \n\
                      INSERT INTO t (id) VALUES (1);";
        let report = executor.execute_script(script).await.unwrap();
        assert_eq!(report, BatchReport { executed: 2, errors: 0 });
    }

    #[tokio::test]
    async fn test_abort_on_first_error() {
        let pool = pool().await;
        let executor = BatchExecutor::new(&pool);

        let statements = vec![
            "CREATE TABLE t (id INTEGER PRIMARY KEY)".to_string(),
            "CREATE TABLE t (id INTEGER PRIMARY KEY)".to_string(),
            "INSERT INTO t (id) VALUES (1)".to_string(),
        ];
        assert!(executor.execute_statements(&statements).await.is_err());
    }

    #[tokio::test]
    async fn test_continue_on_error_counts() {
        let pool = pool().await;
        let executor = BatchExecutor::new(&pool).continue_on_error(true);

        let statements = vec![
            "CREATE TABLE t (id INTEGER PRIMARY KEY)".to_string(),
            "CREATE TABLE t (id INTEGER PRIMARY KEY)".to_string(),
            "INSERT INTO t (id) VALUES (1)".to_string(),
        ];
        let report = executor.execute_statements(&statements).await.unwrap();
        assert_eq!(report, BatchReport { executed: 2, errors: 1 });
    }

    #[tokio::test]
    async fn test_dml_row_count_mismatch_is_not_an_error() {
        let pool = pool().await;
        let executor = BatchExecutor::new(&pool);
        executor
            .execute_script("CREATE TABLE t (id INTEGER PRIMARY KEY)")
            .await
            .unwrap();

        let affected = executor
            .execute_dml("DELETE FROM t WHERE id = 42", 1)
            .await
            .unwrap();
        assert_eq!(affected, 0);
    }
}
