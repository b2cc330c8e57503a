//! Prepared-statement texts, the plan parser and the memoizing cache.
//! Preparing a statement parses the raw text once into an executable plan;
//! the cache is keyed purely by text and lives on the cluster handle, so a
//! plan is never replayed against a foreign cluster.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{FsError, FsResult};

// Query shapes used by the file store. All placeholders are positional.
pub const SELECT_FILE: &str =
    "SELECT cloudlet, folder, filename, content FROM files WHERE cloudlet = ? AND folder = ? AND filename = ?";
pub const INSERT_FILE: &str =
    "INSERT INTO files (cloudlet, folder, filename, content) VALUES (?, ?, ?, ?)";
pub const DELETE_FILE: &str =
    "DELETE FROM files WHERE cloudlet = ? AND folder = ? AND filename = ?";
pub const SELECT_FOLDER: &str =
    "SELECT folder, filename, content FROM files WHERE cloudlet = ? AND folder = ?";
pub const SELECT_SCOPE: &str =
    "SELECT folder, filename FROM files WHERE cloudlet = ?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Select,
    Insert,
    Delete,
}

/// A compiled query plan: verb, target table, column list and the key
/// columns bound by the WHERE clause (in declaration order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedStatement {
    text: String,
    verb: Verb,
    table: String,
    columns: Vec<String>,
    key: Vec<String>,
}

impl PreparedStatement {
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn verb(&self) -> Verb {
        self.verb
    }
    pub fn table(&self) -> &str {
        &self.table
    }
    /// Projection columns for SELECT, value columns for INSERT.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    /// WHERE-bound key columns; empty for INSERT.
    pub fn key(&self) -> &[String] {
        &self.key
    }
}

fn split_columns(list: &str) -> Vec<String> {
    list.split(',').map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect()
}

/// Parse a `col = ? AND col = ?` clause into its column names.
fn parse_where(clause: &str) -> FsResult<Vec<String>> {
    let mut cols = Vec::new();
    for term in clause.split(" AND ") {
        let (col, rhs) = term
            .split_once('=')
            .ok_or_else(|| FsError::query(format!("malformed WHERE term: {}", term)))?;
        if rhs.trim() != "?" {
            return Err(FsError::query(format!("only positional placeholders supported: {}", term)));
        }
        cols.push(col.trim().to_string());
    }
    if cols.is_empty() {
        return Err(FsError::query("empty WHERE clause"));
    }
    Ok(cols)
}

/// Compile raw query text into a plan. Supports the exact-key and
/// partition-prefix SELECT/INSERT/DELETE shapes used by the store.
pub fn parse(text: &str) -> FsResult<PreparedStatement> {
    let t = text.trim();
    if let Some(rest) = t.strip_prefix("SELECT ") {
        let (cols, rest) = rest
            .split_once(" FROM ")
            .ok_or_else(|| FsError::query(format!("SELECT without FROM: {}", text)))?;
        let (table, key) = match rest.split_once(" WHERE ") {
            Some((table, clause)) => (table.trim(), parse_where(clause)?),
            None => (rest.trim(), Vec::new()),
        };
        return Ok(PreparedStatement {
            text: t.to_string(),
            verb: Verb::Select,
            table: table.to_string(),
            columns: split_columns(cols),
            key,
        });
    }
    if let Some(rest) = t.strip_prefix("INSERT INTO ") {
        let (table, rest) = rest
            .split_once('(')
            .ok_or_else(|| FsError::query(format!("INSERT without column list: {}", text)))?;
        let (cols, rest) = rest
            .split_once(')')
            .ok_or_else(|| FsError::query(format!("unterminated column list: {}", text)))?;
        let values = rest
            .trim()
            .strip_prefix("VALUES")
            .and_then(|v| v.trim().strip_prefix('('))
            .and_then(|v| v.strip_suffix(')'))
            .ok_or_else(|| FsError::query(format!("INSERT without VALUES: {}", text)))?;
        let columns = split_columns(cols);
        let placeholders = values.split(',').filter(|v| v.trim() == "?").count();
        if placeholders != columns.len() || values.split(',').count() != columns.len() {
            return Err(FsError::query(format!(
                "INSERT arity mismatch: {} columns, {} placeholders",
                columns.len(),
                placeholders
            )));
        }
        return Ok(PreparedStatement {
            text: t.to_string(),
            verb: Verb::Insert,
            table: table.trim().to_string(),
            columns,
            key: Vec::new(),
        });
    }
    if let Some(rest) = t.strip_prefix("DELETE FROM ") {
        let (table, clause) = rest
            .split_once(" WHERE ")
            .ok_or_else(|| FsError::query(format!("DELETE without WHERE: {}", text)))?;
        return Ok(PreparedStatement {
            text: t.to_string(),
            verb: Verb::Delete,
            table: table.trim().to_string(),
            columns: Vec::new(),
            key: parse_where(clause)?,
        });
    }
    Err(FsError::query(format!("unsupported query shape: {}", text)))
}

/// Memoizing cache of compiled plans keyed by exact query text.
/// Concurrent first-use races have a single winner; losers receive the
/// winning plan.
#[derive(Default)]
pub struct StatementCache {
    inner: RwLock<HashMap<String, Arc<PreparedStatement>>>,
}

impl StatementCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached plan for `text`, compiling and caching it on first
    /// use. Idempotent; steady-state hits take only the read lock.
    pub fn get_or_prepare(&self, text: &str) -> FsResult<Arc<PreparedStatement>> {
        if let Some(p) = self.inner.read().get(text) {
            return Ok(p.clone());
        }
        // Compile outside the write lock; a racing loser discards its copy.
        let compiled = Arc::new(parse(text)?);
        let mut w = self.inner.write();
        Ok(w.entry(text.to_string()).or_insert(compiled).clone())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_exact_key_select() {
        let p = parse(SELECT_FILE).unwrap();
        assert_eq!(p.verb(), Verb::Select);
        assert_eq!(p.table(), "files");
        assert_eq!(p.columns(), ["cloudlet", "folder", "filename", "content"]);
        assert_eq!(p.key(), ["cloudlet", "folder", "filename"]);
    }

    #[test]
    fn parse_partition_select() {
        let p = parse(SELECT_FOLDER).unwrap();
        assert_eq!(p.key(), ["cloudlet", "folder"]);
        let p = parse(SELECT_SCOPE).unwrap();
        assert_eq!(p.key(), ["cloudlet"]);
    }

    #[test]
    fn parse_insert_and_delete() {
        let p = parse(INSERT_FILE).unwrap();
        assert_eq!(p.verb(), Verb::Insert);
        assert_eq!(p.columns(), ["cloudlet", "folder", "filename", "content"]);
        assert!(p.key().is_empty());

        let p = parse(DELETE_FILE).unwrap();
        assert_eq!(p.verb(), Verb::Delete);
        assert_eq!(p.key(), ["cloudlet", "folder", "filename"]);
    }

    #[test]
    fn parse_rejects_malformed_text() {
        assert!(parse("UPDATE files SET x = ?").is_err());
        assert!(parse("SELECT a b c").is_err());
        assert!(parse("INSERT INTO files (a, b) VALUES (?)").is_err());
        assert!(parse("DELETE FROM files").is_err());
        assert!(parse("SELECT a FROM files WHERE a = 'literal'").is_err());
    }

    #[test]
    fn cache_returns_same_plan_for_same_text() {
        let cache = StatementCache::new();
        let a = cache.get_or_prepare(SELECT_FILE).unwrap();
        let b = cache.get_or_prepare(SELECT_FILE).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let c = cache.get_or_prepare(DELETE_FILE).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_does_not_retain_failed_parses() {
        let cache = StatementCache::new();
        assert!(cache.get_or_prepare("bogus").is_err());
        assert!(cache.is_empty());
    }
}
