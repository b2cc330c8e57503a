//! Cluster handles, keyspace-scoped sessions and the wide-column engine they
//! front. A `Cluster` is a process-lifetime object created once per distinct
//! contact-point string and never torn down; `Session`s are cheap, bound to
//! one keyspace for one unit of work, and release themselves on drop so every
//! exit path (including errors) returns the slot.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::{FsError, FsResult};
use crate::statements::{PreparedStatement, StatementCache, Verb};

/// Primary-key layout per table. The `files` table is keyed by
/// `(cloudlet, folder, filename)`: cloudlet is the partition key, folder and
/// filename the clustering columns.
static CATALOG: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    m.insert("files", &["cloudlet", "folder", "filename"]);
    m
});

/// One result row: column name to text value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: HashMap<String, String>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(|v| v.as_str())
    }
}

/// Rows keyed by their full primary-key values, ordered so partition scans
/// walk a contiguous range.
struct Table {
    key: Vec<String>,
    rows: BTreeMap<Vec<String>, HashMap<String, String>>,
}

struct Keyspace {
    tables: RwLock<HashMap<String, Arc<RwLock<Table>>>>,
}

impl Keyspace {
    fn new() -> Self {
        Self { tables: RwLock::new(HashMap::new()) }
    }

    fn table(&self, name: &str) -> FsResult<Arc<RwLock<Table>>> {
        if let Some(t) = self.tables.read().get(name) {
            return Ok(t.clone());
        }
        let key = CATALOG
            .get(name)
            .ok_or_else(|| FsError::query(format!("unknown table: {}", name)))?;
        let mut w = self.tables.write();
        Ok(w.entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(RwLock::new(Table {
                    key: key.iter().map(|c| c.to_string()).collect(),
                    rows: BTreeMap::new(),
                }))
            })
            .clone())
    }
}

/// Shared driver-level handle for one set of contact points. Owns the
/// keyspaces it serves and the statement cache for plans prepared against it.
pub struct Cluster {
    contact_points: String,
    username: Option<String>,
    online: AtomicBool,
    statements: StatementCache,
    keyspaces: RwLock<HashMap<String, Arc<Keyspace>>>,
    open_sessions: AtomicUsize,
}

impl Cluster {
    /// Build a handle for the given comma-separated contact points. Fails
    /// with a connectivity error when no contact point is configured.
    pub fn new(contact_points: &str, username: Option<&str>) -> FsResult<Arc<Self>> {
        if contact_points.trim().is_empty() {
            return Err(FsError::connectivity("no contact points configured"));
        }
        Ok(Arc::new(Self {
            contact_points: contact_points.to_string(),
            username: username.map(|u| u.to_string()),
            online: AtomicBool::new(true),
            statements: StatementCache::new(),
            keyspaces: RwLock::new(HashMap::new()),
            open_sessions: AtomicUsize::new(0),
        }))
    }

    pub fn contact_points(&self) -> &str {
        &self.contact_points
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Plans prepared against this cluster. Scoped here so a plan can never
    /// be reused against a different cluster.
    pub fn statements(&self) -> &StatementCache {
        &self.statements
    }

    /// Fencing control for hosts: a cluster marked offline fails every
    /// connect and execute with a connectivity error until restored.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> FsResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(FsError::connectivity(format!("cluster unreachable: {}", self.contact_points)))
        }
    }

    fn keyspace(&self, name: &str) -> Arc<Keyspace> {
        if let Some(ks) = self.keyspaces.read().get(name) {
            return ks.clone();
        }
        let mut w = self.keyspaces.write();
        w.entry(name.to_string()).or_insert_with(|| Arc::new(Keyspace::new())).clone()
    }

    /// Open a session bound to `keyspace` for one unit of work.
    pub fn connect(self: &Arc<Self>, keyspace: &str) -> FsResult<Session> {
        self.check_online()?;
        let ks = self.keyspace(keyspace);
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Session { cluster: self.clone(), keyspace: keyspace.to_string(), space: ks })
    }
}

/// A live connection to one keyspace. Dropping the session releases it;
/// there is no pooling across operations.
pub struct Session {
    cluster: Arc<Cluster>,
    keyspace: String,
    space: Arc<Keyspace>,
}

impl Session {
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    pub fn cluster(&self) -> &Arc<Cluster> {
        &self.cluster
    }

    /// Statement-cache lookup through this session's cluster.
    pub fn prepare(&self, text: &str) -> FsResult<Arc<PreparedStatement>> {
        self.cluster.statements.get_or_prepare(text)
    }

    /// Execute a prepared plan with positional parameters. One network round
    /// trip per call against a real driver; the embedded engine resolves
    /// immediately.
    pub async fn execute(&self, stmt: &PreparedStatement, params: &[&str]) -> FsResult<Vec<Row>> {
        self.cluster.check_online()?;
        let table = self.space.table(stmt.table())?;
        match stmt.verb() {
            Verb::Insert => {
                if params.len() != stmt.columns().len() {
                    return Err(FsError::query(format!(
                        "expected {} parameters, got {}",
                        stmt.columns().len(),
                        params.len()
                    )));
                }
                let mut row: HashMap<String, String> = HashMap::new();
                for (col, val) in stmt.columns().iter().zip(params) {
                    row.insert(col.clone(), val.to_string());
                }
                let mut t = table.write();
                let key = primary_key(&t.key, &row)?;
                t.rows.insert(key, row);
                Ok(Vec::new())
            }
            Verb::Select => {
                let t = table.read();
                let prefix = key_prefix(stmt, &t.key, params)?;
                let out = t
                    .rows
                    .iter()
                    .filter(|(k, _)| k.starts_with(&prefix))
                    .map(|(_, row)| project(stmt.columns(), row))
                    .collect();
                Ok(out)
            }
            Verb::Delete => {
                let mut t = table.write();
                if stmt.key() != t.key {
                    return Err(FsError::query("DELETE requires the full primary key"));
                }
                let full: Vec<String> = params.iter().map(|p| p.to_string()).collect();
                t.rows.remove(&full);
                Ok(Vec::new())
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cluster.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

fn primary_key(key_cols: &[String], row: &HashMap<String, String>) -> FsResult<Vec<String>> {
    key_cols
        .iter()
        .map(|c| {
            row.get(c)
                .cloned()
                .ok_or_else(|| FsError::query(format!("missing key column: {}", c)))
        })
        .collect()
}

/// Validate that the WHERE columns form a left prefix of the primary key and
/// bind the parameters to it.
fn key_prefix(stmt: &PreparedStatement, key_cols: &[String], params: &[&str]) -> FsResult<Vec<String>> {
    if stmt.key().len() != params.len() {
        return Err(FsError::query(format!(
            "expected {} parameters, got {}",
            stmt.key().len(),
            params.len()
        )));
    }
    if stmt.key().len() > key_cols.len() || stmt.key() != &key_cols[..stmt.key().len()] {
        return Err(FsError::query("WHERE columns must form a primary-key prefix"));
    }
    Ok(params.iter().map(|p| p.to_string()).collect())
}

fn project(columns: &[String], row: &HashMap<String, String>) -> Row {
    let mut out = HashMap::new();
    for c in columns {
        if let Some(v) = row.get(c) {
            out.insert(c.clone(), v.clone());
        }
    }
    Row { columns: out }
}
