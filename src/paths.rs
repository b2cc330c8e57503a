//! Path resolver: pure translation between virtual absolute paths and the
//! `(folder, filename)` pair used as part of the storage key.
//! Folders are always `/`-delimited; the root folder is exactly `/`.

/// Normalize a folder string so it starts and ends with `/`.
/// Empty input and `/` both normalize to the root folder `/`.
pub fn normalize_folder(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Strip `root_prefix` from `path`. Paths outside the root pass through
/// unchanged so the caller can decide what to do with them.
pub fn relativize(root_prefix: &str, path: &str) -> String {
    match path.strip_prefix(root_prefix) {
        Some(rest) => rest.to_string(),
        None => path.to_string(),
    }
}

/// Split an absolute virtual path into `(folder, filename)` relative to
/// `root_prefix`. Everything up to and including the last `/` becomes the
/// normalized folder; the remainder is the filename. Root-level files yield
/// folder `/`.
pub fn break_down(root_prefix: &str, absolute_path: &str) -> (String, String) {
    let rel = relativize(root_prefix, absolute_path);
    match rel.rfind('/') {
        Some(idx) => {
            let folder = normalize_folder(&rel[..=idx]);
            let filename = rel[idx + 1..].to_string();
            (folder, filename)
        }
        None => ("/".to_string(), rel),
    }
}

/// Derive `(tenant, cloudlet)` from a root prefix: the first segment is the
/// tenant, the remaining segments joined by `/` are the cloudlet.
pub fn resolve_owner_scope(root_prefix: &str) -> (String, String) {
    let trimmed = root_prefix.trim_matches('/');
    match trimmed.split_once('/') {
        Some((tenant, rest)) => (tenant.to_string(), rest.to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

/// A tenant/cloudlet root under which all virtual paths live.
/// Wraps the raw prefix and derives the owner scope used to partition rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFolder {
    prefix: String,
}

impl RootFolder {
    /// Build a root from a prefix such as `/acme/app1`. A leading `/` is
    /// ensured and any trailing `/` dropped.
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim().trim_matches('/');
        Self { prefix: format!("/{}", trimmed) }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn relative_path(&self, path: &str) -> String {
        relativize(&self.prefix, path)
    }

    pub fn break_down(&self, absolute_path: &str) -> (String, String) {
        break_down(&self.prefix, absolute_path)
    }

    pub fn tenant(&self) -> String {
        resolve_owner_scope(&self.prefix).0
    }

    pub fn cloudlet(&self) -> String {
        resolve_owner_scope(&self.prefix).1
    }

    /// Keyspace-safe owner scope: tenant and cloudlet joined by `_`, with any
    /// remaining `/` separators flattened.
    pub fn owner_scope(&self) -> String {
        let (tenant, cloudlet) = resolve_owner_scope(&self.prefix);
        if cloudlet.is_empty() {
            tenant
        } else {
            format!("{}_{}", tenant, cloudlet.replace('/', "_"))
        }
    }

    /// Rebuild a fully-qualified virtual path from a folder and filename.
    pub fn qualify(&self, folder: &str, filename: &str) -> String {
        format!("{}{}{}", self.prefix, folder, filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folder_wraps_slashes() {
        assert_eq!(normalize_folder(""), "/");
        assert_eq!(normalize_folder("/"), "/");
        assert_eq!(normalize_folder("docs"), "/docs/");
        assert_eq!(normalize_folder("/docs"), "/docs/");
        assert_eq!(normalize_folder("docs/"), "/docs/");
        assert_eq!(normalize_folder("/a/b/"), "/a/b/");
    }

    #[test]
    fn break_down_nested_and_root_level() {
        let (folder, file) = break_down("/acme/app1", "/acme/app1/docs/readme.txt");
        assert_eq!(folder, "/docs/");
        assert_eq!(file, "readme.txt");

        let (folder, file) = break_down("/acme/app1", "/acme/app1/root.txt");
        assert_eq!(folder, "/");
        assert_eq!(file, "root.txt");

        let (folder, file) = break_down("/acme/app1", "/acme/app1/a/b/c.bin");
        assert_eq!(folder, "/a/b/");
        assert_eq!(file, "c.bin");
    }

    #[test]
    fn break_down_folder_path_yields_empty_filename() {
        let (folder, file) = break_down("/acme/app1", "/acme/app1/docs/");
        assert_eq!(folder, "/docs/");
        assert_eq!(file, "");
    }

    #[test]
    fn owner_scope_from_root() {
        assert_eq!(resolve_owner_scope("/acme/app1"), ("acme".to_string(), "app1".to_string()));
        assert_eq!(resolve_owner_scope("/acme/a/b"), ("acme".to_string(), "a/b".to_string()));
        assert_eq!(resolve_owner_scope("/acme"), ("acme".to_string(), String::new()));

        let root = RootFolder::new("/acme/app1");
        assert_eq!(root.tenant(), "acme");
        assert_eq!(root.cloudlet(), "app1");
        assert_eq!(root.owner_scope(), "acme_app1");

        let deep = RootFolder::new("/acme/a/b");
        assert_eq!(deep.owner_scope(), "acme_a_b");
    }

    #[test]
    fn relativize_outside_root_passes_through() {
        assert_eq!(relativize("/acme/app1", "/other/x.txt"), "/other/x.txt");
        assert_eq!(relativize("/acme/app1", "/acme/app1/x.txt"), "/x.txt");
    }

    #[test]
    fn qualify_round_trips_break_down() {
        let root = RootFolder::new("/acme/app1");
        let (folder, file) = root.break_down("/acme/app1/docs/a.txt");
        assert_eq!(root.qualify(&folder, &file), "/acme/app1/docs/a.txt");
    }
}
