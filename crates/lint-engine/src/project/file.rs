use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Handle to a source file inside a project.
///
/// The path is workspace-relative and `/` separated. Identity is the path alone:
/// two refs to the same path with different declared encodings are the same file.
#[derive(Debug, Clone)]
pub struct FileRef {
    path: String,
    encoding: String,
}

impl FileRef {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self::with_encoding(path, DEFAULT_ENCODING)
    }

    pub fn with_encoding(path: impl AsRef<str>, encoding: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            encoding: encoding.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Declared character encoding label, e.g. `UTF-8` or `ISO-8859-1`
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }
}

impl PartialEq for FileRef {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for FileRef {}

impl Hash for FileRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl PartialOrd for FileRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FileRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Normalize a project-relative path: `/` separators, no leading `./` or `/`,
/// no trailing `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut trimmed = path.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_identity_ignores_encoding() {
        let utf8 = FileRef::new("src/app.js");
        let latin1 = FileRef::with_encoding("src/app.js", "ISO-8859-1");

        assert_eq!(utf8, latin1);

        let set: HashSet<FileRef> = [utf8, latin1].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_ordering_by_path() {
        let mut files = vec![
            FileRef::new("src/b.js"),
            FileRef::new("lib/z.js"),
            FileRef::new("src/a.js"),
        ];
        files.sort();
        let paths: Vec<&str> = files.iter().map(|f| f.path()).collect();
        assert_eq!(paths, vec!["lib/z.js", "src/a.js", "src/b.js"]);
    }

    #[test]
    fn test_name_and_extension() {
        let file = FileRef::new("web/vendor/jquery.min.js");
        assert_eq!(file.name(), "jquery.min.js");
        assert_eq!(file.extension(), Some("js"));

        assert_eq!(FileRef::new("Makefile").extension(), None);
        assert_eq!(FileRef::new("conf/.jshintrc").extension(), None);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./src/app.js"), "src/app.js");
        assert_eq!(normalize_path("/src/app.js"), "src/app.js");
        assert_eq!(normalize_path("src\\lib\\util.js"), "src/lib/util.js");
        assert_eq!(normalize_path("src/lib/"), "src/lib");
    }
}
