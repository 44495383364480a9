use crate::changes::ChangeKind;
use crate::project::file::{DEFAULT_ENCODING, FileRef, normalize_path};
use crate::project::tree::{ResourceDelta, ResourceNode};
use anyhow::Result;
use ignore::WalkBuilder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

// Resource providers decouple the engine from where project files live:
//
// - FsResourceProvider walks a directory on disk; the CLI and file watchers use it.
// - IDE integrations hand the engine their own workspace model (open editor buffers,
//   virtual files) by implementing ResourceProvider directly.
//
// The engine only asks for a resource tree (full builds) and a content reader per
// file (every reconciliation). Deltas are produced by the caller.

pub trait ResourceProvider: Send + Sync {
    /// Display name of the project, used in logs and events
    fn project_name(&self) -> &str;

    fn resource_tree(&self) -> Result<ResourceNode>;

    fn open(&self, file: &FileRef) -> std::io::Result<Box<dyn Read + '_>>;
}

pub struct FsResourceProvider {
    root: PathBuf,
    name: String,
    encoding: String,
}

impl FsResourceProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| root.to_string_lossy().to_string());
        Self {
            root,
            name,
            encoding: DEFAULT_ENCODING.to_string(),
        }
    }

    /// Declared encoding for every file of this project
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Turn a watcher's list of touched paths into a resource delta.
    ///
    /// Paths may be absolute or relative to the project root.
    /// - existing file -> Changed
    /// - existing directory -> folder delta with every file below it Changed
    /// - missing path -> Removed folder, clearing the path and everything below it
    pub fn delta_from_changed_paths<P: AsRef<Path>>(&self, paths: &[P]) -> ResourceDelta {
        let mut children = Vec::new();

        for path in paths {
            let path = path.as_ref();
            let absolute = if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.root.join(path)
            };
            let Some(relative) = self.relative_path(&absolute) else {
                tracing::debug!("Ignoring change outside of project: {}", absolute.display());
                continue;
            };

            if absolute.is_file() {
                children.push(ResourceDelta::file(self.file_ref(&relative), ChangeKind::Changed));
            } else if absolute.is_dir() {
                let files = self
                    .walk(&absolute)
                    .into_iter()
                    .map(|file| ResourceDelta::file(file, ChangeKind::Changed))
                    .collect();
                children.push(ResourceDelta::folder(&relative, ChangeKind::Changed, files));
            } else {
                // A vanished path has no file type left. A descendant clear of the
                // path covers both a removed file and a removed folder.
                children.push(ResourceDelta::folder(&relative, ChangeKind::Removed, Vec::new()));
            }
        }

        ResourceDelta::root(children)
    }

    fn file_ref(&self, relative: &str) -> FileRef {
        FileRef::with_encoding(relative, self.encoding.clone())
    }

    fn relative_path(&self, absolute: &Path) -> Option<String> {
        absolute
            .strip_prefix(&self.root)
            .ok()
            .map(|p| normalize_path(&p.to_string_lossy()))
    }

    fn walk(&self, dir: &Path) -> Vec<FileRef> {
        let mut files = Vec::new();

        for entry in WalkBuilder::new(dir)
            .hidden(true)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .ignore(false)
            .parents(false)
            .build()
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file())
                        && let Some(relative) = self.relative_path(entry.path())
                    {
                        files.push(self.file_ref(&relative));
                    }
                }
                Err(e) => tracing::warn!("Failed to walk {}: {e}", dir.display()),
            }
        }

        files
    }
}

impl ResourceProvider for FsResourceProvider {
    fn project_name(&self) -> &str {
        &self.name
    }

    fn resource_tree(&self) -> Result<ResourceNode> {
        if !self.root.is_dir() {
            anyhow::bail!("Project root is not a directory: {}", self.root.display());
        }
        Ok(ResourceNode::from_files(self.walk(&self.root)))
    }

    fn open(&self, file: &FileRef) -> std::io::Result<Box<dyn Read + '_>> {
        let handle = File::open(self.root.join(file.path()))?;
        Ok(Box::new(BufReader::new(handle)))
    }
}
