use crate::changes::ChangeKind;
use crate::project::file::{FileRef, normalize_path};
use std::collections::BTreeMap;

/// Snapshot of a project's resources, as handed to a full build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceNode {
    Folder {
        path: String,
        children: Vec<ResourceNode>,
    },
    File(FileRef),
}

impl ResourceNode {
    pub fn folder(path: impl AsRef<str>, children: Vec<ResourceNode>) -> Self {
        ResourceNode::Folder {
            path: normalize_path(path.as_ref()),
            children,
        }
    }

    pub fn file(file: FileRef) -> Self {
        ResourceNode::File(file)
    }

    pub fn path(&self) -> &str {
        match self {
            ResourceNode::Folder { path, .. } => path,
            ResourceNode::File(file) => file.path(),
        }
    }

    /// Build a nested tree rooted at the project ("" path) from flat file refs.
    pub fn from_files(files: impl IntoIterator<Item = FileRef>) -> Self {
        let mut root = FolderBuilder::default();
        for file in files {
            let segments: Vec<&str> = file.path().split('/').collect();
            let mut folder = &mut root;
            let mut prefix = String::new();
            for segment in &segments[..segments.len().saturating_sub(1)] {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(segment);
                folder = folder.folders.entry(prefix.clone()).or_default();
            }
            folder.files.insert(file.path().to_string(), file);
        }
        root.build(String::new())
    }

    /// Every file below this node, depth first
    pub fn files(&self) -> Vec<&FileRef> {
        let mut out = Vec::new();
        self.collect_files(&mut out);
        out
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a FileRef>) {
        match self {
            ResourceNode::File(file) => out.push(file),
            ResourceNode::Folder { children, .. } => {
                for child in children {
                    child.collect_files(out);
                }
            }
        }
    }
}

#[derive(Default)]
struct FolderBuilder {
    folders: BTreeMap<String, FolderBuilder>,
    files: BTreeMap<String, FileRef>,
}

impl FolderBuilder {
    fn build(self, path: String) -> ResourceNode {
        let mut children: Vec<ResourceNode> = self
            .folders
            .into_iter()
            .map(|(child_path, builder)| builder.build(child_path))
            .collect();
        children.extend(self.files.into_values().map(ResourceNode::File));
        ResourceNode::Folder { path, children }
    }
}

/// What a resource delta points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaResource {
    Folder(String),
    File(FileRef),
}

/// Recursive description of what changed since the last build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDelta {
    pub kind: ChangeKind,
    pub resource: DeltaResource,
    pub children: Vec<ResourceDelta>,
}

impl ResourceDelta {
    pub fn file(file: FileRef, kind: ChangeKind) -> Self {
        Self {
            kind,
            resource: DeltaResource::File(file),
            children: Vec::new(),
        }
    }

    pub fn folder(path: impl AsRef<str>, kind: ChangeKind, children: Vec<ResourceDelta>) -> Self {
        Self {
            kind,
            resource: DeltaResource::Folder(normalize_path(path.as_ref())),
            children,
        }
    }

    /// Project-level delta wrapping the given children
    pub fn root(children: Vec<ResourceDelta>) -> Self {
        Self::folder("", ChangeKind::Changed, children)
    }

    pub fn path(&self) -> &str {
        match &self.resource {
            DeltaResource::Folder(path) => path,
            DeltaResource::File(file) => file.path(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.resource, DeltaResource::Folder(_)) && self.children.is_empty()
    }
}
