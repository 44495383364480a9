use crate::changes::{ChangeEvent, ChangeKind};
use crate::exclusion::ExclusionRules;
use crate::project::file::FileRef;
use crate::project::tree::{DeltaResource, ResourceDelta, ResourceNode};
use event_bus::BuildMode;
use std::collections::BTreeMap;

/// Decides which files of a tree or delta are build candidates.
pub struct CandidateSelector<'a> {
    extensions: &'a [String],
    rules: &'a ExclusionRules,
}

impl<'a> CandidateSelector<'a> {
    pub fn new(extensions: &'a [String], rules: &'a ExclusionRules) -> Self {
        Self { extensions, rules }
    }

    pub fn is_source_file(&self, file: &FileRef) -> bool {
        file.extension().is_some_and(|ext| {
            self.extensions
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
    }

    pub fn is_excluded(&self, file: &FileRef) -> bool {
        self.rules.matches(file.path())
    }

    fn select(&self, event: ChangeEvent, builder: &mut ClassificationBuilder) {
        if !self.is_source_file(&event.file) {
            return;
        }
        // Removals always go through so stale diagnostics can be dropped.
        if !event.is_removal() && self.is_excluded(&event.file) {
            builder.exclude(event.file);
        } else {
            builder.candidate(event);
        }
    }
}

/// Output of a traversal, ready for the build driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Ordered by path; one event per path
    pub candidates: Vec<ChangeEvent>,
    /// Source files skipped by the exclusion rules
    pub excluded: Vec<FileRef>,
    /// Folders reported as removed by a delta
    pub removed_folders: Vec<String>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.excluded.is_empty() && self.removed_folders.is_empty()
    }
}

#[derive(Default)]
struct ClassificationBuilder {
    candidates: BTreeMap<String, ChangeEvent>,
    excluded: BTreeMap<String, FileRef>,
    removed_folders: Vec<String>,
}

impl ClassificationBuilder {
    // Later events for the same path replace earlier ones.
    fn candidate(&mut self, event: ChangeEvent) {
        self.excluded.remove(event.path());
        self.candidates.insert(event.path().to_string(), event);
    }

    fn exclude(&mut self, file: FileRef) {
        self.candidates.remove(file.path());
        self.excluded.insert(file.path().to_string(), file);
    }

    fn build(self) -> Classification {
        Classification {
            candidates: self.candidates.into_values().collect(),
            excluded: self.excluded.into_values().collect(),
            removed_folders: self.removed_folders,
        }
    }
}

pub trait ChangeClassifier {
    fn mode(&self) -> BuildMode;

    fn classify(&self, selector: &CandidateSelector<'_>) -> Classification;
}

/// Every file of the resource tree is a candidate, tagged Added.
pub struct FullTraversal<'a> {
    tree: &'a ResourceNode,
}

impl<'a> FullTraversal<'a> {
    pub fn new(tree: &'a ResourceNode) -> Self {
        Self { tree }
    }
}

impl ChangeClassifier for FullTraversal<'_> {
    fn mode(&self) -> BuildMode {
        BuildMode::Full
    }

    fn classify(&self, selector: &CandidateSelector<'_>) -> Classification {
        let mut builder = ClassificationBuilder::default();
        for file in self.tree.files() {
            selector.select(ChangeEvent::new(file.clone(), ChangeKind::Added), &mut builder);
        }
        builder.build()
    }
}

/// Only the files named by the delta are candidates, with the delta's kind.
pub struct DeltaTraversal<'a> {
    delta: &'a ResourceDelta,
}

impl<'a> DeltaTraversal<'a> {
    pub fn new(delta: &'a ResourceDelta) -> Self {
        Self { delta }
    }

    fn visit(
        delta: &ResourceDelta,
        selector: &CandidateSelector<'_>,
        builder: &mut ClassificationBuilder,
    ) {
        match &delta.resource {
            DeltaResource::File(file) => {
                selector.select(ChangeEvent::new(file.clone(), delta.kind), builder);
            }
            DeltaResource::Folder(path) => {
                if delta.kind == ChangeKind::Removed {
                    builder.removed_folders.push(path.clone());
                }
            }
        }

        for child in &delta.children {
            Self::visit(child, selector, builder);
        }
    }
}

impl ChangeClassifier for DeltaTraversal<'_> {
    fn mode(&self) -> BuildMode {
        BuildMode::Incremental
    }

    fn classify(&self, selector: &CandidateSelector<'_>) -> Classification {
        let mut builder = ClassificationBuilder::default();
        Self::visit(self.delta, selector, &mut builder);
        builder.build()
    }
}
