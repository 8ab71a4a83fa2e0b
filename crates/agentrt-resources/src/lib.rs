//! §4.1 Resource Model & Conflict Predicate.
//!
//! A tool call's footprint is the union of the footprints of its argument
//! values. The scheduler (`agentrt-scheduler`) uses `conflicts()` to decide
//! whether two calls may run in the same wave.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// File access mode. Write escalates over read when merged (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileMode {
    Read,
    Write,
}

/// Files touched by a call. An empty `paths` set means "all files" — the
/// widest possible footprint, used by tools that scan or rewrite an unknown
/// set of paths (e.g. a project-wide formatter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAccess {
    pub mode: FileMode,
    pub paths: BTreeSet<String>,
}

impl FileAccess {
    pub fn read(paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            mode: FileMode::Read,
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn write(paths: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            mode: FileMode::Write,
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// "All files" footprint — an empty path set denotes the widest scope.
    pub fn all(mode: FileMode) -> Self {
        Self {
            mode,
            paths: BTreeSet::new(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.paths.is_empty()
    }

    fn merge(&self, other: &FileAccess) -> FileAccess {
        let mode = if self.mode == FileMode::Write || other.mode == FileMode::Write {
            FileMode::Write
        } else {
            FileMode::Read
        };
        if self.is_all() || other.is_all() {
            return FileAccess {
                mode,
                paths: BTreeSet::new(),
            };
        }
        let paths = self.paths.union(&other.paths).cloned().collect();
        FileAccess { mode, paths }
    }

    fn overlaps(&self, other: &FileAccess) -> bool {
        if self.is_all() || other.is_all() {
            return true;
        }
        self.paths.intersection(&other.paths).next().is_some()
    }
}

/// The sandbox has exactly one long-running process per non-read operation.
/// `Read` operations (status checks, log tails) compose freely with each
/// other and with everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SandboxOp {
    Exec,
    Analysis,
    Deploy,
    Read,
}

impl SandboxOp {
    fn is_exclusive(self) -> bool {
        !matches!(self, SandboxOp::Read)
    }
}

/// The declarative footprint of a tool call (§3 "Resources").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub files: Option<FileAccess>,
    pub sandbox: Option<SandboxOp>,
    pub blueprint: bool,
    pub git_commit: bool,
}

impl Resources {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn files(access: FileAccess) -> Self {
        Self {
            files: Some(access),
            ..Self::default()
        }
    }

    pub fn sandbox(op: SandboxOp) -> Self {
        Self {
            sandbox: Some(op),
            ..Self::default()
        }
    }

    pub fn blueprint() -> Self {
        Self {
            blueprint: true,
            ..Self::default()
        }
    }

    pub fn git_commit() -> Self {
        Self {
            git_commit: true,
            ..Self::default()
        }
    }

    /// Union two footprints per the §4.1 merge rules. Used to assemble a
    /// call's total footprint from its individual argument values, and to
    /// track the aggregated footprint of a running wave.
    pub fn merge(&self, other: &Resources) -> Resources {
        let files = match (&self.files, &other.files) {
            (Some(a), Some(b)) => Some(a.merge(b)),
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => Some(b.clone()),
            (None, None) => None,
        };
        // Sandbox: last write wins. A single call should not declare
        // conflicting ops; if it does, the later declaration (`other`) wins.
        let sandbox = other.sandbox.or(self.sandbox);
        Resources {
            files,
            sandbox,
            blueprint: self.blueprint || other.blueprint,
            git_commit: self.git_commit || other.git_commit,
        }
    }

    pub fn merge_all<'a>(items: impl IntoIterator<Item = &'a Resources>) -> Resources {
        items.into_iter().fold(Resources::none(), |acc, r| acc.merge(r))
    }
}

/// §4.1 conflict predicate. Symmetric: `conflicts(a, b) == conflicts(b, a)`.
pub fn conflicts(a: &Resources, b: &Resources) -> bool {
    // Rule 1: file writes racing on overlapping (or "all") paths.
    if let (Some(fa), Some(fb)) = (&a.files, &b.files) {
        let either_writes = fa.mode == FileMode::Write || fb.mode == FileMode::Write;
        if either_writes && fa.overlaps(fb) {
            return true;
        }
    }

    // Rule 2: sandbox — any pairing where either side is exclusive conflicts,
    // except read-vs-read which composes freely.
    if let (Some(sa), Some(sb)) = (a.sandbox, b.sandbox) {
        if sa.is_exclusive() || sb.is_exclusive() {
            return true;
        }
    }

    // Rule 3: blueprint is a single-writer shared document.
    if a.blueprint && b.blueprint {
        return true;
    }

    // Rule 4: a git commit serializes with any file write (on either side).
    let writes = |r: &Resources| r.files.as_ref().map_or(false, |f| f.mode == FileMode::Write);
    if (a.git_commit && writes(b)) || (b.git_commit && writes(a)) {
        return true;
    }

    false
}
