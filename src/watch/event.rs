use std::fmt;
use std::path::PathBuf;

use notify::EventKind;
use notify::event::ModifyKind;

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Create,
    Write,
    Remove,
    Rename,
    /// Permissions or timestamps only.
    Attribute,
}

impl Op {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Write => "modified",
            Self::Remove => "removed",
            Self::Rename => "renamed",
            Self::Attribute => "attribute",
        }
    }

    /// Create, remove and rename change which documents exist.
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::Create | Self::Remove | Self::Rename)
    }
}

/// A single-path filesystem change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub op: Op,
}

impl ChangeEvent {
    pub fn new(path: impl Into<PathBuf>, op: Op) -> Self {
        Self {
            path: path.into(),
            op,
        }
    }

    /// Split a notify event into one change per path.
    ///
    /// Access and unclassified events carry no content change and map to
    /// nothing.
    pub fn from_notify(event: &notify::Event) -> Vec<Self> {
        let op = match event.kind {
            EventKind::Create(_) => Op::Create,
            EventKind::Remove(_) => Op::Remove,
            EventKind::Modify(ModifyKind::Name(_)) => Op::Rename,
            EventKind::Modify(ModifyKind::Metadata(_)) => Op::Attribute,
            EventKind::Modify(_) => Op::Write,
            EventKind::Access(_) | EventKind::Any | EventKind::Other => return Vec::new(),
        };

        event
            .paths
            .iter()
            .map(|path| Self::new(path.clone(), op))
            .collect()
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.op.label(), self.path.display())
    }
}
