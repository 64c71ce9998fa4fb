//! Event filtering and rebuild-scope decisions.

use std::fmt;
use std::path::{Path, PathBuf};

use super::event::{ChangeEvent, Op};
use crate::source::TEMPLATE_EXT;
use crate::utils::path::{document_name, normalize_path};

/// What a debounce window rebuilds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildScope {
    All,
    One(String),
}

impl fmt::Display for RebuildScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all documents"),
            Self::One(name) => f.write_str(name),
        }
    }
}

/// The directories a watcher observes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRoots {
    pub documents: PathBuf,
    pub partials: Option<PathBuf>,
}

impl WatchRoots {
    pub fn new(documents: &Path, partials: Option<&Path>) -> Self {
        Self {
            documents: normalize_path(documents),
            partials: partials.map(normalize_path),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.documents.as_path()).chain(self.partials.as_deref())
    }

    /// Whether `path` lies below one of the roots.
    pub fn contains(&self, path: &Path) -> bool {
        self.iter().any(|root| path.starts_with(root))
    }

    fn in_partials(&self, path: &Path) -> bool {
        self.partials
            .as_deref()
            .is_some_and(|partials| path.starts_with(partials))
    }
}

/// Whether `event` can affect any artifact.
///
/// Drops hidden files, non-template paths (directories included) and
/// attribute-only changes.
pub fn is_relevant(event: &ChangeEvent) -> bool {
    if event.op == Op::Attribute {
        return false;
    }

    let Some(name) = event.path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with('.') {
        return false;
    }

    event
        .path
        .extension()
        .is_some_and(|ext| ext == TEMPLATE_EXT)
}

/// Decide the rebuild for the last event of a window.
///
/// Anything under partials, and any structural change, rebuilds everything.
/// A write to a document rebuilds that document only. Paths outside both
/// roots yield `None`.
pub fn decide(roots: &WatchRoots, event: &ChangeEvent) -> Option<RebuildScope> {
    let path = normalize_event_path(&event.path);

    if roots.in_partials(&path) {
        return Some(RebuildScope::All);
    }
    if !path.starts_with(&roots.documents) {
        return None;
    }
    if event.op.is_structural() {
        return Some(RebuildScope::All);
    }

    match document_name(&roots.documents, &path, TEMPLATE_EXT) {
        Some(name) => Some(RebuildScope::One(name)),
        None => Some(RebuildScope::All),
    }
}

/// Normalize through the parent so removed files still resolve like their roots.
pub(super) fn normalize_event_path(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => normalize_path(parent).join(name),
        _ => normalize_path(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots() -> WatchRoots {
        WatchRoots {
            documents: PathBuf::from("/project/documents"),
            partials: Some(PathBuf::from("/project/partials")),
        }
    }

    fn change(path: &str, op: Op) -> ChangeEvent {
        ChangeEvent::new(path, op)
    }

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(&change("/project/documents/a.mjml", Op::Write)));
        assert!(is_relevant(&change("/project/documents/a.mjml", Op::Remove)));
        assert!(!is_relevant(&change("/project/documents/.a.mjml", Op::Write)));
        assert!(!is_relevant(&change("/project/documents/.a.mjml.swp", Op::Write)));
        assert!(!is_relevant(&change("/project/documents/a.txt", Op::Write)));
        assert!(!is_relevant(&change("/project/documents/shop", Op::Create)));
        assert!(!is_relevant(&change("/project/documents/a.mjml", Op::Attribute)));
    }

    #[test]
    fn test_decide_write_rebuilds_one() {
        let scope = decide(&roots(), &change("/project/documents/shop/invoice.mjml", Op::Write));
        assert_eq!(scope, Some(RebuildScope::One("shop/invoice".into())));
    }

    #[test]
    fn test_decide_structural_rebuilds_all() {
        for op in [Op::Create, Op::Remove, Op::Rename] {
            let scope = decide(&roots(), &change("/project/documents/a.mjml", op));
            assert_eq!(scope, Some(RebuildScope::All), "{op:?}");
        }
    }

    #[test]
    fn test_decide_partials_rebuild_all() {
        for op in [Op::Write, Op::Create, Op::Remove, Op::Rename] {
            let scope = decide(&roots(), &change("/project/partials/footer.mjml", op));
            assert_eq!(scope, Some(RebuildScope::All), "{op:?}");
        }
    }

    #[test]
    fn test_decide_outside_roots() {
        let scope = decide(&roots(), &change("/project/elsewhere/a.mjml", Op::Write));
        assert_eq!(scope, None);

        let scope = decide(&roots(), &change("/project/documents-old/a.mjml", Op::Write));
        assert_eq!(scope, None);
    }

    #[test]
    fn test_decide_without_partials() {
        let roots = WatchRoots {
            documents: PathBuf::from("/project/documents"),
            partials: None,
        };
        let scope = decide(&roots, &change("/project/partials/footer.mjml", Op::Write));
        assert_eq!(scope, None);
    }

    #[test]
    fn test_roots_contains() {
        let roots = roots();
        assert!(roots.contains(Path::new("/project/partials/x")));
        assert!(roots.contains(Path::new("/project/documents")));
        assert!(!roots.contains(Path::new("/project/output/a.html")));
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(RebuildScope::All.to_string(), "all documents");
        assert_eq!(RebuildScope::One("a/b".into()).to_string(), "a/b");
    }
}
