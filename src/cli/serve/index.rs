//! Index of compiled artifacts as a nested tree.

use std::path::Path;

use jwalk::WalkDir;

use crate::compiler::ARTIFACT_EXT;
use crate::config::TemplateConfig;
use crate::utils::html::escape;

/// A directory or artifact in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    /// Slash-separated path below the output root; `None` for directories.
    pub path: Option<String>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn dir(name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: None,
            children: Vec::new(),
        }
    }

    fn is_dir(&self) -> bool {
        self.path.is_none()
    }

    /// Insert an artifact at `parts`, creating intermediate directories.
    fn insert(&mut self, parts: &[&str], path: &str) {
        let [head, rest @ ..] = parts else {
            return;
        };

        if rest.is_empty() {
            self.children.push(Self {
                name: head.to_string(),
                path: Some(path.to_string()),
                children: Vec::new(),
            });
            return;
        }

        let index = match self
            .children
            .iter()
            .position(|c| c.is_dir() && c.name == *head)
        {
            Some(index) => index,
            None => {
                self.children.push(Self::dir(head));
                self.children.len() - 1
            }
        };
        self.children[index].insert(rest, path);
    }

    /// Directories first, then files, each alphabetical.
    fn sort(&mut self) {
        self.children
            .sort_by(|a, b| b.is_dir().cmp(&a.is_dir()).then_with(|| a.name.cmp(&b.name)));
        for child in &mut self.children {
            child.sort();
        }
    }
}

/// Collect every artifact below `output`. A missing output directory gives
/// an empty tree.
pub fn build_tree(output: &Path) -> TreeNode {
    let mut root = TreeNode::dir("/");
    if !output.is_dir() {
        return root;
    }

    for entry in WalkDir::new(output).into_iter().flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != ARTIFACT_EXT) {
            continue;
        }
        let Ok(relative) = path.strip_prefix(output) else {
            continue;
        };

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
        root.insert(&parts, &parts.join("/"));
    }

    root.sort();
    root
}

/// Render the tree as nested `<ul>` lists.
pub fn render_tree(root: &TreeNode, template: &TemplateConfig) -> String {
    if root.children.is_empty() {
        return r#"<p class="empty">No compiled templates yet.</p>"#.to_string();
    }

    let mut out = String::new();
    render_children(root, template, &mut out);
    out
}

fn render_children(node: &TreeNode, template: &TemplateConfig, out: &mut String) {
    out.push_str("<ul>");
    for child in &node.children {
        out.push_str("<li>");
        match &child.path {
            None => {
                out.push_str(&format!(r#"<span class="dir">{}/</span>"#, escape(&child.name)));
                render_children(child, template, out);
            }
            Some(path) => {
                let name = path
                    .strip_suffix(&format!(".{ARTIFACT_EXT}"))
                    .unwrap_or(path);
                let label = child
                    .name
                    .strip_suffix(&format!(".{ARTIFACT_EXT}"))
                    .unwrap_or(&child.name);
                out.push_str(&format!(
                    r#"<a href="/{}">{}</a>"#,
                    escape(path),
                    escape(label)
                ));
                if let Some(title) = template.title_of(name) {
                    out.push_str(&format!(r#"<span class="title">{}</span>"#, escape(title)));
                }
            }
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}
