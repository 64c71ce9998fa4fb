//! Embedded static resources for the preview server.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - preview pages and the live-reload client

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    const RELOAD_JS: &str = include_str!("serve/reload.js");

    fn reload_script(ws_port: u16) -> String {
        RELOAD_JS.replace("__WS_PORT__", &ws_port.to_string())
    }

    /// Variables for preview.html. Values must already be HTML-escaped.
    pub struct PreviewVars<'a> {
        pub title: &'a str,
        pub path: &'a str,
        pub ws_port: u16,
    }

    impl TemplateVars for PreviewVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TITLE__", self.title)
                .replace("__PATH__", self.path)
                .replace("__RELOAD_JS__", &reload_script(self.ws_port))
        }
    }

    /// Variables for index.html. `tree` is pre-rendered HTML.
    pub struct IndexVars<'a> {
        pub tree: &'a str,
        pub ws_port: u16,
    }

    impl TemplateVars for IndexVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TREE__", self.tree)
                .replace("__RELOAD_JS__", &reload_script(self.ws_port))
        }
    }

    /// Preview page embedding one artifact in an iframe.
    pub const PREVIEW_HTML: Template<PreviewVars<'static>> =
        Template::new(include_str!("serve/preview.html"));

    /// Index of compiled artifacts.
    pub const INDEX_HTML: Template<IndexVars<'static>> =
        Template::new(include_str!("serve/index.html"));

}
