//! Template pipeline stages.
//!
//! ```text
//! Document --render--> MJML text --compile--> HTML --save--> <output>/<name>.html
//! ```
//!
//! - `render` - variable substitution and partial inclusion (handlebars)
//! - `mjml` - MJML to HTML compilation (mrml)
//! - `output` - artifact writing

pub mod mjml;
pub mod output;
pub mod render;

pub use mjml::{CompileError, CompileOptions, compile};
pub use output::{ARTIFACT_EXT, artifact_path, save};
pub use render::{PartialError, RenderError, Renderer};
