//! Configuration section definitions.

mod mjml;
mod paths;
mod serve;
mod template;

pub use mjml::MjmlConfig;
pub use paths::PathsConfig;
pub use serve::ServeConfig;
pub use template::TemplateConfig;
