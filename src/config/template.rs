//! Default `envelopr.toml` written by `envelopr init`.

pub const DEFAULT_CONFIG: &str = r#"# Directory paths, relative to this file
[paths]
# Templates compiled to HTML
documents = "documents"
# Templates that can be included with {{> name}} ("" disables partials)
partials = "partials"
# Compiled HTML files
output = "output"

# MJML compilation settings
[mjml]
# Keep comments in output HTML
keep_comments = false

# Custom fonts to include
[mjml.fonts]
# Roboto = "https://fonts.googleapis.com/css?family=Roboto"

# Template processing settings
[template]
# The MJML compiler url-encodes href attributes. This keeps template
# expressions like href="{{exp "url"}}" intact for two-stage processing.
preserve_href_expressions = true

# Variables available to all templates
[template.variables]
# company = "ACME Corp"

# Per-document variables, keyed by document name
# [template.documents.newsletter]
# title = "Monthly Newsletter"
# variables = { shop_url = "https://example.shop" }

# Preview server
[serve]
interface = "127.0.0.1"
port = 3600
reload_port = 35729
"#;
