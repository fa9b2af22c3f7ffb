//! Page templates rendered with Jinja2 syntax.
//!
//! Templates live in `templates/` at the project root and are embedded into
//! the binary at compile time.

pub mod engine;

pub use engine::{render_template, TemplateError};
