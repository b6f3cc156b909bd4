//! View decorators.
//!
//! Each decorator wraps a [`ViewFunction`](crate::ViewFunction) and returns a
//! new one. Outputs a decorator does not handle pass through unchanged.

pub mod html;
pub mod json;
pub mod template_name;

pub use html::{render_html, RenderView};
pub use json::{render_json, serialize_record, RenderJson};
pub use template_name::{derive_template_name, resolve_template_name, with_extension, TEMPLATE_KEY};
