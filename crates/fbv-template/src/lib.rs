//! # fbv-template
//!
//! Template rendering for fbv-rs. Templates are written in the tera language
//! and found in the directories listed by [`TemplateSettings`](fbv_core::TemplateSettings).
//!
//! ## Modules
//!
//! - [`context`] - the ordered [`Context`] a view hands to a template
//! - [`loaders`] - reading template sources from directories or memory
//! - [`context_processors`] - variables added to every rendered context
//! - [`engine`] - the [`Engine`] and the [`TemplateRenderer`] seam

pub mod context;
pub mod context_processors;
pub mod engine;
pub mod loaders;

pub use context::Context;
pub use context_processors::{ContextProcessor, DebugContextProcessor, RequestContextProcessor};
pub use engine::{Engine, TemplateRenderer};
pub use loaders::{FileSystemLoader, StringLoader, TemplateLoader};
