//! # fbv-core
//!
//! Core types for the fbv-rs workspace. Every other crate builds on these.
//!
//! ## Modules
//!
//! - [`error`] - The [`FbvError`] enum and the [`FbvResult`] alias
//! - [`settings`] - Explicit configuration passed to apps, engines and decorators
//! - [`settings_loader`] - Loading settings from TOML, JSON and the environment
//! - [`logging`] - Tracing subscriber setup and per-request spans

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

pub use error::{FbvError, FbvResult};
pub use settings::{JsonSettings, Settings, TemplateSettings};
