//! # fbv-db
//!
//! The model side of fbv-rs. There is no database backend here: applications
//! load their own rows and hand them to views as [`ModelRecord`]s or
//! [`QuerySet`]s, which the JSON views know how to flatten.
//!
//! ## Modules
//!
//! - [`value`] - The [`Value`] enum and its JSON encoding
//! - [`model`] - The [`Model`] trait, [`ModelMeta`] and [`ModelRecord`]
//! - [`queryset`] - [`QuerySet`] with model-bearing or projected rows

pub mod model;
pub mod queryset;
pub mod value;

pub use model::{Model, ModelMeta, ModelRecord};
pub use queryset::{QuerySet, QuerySetRows};
pub use value::Value;
