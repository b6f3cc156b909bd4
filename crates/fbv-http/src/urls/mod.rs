//! Django-style URL routing.
//!
//! - [`pattern`] - `path()` and `re_path()` patterns with bound kwargs
//! - [`converters`] - `<int:...>`, `<slug:...>` and friends
//! - [`resolver`] - [`URLConf`](resolver::URLConf) and [`ResolverMatch`](resolver::ResolverMatch)
//! - [`reverse`] - building a URL back from a pattern name

pub mod converters;
pub mod pattern;
pub mod resolver;
pub mod reverse;

pub use pattern::{path, re_path, RouteHandler, URLPattern};
pub use resolver::{ResolverMatch, URLConf};
pub use reverse::reverse;
