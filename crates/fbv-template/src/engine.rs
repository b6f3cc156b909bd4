//! Template engine: loading, compiling and rendering templates.
//!
//! The [`Engine`] compiles every template its loaders find into a
//! [`tera::Tera`] instance once, then renders them with a [`Context`] merged
//! over the output of its context processors. Views reach it through the
//! [`TemplateRenderer`] trait so that tests can substitute their own renderer.

use std::fmt;
use std::path::PathBuf;

use serde_json::{Map, Value};

use fbv_core::{FbvError, FbvResult, Settings};
use fbv_http::{HttpRequest, HttpResponse};

use crate::context::Context;
use crate::context_processors::{ContextProcessor, DebugContextProcessor, RequestContextProcessor};
use crate::loaders::{FileSystemLoader, TemplateLoader};

/// Template suffixes rendered with HTML autoescaping.
const AUTOESCAPE_SUFFIXES: [&str; 3] = [".html", ".htm", ".xml"];

/// Renders named templates.
pub trait TemplateRenderer: Send + Sync {
    /// Renders `name` with `context`. Context processors run when a request
    /// is given.
    fn render_to_string(
        &self,
        name: &str,
        context: &Context,
        request: Option<&HttpRequest>,
    ) -> FbvResult<String>;

    /// Renders `name` into a 200 response. Without a `content_type` the
    /// response is `text/html; charset=utf-8`.
    fn render(
        &self,
        name: &str,
        context: &Context,
        request: &HttpRequest,
        content_type: Option<&str>,
    ) -> FbvResult<HttpResponse> {
        let body = self.render_to_string(name, context, Some(request))?;
        let mut response = HttpResponse::ok(body);
        if let Some(content_type) = content_type {
            response.set_content_type(content_type);
        }
        Ok(response)
    }
}

/// The template engine.
///
/// # Examples
///
/// ```
/// use fbv_template::{Context, Engine, TemplateRenderer};
///
/// let mut engine = Engine::new();
/// engine.add_string_template("test/template.html", "asdf {{ test }}").unwrap();
///
/// let ctx = Context::new().with("test", 123);
/// assert_eq!(
///     engine.render_to_string("test/template.html", &ctx, None).unwrap(),
///     "asdf 123"
/// );
/// ```
pub struct Engine {
    tera: tera::Tera,
    processors: Vec<Box<dyn ContextProcessor>>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("templates", &self.template_names())
            .field("processors", &self.processors.len())
            .finish()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with no templates and no context processors.
    pub fn new() -> Self {
        let mut tera = tera::Tera::default();
        tera.autoescape_on(AUTOESCAPE_SUFFIXES.to_vec());
        Self {
            tera,
            processors: Vec::new(),
        }
    }

    /// Creates an engine from the first template backend in `settings`.
    ///
    /// Relative template directories are resolved against `base_dir`.
    /// Context processors are looked up by name: `"request"` and `"debug"`.
    ///
    /// # Errors
    ///
    /// [`FbvError::ImproperlyConfigured`] for an unknown context processor,
    /// [`FbvError::TemplateSyntaxError`] if a template fails to compile, and
    /// [`FbvError::IoError`] if a template file cannot be read.
    pub fn from_settings(settings: &Settings) -> FbvResult<Self> {
        let templates = settings.template_settings();
        let dirs: Vec<PathBuf> = templates
            .dirs
            .iter()
            .map(|dir| {
                if dir.is_absolute() {
                    dir.clone()
                } else {
                    settings.base_dir.join(dir)
                }
            })
            .collect();

        let mut engine = Self::from_loader(&FileSystemLoader::new(dirs), templates.autoescape)?;
        for name in &templates.context_processors {
            match name.as_str() {
                "request" => engine.add_context_processor(RequestContextProcessor),
                "debug" => engine.add_context_processor(DebugContextProcessor {
                    debug: settings.debug,
                }),
                other => {
                    return Err(FbvError::ImproperlyConfigured(format!(
                        "Unknown context processor: {other}"
                    )))
                }
            }
        }
        Ok(engine)
    }

    /// Creates an engine holding every template `loader` finds.
    pub fn from_loader(loader: &dyn TemplateLoader, autoescape: bool) -> FbvResult<Self> {
        let mut engine = Self::new();
        if !autoescape {
            engine.tera.autoescape_on(Vec::new());
        }
        engine
            .tera
            .add_raw_templates(loader.load_all()?)
            .map_err(map_tera_error)?;
        Ok(engine)
    }

    /// Adds or replaces a template from source text.
    pub fn add_string_template(&mut self, name: &str, source: &str) -> FbvResult<()> {
        self.tera
            .add_raw_template(name, source)
            .map_err(map_tera_error)
    }

    /// Appends a context processor.
    pub fn add_context_processor(&mut self, processor: impl ContextProcessor + 'static) {
        self.processors.push(Box::new(processor));
    }

    /// Returns `true` if a template with this name is loaded.
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Returns the names of all loaded templates, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }
}

impl TemplateRenderer for Engine {
    fn render_to_string(
        &self,
        name: &str,
        context: &Context,
        request: Option<&HttpRequest>,
    ) -> FbvResult<String> {
        let mut vars = Map::new();
        if let Some(request) = request {
            for processor in &self.processors {
                vars.extend(processor.process(request));
            }
        }
        vars.extend(context.as_map().iter().map(|(k, v)| (k.clone(), v.clone())));

        let tera_context =
            tera::Context::from_value(Value::Object(vars)).map_err(map_tera_error)?;
        let rendered = self.tera.render(name, &tera_context).map_err(map_tera_error)?;
        tracing::debug!(template = name, bytes = rendered.len(), "rendered template");
        Ok(rendered)
    }
}

fn map_tera_error(err: tera::Error) -> FbvError {
    if let tera::ErrorKind::TemplateNotFound(name) = &err.kind {
        return FbvError::TemplateDoesNotExist(name.clone());
    }
    let mut message = err.to_string();
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    FbvError::TemplateSyntaxError(message)
}
