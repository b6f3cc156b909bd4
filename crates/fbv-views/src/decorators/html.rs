//! The HTML render decorator.
//!
//! A wrapped view that returns a [`ViewOutput::Context`] has it rendered
//! through a template into a response. Any other output passes through.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use fbv_http::HttpRequest;
//! use fbv_template::{Context, Engine, TemplateRenderer};
//! use fbv_views::decorators::RenderView;
//! use fbv_views::{view, view_name, ViewOutput};
//!
//! let mut engine = Engine::new();
//! engine.add_string_template("test/template.html", "asdf {{ test }}").unwrap();
//! let renderer: Arc<dyn TemplateRenderer> = Arc::new(engine);
//!
//! let test_view = RenderView::html(renderer, "test/template.html").wrap(
//!     view_name!(test_view),
//!     view(|_req: HttpRequest| async { Ok(ViewOutput::from(Context::new().with("test", 123))) }),
//! );
//! # let _ = test_view;
//! ```

use std::sync::Arc;

use fbv_http::HttpRequest;
use fbv_template::TemplateRenderer;

use super::template_name::resolve_template_name;
use crate::output::{ViewFunction, ViewFuture, ViewName, ViewOutput};

/// Renders mapping outputs of a view through a template.
#[derive(Clone)]
pub struct RenderView {
    renderer: Arc<dyn TemplateRenderer>,
    template_name: Option<String>,
    content_type: Option<String>,
}

impl std::fmt::Debug for RenderView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderView")
            .field("template_name", &self.template_name)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

impl RenderView {
    /// Creates a decorator with no template name and the default content type.
    pub fn new(renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self {
            renderer,
            template_name: None,
            content_type: None,
        }
    }

    /// Creates a decorator rendering `template_name` as HTML.
    pub fn html(renderer: Arc<dyn TemplateRenderer>, template_name: impl Into<String>) -> Self {
        Self::new(renderer).template_name(template_name)
    }

    /// Sets the template used when the context has no `TEMPLATE` entry.
    #[must_use]
    pub fn template_name(mut self, template_name: impl Into<String>) -> Self {
        self.template_name = Some(template_name.into());
        self
    }

    /// Sets the response content type, sent exactly as given.
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Wraps `view`. `view_name` names the view for template derivation.
    pub fn wrap(self, view_name: ViewName, view: ViewFunction) -> ViewFunction {
        let decorator = Arc::new(self);
        let view_name = Arc::new(view_name);

        Arc::new(move |request: HttpRequest| -> ViewFuture {
            let decorator = decorator.clone();
            let view_name = view_name.clone();
            let view = view.clone();

            Box::pin(async move {
                let output = view(request.clone()).await?;
                let ViewOutput::Context(mut context) = output else {
                    return Ok(output);
                };

                let template = resolve_template_name(
                    &view_name,
                    decorator.template_name.as_deref(),
                    &mut context,
                )?;
                let response = decorator
                    .renderer
                    .render(&template, &context, &request, decorator.content_type.as_deref())
                    .map_err(|e| {
                        tracing::error!(view = %view_name, template = %template, error = %e, "template rendering failed");
                        e
                    })?;
                Ok(ViewOutput::Response(response))
            })
        })
    }
}

/// Wraps `view` with [`RenderView`] using no template name and the default
/// content type.
pub fn render_html(
    renderer: Arc<dyn TemplateRenderer>,
    view_name: ViewName,
    view: ViewFunction,
) -> ViewFunction {
    RenderView::new(renderer).wrap(view_name, view)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use fbv_core::{FbvError, FbvResult};
    use fbv_http::HttpResponse;
    use fbv_template::{Context, Engine};
    use serde_json::{json, Value};

    use crate::output::view;

    /// Records every render and delegates to a real engine.
    struct RecordingRenderer {
        engine: Engine,
        calls: Mutex<Vec<(String, Context)>>,
    }

    impl RecordingRenderer {
        fn new() -> Arc<Self> {
            let mut engine = Engine::new();
            engine
                .add_string_template("test/template.html", r#"asdf {{ test | default(value="") }}"#)
                .unwrap();
            engine
                .add_string_template(
                    "tests/decorators/test_render_view/render_view_with_no_template.html",
                    "hjkl {{ test }}",
                )
                .unwrap();
            Arc::new(Self {
                engine,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, Context)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TemplateRenderer for RecordingRenderer {
        fn render_to_string(
            &self,
            name: &str,
            context: &Context,
            request: Option<&HttpRequest>,
        ) -> FbvResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), context.clone()));
            self.engine.render_to_string(name, context, request)
        }
    }

    fn returning(value: serde_json::Value) -> ViewFunction {
        view(move |_req: HttpRequest| {
            let value = value.clone();
            async move { Ok(ViewOutput::from(value)) }
        })
    }

    async fn call(view: &ViewFunction) -> FbvResult<ViewOutput> {
        view(HttpRequest::builder().build()).await
    }

    async fn body(output: ViewOutput) -> (String, String) {
        let ViewOutput::Response(response) = output else {
            panic!("expected a response, got {}", output.kind());
        };
        let content_type = response.content_type().to_string();
        let bytes = response.collect_bytes().await.unwrap();
        (String::from_utf8(bytes).unwrap(), content_type)
    }

    #[tokio::test]
    async fn test_render_with_template_name() {
        let renderer = RecordingRenderer::new();
        let wrapped = RenderView::html(renderer.clone(), "test/template.html")
            .wrap(ViewName::new("tests", "t"), returning(json!({"test": 123})));

        let (content, content_type) = body(call(&wrapped).await.unwrap()).await;
        assert_eq!(content, "asdf 123");
        assert_eq!(content_type, "text/html; charset=utf-8");

        let calls = renderer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "test/template.html");
        assert_eq!(Value::from(calls[0].1.clone()), json!({"test": 123}));
    }

    #[tokio::test]
    async fn test_empty_context() {
        let wrapped = RenderView::html(RecordingRenderer::new(), "test/template.html")
            .wrap(ViewName::new("tests", "t"), returning(json!({})));
        let (content, _) = body(call(&wrapped).await.unwrap()).await;
        assert_eq!(content, "asdf ");
    }

    #[tokio::test]
    async fn test_custom_content_type() {
        let wrapped = RenderView::html(RecordingRenderer::new(), "test/template.html")
            .content_type("application/json")
            .wrap(ViewName::new("tests", "t"), returning(json!({"test": 123})));
        let (content, content_type) = body(call(&wrapped).await.unwrap()).await;
        assert_eq!(content, "asdf 123");
        assert_eq!(content_type, "application/json");
    }

    #[tokio::test]
    async fn test_template_key_overrides_and_is_not_rendered() {
        let renderer = RecordingRenderer::new();
        let wrapped = render_html(
            renderer.clone(),
            ViewName::new("tests", "t"),
            returning(json!({"TEMPLATE": "test/template.html", "test": 123})),
        );
        let (content, _) = body(call(&wrapped).await.unwrap()).await;
        assert_eq!(content, "asdf 123");

        let calls = renderer.calls();
        assert_eq!(calls[0].0, "test/template.html");
        assert!(!calls[0].1.contains_key("TEMPLATE"));
    }

    #[tokio::test]
    async fn test_derived_template_name() {
        let renderer = RecordingRenderer::new();
        let wrapped = render_html(
            renderer.clone(),
            ViewName::new("tests.decorators.test_render_view", "render_view_with_no_template"),
            returning(json!({"test": 456})),
        );
        let (content, _) = body(call(&wrapped).await.unwrap()).await;
        assert_eq!(content, "hjkl 456");
        assert_eq!(renderer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_non_mapping_passes_through() {
        let renderer = RecordingRenderer::new();
        let wrapped = RenderView::html(renderer.clone(), "test/template.html")
            .wrap(ViewName::new("tests", "t"), returning(json!("test123")));
        let output = call(&wrapped).await.unwrap();
        assert!(matches!(output, ViewOutput::Value(ref v) if v == "test123"));
        assert!(renderer.calls().is_empty());

        let response_view = view(|_req: HttpRequest| async {
            Ok(ViewOutput::from(HttpResponse::ok("as is")))
        });
        let wrapped = RenderView::html(renderer.clone(), "test/template.html")
            .wrap(ViewName::new("tests", "t"), response_view);
        let (content, _) = body(call(&wrapped).await.unwrap()).await;
        assert_eq!(content, "as is");
        assert!(renderer.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_template() {
        let wrapped = RenderView::html(RecordingRenderer::new(), "test/template1.html")
            .wrap(ViewName::new("tests", "t"), returning(json!({})));
        let err = call(&wrapped).await.unwrap_err();
        assert!(matches!(err, FbvError::TemplateDoesNotExist(_)));
    }

    #[tokio::test]
    async fn test_view_errors_propagate() {
        let failing = view(|_req: HttpRequest| async {
            Err(FbvError::BadRequest("nope".into()))
        });
        let wrapped = RenderView::html(RecordingRenderer::new(), "test/template.html")
            .wrap(ViewName::new("tests", "t"), failing);
        assert!(matches!(call(&wrapped).await, Err(FbvError::BadRequest(_))));
    }
}
