//! The demo's own views.

use std::sync::Arc;

use fbv::prelude::*;
use serde_json::json;

use crate::models::ArticleStore;

/// `test/template.html` with an empty context.
pub fn test_view(renderer: Arc<dyn TemplateRenderer>) -> ViewFunction {
    RenderView::html(renderer, "test/template.html").wrap(
        view_name!(test_view),
        view(|_req: HttpRequest| async { Ok(ViewOutput::from(Context::new())) }),
    )
}

/// The home page, rendered from the derived `site/index.html`.
pub fn index(renderer: Arc<dyn TemplateRenderer>, store: Arc<ArticleStore>) -> ViewFunction {
    render_html(
        renderer,
        ViewName::new("site.views", "index"),
        view(move |_req: HttpRequest| {
            let store = store.clone();
            async move {
                let articles: Vec<_> = store
                    .all()
                    .iter()
                    .map(|a| json!({"id": a.id, "title": a.title}))
                    .collect();
                Ok(ViewOutput::from(
                    Context::new()
                        .with("title", "fbv demo")
                        .with("articles", articles),
                ))
            }
        }),
    )
}

/// Every article as JSON.
pub fn article_list(settings: &Settings, store: Arc<ArticleStore>) -> ViewFunction {
    require_get(RenderJson::from_settings(&settings.json).wrap(view(
        move |_req: HttpRequest| {
            let store = store.clone();
            async move { Ok(ViewOutput::from(QuerySet::from_models(store.all()))) }
        },
    )))
}

/// One article as JSON, limited to `id`, `title` and `published`.
pub fn article_detail(settings: &Settings, store: Arc<ArticleStore>) -> ViewFunction {
    let decorator = RenderJson::from_settings(&settings.json).fields(["id", "title", "published"]);
    require_get(decorator.wrap(view(move |req: HttpRequest| {
        let store = store.clone();
        async move {
            let id = req.kwarg("id").and_then(serde_json::Value::as_i64).unwrap_or_default();
            let article = store
                .get(id)
                .ok_or_else(|| FbvError::NotFound(format!("No article with id {id}")))?;
            Ok(ViewOutput::from(ModelRecord::from_model(article)))
        }
    })))
}

/// Article titles only, as a flat projection.
pub fn article_titles(settings: &Settings, store: Arc<ArticleStore>) -> ViewFunction {
    RenderJson::from_settings(&settings.json)
        .separators((", ", ": "))
        .wrap(view(move |_req: HttpRequest| {
            let store = store.clone();
            async move {
                let titles = QuerySet::from_models(store.all()).values_list(&["title"], true)?;
                Ok(ViewOutput::from(titles))
            }
        }))
}
