//! The demo's URL configuration.

use std::sync::Arc;

use fbv::prelude::*;
use serde_json::json;

use crate::models::ArticleStore;
use crate::views;

pub fn urlpatterns(
    settings: &Settings,
    renderer: &Arc<dyn TemplateRenderer>,
    store: &Arc<ArticleStore>,
) -> FbvResult<URLConf> {
    Ok(URLConf::new(vec![
        path("", into_handler(views::index(renderer.clone(), store.clone())), Some("index"))?,
        path(
            "test-decorator",
            into_handler(views::test_view(renderer.clone())),
            Some("test_decorator"),
        )?,
        path("test-view", into_handler(html_view(renderer.clone())), None)?
            .kwargs(json!({"template_name": "test/template.html"})),
        path("robots.txt", into_handler(file_view(settings)), None)?
            .kwargs(json!({"file_path": "robots.txt"})),
        path("favicon-file.ico", into_handler(favicon_file(settings)), None)?
            .kwargs(json!({"file_path": "static/img/github.png"})),
        path("favicon-emoji.ico", into_handler(favicon_emoji(settings)), None)?
            .kwargs(json!({"emoji": "✨"})),
        path("test-redirect-302", into_handler(redirect_view()), None)?
            .kwargs(json!({"pattern_name": "test_decorator"})),
        path("test-redirect-301", into_handler(redirect_view()), None)?
            .kwargs(json!({"pattern_name": "test_decorator", "permanent": true})),
        path(
            "api/articles",
            into_handler(views::article_list(settings, store.clone())),
            Some("article_list"),
        )?,
        path(
            "api/articles/<int:id>",
            into_handler(views::article_detail(settings, store.clone())),
            Some("article_detail"),
        )?,
        path(
            "api/titles",
            into_handler(views::article_titles(settings, store.clone())),
            Some("article_titles"),
        )?,
    ]))
}
