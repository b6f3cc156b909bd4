//! Decorators, middleware and routing working together behind the axum router.

use std::sync::Arc;

use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use fbv_core::{FbvError, Settings};
use fbv_http::urls::{path, re_path, URLConf};
use fbv_http::{HttpRequest, HttpResponse};
use fbv_template::{Context, Engine, TemplateRenderer};
use fbv_views::decorators::{RenderJson, RenderView};
use fbv_views::middleware::method::RequestMethodMiddleware;
use fbv_views::server::App;
use fbv_views::views::function::{require_get, require_post};
use fbv_views::{into_handler, view, view_name, ViewOutput};

fn renderer() -> Arc<dyn TemplateRenderer> {
    let mut engine = Engine::new();
    engine
        .add_string_template("test/template.html", r#"asdf {{ test | default(value="") }}"#)
        .unwrap();
    engine
        .add_string_template("app/article.html", "<h1>{{ title }}</h1>")
        .unwrap();
    Arc::new(engine)
}

fn router(debug: bool) -> axum::Router {
    let renderer = renderer();

    let page = RenderView::html(renderer.clone(), "test/template.html").wrap(
        view_name!(page),
        view(|req: HttpRequest| async move {
            let test = if req.is_post() { "posted" } else { "viewed" };
            Ok(ViewOutput::from(Context::new().with("test", test)))
        }),
    );

    let article = RenderView::new(renderer).wrap(
        fbv_views::ViewName::new("app.views", "article"),
        view(|req: HttpRequest| async move {
            let title = req.kwarg_str("slug").unwrap_or_default().to_string();
            Ok(ViewOutput::from(json!({"title": title})))
        }),
    );

    let data = require_get(
        RenderJson::new()
            .separators((", ", ": "))
            .wrap(view(|req: HttpRequest| async move {
                let id = req.kwarg("id").cloned().unwrap_or_default();
                Ok(ViewOutput::from(json!({"id": id, "items": [1, 2]})))
            })),
    );

    let misconfigured = RenderJson::new()
        .fields(["name"])
        .wrap(view(|_req: HttpRequest| async {
            Ok(ViewOutput::from(json!({"name": "x"})))
        }));

    let archive = RenderJson::new().wrap(view(|req: HttpRequest| async move {
        Ok(ViewOutput::from(json!({"year": req.kwarg("year").cloned()})))
    }));

    let submit = require_post(view(|req: HttpRequest| async move {
        Ok(ViewOutput::from(HttpResponse::ok(format!("posted {}", req.is_post()))))
    }));

    let unrendered = view(|_req: HttpRequest| async { Ok(ViewOutput::from(json!({"a": 1}))) });

    let urls = URLConf::new(vec![
        path("page", into_handler(page), Some("page")).unwrap(),
        path("articles/<slug:slug>", into_handler(article), Some("article")).unwrap(),
        path("data/<int:id>", into_handler(data), Some("data")).unwrap(),
        path("misconfigured", into_handler(misconfigured), None).unwrap(),
        path("unrendered", into_handler(unrendered), None).unwrap(),
        re_path(r"archive/(?P<year>[0-9]{4})/", into_handler(archive), Some("archive")).unwrap(),
        path("submit", into_handler(submit), None).unwrap(),
    ]);

    let settings = Settings {
        debug,
        ..Settings::default()
    };
    App::new(settings)
        .urls(urls)
        .middleware(RequestMethodMiddleware)
        .into_axum_router()
}

async fn send(router: axum::Router, method: &str, uri: &str) -> (StatusCode, String, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_html_page_sees_method_flags() {
    let (status, content_type, body) = send(router(false), "GET", "/page").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/html; charset=utf-8");
    assert_eq!(body, "asdf viewed");

    let (_, _, body) = send(router(false), "POST", "/page").await;
    assert_eq!(body, "asdf posted");
}

#[tokio::test]
async fn test_derived_template_with_captured_kwarg() {
    let (status, _, body) = send(router(false), "GET", "/articles/hello-world").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>hello-world</h1>");
}

#[tokio::test]
async fn test_json_with_separators() {
    let (status, content_type, body) = send(router(false), "GET", "/data/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");
    assert_eq!(body, r#"{"id": 7, "items": [1, 2]}"#);
}

#[tokio::test]
async fn test_json_method_restriction() {
    let (status, _, _) = send(router(false), "PUT", "/data/7").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_fields_on_mapping_is_server_error() {
    let (status, _, body) = send(router(true), "GET", "/misconfigured").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("fields"));
}

#[tokio::test]
async fn test_unrendered_output_is_server_error() {
    let (status, _, body) = send(router(false), "GET", "/unrendered").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn test_routing_miss() {
    let (status, _, body) = send(router(true), "GET", "/articles/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No URL pattern matches"));
}

#[tokio::test]
async fn test_view_error_type_survives_decorators() {
    let failing = RenderView::html(renderer(), "test/template.html").wrap(
        view_name!(failing),
        view(|_req: HttpRequest| async { Err(FbvError::BadRequest("nope".into())) }),
    );
    let urls = URLConf::new(vec![path("fail", into_handler(failing), None).unwrap()]);
    let router = App::new(Settings::default()).urls(urls).into_axum_router();
    let (status, _, body) = send(router, "GET", "/fail").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Bad request: nope");
}

#[tokio::test]
async fn test_regex_route_passes_named_group_as_string() {
    let (status, _, body) = send(router(false), "GET", "/archive/2024/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"year":"2024"}"#);

    let (status, _, _) = send(router(false), "GET", "/archive/24/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_only_view() {
    let (status, _, body) = send(router(false), "POST", "/submit").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "posted true");

    let (status, _, _) = send(router(false), "GET", "/submit").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
