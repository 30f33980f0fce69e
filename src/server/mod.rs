// 目录服务模块

pub mod handlers;
pub mod state;

pub use state::AppState;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::catalog::MemoryCatalog;

/// 构建目录服务路由
pub fn build_router(catalog: Arc<MemoryCatalog>) -> Router {
    // 配置中间件层
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http()) // HTTP 请求日志
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let api_routes = Router::new()
        .route("/tree", get(handlers::get_tree))
        .route("/folders/:id", get(handlers::get_folder))
        .route("/breadcrumbs/:id", get(handlers::get_breadcrumbs))
        .route("/search/:query", get(handlers::search))
        .route("/health", get(handlers::health_check))
        .with_state(AppState::new(catalog));

    Router::new().nest("/api", api_routes).layer(middleware)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let app = build_router(Arc::new(MemoryCatalog::demo()));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_tree_embeds_children() {
        let (status, body) = get("/api/tree").await;
        assert_eq!(status, StatusCode::OK);
        let roots = body.as_array().unwrap();
        assert_eq!(roots.len(), 3);
        assert_eq!(roots[0]["id"], "documents");
        assert_eq!(roots[0]["type"], "folder");
        assert_eq!(roots[0]["children"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_folder_contents() {
        let (status, body) = get("/api/folders/work_docs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["folder"]["name"], "Work Documents");
        assert_eq!(body["children"][0]["id"], "report_doc");
        assert_eq!(body["children"][0]["size"], 2_048_576);
    }

    #[tokio::test]
    async fn test_folder_errors() {
        let (status, body) = get("/api/folders/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Folder not found");

        let (status, body) = get("/api/folders/index_js").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Item is not a folder");
    }

    #[tokio::test]
    async fn test_breadcrumbs_and_search() {
        let (status, body) = get("/api/breadcrumbs/index_js").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["This PC", "Projects", "Web Development", "my-react-app", "index.js"]
        );

        let (status, body) = get("/api/search/annual%20report").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "report_doc");
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["items"], 13);
    }
}
