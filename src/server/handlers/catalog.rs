// 目录 API 处理器
//
// 响应体与 FastAPI 版本的目录服务一致：成功时直接返回 JSON，失败时返回 {"detail": ...}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::catalog::{CatalogError, Crumb, FolderContents, Node};
use crate::server::state::AppState;

/// 错误响应
#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        let (status, detail) = match &self {
            CatalogError::NotFound { .. } => (StatusCode::NOT_FOUND, "Folder not found"),
            CatalogError::NotAFolder { .. } => (StatusCode::BAD_REQUEST, "Item is not a folder"),
            CatalogError::Unavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Catalog unavailable")
            }
        };
        debug!("目录请求失败: {}", self);

        (
            status,
            Json(ErrorResponse {
                detail: detail.to_string(),
            }),
        )
            .into_response()
    }
}

/// GET /api/tree
/// 文件夹树（从根节点的子节点开始）
pub async fn get_tree(State(state): State<AppState>) -> Json<Vec<Node>> {
    Json(state.catalog.build_tree())
}

/// GET /api/folders/:id
/// 文件夹本身及其直接子节点
pub async fn get_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FolderContents>, CatalogError> {
    state.catalog.folder(&id).map(Json)
}

/// GET /api/breadcrumbs/:id
/// 从根到节点的路径
pub async fn get_breadcrumbs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Crumb>>, CatalogError> {
    state.catalog.breadcrumbs(&id).map(Json)
}

/// GET /api/search/:query
/// 名称包含查询串的节点
pub async fn search(State(state): State<AppState>, Path(query): Path<String>) -> Json<Vec<Node>> {
    Json(state.catalog.search_by_name(&query))
}

/// 健康检查响应结构
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    message: String,
    items: usize,
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Catalog API is running".to_string(),
        items: state.catalog.len(),
    })
}
