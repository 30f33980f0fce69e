// 目录客户端
//
// 封装对目录服务的四个只读操作，所有失败统一转换为 CatalogError

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;

use super::types::{CatalogError, Crumb, FolderContents, Node};

/// 目录服务的只读接口
///
/// 不做重试，每次调用的失败都以 CatalogError 返回给调用方
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// 获取树快照
    async fn get_tree(&self) -> Result<Vec<Node>, CatalogError>;

    /// 获取文件夹内容
    async fn get_folder(&self, id: &str) -> Result<FolderContents, CatalogError>;

    /// 获取从根到节点的面包屑路径（含节点本身）
    async fn get_breadcrumbs(&self, id: &str) -> Result<Vec<Crumb>, CatalogError>;

    /// 按名称搜索，空结果是合法的成功
    async fn search(&self, query: &str) -> Result<Vec<Node>, CatalogError>;
}

/// 基于 HTTP 的目录客户端
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// 创建新的目录客户端
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        info!("初始化目录客户端: base_url={}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 发送 GET 请求并解析 JSON
    ///
    /// 404 → NotFound，400 → NotAFolder，其余失败 → Unavailable
    async fn get_json<T: DeserializeOwned>(&self, path: &str, id: &str) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("请求目录服务: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("目录服务请求失败: {}, 错误: {}", url, e);
            CatalogError::unavailable(format!("请求失败: {}", e))
        })?;

        let status = response.status();
        match status {
            StatusCode::NOT_FOUND => return Err(CatalogError::not_found(id)),
            StatusCode::BAD_REQUEST => {
                return Err(CatalogError::NotAFolder { id: id.to_string() })
            }
            s if !s.is_success() => {
                warn!("目录服务返回异常状态: {} {}", url, s);
                return Err(CatalogError::unavailable(format!("HTTP {}", s)));
            }
            _ => {}
        }

        response.json::<T>().await.map_err(|e| {
            warn!("解析目录服务响应失败: {}, 错误: {}", url, e);
            CatalogError::unavailable(format!("响应解析失败: {}", e))
        })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn get_tree(&self) -> Result<Vec<Node>, CatalogError> {
        let tree: Vec<Node> = self.get_json("/api/tree", "").await?;
        debug!("获取到 {} 个顶层节点", tree.len());
        Ok(tree)
    }

    async fn get_folder(&self, id: &str) -> Result<FolderContents, CatalogError> {
        let path = format!("/api/folders/{}", urlencoding::encode(id));
        let contents: FolderContents = self.get_json(&path, id).await?;
        debug!("文件夹 {} 包含 {} 个条目", id, contents.children.len());
        Ok(contents)
    }

    async fn get_breadcrumbs(&self, id: &str) -> Result<Vec<Crumb>, CatalogError> {
        let path = format!("/api/breadcrumbs/{}", urlencoding::encode(id));
        let crumbs: Vec<Crumb> = self.get_json(&path, id).await?;

        // 路径包含节点本身，能解析的节点至少有一个面包屑
        if crumbs.is_empty() {
            return Err(CatalogError::not_found(id));
        }
        Ok(crumbs)
    }

    async fn search(&self, query: &str) -> Result<Vec<Node>, CatalogError> {
        let path = format!("/api/search/{}", urlencoding::encode(query));
        let results: Vec<Node> = self.get_json(&path, query).await?;
        debug!("搜索 {:?} 命中 {} 个条目", query, results.len());
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MemoryCatalog, ROOT_ID};
    use crate::server::build_router;
    use std::sync::Arc;

    /// 在随机端口上启动目录服务，返回客户端
    async fn spawn_server() -> HttpCatalogClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(Arc::new(MemoryCatalog::demo()));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = CatalogConfig {
            base_url: format!("http://{}/", addr),
            ..Default::default()
        };
        HttpCatalogClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash_trimmed() {
        let config = CatalogConfig {
            base_url: "http://localhost:8001/".to_string(),
            ..Default::default()
        };
        let client = HttpCatalogClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8001");
    }

    #[tokio::test]
    async fn test_http_round_trip_against_server() {
        let client = spawn_server().await;

        let tree = client.get_tree().await.unwrap();
        assert!(tree.iter().any(|n| n.id == "documents"));

        let root = client.get_folder(ROOT_ID).await.unwrap();
        assert_eq!(root.folder.id, ROOT_ID);
        assert_eq!(root.children.len(), 3);

        let crumbs = client.get_breadcrumbs("react_app").await.unwrap();
        let ids: Vec<&str> = crumbs.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "projects", "web_projects", "react_app"]);
    }

    #[tokio::test]
    async fn test_http_error_mapping() {
        let client = spawn_server().await;

        assert_eq!(
            client.get_folder("missing").await.unwrap_err(),
            CatalogError::not_found("missing")
        );
        assert_eq!(
            client.get_folder("index_js").await.unwrap_err(),
            CatalogError::NotAFolder {
                id: "index_js".to_string()
            }
        );
        assert_eq!(
            client.get_breadcrumbs("missing").await.unwrap_err(),
            CatalogError::not_found("missing")
        );
    }

    #[tokio::test]
    async fn test_http_search_encodes_query() {
        let client = spawn_server().await;

        let results = client.search("Work Doc").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "work_docs");

        let empty = client.search("zzz-nothing").await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        // 绑定后立即释放，得到一个无人监听的端口
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = CatalogConfig {
            base_url: format!("http://{}", addr),
            timeout_secs: 2,
            ..Default::default()
        };
        let client = HttpCatalogClient::new(&config).unwrap();

        let err = client.get_tree().await.unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }
}
