// 内存目录服务
//
// 只读的扁平节点表，按 parent_id 组织层级；同时作为 HTTP 服务端的数据源

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use tracing::{info, warn};

use super::client::CatalogClient;
use super::types::{CatalogError, Crumb, FolderContents, Node, NodeKind, ROOT_ID};

/// 内存目录
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    items: HashMap<String, Node>,
}

impl MemoryCatalog {
    /// 从扁平节点列表创建（嵌入的 children 会被忽略）
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut items = HashMap::new();
        for node in nodes {
            let node = node.without_children();
            if items.contains_key(&node.id) {
                warn!("目录中存在重复的节点 ID，后者覆盖前者: {}", node.id);
            }
            items.insert(node.id.clone(), node);
        }
        Self { items }
    }

    /// 从 JSON 文件加载（节点数组）
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog seed file: {:?}", path))?;
        let nodes: Vec<Node> =
            serde_json::from_str(&content).context("Failed to parse catalog seed file")?;

        let catalog = Self::from_nodes(nodes);
        info!("已加载目录种子文件: {:?}, 共 {} 个节点", path, catalog.len());
        Ok(catalog)
    }

    /// 演示用目录数据
    pub fn demo() -> Self {
        let now = Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string();

        let folder = |id: &str, name: &str, parent: Option<&str>, path: &str, has_children: bool| {
            Node {
                id: id.to_string(),
                name: name.to_string(),
                kind: NodeKind::Folder,
                parent_id: parent.map(str::to_string),
                size: None,
                modified: now.clone(),
                path: path.to_string(),
                children: None,
                has_children,
            }
        };
        let file = |id: &str, name: &str, parent: &str, path: &str, size: u64| Node {
            id: id.to_string(),
            name: name.to_string(),
            kind: NodeKind::File,
            parent_id: Some(parent.to_string()),
            size: Some(size),
            modified: now.clone(),
            path: path.to_string(),
            children: None,
            has_children: false,
        };

        Self::from_nodes(vec![
            folder(ROOT_ID, "This PC", None, "/", true),
            folder("documents", "Documents", Some(ROOT_ID), "/Documents", true),
            folder("pictures", "Pictures", Some(ROOT_ID), "/Pictures", true),
            folder("projects", "Projects", Some(ROOT_ID), "/Projects", true),
            folder(
                "work_docs",
                "Work Documents",
                Some("documents"),
                "/Documents/Work Documents",
                true,
            ),
            folder(
                "personal_docs",
                "Personal",
                Some("documents"),
                "/Documents/Personal",
                false,
            ),
            folder(
                "vacation_pics",
                "Vacation 2024",
                Some("pictures"),
                "/Pictures/Vacation 2024",
                false,
            ),
            folder(
                "web_projects",
                "Web Development",
                Some("projects"),
                "/Projects/Web Development",
                true,
            ),
            file(
                "report_doc",
                "Annual Report.docx",
                "work_docs",
                "/Documents/Work Documents/Annual Report.docx",
                2_048_576,
            ),
            file(
                "presentation",
                "Q4 Presentation.pptx",
                "work_docs",
                "/Documents/Work Documents/Q4 Presentation.pptx",
                5_242_880,
            ),
            file(
                "beach_photo",
                "beach_sunset.jpg",
                "vacation_pics",
                "/Pictures/Vacation 2024/beach_sunset.jpg",
                1_048_576,
            ),
            folder(
                "react_app",
                "my-react-app",
                Some("web_projects"),
                "/Projects/Web Development/my-react-app",
                true,
            ),
            file(
                "index_js",
                "index.js",
                "react_app",
                "/Projects/Web Development/my-react-app/index.js",
                1024,
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: &str) -> Option<&Node> {
        self.items.get(id)
    }

    /// 直接子节点：文件夹在前，名称不区分大小写排序
    pub fn children_of(&self, parent_id: &str) -> Vec<Node> {
        let mut children: Vec<Node> = self
            .items
            .values()
            .filter(|n| n.parent_id.as_deref() == Some(parent_id))
            .cloned()
            .collect();
        sort_listing(&mut children);
        children
    }

    /// 构建层级树（从根节点的子节点开始）
    pub fn build_tree(&self) -> Vec<Node> {
        let mut visited = HashSet::new();
        visited.insert(ROOT_ID.to_string());
        self.build_subtree(ROOT_ID, &mut visited)
    }

    fn build_subtree(&self, parent_id: &str, visited: &mut HashSet<String>) -> Vec<Node> {
        let mut children = self.children_of(parent_id);
        for child in children.iter_mut() {
            if child.is_folder() && child.has_children && visited.insert(child.id.clone()) {
                child.children = Some(self.build_subtree(&child.id, visited));
            }
        }
        children
    }

    /// 文件夹内容
    pub fn folder(&self, id: &str) -> Result<FolderContents, CatalogError> {
        let folder = self.item(id).ok_or_else(|| CatalogError::not_found(id))?;
        if !folder.is_folder() {
            return Err(CatalogError::NotAFolder { id: id.to_string() });
        }
        Ok(FolderContents {
            folder: folder.clone(),
            children: self.children_of(id),
        })
    }

    /// 从根到节点的面包屑
    pub fn breadcrumbs(&self, id: &str) -> Result<Vec<Crumb>, CatalogError> {
        let mut crumbs = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(id.to_string());

        while let Some(current_id) = current {
            if !visited.insert(current_id.clone()) {
                warn!("检测到循环的父子关系: {}", current_id);
                break;
            }
            let Some(item) = self.item(&current_id) else {
                break;
            };
            crumbs.push(Crumb::from(item));
            current = item.parent_id.clone();
        }

        if crumbs.is_empty() {
            return Err(CatalogError::not_found(id));
        }
        crumbs.reverse();
        Ok(crumbs)
    }

    /// 名称包含查询串（不区分大小写）的所有节点
    pub fn search_by_name(&self, query: &str) -> Vec<Node> {
        let query_lower = query.to_lowercase();
        let mut results: Vec<Node> = self
            .items
            .values()
            .filter(|n| n.name.to_lowercase().contains(&query_lower))
            .cloned()
            .collect();
        sort_listing(&mut results);
        results
    }
}

/// 文件夹在前，其次按名称（不区分大小写）
fn sort_listing(nodes: &mut [Node]) {
    nodes.sort_by_key(|n| (n.kind == NodeKind::File, n.name.to_lowercase()));
}

#[async_trait]
impl CatalogClient for MemoryCatalog {
    async fn get_tree(&self) -> Result<Vec<Node>, CatalogError> {
        Ok(self.build_tree())
    }

    async fn get_folder(&self, id: &str) -> Result<FolderContents, CatalogError> {
        self.folder(id)
    }

    async fn get_breadcrumbs(&self, id: &str) -> Result<Vec<Crumb>, CatalogError> {
        self.breadcrumbs(id)
    }

    async fn search(&self, query: &str) -> Result<Vec<Node>, CatalogError> {
        Ok(self.search_by_name(query))
    }
}
