// 目录（Catalog）数据类型定义
//
// 字段命名与目录服务的 JSON 保持一致，客户端和服务端共用同一套类型

use serde::{Deserialize, Serialize};

/// 初始加载使用的根节点 ID
pub const ROOT_ID: &str = "root";

/// 节点类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Folder,
    File,
}

impl NodeKind {
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder)
    }
}

/// 文件或文件夹节点
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// 唯一标识（不透明字符串）
    pub id: String,
    /// 显示名称
    pub name: String,
    /// 节点类型
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// 父节点 ID（根节点为 None）
    #[serde(default)]
    pub parent_id: Option<String>,
    /// 文件大小（文件夹为 None）
    #[serde(default)]
    pub size: Option<u64>,
    /// 修改时间 (ISO8601)
    pub modified: String,
    /// 完整路径
    #[serde(default)]
    pub path: String,
    /// 树快照中预加载的直接子节点
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
    /// 是否可能有子节点（子节点加载前用于显示展开按钮）
    #[serde(default)]
    pub has_children: bool,
}

impl Node {
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    /// 是否显示展开按钮
    pub fn may_have_children(&self) -> bool {
        self.has_children
            || self
                .children
                .as_ref()
                .map(|c| !c.is_empty())
                .unwrap_or(false)
    }

    /// 去掉嵌入的子节点，只保留节点本身
    pub fn without_children(&self) -> Node {
        Node {
            children: None,
            ..self.clone()
        }
    }
}

/// 文件夹内容
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FolderContents {
    pub folder: Node,
    pub children: Vec<Node>,
}

/// 面包屑
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Crumb {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub path: String,
}

impl Crumb {
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
        }
    }
}

impl From<&Node> for Crumb {
    fn from(node: &Node) -> Self {
        Crumb::new(node.id.clone(), node.name.clone(), node.path.clone())
    }
}

/// 错误分类（展示给用户的错误类型）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 传输或解析失败，可重试
    CatalogUnavailable,
    /// 标识已无法解析，换一个标识之前重试无意义
    NotFound,
    /// 搜索请求失败
    SearchFailed,
}

impl ErrorKind {
    pub fn is_retriable(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

/// 目录客户端错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("节点不存在: {id}")]
    NotFound { id: String },

    #[error("指定节点不是文件夹: {id}")]
    NotAFolder { id: String },

    #[error("目录服务不可用: {0}")]
    Unavailable(String),
}

impl CatalogError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// 映射到错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } | Self::NotAFolder { .. } => ErrorKind::NotFound,
            Self::Unavailable(_) => ErrorKind::CatalogUnavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_deserialize_wire_format() {
        let json = r#"{
            "id": "documents",
            "name": "Documents",
            "type": "folder",
            "parent_id": "root",
            "size": null,
            "modified": "2024-05-01T10:00:00.000000",
            "path": "/Documents",
            "children": null,
            "has_children": true
        }"#;

        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind, NodeKind::Folder);
        assert_eq!(node.parent_id.as_deref(), Some("root"));
        assert!(node.children.is_none());
        assert!(node.may_have_children());
    }

    #[test]
    fn test_node_missing_optional_fields() {
        let json = r#"{"id": "a", "name": "a.txt", "type": "file", "modified": ""}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind, NodeKind::File);
        assert!(!node.has_children);
        assert_eq!(node.path, "");
    }

    #[test]
    fn test_may_have_children_from_embedded() {
        let child: Node = serde_json::from_str(
            r#"{"id": "c", "name": "c", "type": "file", "modified": ""}"#,
        )
        .unwrap();
        let mut folder: Node = serde_json::from_str(
            r#"{"id": "f", "name": "f", "type": "folder", "modified": "", "has_children": false}"#,
        )
        .unwrap();
        assert!(!folder.may_have_children());

        folder.children = Some(vec![]);
        assert!(!folder.may_have_children());

        folder.children = Some(vec![child]);
        assert!(folder.may_have_children());
        assert!(folder.without_children().children.is_none());
    }

    #[test]
    fn test_catalog_error_kind() {
        assert_eq!(CatalogError::not_found("x").kind(), ErrorKind::NotFound);
        assert_eq!(
            CatalogError::NotAFolder { id: "x".into() }.kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CatalogError::unavailable("timeout").kind(),
            ErrorKind::CatalogUnavailable
        );
        assert!(!ErrorKind::NotFound.is_retriable());
        assert!(ErrorKind::SearchFailed.is_retriable());
    }
}
