//! 侧边栏树的节点存储
//!
//! 按 ID 寻址的节点表，显式记录父子关系。树快照中的所有节点都归这里所有，
//! 展开集合和控制器只持有 ID。

use std::collections::{HashMap, HashSet};

use crate::catalog::{Crumb, Node};

/// 单个节点条目
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaEntry {
    /// 节点本身（不含嵌入的子节点）
    pub node: Node,
    /// 已知的直接子节点 ID，None 表示尚未加载
    pub children: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeArena {
    entries: HashMap<String, ArenaEntry>,
    roots: Vec<String>,
}

impl TreeArena {
    /// 从树快照构建
    pub fn from_snapshot(snapshot: Vec<Node>) -> Self {
        let mut arena = Self::default();
        for node in snapshot {
            let id = arena.insert(node);
            arena.roots.push(id);
        }
        arena
    }

    fn insert(&mut self, mut node: Node) -> String {
        let children = node.children.take().map(|children| {
            children
                .into_iter()
                .map(|child| self.insert(child))
                .collect::<Vec<_>>()
        });

        let id = node.id.clone();
        self.entries.insert(id.clone(), ArenaEntry { node, children });
        id
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn get(&self, id: &str) -> Option<&ArenaEntry> {
        self.entries.get(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.entries.get(id).map(|e| &e.node)
    }

    /// 已知子节点；未加载或节点不存在时返回 None
    pub fn children(&self, id: &str) -> Option<&[String]> {
        self.entries.get(id)?.children.as_deref()
    }

    /// 是否显示展开按钮
    pub fn may_have_children(&self, id: &str) -> bool {
        match self.entries.get(id) {
            Some(entry) => {
                entry.node.has_children
                    || entry.children.as_ref().map(|c| !c.is_empty()).unwrap_or(false)
            }
            None => false,
        }
    }

    /// 补充快照之外的文件夹条目（例如根节点），已存在时不变
    ///
    /// 新条目的子节点未知，随后由 [`graft_children`](Self::graft_children) 填充
    pub fn ensure_node(&mut self, node: &Node) -> bool {
        if self.entries.contains_key(&node.id) {
            return false;
        }
        self.entries.insert(
            node.id.clone(),
            ArenaEntry {
                node: node.without_children(),
                children: None,
            },
        );
        true
    }

    /// 重新挂上快照顶层的父节点，子节点即当前的顶层节点
    pub fn attach_root(&mut self, node: &Node) {
        let roots = self.roots.clone();
        self.entries.insert(
            node.id.clone(),
            ArenaEntry {
                node: node.without_children(),
                children: Some(roots),
            },
        );
    }

    /// 把导航时拿到的文件夹内容补充到树中
    ///
    /// 只在该文件夹的子节点尚未知时生效，已存在的条目不会被覆盖
    pub fn graft_children(&mut self, parent_id: &str, children: &[Node]) -> bool {
        match self.entries.get(parent_id) {
            Some(entry) if entry.children.is_none() => {}
            _ => return false,
        }

        let mut ids = Vec::with_capacity(children.len());
        for child in children {
            if !self.entries.contains_key(&child.id) {
                self.entries.insert(
                    child.id.clone(),
                    ArenaEntry {
                        node: child.without_children(),
                        children: None,
                    },
                );
            }
            ids.push(child.id.clone());
        }

        if let Some(entry) = self.entries.get_mut(parent_id) {
            entry.children = Some(ids);
        }
        true
    }

    /// 沿 parent_id 向上得到的面包屑（仅包含树中已知的节点）
    pub fn ancestry(&self, id: &str) -> Vec<Crumb> {
        let mut crumbs = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(id);

        while let Some(current_id) = current {
            if !visited.insert(current_id) {
                break;
            }
            let Some(node) = self.node(current_id) else {
                break;
            };
            crumbs.push(Crumb::from(node));
            current = node.parent_id.as_deref();
        }

        crumbs.reverse();
        crumbs
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
