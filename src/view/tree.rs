// 侧边栏树视图

use std::collections::HashSet;

use crate::catalog::NodeKind;
use crate::explorer::NavigationState;

/// 侧边栏中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    /// 缩进层级，顶层为 0
    pub depth: usize,
    /// 是否显示展开按钮
    pub expandable: bool,
    pub expanded: bool,
    pub selected: bool,
}

/// 按展开集合把树展开成可见的行
///
/// 只显示已知的子节点；展开了但子节点未知的文件夹不产生子行
pub fn tree_rows(state: &NavigationState) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    let mut visited = HashSet::new();
    for id in state.tree().roots() {
        push_rows(state, id, 0, &mut rows, &mut visited);
    }
    rows
}

fn push_rows<'a>(
    state: &'a NavigationState,
    id: &'a str,
    depth: usize,
    rows: &mut Vec<TreeRow>,
    visited: &mut HashSet<&'a str>,
) {
    let tree = state.tree();
    let Some(node) = tree.node(id) else {
        return;
    };
    if !visited.insert(id) {
        return;
    }

    let expandable = tree.may_have_children(id);
    let expanded = state.expansion().is_expanded(id);
    rows.push(TreeRow {
        id: node.id.clone(),
        name: node.name.clone(),
        kind: node.kind,
        depth,
        expandable,
        expanded,
        selected: state.selected_id() == Some(id),
    });

    if expandable && expanded {
        if let Some(children) = tree.children(id) {
            for child in children {
                push_rows(state, child, depth + 1, rows, visited);
            }
        }
    }
}

/// 渲染为文本
pub fn render_tree(rows: &[TreeRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = match (row.expandable, row.expanded) {
            (true, true) => "▾",
            (true, false) => "▸",
            _ => " ",
        };
        let icon = if row.kind.is_folder() { "📁" } else { "📄" };
        let cursor = if row.selected { ">" } else { " " };
        out.push_str(&format!(
            "{}{}{} {} {}  [{}]\n",
            cursor,
            "  ".repeat(row.depth),
            marker,
            icon,
            row.name,
            row.id
        ));
    }
    out
}
