// 文件列表视图
//
// 排序只作用于渲染出的行，状态中的 current_items 保持目录返回的顺序

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::catalog::{Node, NodeKind};

/// 排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Name,
    Modified,
    Size,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "modified" | "date" => Ok(Self::Modified),
            "size" => Ok(Self::Size),
            other => Err(format!("未知的排序字段: {}", other)),
        }
    }
}

/// 排序顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("未知的排序顺序: {}", other)),
        }
    }
}

/// 列表中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub id: String,
    pub name: String,
    /// 格式化后的修改时间
    pub modified: String,
    /// 类型说明
    pub kind_label: &'static str,
    /// 格式化后的大小（文件夹为空）
    pub size: String,
    pub selected: bool,
}

/// 按字段排序，文件夹始终排在前面
pub fn sort_items<'a>(items: &'a [Node], field: SortField, order: SortOrder) -> Vec<&'a Node> {
    let mut sorted: Vec<&Node> = items.iter().collect();
    sorted.sort_by(|a, b| {
        match (a.kind, b.kind) {
            (NodeKind::Folder, NodeKind::File) => return Ordering::Less,
            (NodeKind::File, NodeKind::Folder) => return Ordering::Greater,
            _ => {}
        }

        let cmp = match field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Size => a.size.unwrap_or(0).cmp(&b.size.unwrap_or(0)),
            SortField::Modified => match (parse_timestamp(&a.modified), parse_timestamp(&b.modified)) {
                (Some(ta), Some(tb)) => ta.cmp(&tb),
                _ => a.modified.cmp(&b.modified),
            },
        };

        match order {
            SortOrder::Asc => cmp,
            SortOrder::Desc => cmp.reverse(),
        }
    });
    sorted
}

/// 生成列表行
pub fn list_rows(
    items: &[Node],
    selected_id: Option<&str>,
    field: SortField,
    order: SortOrder,
) -> Vec<ListRow> {
    sort_items(items, field, order)
        .into_iter()
        .map(|node| ListRow {
            id: node.id.clone(),
            name: node.name.clone(),
            modified: format_modified(&node.modified),
            kind_label: kind_label(node.kind),
            size: node.size.map(format_size).unwrap_or_default(),
            selected: selected_id == Some(node.id.as_str()),
        })
        .collect()
}

pub fn kind_label(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Folder => "文件夹",
        NodeKind::File => "文件",
    }
}

/// 格式化文件大小（1024 进制，最多两位小数）
///
/// 0 字节显示为空
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    let (value, unit) = if bytes == 0 {
        return String::new();
    } else if bytes >= GB {
        (bytes as f64 / GB as f64, "GB")
    } else if bytes >= MB {
        (bytes as f64 / MB as f64, "MB")
    } else if bytes >= KB {
        (bytes as f64 / KB as f64, "KB")
    } else {
        return format!("{} B", bytes);
    };

    let number = format!("{:.2}", value);
    let number = number.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", number, unit)
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// 格式化修改时间，无法解析时原样返回
pub fn format_modified(value: &str) -> String {
    match parse_timestamp(value) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => value.to_string(),
    }
}

/// 渲染为文本表格
pub fn render_list(rows: &[ListRow]) -> String {
    if rows.is_empty() {
        return "此文件夹为空\n".to_string();
    }

    let name_width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = format!(
        "  {:<name_width$}  {:<16}  {:<6}  {}\n",
        "名称",
        "修改日期",
        "类型",
        "大小",
        name_width = name_width
    );
    for row in rows {
        out.push_str(&format!(
            "{} {:<name_width$}  {:<16}  {:<6}  {}  [{}]\n",
            if row.selected { ">" } else { " " },
            row.name,
            row.modified,
            row.kind_label,
            row.size,
            row.id,
            name_width = name_width
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, kind: NodeKind, size: Option<u64>, modified: &str) -> Node {
        Node {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            parent_id: Some("root".to_string()),
            size,
            modified: modified.to_string(),
            path: format!("/{}", id),
            children: None,
            has_children: false,
        }
    }

    fn sample() -> Vec<Node> {
        vec![
            node("b.txt", NodeKind::File, Some(300), "2024-03-01T09:00:00.000000"),
            node("Zeta", NodeKind::Folder, None, "2024-01-01T00:00:00"),
            node("a.txt", NodeKind::File, Some(5000), "2024-05-01T09:00:00Z"),
            node("alpha", NodeKind::Folder, None, "2024-06-01T00:00:00"),
        ]
    }

    fn ids(nodes: &[&Node]) -> Vec<String> {
        nodes.iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn test_sort_by_name_folders_first() {
        let items = sample();
        let sorted = sort_items(&items, SortField::Name, SortOrder::Asc);
        assert_eq!(ids(&sorted), vec!["alpha", "Zeta", "a.txt", "b.txt"]);

        let sorted = sort_items(&items, SortField::Name, SortOrder::Desc);
        assert_eq!(ids(&sorted), vec!["Zeta", "alpha", "b.txt", "a.txt"]);
    }

    #[test]
    fn test_sort_by_size_and_modified() {
        let items = sample();
        let sorted = sort_items(&items, SortField::Size, SortOrder::Desc);
        assert_eq!(ids(&sorted)[2..], ["a.txt", "b.txt"]);

        let sorted = sort_items(&items, SortField::Modified, SortOrder::Asc);
        assert_eq!(ids(&sorted), vec!["Zeta", "alpha", "b.txt", "a.txt"]);
    }

    #[test]
    fn test_sorting_leaves_items_untouched() {
        let items = sample();
        let before = items.clone();
        let _ = list_rows(&items, None, SortField::Size, SortOrder::Asc);
        assert_eq!(items, before);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(2_048_576), "1.95 MB");
        assert_eq!(format_size(5_242_880), "5 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_format_modified() {
        assert_eq!(format_modified("2024-05-01T10:30:12.123456"), "2024-05-01 10:30");
        assert_eq!(format_modified("2024-05-01T10:30:12+00:00"), "2024-05-01 10:30");
        assert_eq!(format_modified("yesterday"), "yesterday");
    }

    #[test]
    fn test_list_rows() {
        let items = sample();
        let rows = list_rows(&items, Some("a.txt"), SortField::Name, SortOrder::Asc);
        let a = rows.iter().find(|r| r.id == "a.txt").unwrap();
        assert!(a.selected);
        assert_eq!(a.kind_label, "文件");
        assert_eq!(a.size, "4.88 KB");
        let zeta = rows.iter().find(|r| r.id == "Zeta").unwrap();
        assert_eq!(zeta.kind_label, "文件夹");
        assert_eq!(zeta.size, "");
    }

    #[test]
    fn test_render_empty_folder() {
        assert_eq!(render_list(&[]), "此文件夹为空\n");
        let items = sample();
        let text = render_list(&list_rows(&items, None, SortField::Name, SortOrder::Asc));
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_parse_sort_args() {
        assert_eq!("Size".parse::<SortField>().unwrap(), SortField::Size);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("color".parse::<SortField>().is_err());
    }
}
