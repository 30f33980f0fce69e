// 视图模块
//
// 只读取导航状态并渲染为文本，不持有任何状态

pub mod list;
pub mod status;
pub mod tree;

pub use list::{format_modified, format_size, list_rows, render_list, sort_items, ListRow, SortField, SortOrder};
pub use status::{content_view, render_breadcrumbs, status_line, ContentView};
pub use tree::{render_tree, tree_rows, TreeRow};
