// 交互式外壳
//
// 把一行命令转换为导航意图交给控制器，等待响应后把状态渲染成文本

use std::fmt::Write as _;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::catalog::{CatalogClient, Node};
use crate::explorer::NavigationController;
use crate::view::{self, ContentView, SortField, SortOrder};

pub const HELP: &str = "\
命令:
  tree                          显示侧边栏树
  ls                            显示当前文件夹
  open <id>                     选中节点（文件夹会加载内容）
  expand <id>                   展开/折叠侧边栏节点
  cd <id>                       跳转到面包屑中的文件夹
  find <关键字>                 按名称搜索
  sort <name|modified|size> [asc|desc]
  refresh                       重新加载树和当前文件夹
  retry                         重试失败的操作
  help                          显示帮助
  quit                          退出";

/// 外壳命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tree,
    List,
    Open(String),
    Expand(String),
    Cd(String),
    Find(String),
    Sort(SortField, SortOrder),
    Refresh,
    Retry,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let require_arg = |usage: &str| {
            if rest.is_empty() {
                Err(format!("用法: {}", usage))
            } else {
                Ok(rest.to_string())
            }
        };

        match name.to_lowercase().as_str() {
            "tree" => Ok(Self::Tree),
            "ls" | "list" => Ok(Self::List),
            "open" | "select" => require_arg("open <id>").map(Self::Open),
            "expand" | "toggle" => require_arg("expand <id>").map(Self::Expand),
            "cd" => require_arg("cd <id>").map(Self::Cd),
            // 空查询交给控制器忽略
            "find" | "search" => Ok(Self::Find(rest.to_string())),
            "sort" => {
                let mut args = rest.split_whitespace();
                let field = args
                    .next()
                    .ok_or_else(|| "用法: sort <name|modified|size> [asc|desc]".to_string())?
                    .parse::<SortField>()?;
                let order = match args.next() {
                    Some(order) => order.parse::<SortOrder>()?,
                    None => SortOrder::Asc,
                };
                Ok(Self::Sort(field, order))
            }
            "refresh" => Ok(Self::Refresh),
            "retry" => Ok(Self::Retry),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            "" => Err("请输入命令，help 查看帮助".to_string()),
            other => Err(format!("未知命令: {}，help 查看帮助", other)),
        }
    }
}

pub struct Shell<C: ?Sized> {
    controller: NavigationController<C>,
    sort_field: SortField,
    sort_order: SortOrder,
    /// 每条命令等待响应的最长时间
    settle_timeout: Duration,
}

impl<C> Shell<C>
where
    C: CatalogClient + ?Sized + 'static,
{
    pub fn new(controller: NavigationController<C>, settle_timeout: Duration) -> Self {
        Self {
            controller,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
            settle_timeout,
        }
    }

    pub fn controller(&self) -> &NavigationController<C> {
        &self.controller
    }

    /// 加载初始状态并返回首屏
    pub async fn start(&mut self) -> String {
        self.controller.start();
        self.settle().await;
        self.render_content()
    }

    /// 执行命令，返回要输出的文本；退出时返回 None
    pub async fn execute(&mut self, command: Command) -> Option<String> {
        debug!("执行命令: {:?}", command);
        let output = match command {
            Command::Quit => return None,
            Command::Help => HELP.to_string(),
            Command::Tree => self.render_tree(),
            Command::List => self.render_content(),
            Command::Expand(id) => {
                self.controller.toggle_expand(id);
                self.render_tree()
            }
            Command::Open(id) => match self.resolve_node(&id) {
                Some(node) => {
                    let is_folder = node.is_folder();
                    self.controller.select_node(node);
                    self.settle().await;
                    if is_folder {
                        self.render_content()
                    } else {
                        format!("已选中: {}", id)
                    }
                }
                None => format!("未找到节点: {}（先用 ls 或 tree 查看可见节点）", id),
            },
            Command::Cd(id) => {
                self.controller.navigate_breadcrumb(id);
                self.settle().await;
                self.render_content()
            }
            Command::Find(query) => {
                self.controller.search(query);
                self.settle().await;
                self.render_content()
            }
            Command::Sort(field, order) => {
                self.sort_field = field;
                self.sort_order = order;
                self.render_content()
            }
            Command::Refresh => {
                self.controller.refresh();
                self.settle().await;
                self.render_content()
            }
            Command::Retry => {
                self.controller.retry();
                self.settle().await;
                self.render_content()
            }
        };
        Some(output)
    }

    async fn settle(&mut self) {
        let timeout = self.settle_timeout;
        if tokio::time::timeout(timeout, self.controller.settle())
            .await
            .is_err()
        {
            warn!(
                "等待目录响应超时 ({:?})，仍有 {} 个请求未完成",
                timeout,
                self.controller.in_flight()
            );
        }
    }

    /// 在当前列表和侧边栏树中查找节点
    fn resolve_node(&self, id: &str) -> Option<Node> {
        let state = self.controller.state();
        state
            .current_items()
            .iter()
            .find(|n| n.id == id)
            .or_else(|| state.tree().node(id))
            .cloned()
    }

    pub fn render_tree(&self) -> String {
        let state = self.controller.state();
        let rows = view::tree_rows(state);
        if rows.is_empty() {
            if state.is_tree_loading() {
                return "正在加载文件夹树...".to_string();
            }
            return "（文件夹树为空）".to_string();
        }
        view::render_tree(&rows)
    }

    /// 面包屑、内容区和状态栏
    pub fn render_content(&self) -> String {
        let state = self.controller.state();
        let mut out = String::new();

        let _ = writeln!(out, "📍 {}", view::render_breadcrumbs(state.breadcrumbs()));

        match view::content_view(state) {
            ContentView::Error { message, retriable } => {
                let _ = writeln!(out, "❌ {}", message);
                if retriable {
                    let _ = writeln!(out, "输入 retry 重试");
                }
            }
            ContentView::Loading => {
                let _ = writeln!(out, "正在加载...");
            }
            ContentView::Listing => {
                let rows = view::list_rows(
                    state.current_items(),
                    state.selected_id(),
                    self.sort_field,
                    self.sort_order,
                );
                out.push_str(&view::render_list(&rows));
            }
        }

        out.push_str(&view::status_line(state));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::config::NavigationConfig;
    use std::sync::Arc;

    async fn demo_shell() -> Shell<MemoryCatalog> {
        let controller = NavigationController::new(
            Arc::new(MemoryCatalog::demo()),
            NavigationConfig::default(),
        );
        let mut shell = Shell::new(controller, Duration::from_secs(5));
        shell.start().await;
        shell
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("tree".parse::<Command>(), Ok(Command::Tree));
        assert_eq!(
            "open  work_docs ".parse::<Command>(),
            Ok(Command::Open("work_docs".to_string()))
        );
        assert_eq!(
            "find annual report".parse::<Command>(),
            Ok(Command::Find("annual report".to_string()))
        );
        assert_eq!("find".parse::<Command>(), Ok(Command::Find(String::new())));
        assert_eq!(
            "sort size desc".parse::<Command>(),
            Ok(Command::Sort(SortField::Size, SortOrder::Desc))
        );
        assert_eq!(
            "sort modified".parse::<Command>(),
            Ok(Command::Sort(SortField::Modified, SortOrder::Asc))
        );
        assert_eq!("QUIT".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!("open".parse::<Command>().is_err());
        assert!("sort".parse::<Command>().is_err());
        assert!("sort colour".parse::<Command>().is_err());
        assert!("rm -rf".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn test_start_renders_root() {
        let controller = NavigationController::new(
            Arc::new(MemoryCatalog::demo()),
            NavigationConfig::default(),
        );
        let mut shell = Shell::new(controller, Duration::from_secs(5));
        let screen = shell.start().await;

        assert!(screen.starts_with("📍 This PC\n"));
        assert!(screen.contains("Documents"));
        assert!(screen.ends_with("3 个项目 · This PC"));
    }

    #[tokio::test]
    async fn test_open_folder_and_cd_back() {
        let mut shell = demo_shell().await;

        let screen = shell
            .execute(Command::Open("projects".to_string()))
            .await
            .unwrap();
        assert!(screen.contains("This PC › Projects"));
        assert!(screen.contains("Web Development"));

        let screen = shell.execute(Command::Cd("root".to_string())).await.unwrap();
        assert!(screen.ends_with("3 个项目 · This PC"));
    }

    #[tokio::test]
    async fn test_open_resolves_tree_nodes() {
        let mut shell = demo_shell().await;

        // react_app 不在当前列表中，但在侧边栏树里
        let screen = shell
            .execute(Command::Open("react_app".to_string()))
            .await
            .unwrap();
        assert!(screen.contains("index.js"));

        let reply = shell
            .execute(Command::Open("index_js".to_string()))
            .await
            .unwrap();
        assert_eq!(reply, "已选中: index_js");
        assert_eq!(shell.controller().state().selected_id(), Some("index_js"));

        let reply = shell
            .execute(Command::Open("ghost".to_string()))
            .await
            .unwrap();
        assert!(reply.starts_with("未找到节点"));
    }

    #[tokio::test]
    async fn test_find_and_sort() {
        let mut shell = demo_shell().await;

        let screen = shell
            .execute(Command::Find("report".to_string()))
            .await
            .unwrap();
        assert!(screen.contains("Annual Report.docx"));
        assert!(screen.contains("搜索结果"));

        shell.execute(Command::Open("work_docs".to_string())).await;
        let screen = shell
            .execute(Command::Sort(SortField::Size, SortOrder::Desc))
            .await
            .unwrap();
        let q4 = screen.find("Q4 Presentation.pptx").unwrap();
        let annual = screen.find("Annual Report.docx").unwrap();
        assert!(q4 < annual);
    }

    #[tokio::test]
    async fn test_not_found_error_screen() {
        let mut shell = demo_shell().await;
        let screen = shell.execute(Command::Cd("gone".to_string())).await.unwrap();
        assert!(screen.contains("❌"));
        assert!(!screen.contains("retry"));
        // 之前的列表仍然保留在状态栏
        assert!(screen.ends_with("3 个项目 · This PC"));
    }

    #[tokio::test]
    async fn test_expand_and_quit() {
        let mut shell = demo_shell().await;
        let tree = shell
            .execute(Command::Expand("projects".to_string()))
            .await
            .unwrap();
        assert!(tree.contains("Web Development"));
        assert!(shell.execute(Command::Quit).await.is_none());
    }
}
