// 面包屑、内容区状态和状态栏

use crate::catalog::Crumb;
use crate::explorer::{NavigationState, Phase};

/// 面包屑分隔符
pub const CRUMB_SEPARATOR: &str = " › ";

pub fn render_breadcrumbs(crumbs: &[Crumb]) -> String {
    crumbs
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(CRUMB_SEPARATOR)
}

/// 内容区显示什么
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentView {
    /// 错误信息，retriable 为 true 时提供重试
    Error { message: String, retriable: bool },
    Loading,
    Listing,
}

pub fn content_view(state: &NavigationState) -> ContentView {
    match state.phase() {
        Phase::Error => {
            let (message, retriable) = state
                .error()
                .map(|e| (e.message.clone(), e.kind.is_retriable()))
                .unwrap_or_default();
            ContentView::Error { message, retriable }
        }
        // 只有侧边栏在加载时内容区仍显示列表
        Phase::Loading if state.is_loading() => ContentView::Loading,
        _ => ContentView::Listing,
    }
}

/// 状态栏：条目数和当前文件夹名称
pub fn status_line(state: &NavigationState) -> String {
    match state.current_folder() {
        Some(folder) => format!(
            "{} 个项目 · {}",
            state.current_items().len(),
            folder.name()
        ),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, MemoryCatalog};
    use crate::config::NavigationConfig;
    use crate::explorer::Action;

    #[test]
    fn test_render_breadcrumbs() {
        let crumbs = vec![
            Crumb::new("root", "This PC", "/"),
            Crumb::new("documents", "Documents", "/Documents"),
        ];
        assert_eq!(render_breadcrumbs(&crumbs), "This PC › Documents");
        assert_eq!(render_breadcrumbs(&[]), "");
    }

    #[test]
    fn test_content_and_status_through_lifecycle() {
        let catalog = MemoryCatalog::demo();
        let mut state = NavigationState::new(NavigationConfig::default());
        assert_eq!(status_line(&state), "");

        let effects = state.apply(Action::Init);
        assert_eq!(content_view(&state), ContentView::Loading);

        let seq = effects[1].seq();
        state.apply(Action::FolderLoaded {
            seq,
            result: catalog.folder("root"),
        });
        state.apply(Action::BreadcrumbsLoaded {
            seq,
            result: catalog.breadcrumbs("root"),
        });
        // 树还在加载，内容区已可显示
        assert_eq!(content_view(&state), ContentView::Listing);
        assert_eq!(status_line(&state), "3 个项目 · This PC");

        let folder = catalog.item("documents").unwrap().clone();
        let seq = state.apply(Action::SelectNode(folder))[0].seq();
        state.apply(Action::FolderLoaded {
            seq,
            result: Err(CatalogError::unavailable("timeout")),
        });
        match content_view(&state) {
            ContentView::Error { message, retriable } => {
                assert!(message.contains("timeout"));
                assert!(retriable);
            }
            other => panic!("unexpected view: {:?}", other),
        }
        // 错误不清空之前的内容
        assert_eq!(status_line(&state), "3 个项目 · This PC");
    }

    #[test]
    fn test_not_found_is_not_retriable() {
        let mut state = NavigationState::new(NavigationConfig::default());
        let seq = state.apply(Action::NavigateBreadcrumb("gone".into()))[0].seq();
        state.apply(Action::FolderLoaded {
            seq,
            result: Err(CatalogError::not_found("gone")),
        });
        assert_eq!(
            content_view(&state),
            ContentView::Error {
                message: "加载文件夹内容失败: 节点不存在: gone".to_string(),
                retriable: false,
            }
        );
    }
}
