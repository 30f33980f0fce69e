//! 导航控制器
//!
//! 唯一与目录客户端交互的组件。状态只在控制器所在的逻辑线程上修改，
//! 目录请求作为 tokio 任务并发执行，结果经 mpsc 通道回送后再交给状态机。
//! 过期请求不会被取消，到达后由序号规则丢弃。

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::catalog::{CatalogClient, Node};
use crate::config::NavigationConfig;

use super::state::{Action, CrumbTarget, Effect, NavigationState};

pub struct NavigationController<C: ?Sized> {
    client: Arc<C>,
    state: NavigationState,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,
    /// 已发出但尚未回送的请求数
    in_flight: usize,
}

impl<C> NavigationController<C>
where
    C: CatalogClient + ?Sized + 'static,
{
    pub fn new(client: Arc<C>, config: NavigationConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            state: NavigationState::new(config),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// 应用动作并发出产生的请求
    pub fn dispatch(&mut self, action: Action) {
        let effects = self.state.apply(action);
        for effect in effects {
            self.spawn(effect);
        }
    }

    fn spawn(&mut self, effect: Effect) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let action = execute(client.as_ref(), effect).await;
            // 控制器已销毁时直接丢弃
            let _ = tx.send(action);
        });
    }

    /// 等待并应用一个响应；没有进行中的请求时返回 false
    pub async fn pump(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(action) => {
                self.in_flight -= 1;
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// 处理完所有进行中的请求
    ///
    /// 挂起的请求会让它一直等待，调用方需要自行决定是否加超时
    pub async fn settle(&mut self) {
        while self.pump().await {}
    }

    pub fn start(&mut self) {
        self.dispatch(Action::Init);
    }

    pub fn select_node(&mut self, node: Node) {
        self.dispatch(Action::SelectNode(node));
    }

    pub fn toggle_expand(&mut self, id: impl Into<String>) {
        self.dispatch(Action::ToggleExpand(id.into()));
    }

    pub fn navigate_breadcrumb(&mut self, target: impl Into<CrumbTarget>) {
        self.dispatch(Action::NavigateBreadcrumb(target.into()));
    }

    pub fn search(&mut self, query: impl Into<String>) {
        self.dispatch(Action::Search(query.into()));
    }

    pub fn refresh(&mut self) {
        self.dispatch(Action::Refresh);
    }

    pub fn retry(&mut self) {
        self.dispatch(Action::Retry);
    }
}

/// 执行单个请求，把结果包装成响应动作
pub async fn execute<C>(client: &C, effect: Effect) -> Action
where
    C: CatalogClient + ?Sized,
{
    debug!("执行目录请求: {:?}", effect);
    match effect {
        Effect::FetchTree { seq } => Action::TreeLoaded {
            seq,
            result: client.get_tree().await,
        },
        Effect::FetchFolder { seq, id } => Action::FolderLoaded {
            seq,
            result: client.get_folder(&id).await,
        },
        Effect::FetchBreadcrumbs { seq, id } => Action::BreadcrumbsLoaded {
            seq,
            result: client.get_breadcrumbs(&id).await,
        },
        Effect::Search { seq, query } => Action::SearchCompleted {
            seq,
            result: client.search(&query).await,
        },
    }
}
