//! 导航状态机
//!
//! 纯函数式的状态转换：`(state, action) -> (state, effects)`。
//! 所有 I/O 都以 [`Effect`] 的形式返回给调用方执行，响应再作为
//! [`Action`] 回送；只有序号仍然有效的响应才会被提交。

use tracing::{debug, info, warn};

use crate::catalog::{CatalogError, Crumb, ErrorKind, FolderContents, Node, NodeKind};
use crate::config::NavigationConfig;

use super::expansion::ExpansionSet;
use super::sequence::{ActionClass, SequenceTracker};
use super::tree::TreeArena;

/// 搜索结果面包屑的 ID
pub const SEARCH_CRUMB_ID: &str = "search";
/// 搜索结果面包屑的名称
pub const SEARCH_CRUMB_NAME: &str = "搜索结果";

/// 当前显示的“文件夹”
#[derive(Debug, Clone, PartialEq)]
pub enum CurrentFolder {
    /// 真实文件夹
    Folder(Node),
    /// 搜索结果（合成的标题）
    SearchResults { query: String },
}

impl CurrentFolder {
    /// 显示名称
    pub fn name(&self) -> String {
        match self {
            Self::Folder(node) => node.name.clone(),
            Self::SearchResults { query } => format!("\"{}\" 的搜索结果", query),
        }
    }

    /// 真实文件夹的 ID
    pub fn folder_id(&self) -> Option<&str> {
        match self {
            Self::Folder(node) => Some(&node.id),
            Self::SearchResults { .. } => None,
        }
    }
}

/// 面包屑导航的目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrumbTarget {
    /// 真实文件夹
    Folder(String),
    /// 合成的搜索结果面包屑
    SearchResults,
}

impl From<String> for CrumbTarget {
    fn from(id: String) -> Self {
        Self::Folder(id)
    }
}

impl From<&str> for CrumbTarget {
    fn from(id: &str) -> Self {
        Self::Folder(id.to_string())
    }
}

/// 状态中记录的错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavError {
    pub kind: ErrorKind,
    pub message: String,
}

/// 状态机所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Error,
}

/// 用户意图及目录响应
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// 启动：加载树快照和根文件夹
    Init,
    SelectNode(Node),
    ToggleExpand(String),
    NavigateBreadcrumb(CrumbTarget),
    Search(String),
    Refresh,
    /// 重新发起导致当前错误的动作
    Retry,
    TreeLoaded {
        seq: u64,
        result: Result<Vec<Node>, CatalogError>,
    },
    FolderLoaded {
        seq: u64,
        result: Result<FolderContents, CatalogError>,
    },
    BreadcrumbsLoaded {
        seq: u64,
        result: Result<Vec<Crumb>, CatalogError>,
    },
    SearchCompleted {
        seq: u64,
        result: Result<Vec<Node>, CatalogError>,
    },
}

/// 需要执行的目录请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchTree { seq: u64 },
    FetchFolder { seq: u64, id: String },
    FetchBreadcrumbs { seq: u64, id: String },
    Search { seq: u64, query: String },
}

impl Effect {
    pub fn seq(&self) -> u64 {
        match self {
            Self::FetchTree { seq }
            | Self::FetchFolder { seq, .. }
            | Self::FetchBreadcrumbs { seq, .. }
            | Self::Search { seq, .. } => *seq,
        }
    }
}

/// 重试时要重新发起的内容请求
#[derive(Debug, Clone, PartialEq, Eq)]
enum RetryTarget {
    Folder(String),
    Search(String),
}

/// 进行中的内容请求
#[derive(Debug, Clone, PartialEq)]
enum Pending {
    Folder {
        seq: u64,
        id: String,
        contents: Option<FolderContents>,
        crumbs: Option<Vec<Crumb>>,
        /// 面包屑失败但被容忍，提交时由树推导
        crumbs_fallback: bool,
    },
    Search {
        seq: u64,
        query: String,
    },
}

/// 导航控制器的全部状态
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    config: NavigationConfig,
    selected_id: Option<String>,
    selected_kind: Option<NodeKind>,
    current_folder: Option<CurrentFolder>,
    current_items: Vec<Node>,
    breadcrumbs: Vec<Crumb>,
    loading: bool,
    tree_loading: bool,
    error: Option<NavError>,
    tree: TreeArena,
    expansion: ExpansionSet,
    sequence: SequenceTracker,
    pending: Option<Pending>,
    retry: Option<RetryTarget>,
    /// 树快照加载失败，重试时重新加载
    tree_retry: bool,
}

impl NavigationState {
    pub fn new(config: NavigationConfig) -> Self {
        let expansion = ExpansionSet::with_expanded([config.root_id.clone()]);
        Self {
            config,
            selected_id: None,
            selected_kind: None,
            current_folder: None,
            current_items: Vec::new(),
            breadcrumbs: Vec::new(),
            loading: false,
            tree_loading: false,
            error: None,
            tree: TreeArena::default(),
            expansion,
            sequence: SequenceTracker::new(),
            pending: None,
            retry: None,
            tree_retry: false,
        }
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn current_folder(&self) -> Option<&CurrentFolder> {
        self.current_folder.as_ref()
    }

    pub fn current_items(&self) -> &[Node] {
        &self.current_items
    }

    pub fn breadcrumbs(&self) -> &[Crumb] {
        &self.breadcrumbs
    }

    /// 第 index 个面包屑对应的导航目标
    pub fn crumb_target(&self, index: usize) -> Option<CrumbTarget> {
        let crumb = self.breadcrumbs.get(index)?;
        if self.is_showing_search() {
            Some(CrumbTarget::SearchResults)
        } else {
            Some(CrumbTarget::Folder(crumb.id.clone()))
        }
    }

    /// 内容区是否在加载
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// 侧边栏树是否在加载
    pub fn is_tree_loading(&self) -> bool {
        self.tree_loading
    }

    pub fn error(&self) -> Option<&NavError> {
        self.error.as_ref()
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn expansion(&self) -> &ExpansionSet {
        &self.expansion
    }

    pub fn is_showing_search(&self) -> bool {
        matches!(self.current_folder, Some(CurrentFolder::SearchResults { .. }))
    }

    pub fn phase(&self) -> Phase {
        if self.error.is_some() {
            Phase::Error
        } else if self.loading || self.tree_loading {
            Phase::Loading
        } else {
            Phase::Idle
        }
    }

    /// 应用一个动作，返回需要执行的请求
    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Init => self.on_init(),
            Action::SelectNode(node) => self.on_select(node),
            Action::ToggleExpand(id) => {
                let expanded = self.expansion.toggle(&id);
                debug!("切换展开状态: id={}, expanded={}", id, expanded);
                Vec::new()
            }
            Action::NavigateBreadcrumb(target) => self.on_navigate_breadcrumb(target),
            Action::Search(query) => self.on_search(query),
            Action::Refresh => self.on_refresh(),
            Action::Retry => self.on_retry(),
            Action::TreeLoaded { seq, result } => {
                self.on_tree_loaded(seq, result);
                Vec::new()
            }
            Action::FolderLoaded { seq, result } => {
                self.on_folder_loaded(seq, result);
                Vec::new()
            }
            Action::BreadcrumbsLoaded { seq, result } => {
                self.on_breadcrumbs_loaded(seq, result);
                Vec::new()
            }
            Action::SearchCompleted { seq, result } => {
                self.on_search_completed(seq, result);
                Vec::new()
            }
        }
    }

    // ---------------------------------------------------------------
    // 用户意图
    // ---------------------------------------------------------------

    fn on_init(&mut self) -> Vec<Effect> {
        let root_id = self.config.root_id.clone();
        info!("初始化导航状态: root={}", root_id);

        self.selected_id = Some(root_id.clone());
        self.selected_kind = Some(NodeKind::Folder);

        let mut effects = self.issue_tree();
        effects.extend(self.issue_folder(root_id));
        effects
    }

    fn on_select(&mut self, node: Node) -> Vec<Effect> {
        self.selected_id = Some(node.id.clone());
        self.selected_kind = Some(node.kind);

        if node.is_folder() {
            self.issue_folder(node.id)
        } else {
            // 选中文件不改变列表
            debug!("选中文件: {}", node.id);
            Vec::new()
        }
    }

    fn on_navigate_breadcrumb(&mut self, target: CrumbTarget) -> Vec<Effect> {
        let id = match target {
            CrumbTarget::Folder(id) => id,
            CrumbTarget::SearchResults => {
                debug!("忽略对搜索结果面包屑的导航");
                return Vec::new();
            }
        };

        self.selected_id = Some(id.clone());
        self.selected_kind = Some(NodeKind::Folder);
        self.issue_folder(id)
    }

    fn on_search(&mut self, query: String) -> Vec<Effect> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        self.issue_search(query.to_string())
    }

    fn on_refresh(&mut self) -> Vec<Effect> {
        self.error = None;
        self.retry = None;
        let mut effects = self.issue_tree();

        let target = match (self.selected_kind, &self.selected_id) {
            (Some(NodeKind::Folder), Some(id)) => Some(id.clone()),
            // 选中的是文件时刷新当前显示的文件夹
            _ => self
                .current_folder
                .as_ref()
                .and_then(|f| f.folder_id())
                .map(str::to_string),
        };

        if let Some(id) = target {
            effects.extend(self.issue_folder(id));
        }
        effects
    }

    fn on_retry(&mut self) -> Vec<Effect> {
        if self.error.is_none() {
            return Vec::new();
        }

        self.error = None;
        let mut effects = Vec::new();
        if self.tree_retry {
            effects.extend(self.issue_tree());
        }
        match self.retry.clone() {
            Some(RetryTarget::Folder(id)) => effects.extend(self.issue_folder(id)),
            Some(RetryTarget::Search(query)) => effects.extend(self.issue_search(query)),
            None => {}
        }
        effects
    }

    // ---------------------------------------------------------------
    // 发起请求
    // ---------------------------------------------------------------

    fn issue_tree(&mut self) -> Vec<Effect> {
        let seq = self.sequence.issue(ActionClass::Tree);
        self.tree_loading = true;
        self.tree_retry = false;
        vec![Effect::FetchTree { seq }]
    }

    fn issue_folder(&mut self, id: String) -> Vec<Effect> {
        let seq = self.sequence.issue(ActionClass::Content);
        debug!("加载文件夹: id={}, seq={}", id, seq);

        self.error = None;
        self.retry = None;
        self.loading = true;
        self.pending = Some(Pending::Folder {
            seq,
            id: id.clone(),
            contents: None,
            crumbs: None,
            crumbs_fallback: false,
        });

        vec![
            Effect::FetchFolder {
                seq,
                id: id.clone(),
            },
            Effect::FetchBreadcrumbs { seq, id },
        ]
    }

    fn issue_search(&mut self, query: String) -> Vec<Effect> {
        let seq = self.sequence.issue(ActionClass::Content);
        debug!("搜索: query={:?}, seq={}", query, seq);

        self.error = None;
        self.retry = None;
        self.loading = true;
        self.pending = Some(Pending::Search {
            seq,
            query: query.clone(),
        });

        vec![Effect::Search { seq, query }]
    }

    // ---------------------------------------------------------------
    // 响应
    // ---------------------------------------------------------------

    fn on_tree_loaded(&mut self, seq: u64, result: Result<Vec<Node>, CatalogError>) {
        if !self.sequence.is_current(ActionClass::Tree, seq) {
            debug!("丢弃过期的树快照响应: seq={}", seq);
            return;
        }
        self.tree_loading = false;

        match result {
            Ok(snapshot) => {
                let root = self.tree.node(&self.config.root_id).cloned();
                self.tree = TreeArena::from_snapshot(snapshot);
                // 快照不含根节点本身，保留已提交的根条目
                if let Some(root) = root {
                    self.tree.attach_root(&root);
                }
                info!("树快照已加载: {} 个节点", self.tree.len());
            }
            Err(e) => {
                warn!("加载文件夹树失败: {}", e);
                // 保留旧的树
                self.tree_retry = true;
                if self.error.is_some() && self.retry.is_some() {
                    // 内容区的错误优先显示，重试时两者一起重新发起
                    debug!("保留内容区错误，树快照随重试一起重新加载");
                    return;
                }
                self.error = Some(NavError {
                    kind: e.kind(),
                    message: format!("加载文件夹树失败: {}", e),
                });
            }
        }
    }

    /// 仅当响应属于当前进行中的文件夹请求时返回它
    fn current_folder_pending(&mut self, seq: u64) -> Option<&mut Pending> {
        if !self.sequence.is_current(ActionClass::Content, seq) {
            return None;
        }
        let pending = self.pending.as_mut()?;
        if matches!(pending, Pending::Folder { seq: s, .. } if *s == seq) {
            Some(pending)
        } else {
            None
        }
    }

    fn on_folder_loaded(&mut self, seq: u64, result: Result<FolderContents, CatalogError>) {
        let Some(Pending::Folder { contents, .. }) = self.current_folder_pending(seq) else {
            debug!("丢弃过期的文件夹内容响应: seq={}", seq);
            return;
        };

        match result {
            Ok(folder_contents) => {
                *contents = Some(folder_contents);
                self.try_commit_folder();
            }
            Err(e) => self.fail_folder(e),
        }
    }

    fn on_breadcrumbs_loaded(&mut self, seq: u64, result: Result<Vec<Crumb>, CatalogError>) {
        let tolerate = self.config.tolerate_breadcrumb_failure;
        let Some(Pending::Folder {
            id,
            crumbs,
            crumbs_fallback,
            ..
        }) = self.current_folder_pending(seq)
        else {
            debug!("丢弃过期的面包屑响应: seq={}", seq);
            return;
        };

        match result {
            Ok(path) => {
                *crumbs = Some(path);
                self.try_commit_folder();
            }
            Err(e) if tolerate && e.kind() == ErrorKind::CatalogUnavailable => {
                // 面包屑只影响显示，记录日志后由树推导
                warn!("加载面包屑失败，使用本地推导: id={}, 错误: {}", id, e);
                *crumbs_fallback = true;
                self.try_commit_folder();
            }
            Err(e) => self.fail_folder(e),
        }
    }

    fn try_commit_folder(&mut self) {
        let ready = matches!(
            &self.pending,
            Some(Pending::Folder {
                contents: Some(_),
                crumbs,
                crumbs_fallback,
                ..
            }) if crumbs.is_some() || *crumbs_fallback
        );
        if !ready {
            return;
        }

        let Some(Pending::Folder {
            contents: Some(contents),
            crumbs,
            ..
        }) = self.pending.take()
        else {
            return;
        };

        let FolderContents { folder, children } = contents;
        // 根节点不在树快照中，首次提交时补上
        self.tree.ensure_node(&folder);
        self.tree.graft_children(&folder.id, &children);

        let breadcrumbs = crumbs.unwrap_or_else(|| {
            let derived = self.tree.ancestry(&folder.id);
            if derived.is_empty() {
                vec![Crumb::from(&folder)]
            } else {
                derived
            }
        });

        info!("文件夹已加载: {} ({} 个条目)", folder.name, children.len());

        self.current_folder = Some(CurrentFolder::Folder(folder));
        self.current_items = children;
        self.breadcrumbs = breadcrumbs;
        self.loading = false;
    }

    /// 文件夹请求失败：丢弃部分结果，保留之前的内容
    fn fail_folder(&mut self, e: CatalogError) {
        let Some(Pending::Folder { id, .. }) = self.pending.take() else {
            return;
        };
        warn!("加载文件夹内容失败: id={}, 错误: {}", id, e);

        self.loading = false;
        self.error = Some(NavError {
            kind: e.kind(),
            message: format!("加载文件夹内容失败: {}", e),
        });
        self.retry = Some(RetryTarget::Folder(id));
    }

    fn on_search_completed(&mut self, seq: u64, result: Result<Vec<Node>, CatalogError>) {
        let current = self.sequence.is_current(ActionClass::Content, seq)
            && matches!(&self.pending, Some(Pending::Search { seq: s, .. }) if *s == seq);
        if !current {
            debug!("丢弃过期的搜索响应: seq={}", seq);
            return;
        }
        let Some(Pending::Search { query, .. }) = self.pending.take() else {
            return;
        };
        self.loading = false;

        match result {
            Ok(results) => {
                info!("搜索 {:?} 完成: {} 个结果", query, results.len());
                self.current_items = results;
                self.current_folder = Some(CurrentFolder::SearchResults { query });
                self.breadcrumbs = vec![Crumb::new(SEARCH_CRUMB_ID, SEARCH_CRUMB_NAME, "/search")];
            }
            Err(e) => {
                warn!("搜索失败: query={:?}, 错误: {}", query, e);
                self.error = Some(NavError {
                    kind: ErrorKind::SearchFailed,
                    message: format!("搜索失败: {}", e),
                });
                self.retry = Some(RetryTarget::Search(query));
            }
        }
    }
}

/// 纯状态转换
pub fn reduce(mut state: NavigationState, action: Action) -> (NavigationState, Vec<Effect>) {
    let effects = state.apply(action);
    (state, effects)
}
