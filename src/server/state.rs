// 应用状态

use crate::catalog::MemoryCatalog;
use std::sync::Arc;

/// 目录服务全局状态
#[derive(Clone)]
pub struct AppState {
    /// 只读目录数据
    pub catalog: Arc<MemoryCatalog>,
}

impl AppState {
    pub fn new(catalog: Arc<MemoryCatalog>) -> Self {
        Self { catalog }
    }
}
