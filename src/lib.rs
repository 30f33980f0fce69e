// Web Explorer Rust Library
// 双栏文件浏览器：目录服务、导航状态机和文本视图

// 目录数据与客户端
pub mod catalog;

// 配置管理模块
pub mod config;

// 导航状态机与控制器
pub mod explorer;

// 日志系统
pub mod logging;

// 目录服务（HTTP）
pub mod server;

// 交互式外壳
pub mod shell;

// 文本视图
pub mod view;

// 导出常用类型
pub use catalog::{
    CatalogClient, CatalogError, Crumb, ErrorKind, FolderContents, HttpCatalogClient,
    MemoryCatalog, Node, NodeKind, ROOT_ID,
};
pub use config::AppConfig;
pub use explorer::{Action, Effect, NavigationController, NavigationState, Phase};
pub use server::AppState;
