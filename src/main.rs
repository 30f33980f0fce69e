use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use web_explorer_rust::{
    catalog::MemoryCatalog,
    config::{AppConfig, LogConfig},
    logging,
    server::build_router,
};

const CONFIG_PATH: &str = "config/app.toml";

/// 加载日志配置
///
/// 日志系统初始化前只读取 [log] 段，失败时返回默认配置
async fn load_log_config() -> LogConfig {
    if let Ok(content) = tokio::fs::read_to_string(CONFIG_PATH).await {
        if let Ok(config) = toml::from_str::<toml::Value>(&content) {
            if let Some(log_table) = config.get("log") {
                if let Ok(log_config) = log_table.clone().try_into::<LogConfig>() {
                    return log_config;
                }
            }
        }
    }

    LogConfig::default()
}

/// 加载目录数据：配置了种子文件时从文件读取，否则使用演示数据
async fn load_catalog(config: &AppConfig) -> anyhow::Result<MemoryCatalog> {
    match &config.catalog.seed_file {
        Some(path) => MemoryCatalog::load_from_file(path)
            .await
            .with_context(|| format!("加载目录种子文件失败: {:?}", path)),
        None => {
            info!("未配置种子文件，使用演示目录数据");
            Ok(MemoryCatalog::demo())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 先尝试加载日志配置，失败时使用默认配置
    let log_config = load_log_config().await;

    // 初始化日志系统（必须保持 _log_guard 存活）
    let _log_guard = logging::init_logging(&log_config, true);

    info!("Web Explorer 目录服务 v{} 启动中...", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_or_default(CONFIG_PATH).await;
    let catalog = load_catalog(&config).await?;
    info!("目录数据加载完成: {} 个节点", catalog.len());

    let app = build_router(Arc::new(catalog));
    let addr = format!("{}:{}", config.server.host, config.server.port);

    // 启动服务器
    info!("服务器启动在: http://{}", addr);
    info!("API 基础路径: http://{}/api", addr);
    info!("健康检查: http://{}/api/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("监听地址失败: {}", addr))?;

    // 使用 select! 监听关闭信号，支持优雅关闭
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("服务器错误: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("收到 Ctrl+C，开始关闭...");
        }
    }

    info!("目录服务已退出");

    Ok(())
}
