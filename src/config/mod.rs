// 配置管理模块

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

use crate::catalog::ROOT_ID;

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 目录服务配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 目录客户端配置
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// 导航配置
    #[serde(default)]
    pub navigation: NavigationConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 是否启用日志文件持久化
    #[serde(default = "default_log_enabled")]
    pub enabled: bool,
    /// 日志文件保存目录
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// 日志保留天数（默认 7 天）
    #[serde(default = "default_log_retention_days")]
    pub retention_days: u32,
    /// 日志级别（默认 info）
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_enabled() -> bool {
    true
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_retention_days() -> u32 {
    7
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: default_log_enabled(),
            log_dir: default_log_dir(),
            retention_days: default_log_retention_days(),
            level: default_log_level(),
        }
    }
}

/// 目录服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_server_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// 目录客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// 目录服务地址
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    /// 单次请求超时（秒）
    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u64,
    /// 目录种子文件（JSON 节点数组），未设置时使用内置演示数据
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

fn default_catalog_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_catalog_timeout_secs() -> u64 {
    30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            timeout_secs: default_catalog_timeout_secs(),
            seed_file: None,
        }
    }
}

/// 导航配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// 启动时加载的根文件夹
    #[serde(default = "default_root_id")]
    pub root_id: String,
    /// 文件夹内容成功而面包屑因服务不可用失败时，记录日志并从树推导面包屑
    ///
    /// 默认关闭：任一请求失败都进入错误状态
    #[serde(default)]
    pub tolerate_breadcrumb_failure: bool,
}

fn default_root_id() -> String {
    ROOT_ID.to_string()
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            root_id: default_root_id(),
            tolerate_breadcrumb_failure: false,
        }
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub async fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;

        let config: AppConfig = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate().context("配置文件验证失败")?;

        Ok(config)
    }

    /// 检查配置取值
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("监听端口不能为 0");
        }

        let base_url = self.catalog.base_url.as_str();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!("目录服务地址必须以 http:// 或 https:// 开头: {}", base_url);
        }

        if self.catalog.timeout_secs == 0 {
            anyhow::bail!("请求超时必须大于 0 秒");
        }

        if self.navigation.root_id.trim().is_empty() {
            anyhow::bail!("根文件夹 ID 不能为空");
        }

        Ok(())
    }

    /// 保存配置到文件
    pub async fn save_to_file(&self, path: &str) -> Result<()> {
        self.validate().context("保存配置失败")?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        // 确保父目录存在
        if let Some(parent) = std::path::Path::new(path).parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        fs::write(path, content)
            .await
            .context("Failed to write config file")?;

        tracing::info!("✓ 配置已保存: {}", path);

        Ok(())
    }

    /// 文件存在时加载，解析或验证失败直接返回错误；文件不存在时使用默认配置
    pub async fn load_if_present(path: &str) -> Result<Self> {
        if !std::path::Path::new(path).exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
            .await
            .with_context(|| format!("加载配置文件失败: {}", path))
    }

    /// 加载或创建默认配置
    pub async fn load_or_default(path: &str) -> Self {
        match Self::load_from_file(path).await {
            Ok(config) => {
                tracing::info!("配置文件加载成功: {}", path);
                config
            }
            Err(e) => {
                tracing::warn!("配置文件加载失败，使用默认配置: {:#}", e);
                let default_config = Self::default();

                // 文件不存在时写出默认配置，格式错误的文件保持原样
                if !std::path::Path::new(path).exists() {
                    if let Err(e) = default_config.save_to_file(path).await {
                        tracing::error!("保存默认配置失败: {}", e);
                    }
                }

                default_config
            }
        }
    }
}
