//! 日志系统配置
//!
//! 支持控制台输出和文件持久化，按天滚动，自动清理过期日志

use crate::config::LogConfig;
use chrono::Local;
use std::fs;
use std::path::Path;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// 日志文件名前缀
const LOG_FILE_PREFIX: &str = "web-explorer";
/// 日志文件扩展名
const LOG_FILE_SUFFIX: &str = "log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// 日志系统守卫
/// 必须保持存活，否则日志写入线程会终止
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// 初始化日志系统
///
/// # Arguments
/// * `config` - 日志配置
/// * `console` - 是否输出到控制台（交互式外壳只写文件）
///
/// # Returns
/// * `LogGuard` - 日志守卫，需要保持存活直到程序结束
pub fn init_logging(config: &LogConfig, console: bool) -> LogGuard {
    // 创建环境过滤器
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // 控制台输出层
    let console_layer = console.then(|| {
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
            .with_ansi(true)
    });

    let (file_writer, file_guard) = if config.enabled {
        match create_file_appender(&config.log_dir) {
            Ok(appender) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                (Some(non_blocking), Some(guard))
            }
            Err(e) => {
                eprintln!("创建日志文件失败: {:?}, 错误: {}, 回退到仅控制台输出", config.log_dir, e);
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    // 文件输出层（不带 ANSI 颜色）
    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
            .with_ansi(false)
            .with_writer(writer)
    });

    // 初始化订阅器
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if file_guard.is_some() {
        info!(
            "日志系统初始化完成: 目录={:?}, 保留天数={}, 级别={}",
            config.log_dir, config.retention_days, config.level
        );

        // 启动过期日志清理
        let deleted = cleanup_old_logs(&config.log_dir, config.retention_days);
        if deleted > 0 {
            info!("已清理 {} 个过期日志文件", deleted);
        }
    } else {
        info!("日志系统初始化完成（仅控制台输出）");
    }

    LogGuard {
        _file_guard: file_guard,
    }
}

/// 按天滚动的文件写入器
///
/// 文件名格式: web-explorer.YYYY-MM-DD.log
fn create_file_appender(log_dir: &Path) -> anyhow::Result<RollingFileAppender> {
    fs::create_dir_all(log_dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(log_dir)?;

    Ok(appender)
}

/// 清理过期日志文件，返回删除的文件数
fn cleanup_old_logs(log_dir: &Path, retention_days: u32) -> usize {
    let now = Local::now().date_naive();
    let retention_duration = chrono::Duration::days(retention_days as i64);

    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("读取日志目录失败: {:?}, 错误: {}", log_dir, e);
            return 0;
        }
    };

    let mut deleted_count = 0;

    for entry in entries.flatten() {
        let path = entry.path();

        // 只处理日志文件
        if !path.is_file() {
            continue;
        }

        let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };

        // 无法识别日期的文件不动
        let Some(file_date) = extract_date_from_filename(filename) else {
            continue;
        };

        if now.signed_duration_since(file_date) > retention_duration {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!("删除过期日志文件失败: {:?}, 错误: {}", path, e);
            } else {
                deleted_count += 1;
                tracing::debug!("已删除过期日志文件: {:?}", path);
            }
        }
    }

    deleted_count
}

/// 从文件名中提取日期
///
/// web-explorer.YYYY-MM-DD.log -> YYYY-MM-DD
fn extract_date_from_filename(filename: &str) -> Option<chrono::NaiveDate> {
    let name = filename.strip_prefix(LOG_FILE_PREFIX)?.strip_prefix('.')?;
    let date = name.strip_suffix(LOG_FILE_SUFFIX)?.strip_suffix('.')?;
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_date_from_filename() {
        assert_eq!(
            extract_date_from_filename("web-explorer.2024-05-01.log"),
            chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert_eq!(extract_date_from_filename("web-explorer.log"), None);
        assert_eq!(extract_date_from_filename("other.2024-05-01.log"), None);
        assert_eq!(extract_date_from_filename("web-explorer.yesterday.log"), None);
    }

    #[test]
    fn test_cleanup_old_logs() {
        let dir = TempDir::new().unwrap();
        let today = Local::now().date_naive();
        let old = today - chrono::Duration::days(30);

        let fresh_name = format!("web-explorer.{}.log", today.format("%Y-%m-%d"));
        let old_name = format!("web-explorer.{}.log", old.format("%Y-%m-%d"));
        for name in [&fresh_name, &old_name, &"notes.txt".to_string()] {
            fs::write(dir.path().join(name), "x").unwrap();
        }

        assert_eq!(cleanup_old_logs(dir.path(), 7), 1);
        assert!(dir.path().join(&fresh_name).exists());
        assert!(!dir.path().join(&old_name).exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_create_file_appender_creates_dir() {
        let dir = TempDir::new().unwrap();
        let log_dir = dir.path().join("nested").join("logs");
        assert!(create_file_appender(&log_dir).is_ok());
        assert!(log_dir.is_dir());
    }
}
