use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use web_explorer_rust::{
    catalog::{CatalogClient, HttpCatalogClient, MemoryCatalog},
    config::AppConfig,
    explorer::NavigationController,
    logging,
    shell::{Command, Shell, HELP},
};

/// 双栏文件浏览器（终端版）
#[derive(Debug, Parser)]
#[command(name = "explorer", version)]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "config/app.toml")]
    config: String,

    /// 覆盖配置中的目录服务地址
    #[arg(long)]
    base_url: Option<String>,

    /// 使用进程内的演示目录，不连接目录服务
    #[arg(long)]
    local: bool,
}

fn print_prompt() {
    print!("explorer> ");
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 日志尚未初始化，配置错误直接报告给用户
    let mut config = AppConfig::load_if_present(&args.config).await?;
    if let Some(base_url) = args.base_url {
        config.catalog.base_url = base_url;
    }
    config.validate().context("配置无效")?;

    // 控制台留给交互输出，日志只写文件
    let _log_guard = logging::init_logging(&config.log, false);

    let client: Arc<dyn CatalogClient> = if args.local {
        info!("使用进程内演示目录");
        Arc::new(MemoryCatalog::demo())
    } else {
        Arc::new(HttpCatalogClient::new(&config.catalog)?)
    };

    let controller = NavigationController::new(client, config.navigation.clone());
    // 比单次请求超时多留一秒，超时请求会先以 CatalogUnavailable 返回
    let settle_timeout = Duration::from_secs(config.catalog.timeout_secs + 1);
    let mut shell = Shell::new(controller, settle_timeout);

    println!("{}\n", HELP);
    println!("{}", shell.start().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_prompt();
    while let Some(line) = lines.next_line().await.context("读取输入失败")? {
        if line.trim().is_empty() {
            print_prompt();
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => match shell.execute(command).await {
                Some(output) => println!("{}", output),
                None => break,
            },
            Err(e) => println!("{}", e),
        }
        print_prompt();
    }

    info!("explorer 已退出");
    Ok(())
}
