use bazigate::config::{Config, ProviderKind};
use bazigate::server;
use bazigate::Gateway;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bazigate")]
#[command(about = "八字转运城市推荐网关", long_about = None)]
struct Args {
    /// 部署配置文件路径，不指定时使用默认配置
    #[arg(short, long)]
    config: Option<String>,

    /// 监听地址
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// 覆盖配置文件中的适配器
    #[arg(short, long, value_enum)]
    provider: Option<ProviderKind>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // 解析命令行参数
    let args = Args::parse();

    // 加载部署配置，API_KEY / API_BASE_URL 在每次请求时读取
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(provider) = args.provider {
        config.provider = provider;
    }
    info!(
        "适配器: {}，模型: {}",
        config.provider.as_str(),
        config.model_name()
    );

    let gateway = Arc::new(Gateway::from_process_env(&config));

    // 解析监听地址
    let addr: SocketAddr = args.bind.parse()?;

    server::start_server(gateway, addr).await?;

    Ok(())
}
