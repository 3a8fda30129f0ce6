pub mod handlers;
pub mod response;

use crate::gateway::Gateway;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tracing::{error, info, warn};

/// 启动 HTTP 服务器（带优雅关闭）
pub async fn start_server(gateway: Arc<Gateway>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(
        "bazigate 服务器运行在 http://{}，适配器: {}",
        listener.local_addr()?,
        gateway.provider_kind().as_str()
    );

    tokio::select! {
        _ = accept_loop(listener, gateway) => {}
        _ = shutdown_signal() => {
            info!("收到关闭信号，停止接受新连接");
        }
    }

    info!("服务器已关闭");
    Ok(())
}

/// 在已绑定的 listener 上提供服务，不监听关闭信号（测试用）
pub async fn serve(listener: TcpListener, gateway: Arc<Gateway>) {
    accept_loop(listener, gateway).await
}

async fn accept_loop(listener: TcpListener, gateway: Arc<Gateway>) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => spawn_connection(stream, Arc::clone(&gateway)),
            Err(e) => {
                error!("接受连接失败: {}", e);
                continue;
            }
        }
    }
}

fn spawn_connection(stream: TcpStream, gateway: Arc<Gateway>) {
    let io = TokioIo::new(stream);

    tokio::spawn(async move {
        let service = service_fn(move |req| {
            let gateway = Arc::clone(&gateway);
            handlers::handle_request(req, gateway)
        });

        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
            error!("服务连接错误: {}", e);
        }
    });
}

/// 等待 Ctrl+C 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("设置 Ctrl+C 信号处理失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("设置 SIGTERM 信号处理失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("收到 Ctrl+C 信号，开始关闭..."),
        _ = terminate => warn!("收到 SIGTERM 信号，开始关闭..."),
    }
}
