use crate::error::ErrorKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 简单的指标收集器，失败按错误类型分别计数
#[derive(Debug, Default)]
pub struct Metrics {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_by_kind: [AtomicU64; 8],
}

fn kind_index(kind: ErrorKind) -> usize {
    ErrorKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_default()
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录成功请求
    pub fn record_success(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// 记录失败请求
    pub fn record_failure(&self, kind: ErrorKind) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_by_kind[kind_index(kind)].fetch_add(1, Ordering::Relaxed);
    }

    pub fn failures(&self, kind: ErrorKind) -> u64 {
        self.failed_by_kind[kind_index(kind)].load(Ordering::Relaxed)
    }

    /// 导出 Prometheus 格式
    pub fn export_prometheus(&self) -> String {
        let mut out = format!(
            "# HELP bazigate_requests_total Total number of generate requests\n\
             # TYPE bazigate_requests_total counter\n\
             bazigate_requests_total {}\n\
             # HELP bazigate_requests_successful Successful generate requests\n\
             # TYPE bazigate_requests_successful counter\n\
             bazigate_requests_successful {}\n\
             # HELP bazigate_requests_failed Failed generate requests by error kind\n\
             # TYPE bazigate_requests_failed counter\n",
            self.total_requests.load(Ordering::Relaxed),
            self.successful_requests.load(Ordering::Relaxed),
        );
        for kind in ErrorKind::ALL {
            out.push_str(&format!(
                "bazigate_requests_failed{{kind=\"{}\"}} {}\n",
                kind.as_str(),
                self.failures(kind)
            ));
        }
        out
    }
}

/// 获取全局指标实例
pub fn global_metrics() -> &'static Arc<Metrics> {
    use once_cell::sync::Lazy;
    static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| Arc::new(Metrics::new()));
    &METRICS
}
