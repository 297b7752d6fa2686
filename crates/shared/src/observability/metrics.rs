//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。
//! 未安装 recorder 时，记录函数是空操作。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
///
/// drop 时终止指标 HTTP 服务。
pub struct MetricsHandle {
    server_handle: tokio::task::JoinHandle<()>,
}

impl Drop for MetricsHandle {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle { server_handle })
}

/// 注册指标描述，出现在 /metrics 端点的 HELP 注释中
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!(
        "rule_graph_evaluations_total",
        "Total number of rule graph evaluations"
    );
    metrics::describe_counter!(
        "rule_graph_matches_total",
        "Total number of matched rule groups"
    );
    metrics::describe_histogram!(
        "rule_graph_evaluation_duration_seconds",
        "Rule graph evaluation duration in seconds"
    );
    metrics::describe_counter!("rule_graph_reloads_total", "Total number of rule set reloads");
    metrics::describe_gauge!("rule_graph_groups", "Number of rule groups currently loaded");

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

/// 记录一次规则图评估
#[inline]
pub fn record_graph_evaluation(status: &str, matched: usize, duration_secs: f64) {
    metrics::counter!(
        "rule_graph_evaluations_total",
        "status" => status.to_string()
    )
    .increment(1);

    metrics::counter!("rule_graph_matches_total").increment(matched as u64);

    metrics::histogram!(
        "rule_graph_evaluation_duration_seconds",
        "status" => status.to_string()
    )
    .record(duration_secs);
}

/// 记录一次规则集重载
///
/// `groups` 为重载后生效的规则组数量。
#[inline]
pub fn record_rules_reload(status: &str, groups: usize) {
    metrics::counter!(
        "rule_graph_reloads_total",
        "status" => status.to_string()
    )
    .increment(1);

    metrics::gauge!("rule_graph_groups").set(groups as f64);
}
