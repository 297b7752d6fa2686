//! 规则文件热更新
//!
//! 使用 `notify` 监听规则文件所在目录，文件变化后经 debounce 窗口去抖，
//! 再重新加载到 [`SharedRuleGraph`]。加载失败时保留当前规则集。
//!
//! 监听目录而不是文件本身：编辑器和 K8s ConfigMap 通常以替换（rename）方式更新文件，
//! 直接监听文件会在第一次替换后失效。

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::store::SharedRuleGraph;

/// 规则文件监听器
pub struct RulesFileWatcher {
    /// 规则文件路径
    path: PathBuf,
    /// debounce 窗口，避免文件连续写入触发多次重载
    debounce: Duration,
    /// 变更时替换的目标规则图
    graph: SharedRuleGraph,
    /// 用于通知监听循环退出
    shutdown_tx: watch::Sender<bool>,
}

/// 运行中的监听任务
///
/// 持有底层 watcher，drop 后停止接收文件事件。
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl WatchHandle {
    /// 等待监听循环退出
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!(error = %e, "规则文件监听任务异常退出");
        }
    }
}

impl RulesFileWatcher {
    pub fn new(path: impl AsRef<Path>, debounce: Duration, graph: SharedRuleGraph) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            path: path.as_ref().to_path_buf(),
            debounce,
            graph,
            shutdown_tx,
        }
    }

    /// 启动监听，需要在 tokio 运行时中调用
    pub fn start(&self) -> Result<WatchHandle> {
        let file_name = self
            .path
            .file_name()
            .map(OsString::from)
            .with_context(|| format!("规则文件路径无效: {}", self.path.display()))?;

        let watch_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        // notify 回调运行在它自己的线程，通过 channel 转发到异步任务
        let (event_tx, mut event_rx) = mpsc::channel::<()>(16);

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    let relevant = matches!(
                        event.kind,
                        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                    ) && event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()));

                    if relevant {
                        let _ = event_tx.try_send(());
                    }
                }
                Err(e) => {
                    warn!(error = %e, "文件监听器事件错误");
                }
            },
        )
        .context("创建文件监听器失败")?;

        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("启动文件监听失败: {}", watch_dir.display()))?;

        info!(path = %self.path.display(), "规则文件监听已启动");

        let path = self.path.clone();
        let debounce = self.debounce;
        let graph = self.graph.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        // 异步 debounce 循环：收到文件事件后等待窗口期再重载
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = event_rx.recv() => {
                        if event.is_none() {
                            break;
                        }

                        tokio::time::sleep(debounce).await;
                        // 清空窗口内积压的重复事件
                        while event_rx.try_recv().is_ok() {}

                        match graph.load_rules_from_path(&path) {
                            Ok(version) => {
                                info!(
                                    path = %path.display(),
                                    version,
                                    groups = graph.len(),
                                    "规则文件变更，已重新加载"
                                );
                            }
                            Err(e) => {
                                error!(
                                    path = %path.display(),
                                    error = %e,
                                    "规则文件重新加载失败，保留当前规则"
                                );
                            }
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        // 发送端被 drop 同样视为停止
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!("规则文件监听已停止");
                            break;
                        }
                    }
                }
            }
        });

        Ok(WatchHandle {
            _watcher: watcher,
            task,
        })
    }

    /// 通知监听循环退出
    pub fn stop(&self) {
        // 没有运行中的监听循环时 send 会失败，忽略即可
        let _ = self.shutdown_tx.send(true);
    }
}
