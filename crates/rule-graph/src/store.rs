//! 共享规则图
//!
//! 使用 `ArcSwap` 持有当前规则图快照：评估只做一次原子 load，不阻塞；
//! 规则集整体替换通过原子指针交换完成，读者看到的要么是旧规则集、要么是新规则集。

use crate::document::Document;
use crate::error::{EvaluationFailure, Result};
use crate::graph::RuleGraph;
use crate::loader;
use crate::models::RulesNode;
use arc_swap::ArcSwap;
use rand::Rng;
use rulegraph_shared::observability::metrics;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// 可在线程间共享、支持热替换的规则图
#[derive(Clone)]
pub struct SharedRuleGraph {
    /// 当前规则图快照
    current: Arc<ArcSwap<RuleGraph>>,
    /// 成功替换的次数
    version: Arc<AtomicU64>,
}

impl SharedRuleGraph {
    pub fn new(graph: RuleGraph) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(graph)),
            version: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 获取当前规则图快照
    pub fn snapshot(&self) -> Arc<RuleGraph> {
        self.current.load_full()
    }

    /// 当前规则集版本，每次成功替换加一
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// 整体替换规则组序列
    #[instrument(skip(self, nodes), fields(groups = nodes.len()))]
    pub fn replace(&self, nodes: Vec<RulesNode>) -> u64 {
        let count = nodes.len();
        self.current.store(Arc::new(RuleGraph::with_nodes(nodes)));
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;

        metrics::record_rules_reload("ok", count);
        info!("规则集已替换: {} 个规则组, 版本 {}", count, version);
        version
    }

    /// 从 JSON 字符串加载规则集；失败时保持当前规则集不变
    pub fn load_rules_from_str(&self, rules: &str) -> Result<u64> {
        let nodes = loader::rules_from_str(rules).inspect_err(|e| {
            metrics::record_rules_reload("rejected", self.len());
            warn!(error = %e, "规则集被拒绝，保留当前规则");
        })?;
        Ok(self.replace(nodes))
    }

    /// 从文件加载规则集；失败时保持当前规则集不变
    pub fn load_rules_from_path(&self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let nodes = loader::rules_from_path(path).inspect_err(|e| {
            metrics::record_rules_reload("rejected", self.len());
            warn!(path = %path.display(), error = %e, "规则文件被拒绝，保留当前规则");
        })?;
        Ok(self.replace(nodes))
    }

    /// 在当前快照上评估文档
    pub fn evaluate(&self, document: &Document) -> std::result::Result<Vec<Uuid>, EvaluationFailure> {
        self.current.load().evaluate(document)
    }

    /// 在当前快照上使用指定随机源评估文档
    pub fn evaluate_with_rng<R: Rng + ?Sized>(
        &self,
        document: &Document,
        rng: &mut R,
    ) -> std::result::Result<Vec<Uuid>, EvaluationFailure> {
        self.current.load().evaluate_with_rng(document, rng)
    }
}

impl Default for SharedRuleGraph {
    fn default() -> Self {
        Self::new(RuleGraph::new())
    }
}

impl From<RuleGraph> for SharedRuleGraph {
    fn from(graph: RuleGraph) -> Self {
        Self::new(graph)
    }
}
