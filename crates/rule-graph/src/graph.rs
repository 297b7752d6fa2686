//! 规则图
//!
//! 持有有序的规则组序列，对一个文档依次评估所有规则组并收集匹配的 ID。

use crate::document::Document;
use crate::error::{EvaluationFailure, Result, RuleError};
use crate::loader;
use crate::models::{GroupOutcome, RulesNode};
use rand::Rng;
use rulegraph_shared::observability::metrics;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// 规则图
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleGraph {
    nodes: Vec<RulesNode>,
}

impl RuleGraph {
    /// 创建空的规则图
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// 使用预定义规则组创建
    pub fn with_nodes(nodes: Vec<RulesNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[RulesNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 规则集是否为空
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 整体替换规则组序列
    pub fn replace(&mut self, nodes: Vec<RulesNode>) {
        self.nodes = nodes;
    }

    /// 从 JSON 字符串加载规则集并替换当前规则
    ///
    /// 解析或校验失败时保持当前规则不变。
    #[instrument(skip(self, rules))]
    pub fn load_rules_from_str(&mut self, rules: &str) -> Result<usize> {
        let nodes = loader::rules_from_str(rules)?;
        let count = nodes.len();
        self.replace(nodes);

        info!("规则集已加载: {} 个规则组", count);
        Ok(count)
    }

    /// 从文件加载规则集并替换当前规则
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_rules_from_path(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let nodes = loader::rules_from_path(path)?;
        let count = nodes.len();
        self.replace(nodes);

        info!("规则集已加载: {} 个规则组", count);
        Ok(count)
    }

    /// 使用线程本地随机源评估文档
    pub fn evaluate(&self, document: &Document) -> std::result::Result<Vec<Uuid>, EvaluationFailure> {
        self.evaluate_with_rng(document, &mut rand::rng())
    }

    /// 评估原始 JSON 字节
    ///
    /// 字节不是合法 JSON 时返回 [`RuleError::MalformedInput`]，匹配列表为空。
    pub fn evaluate_json(&self, bytes: &[u8]) -> std::result::Result<Vec<Uuid>, EvaluationFailure> {
        let document = Document::from_slice(bytes)?;
        self.evaluate(&document)
    }

    /// 使用指定随机源评估文档
    ///
    /// 按插入顺序评估每个规则组，收集匹配的 ID。任一规则组出错时立即中止，
    /// 错误中携带已经收集到的 ID。
    pub fn evaluate_with_rng<R: Rng + ?Sized>(
        &self,
        document: &Document,
        rng: &mut R,
    ) -> std::result::Result<Vec<Uuid>, EvaluationFailure> {
        let start = Instant::now();
        let mut matched = Vec::new();

        for node in &self.nodes {
            match node.evaluate_outcome(document, rng) {
                Ok(outcome) => {
                    debug!(group_id = %node.id(), outcome = ?outcome, "规则组评估完成");
                    if outcome.is_match() {
                        matched.push(node.id());
                    }
                }
                Err(e) => {
                    debug!(group_id = %node.id(), error = %e, "规则组评估失败，中止");
                    metrics::record_graph_evaluation(
                        "error",
                        matched.len(),
                        start.elapsed().as_secs_f64(),
                    );
                    return Err(EvaluationFailure::new(matched, e));
                }
            }
        }

        metrics::record_graph_evaluation("ok", matched.len(), start.elapsed().as_secs_f64());
        Ok(matched)
    }

    /// 评估文档并返回每个规则组的详细结果
    ///
    /// 与 [`RuleGraph::evaluate_with_rng`] 语义相同，遇到错误时停止，
    /// 错误记录在报告中。
    pub fn explain<R: Rng + ?Sized>(&self, document: &Document, rng: &mut R) -> GraphReport {
        let start = Instant::now();
        let mut report = GraphReport::default();

        for node in &self.nodes {
            match node.evaluate_outcome(document, rng) {
                Ok(outcome) => report.verdicts.push(GroupVerdict {
                    id: node.id(),
                    outcome,
                }),
                Err(e) => {
                    report.failed_group = Some(node.id());
                    report.error = Some(e);
                    break;
                }
            }
        }

        let status = if report.is_complete() { "ok" } else { "error" };
        metrics::record_graph_evaluation(
            status,
            report.matched().len(),
            start.elapsed().as_secs_f64(),
        );
        report
    }
}

/// 单个规则组的评估结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupVerdict {
    pub id: Uuid,
    #[serde(flatten)]
    pub outcome: GroupOutcome,
}

/// 规则图评估报告
#[derive(Debug, Default)]
pub struct GraphReport {
    /// 已评估规则组的结论，按插入顺序
    pub verdicts: Vec<GroupVerdict>,
    /// 出错的规则组
    pub failed_group: Option<Uuid>,
    pub error: Option<RuleError>,
}

impl GraphReport {
    /// 匹配的规则组 ID
    pub fn matched(&self) -> Vec<Uuid> {
        self.verdicts
            .iter()
            .filter(|v| v.outcome.is_match())
            .map(|v| v.id)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}
