//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑。
//! 命令行参数优先，未指定时使用 [`AppConfig`] 中的规则路径与随机种子。

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::Serialize;
use tokio::io::AsyncBufReadExt;
use tracing::{error, info, warn};
use uuid::Uuid;

use rulegraph_shared::config::AppConfig;

use crate::document::Document;
use crate::graph::{GroupVerdict, RuleGraph};
use crate::loader;
use crate::reload::RulesFileWatcher;
use crate::store::SharedRuleGraph;

/// 命令执行器
///
/// 持有加载好的应用配置，作为 CLI 与规则图之间的桥梁。
pub struct CommandRunner {
    config: AppConfig,
}

/// 单个输入行的评估结果，序列化为一行 JSON 输出
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationLine {
    /// 输入中的行号（从 1 开始）
    pub line: usize,
    /// 匹配的规则组 ID；评估中止时为出错前的部分结果
    pub matched: Vec<Uuid>,
    pub error: Option<String>,
    /// 仅在 `--explain` 时输出
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Vec<GroupVerdict>>,
}

/// 规则集摘要（check 命令输出）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSetSummary {
    pub path: String,
    pub groups: usize,
    pub rules: usize,
    /// skip_probability 大于 0 的规则组数量
    pub skippable_groups: usize,
}

/// 评估统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalStats {
    pub documents: usize,
    pub failures: usize,
}

impl CommandRunner {
    /// 创建命令执行器
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn rules_path(&self, rules: Option<PathBuf>) -> PathBuf {
        rules.unwrap_or_else(|| PathBuf::from(&self.config.rules.path))
    }

    /// 构造随机源：有种子时使用可复现的 StdRng，否则使用线程本地随机源
    fn rng(&self, seed: Option<u64>) -> Box<dyn RngCore> {
        match seed.or(self.config.evaluation.seed) {
            Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
            None => Box::new(rand::rng()),
        }
    }

    /// 执行 check 命令
    pub fn run_check(&self, rules: Option<PathBuf>) -> Result<()> {
        let path = self.rules_path(rules);
        let summary = check_rules(&path)?;

        info!(
            path = %summary.path,
            groups = summary.groups,
            rules = summary.rules,
            "规则集校验通过"
        );

        let mut out = io::stdout().lock();
        serde_json::to_writer(&mut out, &summary)?;
        writeln!(out)?;
        Ok(())
    }

    /// 执行 eval 命令
    pub fn run_eval(
        &self,
        rules: Option<PathBuf>,
        input: Option<PathBuf>,
        seed: Option<u64>,
        explain: bool,
    ) -> Result<()> {
        let path = self.rules_path(rules);
        let mut graph = RuleGraph::new();
        graph
            .load_rules_from_path(&path)
            .with_context(|| format!("加载规则集失败: {}", path.display()))?;

        let mut rng = self.rng(seed);
        let mut out = BufWriter::new(io::stdout().lock());

        let stats = match input {
            Some(input) => {
                let file = File::open(&input)
                    .with_context(|| format!("打开输入文件失败: {}", input.display()))?;
                evaluate_lines(&graph, BufReader::new(file), &mut out, rng.as_mut(), explain)?
            }
            None => evaluate_lines(&graph, io::stdin().lock(), &mut out, rng.as_mut(), explain)?,
        };
        out.flush()?;

        info!(
            documents = stats.documents,
            failures = stats.failures,
            "评估完成"
        );
        Ok(())
    }

    /// 执行 watch 命令
    ///
    /// 从标准输入逐行读取文档，每行使用当时生效的规则集快照评估。
    /// 规则文件变化后自动重载；新规则集非法时继续使用旧规则集。
    pub async fn run_watch(&self, rules: Option<PathBuf>, seed: Option<u64>) -> Result<()> {
        let path = self.rules_path(rules);
        let graph = SharedRuleGraph::default();
        graph
            .load_rules_from_path(&path)
            .with_context(|| format!("加载规则集失败: {}", path.display()))?;

        let watcher = RulesFileWatcher::new(
            &path,
            Duration::from_millis(self.config.rules.debounce_ms),
            graph.clone(),
        );
        let handle = watcher.start()?;

        info!(path = %path.display(), groups = graph.len(), "开始监听标准输入，按 Ctrl+C 停止");

        let mut rng = self.rng(seed);
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        let mut out = io::stdout();
        let mut line_no = 0;

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                line = lines.next_line() => {
                    let Some(line) = line.context("读取标准输入失败")? else {
                        break;
                    };
                    line_no += 1;
                    if line.trim().is_empty() {
                        continue;
                    }

                    let snapshot = graph.snapshot();
                    let result = evaluate_line(&snapshot, line_no, &line, rng.as_mut(), false);
                    write_line(&mut out, &result)?;
                    out.flush()?;
                }
            }
        }

        watcher.stop();
        handle.join().await;
        info!(documents = line_no, version = graph.version(), "监听结束");
        Ok(())
    }
}

/// 校验规则集文件并生成摘要
pub fn check_rules(path: &Path) -> Result<RuleSetSummary> {
    let nodes = loader::rules_from_path(path)
        .with_context(|| format!("规则集校验失败: {}", path.display()))?;

    Ok(RuleSetSummary {
        path: path.display().to_string(),
        groups: nodes.len(),
        rules: nodes.iter().map(|n| n.rules().len()).sum(),
        skippable_groups: nodes.iter().filter(|n| n.skip_probability() > 0.0).count(),
    })
}

/// 评估一行 JSON 文本
///
/// 文本不是合法 JSON 或评估出错时，结果的 `error` 字段携带错误信息。
pub fn evaluate_line<R: Rng + ?Sized>(
    graph: &RuleGraph,
    line_no: usize,
    line: &str,
    rng: &mut R,
    explain: bool,
) -> EvaluationLine {
    let document = match Document::from_json(line) {
        Ok(document) => document,
        Err(e) => {
            return EvaluationLine {
                line: line_no,
                matched: Vec::new(),
                error: Some(e.to_string()),
                report: None,
            };
        }
    };

    if explain {
        let report = graph.explain(&document, rng);
        return EvaluationLine {
            line: line_no,
            matched: report.matched(),
            error: report.error.as_ref().map(ToString::to_string),
            report: Some(report.verdicts),
        };
    }

    match graph.evaluate_with_rng(&document, rng) {
        Ok(matched) => EvaluationLine {
            line: line_no,
            matched,
            error: None,
            report: None,
        },
        Err(failure) => {
            let (matched, e) = failure.into_parts();
            EvaluationLine {
                line: line_no,
                matched,
                error: Some(e.to_string()),
                report: None,
            }
        }
    }
}

/// 逐行评估 NDJSON 输入，每个非空行输出一行结果
///
/// 单行失败不会中止处理；只有读写错误才会返回 `Err`。
pub fn evaluate_lines<B, W, R>(
    graph: &RuleGraph,
    reader: B,
    writer: &mut W,
    rng: &mut R,
    explain: bool,
) -> Result<EvalStats>
where
    B: BufRead,
    W: Write,
    R: Rng + ?Sized,
{
    let mut stats = EvalStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("读取输入失败")?;
        if line.trim().is_empty() {
            continue;
        }

        let result = evaluate_line(graph, index + 1, &line, rng, explain);
        stats.documents += 1;
        if let Some(e) = &result.error {
            stats.failures += 1;
            warn!(line = result.line, error = %e, "文档评估失败");
        }
        write_line(writer, &result)?;
    }

    Ok(stats)
}

fn write_line<W: Write>(writer: &mut W, result: &EvaluationLine) -> Result<()> {
    serde_json::to_writer(&mut *writer, result)?;
    writeln!(writer)?;
    Ok(())
}

/// 等待 Ctrl+C 信号
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "安装 CTRL+C 信号处理器失败");
        std::future::pending::<()>().await;
    }
    info!("收到关闭信号，正在停止...");
}
