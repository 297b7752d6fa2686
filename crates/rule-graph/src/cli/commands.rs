//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。
//! 未在命令行指定的参数回退到配置文件（config/*.toml 与 RULEGRAPH_ 环境变量）。

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 规则图命令行工具
///
/// 对 JSON 文档评估规则集，输出匹配的规则组 ID。
/// 使用 `--help` 查看各子命令的详细说明。
#[derive(Parser, Debug)]
#[command(name = "rule-graph")]
#[command(version, about = "JSON 规则图评估工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，覆盖配置文件
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 校验规则集文件并输出摘要
    Check {
        /// 规则集文件路径
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// 评估 NDJSON 文档（每行一个 JSON 文档）
    ///
    /// 每个输入行输出一行 JSON 结果；格式错误的行输出 error 字段后继续处理。
    Eval {
        /// 规则集文件路径
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// 输入文件，缺省时读取标准输入
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// 跳过概率抽样的随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// 输出每个规则组的评估结论
        #[arg(long)]
        explain: bool,
    },

    /// 从标准输入持续评估，规则文件变化时自动重新加载
    Watch {
        /// 规则集文件路径
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// 跳过概率抽样的随机种子
        #[arg(long)]
        seed: Option<u64>,

        /// 启动 Prometheus 指标端点
        #[arg(long)]
        metrics: bool,
    },
}
