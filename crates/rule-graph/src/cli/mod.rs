//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `check` - 校验规则集文件
//! - `eval` - 逐行评估 NDJSON 文档
//! - `watch` - 评估标准输入，同时热更新规则文件
//!
//! # 使用示例
//!
//! ```bash
//! # 校验规则集
//! rule-graph check --rules config/rules.json
//!
//! # 评估文件中的文档，固定随机种子并输出每个规则组的结论
//! rule-graph eval --rules config/rules.json --input events.ndjson --seed 7 --explain
//!
//! # 从标准输入持续评估，规则文件修改后自动生效
//! tail -f events.ndjson | rule-graph watch --rules config/rules.json --metrics
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::{CommandRunner, EvaluationLine};
