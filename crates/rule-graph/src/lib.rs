//! JSON 规则图引擎
//!
//! 对任意 JSON 文档评估一组规则组，返回匹配的规则组 ID：
//! - 规则：点分路径 + 操作符 + 字符串字面量
//! - 规则组：AND 组合，短路求值，可按概率跳过
//! - 规则图：按插入顺序评估所有规则组，收集匹配结果
//!
//! 另提供规则集热更新（[`SharedRuleGraph`] + [`RulesFileWatcher`]）与命令行工具。

pub mod cli;
pub mod comparator;
pub mod document;
pub mod error;
pub mod graph;
pub mod loader;
pub mod models;
pub mod operators;
pub mod reload;
pub mod store;

pub use comparator::Comparator;
pub use document::Document;
pub use error::{CoercionError, EvaluationFailure, Result, RuleError};
pub use graph::{GraphReport, GroupVerdict, RuleGraph};
pub use models::{GroupOutcome, Rule, RulesNode};
pub use operators::Operation;
pub use reload::{RulesFileWatcher, WatchHandle};
pub use store::SharedRuleGraph;
