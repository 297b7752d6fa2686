//! 规则集加载
//!
//! 规则集是一个 JSON 数组：
//!
//! ```json
//! [
//!   {
//!     "id": "d8212113-3732-42de-bc40-be63b89d7864",
//!     "skip_probability": 0.3,
//!     "rules": [
//!       { "operation": "greater_than", "left_side": "user.age", "right_side": "10" }
//!     ]
//!   }
//! ]
//! ```
//!
//! 任一规则组解析或校验失败，整批规则集都会被拒绝。

use crate::error::{Result, RuleError};
use crate::models::RulesNode;
use std::path::Path;

/// 从 JSON 字符串解析规则集
pub fn rules_from_str(rules: &str) -> Result<Vec<RulesNode>> {
    serde_json::from_str(rules).map_err(|e| RuleError::MalformedRuleSet(e.to_string()))
}

/// 从原始字节解析规则集
pub fn rules_from_slice(rules: &[u8]) -> Result<Vec<RulesNode>> {
    serde_json::from_slice(rules).map_err(|e| RuleError::MalformedRuleSet(e.to_string()))
}

/// 从文件读取并解析规则集
pub fn rules_from_path(path: impl AsRef<Path>) -> Result<Vec<RulesNode>> {
    let bytes = std::fs::read(path.as_ref())?;
    rules_from_slice(&bytes)
}
