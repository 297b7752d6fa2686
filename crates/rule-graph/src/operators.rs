//! 规则操作符定义

use crate::error::RuleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 比较操作符
///
/// `equal` / `not_equal` 按序列化后的字节严格比较，
/// `greater_than` / `lower_than` 走数值/时间转换。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Equal,
    NotEqual,
    GreaterThan,
    LowerThan,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
            Self::GreaterThan => "greater_than",
            Self::LowerThan => "lower_than",
        }
    }

    /// 是否为排序比较（需要类型转换）
    pub fn is_ordering(&self) -> bool {
        matches!(self, Self::GreaterThan | Self::LowerThan)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "equal" => Ok(Self::Equal),
            "not_equal" => Ok(Self::NotEqual),
            "greater_than" => Ok(Self::GreaterThan),
            "lower_than" => Ok(Self::LowerThan),
            other => Err(RuleError::UnknownOperation(other.to_string())),
        }
    }
}
