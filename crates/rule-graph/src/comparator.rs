//! 值比较器
//!
//! 相等判断按序列化字节严格比较；大小判断先把左右两侧转换为同一种可比较形式，
//! 依次尝试：数值 → RFC 3339 时间 → 数字字符串。

use crate::error::CoercionError;
use crate::operators::Operation;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

/// 转换后的可比较值对（左, 右）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    Number(f64, f64),
    Instant(DateTime<Utc>, DateTime<Utc>),
}

impl Coerced {
    /// 左值相对右值的顺序；包含 NaN 时为 `None`
    pub fn ordering(&self) -> Option<Ordering> {
        match self {
            Self::Number(left, right) => left.partial_cmp(right),
            Self::Instant(left, right) => Some(left.cmp(right)),
        }
    }
}

/// 值比较器
pub struct Comparator;

impl Comparator {
    /// 比较文档中的值与规则右侧字面量
    ///
    /// # Arguments
    /// * `operation` - 操作符
    /// * `left` - 从文档中定位到的值
    /// * `right` - 规则中定义的字面量
    pub fn compare(
        operation: Operation,
        left: &Value,
        right: &str,
    ) -> Result<bool, CoercionError> {
        if !operation.is_ordering() {
            let equal = Self::encoded_eq(left, right);
            return Ok(equal == (operation == Operation::Equal));
        }

        let expected = if operation == Operation::GreaterThan {
            Ordering::Greater
        } else {
            Ordering::Less
        };
        let coerced = Self::coerce(left, right)?;
        Ok(coerced.ordering() == Some(expected))
    }

    /// 严格相等：两侧编码为 JSON 后逐字节比较
    ///
    /// 右侧字面量始终编码为 JSON 字符串，因此数字 `13` 与字面量 `"13"` 不相等。
    fn encoded_eq(left: &Value, right: &str) -> bool {
        let left = Self::encode(left);
        let right = Self::encode(&Value::String(right.to_owned()));
        left.as_bytes() == right.as_bytes()
    }

    fn encode(value: &Value) -> String {
        value.to_string()
    }

    /// 按优先级转换左右两侧，任一策略对两侧都成功即采用
    pub fn coerce(left: &Value, right: &str) -> Result<Coerced, CoercionError> {
        Self::try_number(left, right)
            .or_else(|| Self::try_instant(left, right))
            .or_else(|| Self::try_numeric_string(left, right))
            .ok_or_else(|| CoercionError {
                left: Self::encode(left),
                right: right.to_owned(),
            })
    }

    /// 左值是 JSON 数字，右值可解析为浮点数
    fn try_number(left: &Value, right: &str) -> Option<Coerced> {
        let left = left.as_f64()?;
        let right = right.parse::<f64>().ok()?;
        Some(Coerced::Number(left, right))
    }

    /// 两侧都是 RFC 3339 时间
    fn try_instant(left: &Value, right: &str) -> Option<Coerced> {
        let left = Self::parse_instant(left.as_str()?)?;
        let right = Self::parse_instant(right)?;
        Some(Coerced::Instant(left, right))
    }

    /// 左值是可解析为浮点数的字符串
    fn try_numeric_string(left: &Value, right: &str) -> Option<Coerced> {
        let left = left.as_str()?.parse::<f64>().ok()?;
        let right = right.parse::<f64>().ok()?;
        Some(Coerced::Number(left, right))
    }

    fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
