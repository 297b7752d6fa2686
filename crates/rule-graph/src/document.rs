//! 待评估的 JSON 文档与字段路径解析

use crate::error::{Result, RuleError};
use serde::Serialize;
use serde_json::Value;

/// 可空包装中的有效标记字段
const VALID_KEY: &str = "Valid";

/// 评估输入文档
///
/// 可以由已解析的 `Value`、任意可序列化的类型或原始字节构造。
/// 原始字节不是合法 JSON 时返回 [`RuleError::MalformedInput`]，
/// 与"字段不存在"严格区分。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    data: Value,
}

impl Document {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// 从 JSON 字符串创建
    pub fn from_json(json: &str) -> Result<Self> {
        let data: Value = serde_json::from_str(json).map_err(RuleError::MalformedInput)?;
        Ok(Self { data })
    }

    /// 从原始字节创建
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let data: Value = serde_json::from_slice(bytes).map_err(RuleError::MalformedInput)?;
        Ok(Self { data })
    }

    /// 从任意可序列化的结构创建
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let data = serde_json::to_value(value).map_err(RuleError::MalformedInput)?;
        Ok(Self { data })
    }

    /// 获取字段值（点号分隔的路径，如 "user.name" 或 "order.items.0.price"）
    pub fn get_field(&self, path: &str) -> Option<&Value> {
        resolve(&self.data, path)
    }

    /// 获取底层数据
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_inner(self) -> Value {
        self.data
    }
}

impl From<Value> for Document {
    fn from(data: Value) -> Self {
        Self::new(data)
    }
}

/// 按点号路径在 JSON 中定位值
///
/// 任一段不存在、或在标量上继续下钻时返回 `None`。
/// 存在但为 `null` 的字段返回 `Some(&Value::Null)`。
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;

    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            Value::Array(arr) => {
                // 数组按下标访问，如 "items.0.name"
                let index: usize = part.parse().ok()?;
                current = arr.get(index)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

/// 可空包装值
///
/// 部分上游系统把可空字段编码为 `{"Time": "...", "Valid": true}` 的形式。
/// 比较之前先解开包装：有效时取内部值，无效时视为字段缺失。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Nullable<'a> {
    /// 普通值，未包装
    Plain(&'a Value),
    /// 包装且 Valid = true
    Valid(&'a Value),
    /// 包装且 Valid = false
    Invalid,
}

impl<'a> Nullable<'a> {
    pub fn from_value(value: &'a Value) -> Self {
        let Value::Object(map) = value else {
            return Self::Plain(value);
        };

        if map.len() != 2 {
            return Self::Plain(value);
        }

        let Some(Value::Bool(valid)) = map.get(VALID_KEY) else {
            return Self::Plain(value);
        };

        match map.iter().find(|(key, _)| key.as_str() != VALID_KEY) {
            Some((_, inner)) if *valid => Self::Valid(inner),
            Some(_) => Self::Invalid,
            None => Self::Plain(value),
        }
    }

    /// 解开后的值；无效包装返回 `None`
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Self::Plain(v) | Self::Valid(v) => Some(v),
            Self::Invalid => None,
        }
    }
}
