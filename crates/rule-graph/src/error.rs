//! 规则引擎错误类型

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("输入文档不是合法的 JSON: {0}")]
    MalformedInput(#[source] serde_json::Error),

    #[error("规则集格式错误: {0}")]
    MalformedRuleSet(String),

    #[error("字段 '{path}' 无法比较: {source}")]
    Coercion {
        path: String,
        #[source]
        source: CoercionError,
    },

    #[error("未知的操作符: {0}")]
    UnknownOperation(String),

    #[error("读取规则文件失败: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;

/// 左值与右值无法转换为同一可比较形式
#[derive(Debug, Clone, PartialEq, Error)]
#[error("无法将 {left} 与 '{right}' 转换为数值或时间进行比较")]
pub struct CoercionError {
    /// 文档中定位到的值（JSON 文本）
    pub left: String,
    /// 规则右侧的字面量
    pub right: String,
}

/// 规则图评估失败
///
/// 保留出错前已经匹配的规则组 ID，调用方可以同时拿到部分结果和错误原因。
#[derive(Debug, Error)]
#[error("规则图评估中止（已匹配 {} 个规则组）: {source}", .matched.len())]
pub struct EvaluationFailure {
    pub matched: Vec<Uuid>,
    #[source]
    pub source: RuleError,
}

impl EvaluationFailure {
    pub fn new(matched: Vec<Uuid>, source: RuleError) -> Self {
        Self { matched, source }
    }

    /// 拆分为部分结果与错误
    pub fn into_parts(self) -> (Vec<Uuid>, RuleError) {
        (self.matched, self.source)
    }
}

impl From<RuleError> for EvaluationFailure {
    fn from(source: RuleError) -> Self {
        Self::new(Vec::new(), source)
    }
}
