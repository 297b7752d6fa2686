//! 规则引擎领域模型

use crate::comparator::Comparator;
use crate::document::{Document, Nullable};
use crate::error::{Result, RuleError};
use crate::operators::Operation;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

const MIN_PROBABILITY: f64 = 0.0;
const MAX_PROBABILITY: f64 = 1.0;

/// 单条比较规则：`left_side`（文档路径）`operation` `right_side`（字面量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    operation: Operation,
    left_side: String,
    right_side: String,
}

impl Rule {
    pub fn new(
        operation: Operation,
        left_side: impl Into<String>,
        right_side: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            left_side: left_side.into(),
            right_side: right_side.into(),
        }
    }

    /// 从操作符名称创建，未知操作符返回 [`RuleError::UnknownOperation`]
    pub fn parse(
        operation: &str,
        left_side: impl Into<String>,
        right_side: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(operation.parse()?, left_side, right_side))
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn left_side(&self) -> &str {
        &self.left_side
    }

    pub fn right_side(&self) -> &str {
        &self.right_side
    }

    /// 对文档评估规则
    ///
    /// 左侧路径不存在（或可空包装无效）时直接返回 `false`，不会调用比较器。
    pub fn evaluate(&self, document: &Document) -> Result<bool> {
        let located = document
            .get_field(&self.left_side)
            .and_then(|value| Nullable::from_value(value).value());

        let Some(value) = located else {
            trace!(path = %self.left_side, "字段不存在，规则不匹配");
            return Ok(false);
        };

        Comparator::compare(self.operation, value, &self.right_side).map_err(|source| {
            RuleError::Coercion {
                path: self.left_side.clone(),
                source,
            }
        })
    }
}

/// 规则组评估结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GroupOutcome {
    /// 所有规则匹配且未被跳过
    Matched,
    /// 第 `rule_index` 条规则不匹配（短路）
    Rejected { rule_index: usize },
    /// 所有规则匹配，但被跳过概率抑制
    Skipped,
}

impl GroupOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched)
    }
}

/// 规则组：一组按 AND 组合的规则，附带跳过概率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RulesNodeRecord")]
pub struct RulesNode {
    id: Uuid,
    rules: Vec<Rule>,
    skip_probability: f64,
}

/// 规则组的序列化形式，反序列化后经 [`RulesNode::new`] 校验
#[derive(Deserialize)]
struct RulesNodeRecord {
    id: Uuid,
    #[serde(default)]
    rules: Vec<Rule>,
    #[serde(default)]
    skip_probability: f64,
}

impl TryFrom<RulesNodeRecord> for RulesNode {
    type Error = RuleError;

    fn try_from(record: RulesNodeRecord) -> Result<Self> {
        Self::new(record.id, record.rules, record.skip_probability)
    }
}

impl RulesNode {
    /// 创建规则组，`skip_probability` 不在 [0, 1] 内时返回错误
    pub fn new(id: Uuid, rules: Vec<Rule>, skip_probability: f64) -> Result<Self> {
        if !(MIN_PROBABILITY..=MAX_PROBABILITY).contains(&skip_probability) {
            return Err(RuleError::MalformedRuleSet(format!(
                "规则组 {} 的 skip_probability 必须在 [0, 1] 范围内，实际为 {}",
                id, skip_probability
            )));
        }

        Ok(Self {
            id,
            rules,
            skip_probability,
        })
    }

    /// 由 ID、JSON 编码的规则数组和跳过概率创建规则组
    pub fn from_rules_json(id: Uuid, rules_json: &str, skip_probability: f64) -> Result<Self> {
        let rules: Vec<Rule> = serde_json::from_str(rules_json)
            .map_err(|e| RuleError::MalformedRuleSet(e.to_string()))?;
        Self::new(id, rules, skip_probability)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn skip_probability(&self) -> f64 {
        self.skip_probability
    }

    /// 评估规则组，返回是否匹配
    pub fn evaluate<R: Rng + ?Sized>(&self, document: &Document, rng: &mut R) -> Result<bool> {
        self.evaluate_outcome(document, rng).map(|outcome| outcome.is_match())
    }

    /// 评估规则组并返回详细结果
    ///
    /// 规则按顺序短路求值；全部匹配后再抽取一次 [0, 1) 的随机数，
    /// `skip_probability` 大于该随机数时结果被抑制。
    pub fn evaluate_outcome<R: Rng + ?Sized>(
        &self,
        document: &Document,
        rng: &mut R,
    ) -> Result<GroupOutcome> {
        for (rule_index, rule) in self.rules.iter().enumerate() {
            if !rule.evaluate(document)? {
                return Ok(GroupOutcome::Rejected { rule_index });
            }
        }

        let draw: f64 = rng.random();
        if self.skip_probability > draw {
            return Ok(GroupOutcome::Skipped);
        }

        Ok(GroupOutcome::Matched)
    }
}
