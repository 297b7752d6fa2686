//! 测试数据 Fixtures
//!
//! 预定义的规则集与文档，用于快速创建测试场景。

use serde_json::{Value, json};
use uuid::Uuid;

/// 测试规则组 ID
pub struct GroupIds;

impl GroupIds {
    pub const ADULT: &'static str = "0c5ec1a0-33b8-4c2e-8f3e-6a1f2d9b7c01";
    pub const NEW_HOUSE: &'static str = "0c5ec1a0-33b8-4c2e-8f3e-6a1f2d9b7c02";
    pub const REGISTERED_EARLY: &'static str = "0c5ec1a0-33b8-4c2e-8f3e-6a1f2d9b7c03";
    pub const SOMETIMES: &'static str = "0c5ec1a0-33b8-4c2e-8f3e-6a1f2d9b7c04";

    pub fn id(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }
}

/// 测试规则集
pub struct TestRuleSets;

impl TestRuleSets {
    /// 三个确定性规则组
    pub fn households() -> Value {
        json!([
            {
                "id": GroupIds::ADULT,
                "rules": [
                    { "operation": "greater_than", "left_side": "user.age", "right_side": "17" }
                ]
            },
            {
                "id": GroupIds::NEW_HOUSE,
                "rules": [
                    { "operation": "greater_than", "left_side": "house.built_at", "right_side": "2020-01-01T00:00:00Z" },
                    { "operation": "lower_than", "left_side": "house.price", "right_side": "500000" }
                ]
            },
            {
                "id": GroupIds::REGISTERED_EARLY,
                "rules": [
                    { "operation": "lower_than", "left_side": "user.registered_at", "right_side": "2015-01-01T00:00:00Z" }
                ]
            }
        ])
    }

    /// 在 households 基础上追加一个总被跳过的规则组
    pub fn households_with_skipped_group() -> Value {
        let mut rules = Self::households();
        if let Some(groups) = rules.as_array_mut() {
            groups.push(json!({
                "id": GroupIds::SOMETIMES,
                "skip_probability": 1.0,
                "rules": []
            }));
        }
        rules
    }

    /// 包含非法跳过概率的规则集
    pub fn invalid_probability() -> Value {
        json!([
            { "id": GroupIds::ADULT, "skip_probability": -0.1, "rules": [] }
        ])
    }
}

/// 测试文档
pub struct TestDocuments;

impl TestDocuments {
    pub fn adult_with_new_house() -> Value {
        json!({
            "user": {
                "name": "Pete",
                "age": 34,
                "registered_at": { "Time": "2012-03-04T05:06:07Z", "Valid": true }
            },
            "house": { "built_at": "2021-06-01T00:00:00+02:00", "price": 320000 }
        })
    }

    pub fn minor_without_registration() -> Value {
        json!({
            "user": {
                "name": "Andrew",
                "age": 13,
                "registered_at": { "Time": "0001-01-01T00:00:00Z", "Valid": false }
            },
            "house": { "built_at": "1999-01-01T00:00:00Z", "price": 90000 }
        })
    }

    /// age 是无法比较的字符串
    pub fn unparsable_age() -> Value {
        json!({ "user": { "name": "Ann", "age": "unknown" } })
    }
}
