//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::observability::ObservabilityConfig;

/// 环境变量前缀
const ENV_PREFIX: &str = "RULEGRAPH";

/// 规则集配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// 规则集文件路径（JSON）
    pub path: String,
    /// 热更新 debounce 窗口（毫秒）
    pub debounce_ms: u64,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            path: "config/rules.json".to_string(),
            debounce_ms: 500,
        }
    }
}

/// 评估配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// 跳过概率抽样的随机种子；设置后同一输入序列的评估结果可复现
    pub seed: Option<u64>,
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub rules: RulesConfig,
    pub evaluation: EvaluationConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（RULEGRAPH_ 前缀，层级用双下划线分隔，如 RULEGRAPH_RULES__PATH -> rules.path）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("RULEGRAPH_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::load_from(Path::new(&config_dir), &env, service_name)
    }

    /// 从指定目录和环境加载配置
    pub fn load_from(
        config_dir: &Path,
        environment: &str,
        service_name: &str,
    ) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", environment)?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", environment))).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", service_name))).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}
