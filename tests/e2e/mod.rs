//! 规则图端到端测试
//!
//! 以文件为边界测试完整流程，包括：
//! - 规则集文件加载与校验
//! - NDJSON 文档批量评估
//! - 规则文件热更新

pub mod data;
pub mod setup;
pub mod suites;

pub use setup::TestEnvironment;
