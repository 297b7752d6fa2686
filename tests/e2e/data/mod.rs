//! 测试数据模块
//!
//! 提供预定义的规则集和文档。

mod fixtures;

pub use fixtures::*;
