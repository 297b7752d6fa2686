//! 测试环境
//!
//! 每个测试使用独立的临时目录存放规则文件和输入文件，drop 时自动清理。

use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// 基于临时目录的测试环境
pub struct TestEnvironment {
    dir: TempDir,
    rules_path: PathBuf,
}

impl TestEnvironment {
    /// 创建环境并写入初始规则集
    pub fn setup(rules: &Value) -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let rules_path = dir.path().join("rules.json");
        let env = Self { dir, rules_path };
        env.write_rules(rules)?;
        Ok(env)
    }

    pub fn rules_path(&self) -> &Path {
        &self.rules_path
    }

    /// 覆盖写入规则文件
    pub fn write_rules(&self, rules: &Value) -> anyhow::Result<()> {
        std::fs::write(&self.rules_path, serde_json::to_vec_pretty(rules)?)?;
        Ok(())
    }

    /// 写入原始文本作为规则文件（用于非法内容）
    pub fn write_raw_rules(&self, content: &str) -> anyhow::Result<()> {
        std::fs::write(&self.rules_path, content)?;
        Ok(())
    }

    /// 写入 NDJSON 输入文件，每个元素一行
    pub fn write_input(&self, name: &str, lines: &[String]) -> anyhow::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, lines.join("\n"))?;
        Ok(path)
    }
}
