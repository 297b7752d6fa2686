//! 规则热更新测试套件
//!
//! 修改规则文件后，共享规则图应切换到新规则集；非法修改被忽略。

use std::time::Duration;

use rule_graph::{Document, RulesFileWatcher, SharedRuleGraph};

use crate::data::*;
use crate::setup::TestEnvironment;

const DEBOUNCE: Duration = Duration::from_millis(50);

/// 轮询直到条件成立或超时
async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    condition()
}

#[cfg(test)]
mod reload_tests {
    use super::*;

    #[tokio::test]
    async fn test_rules_change_takes_effect() {
        let env = TestEnvironment::setup(&TestRuleSets::households()).unwrap();
        let graph = SharedRuleGraph::default();
        graph.load_rules_from_path(env.rules_path()).unwrap();

        let watcher = RulesFileWatcher::new(env.rules_path(), DEBOUNCE, graph.clone());
        let handle = watcher.start().unwrap();

        let document = Document::new(TestDocuments::adult_with_new_house());
        let before = graph.snapshot();
        assert_eq!(before.evaluate(&document).unwrap().len(), 3);

        env.write_rules(&TestRuleSets::households_with_skipped_group())
            .unwrap();
        assert!(wait_until(|| graph.len() == 4).await, "规则文件应被重新加载");
        assert!(graph.version() >= 2);

        // 旧快照不受替换影响
        assert_eq!(before.len(), 3);
        assert_eq!(graph.evaluate(&document).unwrap().len(), 3);

        watcher.stop();
        handle.join().await;
    }

    #[tokio::test]
    async fn test_invalid_change_keeps_current_rules() {
        let env = TestEnvironment::setup(&TestRuleSets::households()).unwrap();
        let graph = SharedRuleGraph::default();
        graph.load_rules_from_path(env.rules_path()).unwrap();
        let version = graph.version();

        let watcher = RulesFileWatcher::new(env.rules_path(), DEBOUNCE, graph.clone());
        let handle = watcher.start().unwrap();

        env.write_rules(&TestRuleSets::invalid_probability()).unwrap();
        env.write_raw_rules("[{\"id\":").unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(graph.version(), version);
        assert_eq!(graph.len(), 3);

        // 修复后恢复热更新
        env.write_rules(&TestRuleSets::households_with_skipped_group())
            .unwrap();
        assert!(wait_until(|| graph.len() == 4).await);

        watcher.stop();
        handle.join().await;
    }
}
