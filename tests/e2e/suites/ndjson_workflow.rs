//! NDJSON 评估测试套件
//!
//! 从规则文件加载规则集，逐行评估输入文件并检查输出。

use std::fs::File;
use std::io::BufReader;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rule_graph::RuleGraph;
use rule_graph::cli::runner::{check_rules, evaluate_lines};
use serde_json::{Value, json};

use crate::data::*;
use crate::setup::TestEnvironment;

fn load(env: &TestEnvironment) -> RuleGraph {
    let mut graph = RuleGraph::new();
    graph.load_rules_from_path(env.rules_path()).unwrap();
    graph
}

fn run_file(env: &TestEnvironment, lines: &[String], explain: bool) -> Vec<Value> {
    let graph = load(env);
    let input = env.write_input("input.ndjson", lines).unwrap();

    let mut out = Vec::new();
    let mut rng = StdRng::seed_from_u64(2024);
    evaluate_lines(
        &graph,
        BufReader::new(File::open(input).unwrap()),
        &mut out,
        &mut rng,
        explain,
    )
    .unwrap();

    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[cfg(test)]
mod check_tests {
    use super::*;

    #[test]
    fn test_check_valid_rule_set() {
        let env = TestEnvironment::setup(&TestRuleSets::households_with_skipped_group()).unwrap();

        let summary = check_rules(env.rules_path()).unwrap();
        assert_eq!(summary.groups, 4);
        assert_eq!(summary.rules, 4);
        assert_eq!(summary.skippable_groups, 1);
    }

    #[test]
    fn test_check_rejects_invalid_rule_sets() {
        let env = TestEnvironment::setup(&TestRuleSets::invalid_probability()).unwrap();
        assert!(check_rules(env.rules_path()).is_err());

        env.write_raw_rules("[{\"id\": \"not-a-uuid\", \"rules\": []}]").unwrap();
        assert!(check_rules(env.rules_path()).is_err());

        env.write_raw_rules("{}").unwrap();
        assert!(check_rules(env.rules_path()).is_err());
    }
}

#[cfg(test)]
mod evaluation_tests {
    use super::*;

    #[test]
    fn test_evaluate_documents_in_order() {
        let env = TestEnvironment::setup(&TestRuleSets::households_with_skipped_group()).unwrap();

        let output = run_file(
            &env,
            &[
                TestDocuments::adult_with_new_house().to_string(),
                TestDocuments::minor_without_registration().to_string(),
            ],
            false,
        );

        assert_eq!(output.len(), 2);
        assert_eq!(
            output[0],
            json!({
                "line": 1,
                "matched": [GroupIds::ADULT, GroupIds::NEW_HOUSE, GroupIds::REGISTERED_EARLY],
                "error": null
            })
        );
        assert_eq!(
            output[1],
            json!({ "line": 2, "matched": [], "error": null })
        );
    }

    #[test]
    fn test_bad_lines_are_reported_and_skipped() {
        let env = TestEnvironment::setup(&TestRuleSets::households()).unwrap();

        let output = run_file(
            &env,
            &[
                "{not json".to_string(),
                TestDocuments::unparsable_age().to_string(),
                String::new(),
                TestDocuments::adult_with_new_house().to_string(),
            ],
            false,
        );

        assert_eq!(output.len(), 3);
        assert_eq!(output[0]["line"], 1);
        assert!(output[0]["error"].is_string());

        assert_eq!(output[1]["line"], 2);
        assert_eq!(output[1]["matched"], json!([]));
        assert!(output[1]["error"].as_str().unwrap().contains("user.age"));

        assert_eq!(output[2]["line"], 4);
        assert!(output[2]["error"].is_null());
        assert_eq!(output[2]["matched"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_explain_reports_every_group() {
        let env = TestEnvironment::setup(&TestRuleSets::households_with_skipped_group()).unwrap();

        let output = run_file(
            &env,
            &[TestDocuments::minor_without_registration().to_string()],
            true,
        );

        let report = output[0]["report"].as_array().unwrap();
        let outcomes: Vec<_> = report
            .iter()
            .map(|v| (v["id"].as_str().unwrap(), v["outcome"].as_str().unwrap()))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                (GroupIds::ADULT, "rejected"),
                (GroupIds::NEW_HOUSE, "rejected"),
                (GroupIds::REGISTERED_EARLY, "rejected"),
                (GroupIds::SOMETIMES, "skipped"),
            ]
        );
        assert_eq!(report[1]["rule_index"], 0);
    }

    #[test]
    fn test_evaluation_with_same_seed_is_repeatable() {
        let mut rules = TestRuleSets::households();
        for group in rules.as_array_mut().unwrap() {
            group["skip_probability"] = json!(0.5);
        }
        let env = TestEnvironment::setup(&rules).unwrap();

        let lines: Vec<String> = (0..20)
            .map(|_| TestDocuments::adult_with_new_house().to_string())
            .collect();

        assert_eq!(run_file(&env, &lines, false), run_file(&env, &lines, false));
    }
}
