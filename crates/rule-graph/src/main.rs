//! 规则图命令行入口

use clap::Parser;
use rule_graph::cli::{Cli, CommandRunner, Commands};
use rulegraph_shared::config::AppConfig;
use rulegraph_shared::observability;

const SERVICE_NAME: &str = "rule-graph";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(SERVICE_NAME).unwrap_or_else(|e| {
        eprintln!("配置加载失败，使用默认配置: {e}");
        AppConfig::default()
    });

    // 命令行参数覆盖配置文件
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    if let Commands::Watch { metrics: true, .. } = &cli.command {
        config.observability.metrics_enabled = true;
    }
    // 只有 watch 是长驻进程，其余命令不启动指标端点
    if !matches!(cli.command, Commands::Watch { .. }) {
        config.observability.metrics_enabled = false;
    }

    let observability_config = config
        .observability
        .clone()
        .with_service_name(SERVICE_NAME);
    let _guard = observability::init(&observability_config).await?;

    let runner = CommandRunner::new(config);

    match cli.command {
        Commands::Check { rules } => {
            runner.run_check(rules)?;
        }
        Commands::Eval {
            rules,
            input,
            seed,
            explain,
        } => {
            runner.run_eval(rules, input, seed, explain)?;
        }
        Commands::Watch { rules, seed, .. } => {
            runner.run_watch(rules, seed).await?;
        }
    }

    Ok(())
}
