//! purgecss 命令行入口

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use purgecss::{Cli, OutputTarget, PurgeRunner, write_outputs};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // RUST_LOG 控制日志级别，日志写到 stderr，stdout 留给 JSON 结果
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.resolve_options().await.context("failed to resolve options")?;
    let target = OutputTarget::from_options(&options);

    let runner = PurgeRunner::new(options).context("invalid configuration")?;
    let report = runner.run().await.context("purge failed")?;
    write_outputs(&report, &target).await.context("failed to write output")?;

    if report.has_failures() {
        for error in report.failures() {
            tracing::error!("{}", error);
        }
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
