mod cli;

use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};

use blockprobe_core::exec::RetryPolicy;
use blockprobe_core::{RpcClient, RpcOptions, ScenarioBuilder};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let options = RpcOptions::default()
        .with_timeout(Duration::from_millis(args.timeout_ms))
        .with_retry(RetryPolicy::immediate(args.attempts))
        .with_requests_per_second(args.requests_per_second);
    let rpc = RpcClient::new(&args.rpc_url, options).context("configure RPC client")?;

    tracing::info!(endpoint = rpc.endpoint(), "running block scenario");

    let poll = RetryPolicy::fixed_delay(
        args.poll_attempts,
        Duration::from_millis(args.poll_delay_ms),
    );
    let report = ScenarioBuilder::new(&rpc)
        .with_poll_policy(poll)
        .run()
        .await
        .map_err(|err| {
            let message = format!("[{}] {err}", err.kind());
            eyre!(message).wrap_err(format!("scenario against `{}` failed", args.rpc_url))
        })?;

    tracing::info!(
        block_number = %report.block_number,
        tx_hash = %report.transaction_hash,
        "scenario complete"
    );

    let rendered = serde_json::to_string_pretty(&report).context("render scenario report")?;
    println!("{rendered}");

    Ok(())
}
