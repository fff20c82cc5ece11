use clap::Parser;

/// blockprobe: fetch the latest block and its first transaction from an EVM node.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Node JSON-RPC endpoint URL.
    #[arg(long, default_value = "http://127.0.0.1:8545", env = "BLOCKPROBE_RPC_URL")]
    pub rpc_url: String,

    /// Deadline for each RPC operation, retries included, in milliseconds.
    #[arg(long, default_value = "30000", env = "BLOCKPROBE_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Attempts per RPC operation.
    #[arg(long, default_value = "2")]
    pub attempts: u32,

    /// How many times to look for transactions in a freshly produced block.
    #[arg(long, default_value = "3")]
    pub poll_attempts: u32,

    /// Pause between transaction polls, in milliseconds.
    #[arg(long, default_value = "2000")]
    pub poll_delay_ms: u64,

    /// Maximum outbound requests per second (unlimited if omitted).
    #[arg(long)]
    pub requests_per_second: Option<u32>,
}
