use clap::Args;

use magiclotto_data::config::{
    FetchConfig, DEFAULT_BASELINE_ROUND, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS,
};

/// Upstream options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Draw results endpoint
    #[arg(long, global = true, env = "MAGICLOTTO_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "MAGICLOTTO_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Round known to exist, where latest-round probing starts
    #[arg(long, global = true, env = "MAGICLOTTO_BASELINE_ROUND", default_value_t = DEFAULT_BASELINE_ROUND)]
    pub baseline_round: u32,

    /// Lifetime of the cached history in interactive mode (unset = until refresh)
    #[arg(long, global = true, env = "MAGICLOTTO_CACHE_TTL_SECS")]
    pub cache_ttl_secs: Option<u64>,
}

impl From<FetchArgs> for FetchConfig {
    fn from(args: FetchArgs) -> Self {
        FetchConfig {
            base_url: args.base_url,
            timeout_secs: args.timeout_secs,
            baseline_round: args.baseline_round,
            cache_ttl_secs: args.cache_ttl_secs,
        }
    }
}
