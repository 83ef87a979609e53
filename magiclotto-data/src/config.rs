use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://www.dhlottery.co.kr/common.do";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
/// A round known to exist; latest-round probing starts here.
pub const DEFAULT_BASELINE_ROUND: u32 = 1100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub baseline_round: u32,
    /// `None` keeps a cached history until it is invalidated by hand.
    pub cache_ttl_secs: Option<u64>,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            baseline_round: DEFAULT_BASELINE_ROUND,
            cache_ttl_secs: None,
        }
    }
}
