use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::models::{DrawRecord, HistoryLog, PICK_COUNT};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("malformed payload for round {round}: {reason}")]
    Malformed { round: u32, reason: String },
}

/// Result of asking the upstream for one round.
#[derive(Debug)]
pub enum FetchOutcome {
    Found(DrawRecord),
    /// The endpoint answered but has no result for this round.
    NotFound,
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, FetchOutcome::Found(_))
    }

    pub fn into_record(self) -> Option<DrawRecord> {
        match self {
            FetchOutcome::Found(record) => Some(record),
            _ => None,
        }
    }
}

pub trait DrawSource {
    fn fetch_draw(&self, round: u32) -> FetchOutcome;
}

#[derive(Debug, Deserialize)]
struct LottoPayload {
    #[serde(rename = "returnValue")]
    return_value: String,
    #[serde(rename = "drwNo")]
    round: Option<u32>,
    #[serde(rename = "drwNoDate")]
    date: Option<String>,
    #[serde(rename = "drwtNo1")]
    no1: Option<u8>,
    #[serde(rename = "drwtNo2")]
    no2: Option<u8>,
    #[serde(rename = "drwtNo3")]
    no3: Option<u8>,
    #[serde(rename = "drwtNo4")]
    no4: Option<u8>,
    #[serde(rename = "drwtNo5")]
    no5: Option<u8>,
    #[serde(rename = "drwtNo6")]
    no6: Option<u8>,
    #[serde(rename = "bnusNo")]
    bonus: Option<u8>,
    #[serde(rename = "firstPrzwnerCo")]
    first_winner_count: Option<u32>,
    #[serde(rename = "firstWinamnt")]
    first_prize: Option<u64>,
}

/// Turns one upstream JSON body into an outcome for `round`.
pub fn parse_payload(round: u32, body: &str) -> FetchOutcome {
    let malformed = |reason: String| FetchOutcome::Failed(FetchError::Malformed { round, reason });

    let payload: LottoPayload = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) => return malformed(e.to_string()),
    };

    if payload.return_value != "success" {
        return FetchOutcome::NotFound;
    }

    if let Some(reported) = payload.round {
        if reported != round {
            return malformed(format!("payload reports round {}", reported));
        }
    }

    let slots = [
        payload.no1,
        payload.no2,
        payload.no3,
        payload.no4,
        payload.no5,
        payload.no6,
    ];
    let mut numbers = [0u8; PICK_COUNT];
    for (i, slot) in slots.iter().enumerate() {
        match slot {
            Some(n) => numbers[i] = *n,
            None => return malformed(format!("missing drwtNo{}", i + 1)),
        }
    }
    let Some(bonus) = payload.bonus else {
        return malformed("missing bnusNo".to_string());
    };

    let mut record = match DrawRecord::new(round, numbers, bonus) {
        Ok(r) => r,
        Err(e) => return malformed(e.to_string()),
    };
    record.date = payload
        .date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
    record.first_winner_count = payload.first_winner_count.unwrap_or(0);
    record.first_prize = payload.first_prize.unwrap_or(0);

    FetchOutcome::Found(record)
}

/// Blocking client for the `getLottoNumber` endpoint.
pub struct HttpDrawSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpDrawSource {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

impl DrawSource for HttpDrawSource {
    fn fetch_draw(&self, round: u32) -> FetchOutcome {
        let round_param = round.to_string();
        let response = match self
            .client
            .get(&self.base_url)
            .query(&[("method", "getLottoNumber"), ("drwNo", round_param.as_str())])
            .send()
        {
            Ok(r) => r,
            Err(e) => return FetchOutcome::Failed(e.into()),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Failed(FetchError::Status(status.as_u16()));
        }

        match response.text() {
            Ok(body) => parse_payload(round, &body),
            Err(e) => FetchOutcome::Failed(e.into()),
        }
    }
}

fn is_available(source: &dyn DrawSource, round: u32) -> bool {
    match source.fetch_draw(round) {
        FetchOutcome::Found(_) => true,
        FetchOutcome::NotFound => {
            debug!(round, "round not available");
            false
        }
        FetchOutcome::Failed(e) => {
            warn!(round, error = %e, "probe failed");
            false
        }
    }
}

/// Probes upward from `baseline` and returns the last round that exists.
///
/// When the baseline itself is missing, the rounds below it are
/// binary-searched instead. Returns 0 when not even round 1 is available.
pub fn fetch_latest_round(source: &dyn DrawSource, baseline: u32) -> u32 {
    let baseline = baseline.max(1);
    if !is_available(source, baseline) {
        warn!(baseline, "baseline round unavailable, searching below it");
        let latest = search_below(source, baseline);
        info!(latest, "latest round resolved");
        return latest;
    }

    let mut latest = baseline;
    while is_available(source, latest + 1) {
        latest += 1;
    }
    info!(latest, "latest round resolved");
    latest
}

// Assumes availability is a prefix 1..=k of the rounds. `lo` is known present
// (or 0), `hi` known absent.
fn search_below(source: &dyn DrawSource, upper: u32) -> u32 {
    let (mut lo, mut hi) = (0u32, upper);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if is_available(source, mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Downloads rounds 1..=latest one request at a time.
///
/// The log stops at the first round that cannot be fetched, so it never has
/// gaps. `progress` receives `(round, latest)` after each request.
pub fn fetch_all_history(
    source: &dyn DrawSource,
    baseline: u32,
    mut progress: impl FnMut(u32, u32),
) -> HistoryLog {
    let latest = fetch_latest_round(source, baseline);
    let mut history = HistoryLog::with_capacity(latest as usize);

    for round in 1..=latest {
        let outcome = source.fetch_draw(round);
        progress(round, latest);
        match outcome {
            FetchOutcome::Found(record) => {
                if let Err(e) = history.push(record) {
                    warn!(round, error = %e, "discarding out-of-sequence record");
                    break;
                }
            }
            FetchOutcome::NotFound => {
                warn!(round, "round missing upstream");
                break;
            }
            FetchOutcome::Failed(e) => {
                warn!(round, error = %e, "round fetch failed");
                break;
            }
        }
    }

    let fetched = history.len() as u32;
    if fetched < latest {
        warn!(fetched, latest, dropped = latest - fetched, "history truncated");
    } else {
        info!(fetched, "history downloaded");
    }
    history
}
