// Data model for the HK Next Bus stop list viewer.
//
// Stops and ETAs arrive here already fetched and parsed; this module only
// defines the record types, builds the per-stop ETA index, and selects the
// earliest arrival for display. The bundled sample network stands in for the
// external data source so the frontends have something to bind.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

// ============================================================================
// Data Structures
// ============================================================================

/// A bus stop with bilingual display names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusStop {
    pub stop_id: String,
    pub name_en: String,
    pub name_tc: String,
    pub service_type: String,
}

/// One estimated arrival for a stop, in whole minutes.
///
/// Negative minutes mark an estimate that is not meaningful yet; such entries
/// never win the earliest-arrival scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEta {
    pub stop_id: String,
    pub minutes_remaining: i32,
}

/// ETA text for one stop, ready to localize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtaDisplay {
    NoData,
    NoBuses,
    Arriving,
    Minutes(i32),
}

impl EtaDisplay {
    /// Classify the ETA entries known for a stop (`None` = stop not indexed).
    pub fn for_stop(entries: Option<&[RouteEta]>) -> Self {
        match entries {
            Some(list) if !list.is_empty() => match HknbModels::earliest_eta(list) {
                Some(eta) if eta.minutes_remaining <= 0 => EtaDisplay::Arriving,
                Some(eta) => EtaDisplay::Minutes(eta.minutes_remaining),
                None => EtaDisplay::NoBuses,
            },
            _ => EtaDisplay::NoData,
        }
    }

    pub fn text(&self, is_english: bool) -> String {
        match self {
            EtaDisplay::NoData => {
                if is_english { "No ETA data".to_string() } else { "無到站資料".to_string() }
            }
            EtaDisplay::NoBuses => {
                if is_english { "No buses".to_string() } else { "無班次".to_string() }
            }
            EtaDisplay::Arriving => {
                if is_english { "Arriving".to_string() } else { "即將到站".to_string() }
            }
            EtaDisplay::Minutes(m) => {
                if is_english { format!("{} min", m) } else { format!("{} 分鐘", m) }
            }
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum HknbError {
    ParseError(String),
}

impl std::fmt::Display for HknbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HknbError::ParseError(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for HknbError {}

pub type Result<T> = std::result::Result<T, HknbError>;

// ============================================================================
// Main Implementation
// ============================================================================

pub struct HknbModels;

impl HknbModels {
    /// Group ETA entries by stop id, in feed order.
    ///
    /// The index is rebuilt wholesale on every data update; entries without a
    /// stop id cannot be keyed and are dropped here.
    pub fn build_eta_index(etas: &[RouteEta]) -> HashMap<String, Vec<RouteEta>> {
        let mut index: HashMap<String, Vec<RouteEta>> = HashMap::new();
        let mut skipped = 0usize;

        for eta in etas {
            if eta.stop_id.is_empty() {
                skipped += 1;
                continue;
            }
            index
                .entry(eta.stop_id.clone())
                .or_insert_with(Vec::new)
                .push(eta.clone());
        }

        if skipped > 0 {
            log::debug!("Dropped {} ETA entries without a stop id", skipped);
        }

        index
    }

    /// Earliest meaningful arrival among `entries`.
    ///
    /// Entries with negative minutes are ignored; ties keep the first
    /// occurrence, so the result is deterministic for a given feed order.
    pub fn earliest_eta(entries: &[RouteEta]) -> Option<&RouteEta> {
        let mut earliest: Option<&RouteEta> = None;
        for eta in entries {
            if eta.minutes_remaining >= 0 {
                let better = match earliest {
                    Some(best) => eta.minutes_remaining < best.minutes_remaining,
                    None => true,
                };
                if better {
                    earliest = Some(eta);
                }
            }
        }
        earliest
    }

    /// Default display language for this process, from the POSIX locale
    /// variables. Anything tagged Chinese selects Traditional Chinese text;
    /// everything else (including an unset locale) selects English.
    pub fn detect_english_locale() -> bool {
        let locale = env::var("LC_ALL")
            .or_else(|_| env::var("LC_MESSAGES"))
            .or_else(|_| env::var("LANG"))
            .ok();
        Self::english_from_locale(locale.as_deref())
    }

    pub fn english_from_locale(locale: Option<&str>) -> bool {
        match locale {
            Some(tag) => !tag.to_lowercase().starts_with("zh"),
            None => true,
        }
    }
}

// ============================================================================
// Sample Network (demo data source)
// ============================================================================

const SAMPLE_NETWORK_JSON: &str = include_str!("../data/sample_network.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SampleNetwork {
    route: String,
    stops: Vec<BusStop>,
    frames: Vec<Vec<RouteEta>>,
}

/// Replays pre-computed ETA snapshots for one route.
///
/// Stands in for the network layer: each refresh serves the next canned
/// frame, wrapping around at the end. Nothing is computed or fetched.
#[derive(Debug, Clone)]
pub struct SampleFeed {
    network: SampleNetwork,
    cursor: usize,
}

impl SampleFeed {
    pub fn load() -> Result<Self> {
        let network: SampleNetwork = serde_json::from_str(SAMPLE_NETWORK_JSON)
            .map_err(|e| HknbError::ParseError(format!("Invalid sample network data: {}", e)))?;

        if network.frames.is_empty() {
            return Err(HknbError::ParseError(
                "Sample network has no ETA frames".to_string(),
            ));
        }

        Ok(SampleFeed { network, cursor: 0 })
    }

    pub fn route(&self) -> &str {
        &self.network.route
    }

    pub fn stops(&self) -> &[BusStop] {
        &self.network.stops
    }

    /// Serve the next ETA snapshot, wrapping after the last frame.
    pub fn next_frame(&mut self) -> Vec<RouteEta> {
        let frame = self.network.frames[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.network.frames.len();
        frame
    }

    pub fn frame_count(&self) -> usize {
        self.network.frames.len()
    }

    /// 1-based index of the most recently served frame.
    pub fn current_frame(&self) -> usize {
        let count = self.network.frames.len();
        (self.cursor + count - 1) % count + 1
    }
}
