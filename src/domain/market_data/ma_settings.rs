use derive_more::Display;
use serde::{Deserialize, Serialize};

pub const MA_SETTINGS_KEY: &str = "dashboard_ma_settings_v1";
pub const DEFAULT_PRICE_MA: [u32; 2] = [5, 20];
pub const DEFAULT_VOLUME_MA: [u32; 2] = [5, 20];
pub const MIN_MA_PERIOD: u32 = 2;
pub const MAX_MA_PERIOD: u32 = 240;
pub const MAX_MA_COUNT: usize = 8;

/// Validation failures for period-set mutations. These are user-facing
/// inline messages, never exceptions: a rejected mutation leaves the set,
/// the persisted settings and the rendered charts untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PeriodError {
    #[display(fmt = "Enter an integer period.")]
    NotAnInteger,
    #[display(fmt = "Period must be between {} and {}.", MIN_MA_PERIOD, MAX_MA_PERIOD)]
    OutOfRange,
    #[display(fmt = "That period is already added.")]
    Duplicate,
    #[display(fmt = "At most {} periods can be added.", MAX_MA_COUNT)]
    AtCapacity,
}

/// A set of distinct MA periods kept ascending, bounded and capped.
///
/// The invariants (uniqueness, bounds, cap, order) are enforced on every
/// mutation, not just when settings are loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSet(Vec<u32>);

impl PeriodSet {
    /// Normalize arbitrary persisted values: keep integers inside the
    /// bounds, drop duplicates, sort ascending, truncate to the cap.
    pub fn normalize(values: &[i64]) -> Self {
        let mut unique: Vec<u32> = Vec::new();
        for &value in values {
            let Ok(period) = u32::try_from(value) else { continue };
            if period < MIN_MA_PERIOD || period > MAX_MA_PERIOD {
                continue;
            }
            if !unique.contains(&period) {
                unique.push(period);
            }
        }
        unique.sort_unstable();
        unique.truncate(MAX_MA_COUNT);
        Self(unique)
    }

    pub fn defaults(values: &[u32]) -> Self {
        Self(values.to_vec())
    }

    pub fn periods(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert a new period keeping ascending order. Rejects non-integers
    /// (callers pass the raw parse result), out-of-range values, duplicates
    /// and additions past the cap.
    pub fn add(&mut self, period: Option<i64>) -> Result<u32, PeriodError> {
        let period = period.ok_or(PeriodError::NotAnInteger)?;
        if period < MIN_MA_PERIOD as i64 || period > MAX_MA_PERIOD as i64 {
            return Err(PeriodError::OutOfRange);
        }
        let period = period as u32;
        if self.0.contains(&period) {
            return Err(PeriodError::Duplicate);
        }
        if self.0.len() >= MAX_MA_COUNT {
            return Err(PeriodError::AtCapacity);
        }
        let pos = self.0.partition_point(|&p| p < period);
        self.0.insert(pos, period);
        Ok(period)
    }

    /// Remove a period; absent periods are a no-op signalled by `false`.
    pub fn remove(&mut self, period: u32) -> bool {
        let before = self.0.len();
        self.0.retain(|&p| p != period);
        self.0.len() != before
    }
}

/// The persisted settings blob: `{"price":[..],"volume":[..]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaSettingsBlob {
    #[serde(default)]
    pub price: Vec<i64>,
    #[serde(default)]
    pub volume: Vec<i64>,
}

/// Decode persisted settings, falling back to the defaults on absence,
/// corruption, or a normalize result that ends up empty.
pub fn decode_ma_settings(raw: Option<&str>) -> (PeriodSet, PeriodSet) {
    let defaults =
        || (PeriodSet::defaults(&DEFAULT_PRICE_MA), PeriodSet::defaults(&DEFAULT_VOLUME_MA));
    let Some(raw) = raw else {
        return defaults();
    };
    let Ok(blob) = serde_json::from_str::<MaSettingsBlob>(raw) else {
        return defaults();
    };
    let mut price = PeriodSet::normalize(&blob.price);
    let mut volume = PeriodSet::normalize(&blob.volume);
    if price.is_empty() {
        price = PeriodSet::defaults(&DEFAULT_PRICE_MA);
    }
    if volume.is_empty() {
        volume = PeriodSet::defaults(&DEFAULT_VOLUME_MA);
    }
    (price, volume)
}

/// Encode the current sets for persistence.
pub fn encode_ma_settings(price: &PeriodSet, volume: &PeriodSet) -> String {
    let blob = MaSettingsBlob {
        price: price.periods().iter().map(|&p| p as i64).collect(),
        volume: volume.periods().iter().map(|&p| p as i64).collect(),
    };
    serde_json::to_string(&blob).unwrap_or_else(|_| "{}".to_string())
}
