use serde::{Deserialize, Serialize};

/// Rate charged when no tariff period covers the hour (per kWh).
pub const DEFAULT_RATE: f32 = 0.15;

/// Tariff band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TariffKind {
    Peak,
    Standard,
    OffPeak,
    SuperOffPeak,
}

/// A tariff band over `[start_hour, end_hour)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TariffPeriod {
    pub start_hour: u32,
    pub end_hour: u32,
    /// Energy price (currency per kWh).
    pub rate: f32,
    pub kind: TariffKind,
}

/// Result of a tariff lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TariffRate {
    pub rate: f32,
    pub kind: TariffKind,
}

/// Time-of-use energy tariff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tariff {
    pub name: String,
    pub currency: String,
    pub periods: Vec<TariffPeriod>,
}

impl Default for Tariff {
    fn default() -> Self {
        let period = |start_hour, end_hour, rate, kind| TariffPeriod {
            start_hour,
            end_hour,
            rate,
            kind,
        };
        Self {
            name: "Commercial EV Tariff".to_string(),
            currency: "GBP".to_string(),
            periods: vec![
                period(0, 5, 0.08, TariffKind::SuperOffPeak),
                period(5, 7, 0.12, TariffKind::OffPeak),
                period(7, 9, 0.28, TariffKind::Peak),
                period(9, 16, 0.15, TariffKind::Standard),
                period(16, 19, 0.32, TariffKind::Peak),
                period(19, 22, 0.15, TariffKind::Standard),
                period(22, 24, 0.10, TariffKind::OffPeak),
            ],
        }
    }
}

impl Tariff {
    /// Rate in force during `hour`, falling back to [`DEFAULT_RATE`].
    pub fn rate_for_hour(&self, hour: u32) -> TariffRate {
        self.periods
            .iter()
            .find(|p| hour >= p.start_hour && hour < p.end_hour)
            .map_or(
                TariffRate {
                    rate: DEFAULT_RATE,
                    kind: TariffKind::Standard,
                },
                |p| TariffRate {
                    rate: p.rate,
                    kind: p.kind,
                },
            )
    }

    /// Highest rate across all periods, or [`DEFAULT_RATE`] for an empty tariff.
    pub fn peak_rate(&self) -> f32 {
        self.periods
            .iter()
            .map(|p| p.rate)
            .reduce(f32::max)
            .unwrap_or(DEFAULT_RATE)
    }
}
