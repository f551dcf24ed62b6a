//! Domain model shared by the simulation and orchestration layers.

/// Bus chargers and their live telemetry.
pub mod charger;
/// Depots and time-windowed grid constraints.
pub mod depot;
/// Scheduled duties (blocks) and their status machine.
pub mod duty;
pub mod route;
/// Energy tariff periods and rate lookup.
pub mod tariff;
pub mod time;
/// Battery-electric buses.
pub mod vehicle;

pub use charger::{Charger, ChargerStatus};
pub use depot::{Depot, GridConstraint};
pub use duty::{DutyStatus, ScheduledDuty};
pub use route::Route;
pub use tariff::{Tariff, TariffKind, TariffPeriod, TariffRate};
pub use vehicle::{Vehicle, VehicleStatus};

/// Rounds a percentage or energy value to one decimal place.
pub(crate) fn round_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
