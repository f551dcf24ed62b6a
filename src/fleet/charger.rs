use serde::{Deserialize, Serialize};

/// Rated power above which a charger runs on the high-voltage telemetry tier (kW).
pub const HIGH_POWER_THRESHOLD_KW: f32 = 100.0;

/// Operating status of a charger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargerStatus {
    Active,
    Available,
    Faulted,
    Offline,
    Scheduled,
}

impl ChargerStatus {
    /// Returns `true` unless the charger is faulted or offline.
    pub fn is_working(self) -> bool {
        !matches!(self, ChargerStatus::Faulted | ChargerStatus::Offline)
    }
}

/// A depot charger with its live session metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Charger {
    pub id: String,
    pub depot_id: String,
    #[serde(default)]
    pub zone: String,
    /// Rated power (kW).
    pub power_kw: f32,
    pub status: ChargerStatus,
    #[serde(default)]
    pub connected_vehicle: Option<String>,
    #[serde(default)]
    pub fault_code: Option<String>,

    #[serde(default)]
    pub voltage_v: f32,
    #[serde(default)]
    pub current_a: f32,
    /// Power actually delivered (kW).
    #[serde(default)]
    pub power_delivery_kw: f32,
    /// Energy delivered in the current session (kWh).
    #[serde(default)]
    pub session_energy_kwh: f32,
}

impl Charger {
    /// Creates an idle charger with zeroed telemetry.
    pub fn new(
        id: impl Into<String>,
        depot_id: impl Into<String>,
        power_kw: f32,
        status: ChargerStatus,
    ) -> Self {
        Self {
            id: id.into(),
            depot_id: depot_id.into(),
            zone: String::new(),
            power_kw,
            status,
            connected_vehicle: None,
            fault_code: None,
            voltage_v: 0.0,
            current_a: 0.0,
            power_delivery_kw: 0.0,
            session_energy_kwh: 0.0,
        }
    }

    /// Sets the connected vehicle forward reference.
    pub fn with_vehicle(mut self, vehicle_id: impl Into<String>) -> Self {
        self.connected_vehicle = Some(vehicle_id.into());
        self
    }

    /// Returns `true` for chargers rated above [`HIGH_POWER_THRESHOLD_KW`].
    pub fn is_high_power(&self) -> bool {
        self.power_kw > HIGH_POWER_THRESHOLD_KW
    }

    /// Zeroes the electrical readings; session energy is kept.
    pub fn clear_readings(&mut self) {
        self.voltage_v = 0.0;
        self.current_a = 0.0;
        self.power_delivery_kw = 0.0;
    }
}
