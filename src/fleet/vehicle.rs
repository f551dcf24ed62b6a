use serde::{Deserialize, Serialize};

/// Battery capacity assumed for every bus when converting charger power to SoC (kWh).
pub const REFERENCE_BATTERY_KWH: f32 = 300.0;

/// Maintenance marker meaning the vehicle is overdue for service.
pub const SERVICE_URGENT: &str = "Urgent";

/// Operating status of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleStatus {
    Charging,
    Idle,
    Driving,
    Faulted,
    Maintenance,
}

impl VehicleStatus {
    /// Every status, in dashboard order.
    pub const ALL: [VehicleStatus; 5] = [
        VehicleStatus::Charging,
        VehicleStatus::Idle,
        VehicleStatus::Driving,
        VehicleStatus::Faulted,
        VehicleStatus::Maintenance,
    ];

    /// Returns `true` when a vehicle in this status can be pulled into another duty.
    pub fn can_cover_duty(self) -> bool {
        matches!(self, VehicleStatus::Charging | VehicleStatus::Idle)
    }
}

/// A battery-electric bus.
///
/// `charger_id` and `assigned_duty` are back-references; the forward side
/// lives on [`Charger::connected_vehicle`](super::Charger) and
/// [`ScheduledDuty::vehicle_id`](super::ScheduledDuty). Both sides are kept in
/// step by [`crate::sim::links`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vehicle {
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub depot_id: String,

    /// Current state of charge (%).
    pub soc: f32,
    /// SoC required for the next duty (%).
    pub required_soc: f32,
    /// SoC the charger aims for (%).
    #[serde(default = "default_target_soc")]
    pub target_soc: f32,

    pub status: VehicleStatus,
    #[serde(default)]
    pub charger_id: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub assigned_duty: Option<String>,

    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    /// Route name or id while in service.
    #[serde(default)]
    pub route: Option<String>,
    /// Lap progress along the route, in `[0, 1)`.
    #[serde(default)]
    pub progress: f32,

    /// State of health (%).
    #[serde(default = "default_soh")]
    pub soh: f32,
    #[serde(default)]
    pub odometer_km: f32,
    /// Energy use (kWh/km).
    #[serde(default = "default_efficiency")]
    pub efficiency: f32,
    #[serde(default)]
    pub cycles: u32,
    /// Battery temperature (°C).
    #[serde(default = "default_battery_temp")]
    pub battery_temp: f32,
    /// Either a due period such as `"14d"` or `"Urgent"`.
    #[serde(default)]
    pub next_service: String,

    #[serde(default)]
    pub predicted_soc_at_departure: f32,
    /// Minutes of charging left to reach `target_soc`.
    #[serde(default)]
    pub charging_time_remaining: f32,
}

fn default_target_soc() -> f32 {
    100.0
}

fn default_soh() -> f32 {
    100.0
}

fn default_efficiency() -> f32 {
    1.2
}

fn default_battery_temp() -> f32 {
    20.0
}

impl Vehicle {
    /// Creates a depot vehicle with healthy telemetry and no links.
    pub fn new(
        id: impl Into<String>,
        depot_id: impl Into<String>,
        soc: f32,
        required_soc: f32,
        status: VehicleStatus,
    ) -> Self {
        Self {
            id: id.into(),
            model: String::new(),
            depot_id: depot_id.into(),
            soc,
            required_soc,
            target_soc: default_target_soc(),
            status,
            charger_id: None,
            location: String::new(),
            assigned_duty: None,
            lat: 0.0,
            lng: 0.0,
            route: None,
            progress: 0.0,
            soh: default_soh(),
            odometer_km: 0.0,
            efficiency: default_efficiency(),
            cycles: 0,
            battery_temp: default_battery_temp(),
            next_service: String::new(),
            predicted_soc_at_departure: soc,
            charging_time_remaining: 0.0,
        }
    }

    /// Sets the charger back-reference.
    pub fn with_charger(mut self, charger_id: impl Into<String>) -> Self {
        self.charger_id = Some(charger_id.into());
        self
    }

    /// Sets the duty back-reference.
    pub fn with_duty(mut self, duty_id: impl Into<String>) -> Self {
        self.assigned_duty = Some(duty_id.into());
        self
    }

    /// Puts the vehicle in service on a route at the given lap progress.
    pub fn with_route(mut self, route: impl Into<String>, progress: f32) -> Self {
        self.route = Some(route.into());
        self.progress = progress;
        self
    }

    /// Sets battery health and energy efficiency.
    pub fn with_health(mut self, soh: f32, efficiency: f32) -> Self {
        self.soh = soh;
        self.efficiency = efficiency;
        self
    }

    /// Returns `true` when maintenance is overdue.
    pub fn service_overdue(&self) -> bool {
        self.next_service == SERVICE_URGENT
    }
}

/// SoC gained per minute (percentage points) on a charger of `charger_power_kw`.
///
/// # Examples
///
/// ```
/// use depot_orchestrator::fleet::vehicle::charge_rate_per_minute;
///
/// let rate = charge_rate_per_minute(150.0);
/// assert!((rate * 60.0 - 50.0).abs() < 1e-4);
/// ```
pub fn charge_rate_per_minute(charger_power_kw: f32) -> f32 {
    charger_power_kw / REFERENCE_BATTERY_KWH * 100.0 / 60.0
}
