// In-memory entity registries, one per entity kind

mod entity;
mod error;
mod movable;
mod traffic_light;

pub use entity::{MovableKind, Position, PositionRecord, StateRecord, TrafficLight};
pub use error::RegistryError;
pub use movable::PositionRegistry;
pub use traffic_light::{
    RepositionPolicy, StateUpdateOutcome, TrafficLightPolicy, TrafficLightRegistry,
    UnknownIdPolicy,
};

use tracing::info;

/// All registries owned by one server instance.
///
/// Created once at startup and shared with request handlers; collections never interact.
pub struct Registries {
    pub cars: PositionRegistry,
    pub motorcycles: PositionRegistry,
    pub buses: PositionRegistry,
    pub electric_vehicles: PositionRegistry,
    pub traffic_lights: TrafficLightRegistry,
}

impl Registries {
    pub fn new(policy: TrafficLightPolicy) -> Self {
        Self {
            cars: PositionRegistry::new(MovableKind::Car),
            motorcycles: PositionRegistry::new(MovableKind::Motorcycle),
            buses: PositionRegistry::new(MovableKind::Bus),
            electric_vehicles: PositionRegistry::new(MovableKind::ElectricVehicle),
            traffic_lights: TrafficLightRegistry::new(policy),
        }
    }

    /// Registry holding positions for the given movable kind
    pub fn movable(&self, kind: MovableKind) -> &PositionRegistry {
        match kind {
            MovableKind::Car => &self.cars,
            MovableKind::Motorcycle => &self.motorcycles,
            MovableKind::Bus => &self.buses,
            MovableKind::ElectricVehicle => &self.electric_vehicles,
        }
    }

    /// Log current collection sizes
    pub fn log_summary(&self) -> Result<(), RegistryError> {
        info!(
            cars = self.cars.len()?,
            motorcycles = self.motorcycles.len()?,
            buses = self.buses.len()?,
            electric_vehicles = self.electric_vehicles.len()?,
            traffic_lights = self.traffic_lights.len()?,
            "Registry summary"
        );
        Ok(())
    }
}

impl Default for Registries {
    fn default() -> Self {
        Self::new(TrafficLightPolicy::default())
    }
}
