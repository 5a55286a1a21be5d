use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque coordinate payload as sent by the simulation (usually `[x, z]`)
pub type Position = Value;

/// Position-only entity kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovableKind {
    Car,
    Motorcycle,
    Bus,
    ElectricVehicle,
}

impl MovableKind {
    pub const ALL: [MovableKind; 4] = [
        MovableKind::Car,
        MovableKind::Motorcycle,
        MovableKind::Bus,
        MovableKind::ElectricVehicle,
    ];

    /// Short name used in route paths (e.g. `/update_moto_positions`)
    pub fn slug(self) -> &'static str {
        match self {
            MovableKind::Car => "car",
            MovableKind::Motorcycle => "moto",
            MovableKind::Bus => "bus",
            MovableKind::ElectricVehicle => "ev",
        }
    }
}

impl fmt::Display for MovableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Traffic light with independently updatable position and state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficLight {
    pub position: Position,

    /// Free-form label ("red", "yellow", "green", ...)
    pub state: String,
}

/// `{id, position}` entry returned by list operations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub id: String,
    pub position: Position,
}

/// `{id, state}` entry returned by traffic light state listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub id: String,
    pub state: String,
}
