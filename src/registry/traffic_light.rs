use crate::registry::entity::{Position, PositionRecord, StateRecord, TrafficLight};
use crate::registry::error::RegistryError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

const REGISTRY_NAME: &str = "traffic_light";

/// What `set_positions` does to the state of a light that already exists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositionPolicy {
    /// Replace the whole light; state goes back to the initial state
    #[default]
    ResetState,
    /// Move the light and keep its current state
    KeepState,
}

/// How `update_states` treats ids that were never registered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownIdPolicy {
    /// Drop the entry and log it
    #[default]
    Ignore,
    /// Refuse the whole batch without applying anything
    Reject,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrafficLightPolicy {
    pub initial_state: String,
    pub reposition: RepositionPolicy,
    pub unknown_ids: UnknownIdPolicy,
}

impl Default for TrafficLightPolicy {
    fn default() -> Self {
        Self {
            initial_state: "red".to_string(),
            reposition: RepositionPolicy::default(),
            unknown_ids: UnknownIdPolicy::default(),
        }
    }
}

/// Result of a state update batch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateUpdateOutcome {
    pub applied: usize,
    /// Ids dropped because no light with that id exists
    pub unknown: Vec<String>,
}

/// Traffic lights keyed by id
pub struct TrafficLightRegistry {
    policy: TrafficLightPolicy,
    lights: RwLock<BTreeMap<String, TrafficLight>>,
}

impl TrafficLightRegistry {
    pub fn new(policy: TrafficLightPolicy) -> Self {
        Self {
            policy,
            lights: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create or move lights.
    ///
    /// New lights start in the initial state. Existing lights are reset to the initial
    /// state under `RepositionPolicy::ResetState`, or keep their state under `KeepState`.
    pub fn set_positions<I>(&self, batch: I) -> Result<usize, RegistryError>
    where
        I: IntoIterator<Item = (String, Position)>,
    {
        let mut lights = self.write()?;
        let mut written = 0;
        for (id, position) in batch {
            written += 1;
            if self.policy.reposition == RepositionPolicy::KeepState {
                if let Some(light) = lights.get_mut(&id) {
                    light.position = position;
                    continue;
                }
            }
            lights.insert(
                id,
                TrafficLight {
                    position,
                    state: self.policy.initial_state.clone(),
                },
            );
        }
        drop(lights);

        debug!(count = written, "Set traffic light positions");
        Ok(written)
    }

    /// Overwrite the state of existing lights; position is never touched.
    pub fn update_states<I>(&self, batch: I) -> Result<StateUpdateOutcome, RegistryError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let batch: Vec<(String, String)> = batch.into_iter().collect();
        let mut lights = self.write()?;

        if self.policy.unknown_ids == UnknownIdPolicy::Reject {
            let unknown: Vec<String> = batch
                .iter()
                .filter(|(id, _)| !lights.contains_key(id))
                .map(|(id, _)| id.clone())
                .collect();
            if !unknown.is_empty() {
                return Err(RegistryError::UnknownEntity { ids: unknown });
            }
        }

        let mut outcome = StateUpdateOutcome::default();
        for (id, state) in batch {
            match lights.get_mut(&id) {
                Some(light) => {
                    light.state = state;
                    outcome.applied += 1;
                }
                None => outcome.unknown.push(id),
            }
        }
        drop(lights);

        for id in &outcome.unknown {
            warn!(entity_id = %id, "State update for unregistered traffic light ignored");
        }
        debug!(applied = outcome.applied, "Updated traffic light states");
        Ok(outcome)
    }

    /// Snapshot of the state facet, ordered by id
    pub fn list_states(&self) -> Result<Vec<StateRecord>, RegistryError> {
        let lights = self.read()?;
        Ok(lights
            .iter()
            .map(|(id, light)| StateRecord {
                id: id.clone(),
                state: light.state.clone(),
            })
            .collect())
    }

    /// Snapshot of the position facet, ordered by id
    pub fn list_positions(&self) -> Result<Vec<PositionRecord>, RegistryError> {
        let lights = self.read()?;
        Ok(lights
            .iter()
            .map(|(id, light)| PositionRecord {
                id: id.clone(),
                position: light.position.clone(),
            })
            .collect())
    }

    pub fn get(&self, id: &str) -> Result<Option<TrafficLight>, RegistryError> {
        Ok(self.read()?.get(id).cloned())
    }

    pub fn len(&self) -> Result<usize, RegistryError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, TrafficLight>>, RegistryError> {
        self.lights.read().map_err(|_| RegistryError::Poisoned {
            registry: REGISTRY_NAME,
        })
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, BTreeMap<String, TrafficLight>>, RegistryError> {
        self.lights.write().map_err(|_| RegistryError::Poisoned {
            registry: REGISTRY_NAME,
        })
    }
}

impl Default for TrafficLightRegistry {
    fn default() -> Self {
        Self::new(TrafficLightPolicy::default())
    }
}
