use crate::registry::entity::{MovableKind, Position, PositionRecord};
use crate::registry::error::RegistryError;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Latest known position per id for one movable kind
pub struct PositionRegistry {
    kind: MovableKind,

    /// Whole batches are applied under one write lock, so readers never see half a batch
    positions: RwLock<BTreeMap<String, Position>>,
}

impl PositionRegistry {
    pub fn new(kind: MovableKind) -> Self {
        Self {
            kind,
            positions: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn kind(&self) -> MovableKind {
        self.kind
    }

    /// Merge `batch` into the collection (insert or overwrite per id).
    ///
    /// Ids not present in the batch are left untouched. Returns the number of entries written.
    pub fn upsert<I>(&self, batch: I) -> Result<usize, RegistryError>
    where
        I: IntoIterator<Item = (String, Position)>,
    {
        let mut positions = self.write()?;
        let mut written = 0;
        for (id, position) in batch {
            positions.insert(id, position);
            written += 1;
        }
        drop(positions);

        debug!(kind = %self.kind, count = written, "Upserted positions");
        Ok(written)
    }

    /// Snapshot of every entity, ordered by id
    pub fn list_all(&self) -> Result<Vec<PositionRecord>, RegistryError> {
        let positions = self.read()?;
        Ok(positions
            .iter()
            .map(|(id, position)| PositionRecord {
                id: id.clone(),
                position: position.clone(),
            })
            .collect())
    }

    /// Current position for a single id
    pub fn get(&self, id: &str) -> Result<Option<Position>, RegistryError> {
        Ok(self.read()?.get(id).cloned())
    }

    pub fn len(&self) -> Result<usize, RegistryError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Position>>, RegistryError> {
        self.positions.read().map_err(|_| RegistryError::Poisoned {
            registry: self.kind.slug(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Position>>, RegistryError> {
        self.positions.write().map_err(|_| RegistryError::Poisoned {
            registry: self.kind.slug(),
        })
    }
}
