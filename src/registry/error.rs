use std::fmt;

/// Errors raised by registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A writer panicked while holding the registry lock
    Poisoned { registry: &'static str },

    /// State update referenced ids that were never registered (reject policy only)
    UnknownEntity { ids: Vec<String> },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Poisoned { registry } => {
                write!(f, "{} registry lock poisoned", registry)
            }
            RegistryError::UnknownEntity { ids } => {
                write!(f, "unknown entity ids: {}", ids.join(", "))
            }
        }
    }
}

impl std::error::Error for RegistryError {}
