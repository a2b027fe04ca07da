//! Flatten configuration
//!
//! Controls what a flattened chain keeps besides its value bindings and how
//! the binding array is pre-sized.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the flattened scope is attached to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlattenMode {
    /// Collect every binding on the chain into one scope over a fresh root.
    ///
    /// Cancel and deadline scopes passed over are not part of the result;
    /// callers that need them must keep the original chain or re-wrap.
    #[default]
    Detached,
    /// Collect only the leaf-side run of value scopes and re-attach the first
    /// non-value ancestor as parent, keeping cancellation and deadlines
    /// reachable through the flattened chain.
    ValuePrefix,
}

impl fmt::Display for FlattenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlattenMode::Detached => write!(f, "detached"),
            FlattenMode::ValuePrefix => write!(f, "value-prefix"),
        }
    }
}

/// Flatten configuration
///
/// # Examples
///
/// ```rust
/// use ctxchain::flatten::{FlattenConfig, FlattenMode};
///
/// let config = FlattenConfig::default()
///     .with_mode(FlattenMode::ValuePrefix)
///     .with_initial_capacity(16);
/// assert!(config.validate().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenConfig {
    /// Attachment strategy. Default: [`FlattenMode::Detached`]
    pub mode: FlattenMode,

    /// Binding slots reserved before the walk. Default: 4, the inline
    /// capacity of a flattened scope
    pub initial_capacity: usize,
}

impl FlattenConfig {
    /// Create new configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: FlattenMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Configuration that keeps cancel and deadline scopes reachable
    pub fn preserve_capabilities() -> Self {
        Self {
            mode: FlattenMode::ValuePrefix,
            ..Self::default()
        }
    }

    /// Check values and return warnings for questionable settings
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.initial_capacity > 4096 {
            warnings.push(
                "initial_capacity is very high (>4096) - most of it will stay unused".to_string(),
            );
        }

        if self.initial_capacity == 0 {
            warnings.push(
                "initial_capacity is 0 - the first binding will force an allocation".to_string(),
            );
        }

        warnings
    }
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            mode: FlattenMode::Detached,
            initial_capacity: crate::scope::INLINE_BINDINGS,
        }
    }
}
