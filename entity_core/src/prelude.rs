//! Prelude module for convenient imports
//!
//! ```rust
//! use entity_core::prelude::*;
//! ```

// Core types
pub use crate::entity::Entity;
pub use crate::types::{Options, Slot, UseOptions};

// Registries
pub use crate::ability::{AbilityOptions, AbilityRegistry};
pub use crate::addon::{AddonRegistry, Guard, Registry};

// Addon state
pub use crate::addon::inventory::{Inventory, Item};
pub use crate::addon::stat::{Stat, StatDefaults};

// Events
pub use crate::events::{EventBus, Publisher};

// Errors
pub use crate::{AbilityError, AddonError, UseFailure};
