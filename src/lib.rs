// Core module of the Orbit headless accessibility engine
pub mod collection;
pub mod config;
pub mod context;
pub mod dom;
pub mod events;
pub mod focus;
pub mod outside;
pub mod scheduler;

pub mod kit;

/// Version of the engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export of common types for convenience
pub mod prelude {
    pub use crate::collection::{
        Action, ActivationTrigger, Collection, CollectionError, CollectionEvent, CollectionOption,
        Comparator, Navigation, OptionId, SelectionMode,
    };
    pub use crate::config::{EngineConfig, Services};
    pub use crate::context::{callback, Callback, ContextProvider};
    pub use crate::dom::{Dom, MemoryDom, NodeId};
    pub use crate::events::{FocusEvent, Key, KeyboardEvent, PointerEvent, TouchEvent};
    pub use crate::focus::{
        focus_in, ActiveElementHistory, FocusFlags, FocusResult, FocusScope, FocusTrapController,
        FocusTrapProps, TrapFeatures,
    };
    pub use crate::kit::prelude::*;
    pub use crate::outside::{OutsideInteraction, OutsideInteractionDetector, Verdict};
}

/// Build the engine's services from a JSON configuration, or the defaults
/// when `config` is `None`
pub fn init(config: Option<&str>) -> Result<config::Services, Error> {
    let config = match config {
        Some(json) => config::EngineConfig::from_json(json)?,
        None => config::EngineConfig::default(),
    };
    Ok(config::Services::new(config))
}

/// Errors that can occur in the engine
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Collection error: {0}")]
    Collection(#[from] collection::CollectionError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
