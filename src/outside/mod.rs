//! Outside interaction handling
//!
//! [`OutsideInteractionDetector`] decides whether a gesture ended outside a
//! set of owned containers. [`TopLayerRegistry`] keeps nested detectors from
//! reacting to the same gesture: only the newest layer of a purpose listens.

mod detector;
mod top_layer;

pub use detector::{
    InteractionKind, OutsideInteraction, OutsideInteractionDetector, Verdict, OUTSIDE_CLICK,
};
pub use top_layer::{LayerChange, LayerGuard, LayerId, TopLayerRegistry};
