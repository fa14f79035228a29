// Packaging selection: capacity ladders first, then the all-cable override
pub mod cable;
pub mod capacity;
pub mod engine;

pub use cable::{CableCodeSet, CableOverrideResolver};
pub use capacity::{CapacityPackagingResolver, CapacityTables, DeliveryMode, PackagingDecision, Tier};
pub use engine::{LabelOutcome, LabelResolver, PackagingEngine};
