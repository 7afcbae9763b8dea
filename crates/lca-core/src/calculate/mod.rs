pub mod circularity;
pub mod engine;
pub mod outcome;
pub mod step;

pub use engine::LcaEngine;
pub use outcome::{CalculationResult, MissKind, ReferenceMiss, StepImpacts};
pub use step::StepCalculator;
