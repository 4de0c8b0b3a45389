pub mod registry;

pub use registry::{CardDefinition, Category, IndicatorDefinition, Registry};
