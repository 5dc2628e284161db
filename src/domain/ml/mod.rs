pub mod feature_derivation;
pub mod feature_registry;

pub use feature_derivation::{
    BarSeries, BodyAverageDivisor, DegenerateWindowPolicy, DerivationConfig, FeatureDeriver,
};
