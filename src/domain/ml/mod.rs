pub mod artifact;
pub mod feature_registry;
