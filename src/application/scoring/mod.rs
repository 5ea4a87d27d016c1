pub mod rule_scorer;

pub use rule_scorer::RuleBasedScorer;
