/// Alert classification engine and rule matching
pub mod engine;
pub mod rules;

pub use engine::AlertClassifier;
pub use rules::RuleSet;
