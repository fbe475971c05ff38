//! Trading signals service module.
//!
//! Provides the technical indicator engine and the rule-based scorer that
//! turns an indicator snapshot into a scored signal.

pub mod engine;
pub mod indicators;
pub mod rules;
pub mod scorer;

pub use engine::{IndicatorEngine, IndicatorParams};
pub use rules::{Rule, RuleInput, RuleSet};
pub use scorer::{ContextPolicy, ScorerConfig, SignalScorer, TierThresholds};
