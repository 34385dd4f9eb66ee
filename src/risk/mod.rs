pub mod classifier;
pub mod rules;

pub use classifier::*;
pub use rules::{RiskRule, default_rules};
