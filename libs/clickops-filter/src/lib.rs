mod account;
mod classify;
mod event;
mod rules;

pub use account::AccountKeyFilter;
pub use classify::{Classification, EventClassifier};
pub use event::{extract_principal, LogBatch, LogEvent, LogRecord, UserIdentity};
pub use rules::{MatchKind, Rule, RuleError, RuleSet, RuleTables};
