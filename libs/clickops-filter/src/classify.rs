use crate::event::{LogEvent, LogRecord};
use crate::rules::RuleSet;

/// Marker CloudTrail puts in `userIdentity.invokedBy` when AWS itself made the call.
const INTERNAL_INVOKER: &str = "AWS Internal";


/// Outcome of every individual check for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub is_match: bool,
    pub is_readonly_event: bool,
    pub is_readonly_action: bool,
    pub is_ignored_event: bool,
    pub is_ignored_scoped_event: bool,
    pub is_in_event: bool,
}

impl Classification {
    pub fn should_notify(&self) -> bool {
        self.is_match
            && !self.is_readonly_event
            && !self.is_readonly_action
            && !self.is_ignored_event
            && !self.is_in_event
            && !self.is_ignored_scoped_event
    }
}

/// Decides which CloudTrail events look like hands-on console changes.
#[derive(Debug, Clone)]
pub struct EventClassifier {
    rules: RuleSet,
}

impl EventClassifier {
    pub fn new(rules: RuleSet) -> Self {
        EventClassifier { rules }
    }

    pub fn classify(&self, event: &LogEvent) -> Classification {
        Classification {
            is_match: self.rules.is_console_user_agent(&event.user_agent),
            is_readonly_event: event.read_only.unwrap_or(false),
            is_readonly_action: self.rules.is_readonly_action(&event.event_name),
            is_ignored_event: self.rules.is_ignored_event(&event.event_name),
            is_ignored_scoped_event: self.rules.is_ignored_scoped_event(&event.event_source, &event.event_name),
            is_in_event: event.user_identity.invoked_by.as_deref() == Some(INTERNAL_INVOKER),
        }
    }

    /// Classifies the record and logs the raw event together with the breakdown.
    pub fn should_notify(&self, record: &LogRecord) -> bool {
        let classification = self.classify(&record.event);

        tracing::info!(
            event = %record.raw,
            is_match = classification.is_match,
            is_readonly_event = classification.is_readonly_event,
            is_readonly_action = classification.is_readonly_action,
            is_ignored_event = classification.is_ignored_event,
            is_ignored_scoped_event = classification.is_ignored_scoped_event,
            is_in_event = classification.is_in_event,
            "classified event {}:{}",
            record.event.event_source,
            record.event.event_name
        );

        classification.should_notify()
    }
}
