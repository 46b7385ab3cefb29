//! Top-level routing of a classified message

use rendezvous_domain::{Classification, Intent};

/// Handler selected for the first message of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Greeting,
    Bye,
    Thanks,
    ShowCalendar,
    ScheduleMeeting,
    SetupCalendar,
    Who,
    Help,
    Default,
}

impl Route {
    /// A recognised intent wins over the small-talk flags. A top-level
    /// `cancel` has nothing to act on and falls through to `Default`.
    pub fn from_classification(classification: &Classification) -> Self {
        match classification.known_intent() {
            Some(Intent::ShowCalendar) => Self::ShowCalendar,
            Some(Intent::ScheduleMeeting) => Self::ScheduleMeeting,
            Some(Intent::SetupCalendar) => Self::SetupCalendar,
            Some(Intent::Who) => Self::Who,
            Some(Intent::Help) => Self::Help,
            Some(Intent::Cancel) => Self::Default,
            None if classification.greeting => Self::Greeting,
            None if classification.bye => Self::Bye,
            None if classification.thanks => Self::Thanks,
            None => Self::Default,
        }
    }
}
