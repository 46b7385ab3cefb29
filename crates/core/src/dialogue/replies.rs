//! User-facing reply texts

use chrono_tz::Tz;
use rendezvous_domain::{Conversant, Event, RendezvousError};

pub const ASK_CONTACT: &str = "Who should I invite?";
pub const ASK_START: &str = "When should the meeting start?";
pub const ASK_DURATION: &str = "How long should it be?";

pub const CANCELLED: &str = "Okay, cancelled.";
pub const NOT_UNDERSTOOD: &str =
    "Sorry, I couldn't make sense of that just now. Could you say it again?";
pub const NOTHING_TO_CANCEL: &str = "There's nothing to cancel.";

pub const GREETING: &str = "Hi! I can show your calendar or set up a meeting for you.";
pub const BYE: &str = "Bye! Talk to you soon.";
pub const THANKS: &str = "You're welcome!";
pub const DEFAULT: &str = "Sorry, I didn't get that. Say \"help\" to see what I can do.";
pub const HELP: &str = "I can:\n\
    - show your calendar (\"what's on today?\")\n\
    - schedule a meeting (\"meet @bob tomorrow at 3 for 30 minutes\")\n\
    - set up your calendar (\"setup calendar\")\n\
    - tell you who you are (\"who am I?\")\n\
    Say \"cancel\" at any point to stop what we're doing.";

/// Text shown to `caller` for a failed handler.
pub fn describe_failure(err: &RendezvousError, caller: &Conversant) -> String {
    match err {
        RendezvousError::MissingCalendarConfig(party) if *party == caller.user => {
            "You haven't set up a calendar yet. Say \"setup calendar\" to connect one.".into()
        }
        RendezvousError::MissingCalendarConfig(party) => {
            format!("{party} hasn't set up a calendar yet, so I can't book a meeting with them.")
        }
        RendezvousError::PartialScheduleFailure { confirmed, failed } => format!(
            "I couldn't confirm the meeting on both calendars: {} did not accept it. \
             It may already appear on {}'s calendar, so please check before relying on it.",
            join_names(failed),
            join_names(confirmed),
        ),
        RendezvousError::TotalScheduleFailure { failed } => {
            format!("I couldn't schedule the meeting. It was not accepted by {}.", join_names(failed))
        }
        RendezvousError::Network(_) => {
            "I couldn't reach the calendar service. Please try again later.".into()
        }
        RendezvousError::Auth(_) => {
            "The calendar service rejected the stored credentials. \
             Say \"setup calendar\" to update them."
                .into()
        }
        RendezvousError::Nlu(_) => NOT_UNDERSTOOD.into(),
        RendezvousError::InvalidInput(message) => message.clone(),
        _ => "Something went wrong on my side. Please try again.".into(),
    }
}

pub fn booked(event: &Event, with: &Conversant, tz: Tz) -> String {
    format!(
        "Done! \"{}\" with {} is booked for {}.",
        event.title,
        with.user,
        event.start.with_timezone(&tz).format("%a %-d %b at %H:%M %Z"),
    )
}

pub fn agenda(events: &[Event], tz: Tz) -> String {
    if events.is_empty() {
        return "Your calendar is clear.".into();
    }

    let mut text = String::from("Here's what's on your calendar:");
    for event in events {
        let start = event.start.with_timezone(&tz);
        let end = event.end.with_timezone(&tz);
        text.push_str(&format!(
            "\n- {} {}-{} {}",
            start.format("%a %-d %b"),
            start.format("%H:%M"),
            end.format("%H:%M"),
            event.title
        ));
    }
    text
}

pub fn setup_link(url: &str, current: Option<&str>) -> String {
    match current {
        Some(kind) => format!("Your calendar is connected via {kind}. To change it, visit {url}"),
        None => format!("Connect your calendar here: {url}"),
    }
}

pub fn who(conversant: &Conversant, display_name: Option<&str>) -> String {
    match display_name {
        Some(name) => format!("You're {name} ({} on {}).", conversant.user, conversant.namespace),
        None => format!("You're {} on {}.", conversant.user, conversant.namespace),
    }
}

fn join_names(names: &[String]) -> String {
    match names {
        [] => "nobody".into(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}
