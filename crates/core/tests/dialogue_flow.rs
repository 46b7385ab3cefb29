//! Conversations driven end to end through the assistant.

mod support;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use rendezvous_core::{
    query_loop, route_inbound, Assistant, ChatSpool, FireOutcome, ReplySink, SlotOutcome,
};
use rendezvous_core::dialogue::slots;
use rendezvous_domain::{
    BotConfig, Classification, Conversant, Entity, RendezvousError, UserSettings,
};
use serde_json::json;
use support::calendar::{InMemorySettings, MockBackend, MockBackendFactory};
use support::conversation::{RecordingSink, ScriptedConversation, ScriptedNlu};
use support::at;

fn alice() -> Conversant {
    Conversant::new("slack", "alice")
}

fn bob() -> Conversant {
    Conversant::new("slack", "bob")
}

fn full_request() -> Classification {
    Classification::with_intent("schedule_meeting")
        .and_entity("contact", Entity::new("<@bob>"))
        .and_entity("datetime", Entity::normalized("at 3pm", json!(at(15, 0).to_rfc3339())))
        .and_entity("duration", Entity::normalized("30 minutes", json!(1800)))
}

struct Fixture {
    factory: Arc<MockBackendFactory>,
    alice_backend: MockBackend,
    bob_backend: MockBackend,
}

impl Fixture {
    fn new(alice_backend: MockBackend, bob_backend: MockBackend) -> Self {
        Self { factory: Arc::new(MockBackendFactory::default()), alice_backend, bob_backend }
    }

    fn settings(&self) -> InMemorySettings {
        let a = self.factory.register("alice", self.alice_backend.clone());
        let b = self.factory.register("bob", self.bob_backend.clone());
        InMemorySettings::default()
            .with(&alice(), UserSettings::with_calendar(a))
            .with(&bob(), UserSettings::with_calendar(b))
    }

    fn assistant(&self, nlu: ScriptedNlu, settings: InMemorySettings) -> Assistant {
        Assistant::new(Arc::new(nlu), Arc::new(settings), self.factory.clone(), BotConfig::default())
    }
}

#[tokio::test]
async fn query_loop_takes_first_filled_reply_without_reprompting() {
    let nlu = ScriptedNlu::default()
        .on("bob", Classification::default().and_entity("contact", Entity::new("bob")));
    let conversation = ScriptedConversation::new(alice()).replying(&["bob", "carol"]);

    let outcome = query_loop(&conversation, &nlu, None, "Who?", &slots::CONTACT).await.unwrap();

    assert_eq!(outcome, SlotOutcome::Filled("bob".to_string()));
    assert_eq!(conversation.sent(), vec!["Who?".to_string()]);
}

#[tokio::test]
async fn query_loop_returns_cancelled_on_cancel_intent() {
    let nlu = ScriptedNlu::default().on(
        "cancel that",
        Classification::with_intent("cancel").and_entity("contact", Entity::new("bob")),
    );
    let conversation = ScriptedConversation::new(alice()).replying(&["cancel that"]);

    let outcome = query_loop(&conversation, &nlu, None, "Who?", &slots::CONTACT).await.unwrap();

    assert_eq!(outcome, SlotOutcome::Cancelled);
    assert_eq!(conversation.sent(), vec!["Who?".to_string(), "Okay, cancelled.".to_string()]);
}

#[tokio::test]
async fn query_loop_reprompts_after_unusable_and_failed_replies() {
    let nlu = ScriptedNlu::default()
        .failing_on("garbled")
        .on("bob", Classification::default().and_entity("contact", Entity::new("bob")));
    let conversation = ScriptedConversation::new(alice()).replying(&["umm", "garbled", "bob"]);

    let outcome = query_loop(&conversation, &nlu, None, "Who?", &slots::CONTACT).await.unwrap();

    assert_eq!(outcome, SlotOutcome::Filled("bob".to_string()));
    let prompts = conversation.sent().iter().filter(|m| m.as_str() == "Who?").count();
    assert_eq!(prompts, 3);
}

#[tokio::test]
async fn query_loop_with_initial_value_sends_nothing() {
    let nlu = ScriptedNlu::default();
    let conversation = ScriptedConversation::new(alice());

    let outcome =
        query_loop(&conversation, &nlu, Some("bob".to_string()), "Who?", &slots::CONTACT)
            .await
            .unwrap();

    assert_eq!(outcome, SlotOutcome::Filled("bob".to_string()));
    assert!(conversation.sent().is_empty());
    assert!(nlu.calls().is_empty());
}

#[tokio::test]
async fn fully_specified_meeting_books_both_calendars_without_prompts() {
    let fixture = Fixture::new(MockBackend::accepting(), MockBackend::accepting());
    let nlu = ScriptedNlu::default().on("meet bob at 3 for 30m", full_request());
    let assistant = fixture.assistant(nlu, fixture.settings());
    let conversation = ScriptedConversation::new(alice());

    assistant.handle("meet bob at 3 for 30m", &conversation).await.unwrap();

    let sent = conversation.sent();
    assert_eq!(sent.len(), 1, "unexpected prompts: {sent:?}");
    assert!(sent[0].starts_with("Done!"), "{}", sent[0]);

    let written = fixture.alice_backend.writes();
    assert_eq!(written, fixture.bob_backend.writes());
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].start, at(15, 0));
    assert_eq!(written[0].duration(), Duration::minutes(30));
    assert_eq!(written[0].title, "Meeting with alice and bob");
}

#[tokio::test]
async fn missing_slots_are_asked_for_in_order() {
    let fixture = Fixture::new(MockBackend::accepting(), MockBackend::accepting());
    let nlu = ScriptedNlu::default()
        .on(
            "set up a meeting about budget",
            Classification::with_intent("schedule_meeting")
                .and_entity("subject", Entity::new("Budget")),
        )
        .on("bob", Classification::default().and_entity("contact", Entity::new("bob")))
        .on(
            "3pm",
            Classification::default()
                .and_entity("datetime", Entity::normalized("3pm", json!(at(15, 0).to_rfc3339()))),
        )
        .on("an hour", Classification::default().and_entity("duration", Entity::new("1h")));
    let assistant = fixture.assistant(nlu, fixture.settings());
    let conversation =
        ScriptedConversation::new(alice()).replying(&["bob", "3pm", "an hour"]);

    assistant.handle("set up a meeting about budget", &conversation).await.unwrap();

    let sent = conversation.sent();
    assert_eq!(sent[..3], [
        "Who should I invite?".to_string(),
        "When should the meeting start?".to_string(),
        "How long should it be?".to_string(),
    ]);
    assert!(sent[3].starts_with("Done! \"Budget\""), "{}", sent[3]);
    assert_eq!(fixture.bob_backend.writes()[0].duration(), Duration::hours(1));
}

#[tokio::test]
async fn cancelling_mid_dialogue_books_nothing() {
    let fixture = Fixture::new(MockBackend::accepting(), MockBackend::accepting());
    let nlu = ScriptedNlu::default()
        .on("book something", Classification::with_intent("schedule_meeting"))
        .on("never mind", Classification::with_intent("cancel"));
    let assistant = fixture.assistant(nlu, fixture.settings());
    let conversation = ScriptedConversation::new(alice()).replying(&["never mind"]);

    assistant.handle("book something", &conversation).await.unwrap();

    assert_eq!(conversation.sent(), vec![
        "Who should I invite?".to_string(),
        "Okay, cancelled.".to_string(),
    ]);
    assert!(fixture.alice_backend.writes().is_empty());
}

#[tokio::test]
async fn counterpart_refusal_reports_partial_failure() {
    let fixture = Fixture::new(MockBackend::accepting(), MockBackend::declining());
    let nlu = ScriptedNlu::default().on("meet bob", full_request());
    let assistant = fixture.assistant(nlu, fixture.settings());
    let conversation = ScriptedConversation::new(alice());

    assistant.handle("meet bob", &conversation).await.unwrap();

    let reply = conversation.last_sent();
    assert!(reply.contains("couldn't confirm the meeting on both calendars"), "{reply}");
    assert!(reply.contains("bob did not accept"), "{reply}");
    assert!(reply.contains("alice's calendar"), "{reply}");
}

#[tokio::test]
async fn unreachable_backends_report_total_failure() {
    let down = || MockBackend::failing(RendezvousError::Network("connection refused".into()));
    let fixture = Fixture::new(down(), down());
    let nlu = ScriptedNlu::default().on("meet bob", full_request());
    let assistant = fixture.assistant(nlu, fixture.settings());
    let conversation = ScriptedConversation::new(alice());

    assistant.handle("meet bob", &conversation).await.unwrap();

    assert_eq!(
        conversation.last_sent(),
        "I couldn't schedule the meeting. It was not accepted by alice and bob."
    );
}

#[tokio::test]
async fn caller_without_calendar_is_told_before_any_prompt() {
    let fixture = Fixture::new(MockBackend::accepting(), MockBackend::accepting());
    let nlu = ScriptedNlu::default().on("meet bob", full_request());
    let assistant = fixture.assistant(nlu, InMemorySettings::default());
    let conversation = ScriptedConversation::new(alice());

    assistant.handle("meet bob", &conversation).await.unwrap();

    let sent = conversation.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("You haven't set up a calendar"), "{}", sent[0]);
}

#[tokio::test]
async fn counterpart_without_calendar_is_named() {
    let fixture = Fixture::new(MockBackend::accepting(), MockBackend::accepting());
    let a = fixture.factory.register("alice", fixture.alice_backend.clone());
    let settings = InMemorySettings::default().with(&alice(), UserSettings::with_calendar(a));
    let nlu = ScriptedNlu::default().on("meet bob", full_request());
    let assistant = fixture.assistant(nlu, settings);
    let conversation = ScriptedConversation::new(alice());

    assistant.handle("meet bob", &conversation).await.unwrap();

    assert!(conversation.last_sent().starts_with("bob hasn't set up a calendar"));
    assert!(fixture.alice_backend.writes().is_empty());
}

#[tokio::test]
async fn counterpart_named_you_is_not_mistaken_for_the_caller() {
    let fixture = Fixture::new(MockBackend::accepting(), MockBackend::accepting());
    let a = fixture.factory.register("alice", fixture.alice_backend.clone());
    let settings = InMemorySettings::default().with(&alice(), UserSettings::with_calendar(a));
    let request = Classification::with_intent("schedule_meeting")
        .and_entity("contact", Entity::new("@you"))
        .and_entity("datetime", Entity::normalized("at 3pm", json!(at(15, 0).to_rfc3339())))
        .and_entity("duration", Entity::normalized("30 minutes", json!(1800)));
    let nlu = ScriptedNlu::default().on("meet you", request);
    let assistant = fixture.assistant(nlu, settings);
    let conversation = ScriptedConversation::new(alice());

    assistant.handle("meet you", &conversation).await.unwrap();

    assert!(conversation.last_sent().starts_with("you hasn't set up a calendar"));
}

#[tokio::test]
async fn meeting_with_yourself_is_rejected() {
    let fixture = Fixture::new(MockBackend::accepting(), MockBackend::accepting());
    let request = Classification::with_intent("schedule_meeting")
        .and_entity("contact", Entity::new("@alice"))
        .and_entity("datetime", Entity::normalized("3pm", json!(at(15, 0).to_rfc3339())))
        .and_entity("duration", Entity::new("30 min"));
    let nlu = ScriptedNlu::default().on("meet me", request);
    let assistant = fixture.assistant(nlu, fixture.settings());
    let conversation = ScriptedConversation::new(alice());

    assistant.handle("meet me", &conversation).await.unwrap();

    assert_eq!(conversation.last_sent(), "You can't book a meeting with yourself.");
    assert!(fixture.alice_backend.writes().is_empty());
}

#[tokio::test]
async fn show_calendar_lists_todays_events() {
    let standup = rendezvous_domain::Event::starting_at("Standup", at(9, 0), Duration::minutes(15))
        .unwrap();
    let tomorrow =
        rendezvous_domain::Event::starting_at("Retro", at(9, 0) + Duration::days(1), Duration::hours(1))
            .unwrap();
    let fixture = Fixture::new(
        MockBackend::accepting().with_remote(vec![standup, tomorrow]),
        MockBackend::accepting(),
    );
    let nlu = ScriptedNlu::default().on("what's on", Classification::with_intent("show_calendar"));
    let assistant =
        fixture.assistant(nlu, fixture.settings()).with_clock(Arc::new(|| at(8, 0)));
    let conversation = ScriptedConversation::new(alice());

    assistant.handle("what's on", &conversation).await.unwrap();

    assert_eq!(
        conversation.last_sent(),
        "Here's what's on your calendar:\n- Mon 4 May 09:00-09:15 Standup"
    );
}

#[tokio::test]
async fn small_talk_and_info_routes() {
    let fixture = Fixture::new(MockBackend::accepting(), MockBackend::accepting());
    let nlu = ScriptedNlu::default()
        .on("hello", Classification { greeting: true, ..Classification::default() })
        .on("thanks", Classification { thanks: true, ..Classification::default() })
        .on("who am i", Classification::with_intent("who"))
        .on("setup", Classification::with_intent("setup_calendar"))
        .on("cancel", Classification::with_intent("cancel"));
    let assistant = fixture.assistant(nlu, fixture.settings());
    let conversation = ScriptedConversation::new(alice());

    for text in ["hello", "thanks", "who am i", "setup", "cancel", "gibberish"] {
        assistant.handle(text, &conversation).await.unwrap();
    }

    let sent = conversation.sent();
    assert!(sent[0].starts_with("Hi!"));
    assert_eq!(sent[1], "You're welcome!");
    assert_eq!(sent[2], "You're alice on slack.");
    assert_eq!(
        sent[3],
        "Your calendar is connected via remote_proxy. To change it, visit \
         http://localhost:8080/settings/slack/alice"
    );
    assert_eq!(sent[4], "There's nothing to cancel.");
    assert!(sent[5].contains("help"));
}

#[tokio::test]
async fn classifier_outage_is_reported() {
    let fixture = Fixture::new(MockBackend::accepting(), MockBackend::accepting());
    let nlu = ScriptedNlu::default().failing_on("hello");
    let assistant = fixture.assistant(nlu, fixture.settings());
    let conversation = ScriptedConversation::new(alice());

    assistant.handle("hello", &conversation).await.unwrap();

    assert!(conversation.last_sent().starts_with("Sorry, I couldn't make sense"));
}

async fn until_waiting(spool: &ChatSpool) {
    tokio::time::timeout(StdDuration::from_secs(5), async {
        while spool.pending() == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("dialogue never suspended");
}

#[tokio::test]
async fn spooled_dialogue_resumes_with_follow_up_messages() {
    let fixture = Fixture::new(MockBackend::accepting(), MockBackend::accepting());
    let nlu = ScriptedNlu::default()
        .on(
            "meet bob at 3",
            Classification::with_intent("schedule_meeting")
                .and_entity("contact", Entity::new("bob"))
                .and_entity("datetime", Entity::normalized("at 3", json!(at(15, 0).to_rfc3339()))),
        )
        .on("45 minutes", Classification::default().and_entity("duration", Entity::new("45 minutes")));
    let assistant = Arc::new(fixture.assistant(nlu, fixture.settings()));
    let spool = Arc::new(ChatSpool::new(assistant));
    let recorder = Arc::new(RecordingSink::default());
    let sink: Arc<dyn ReplySink> = recorder.clone();

    let FireOutcome::New(dialogue) = route_inbound(&spool, &sink, alice(), "meet bob at 3".into())
    else {
        panic!("first message must start a dialogue");
    };
    until_waiting(&spool).await;

    let resumed = route_inbound(&spool, &sink, alice(), "45 minutes".into());
    assert!(!resumed.is_new());
    dialogue.await.unwrap();

    let texts: Vec<String> = recorder.delivered().into_iter().map(|(_, text)| text).collect();
    assert_eq!(texts[0], "How long should it be?");
    assert!(texts[1].starts_with("Done!"), "{}", texts[1]);
    assert_eq!(fixture.bob_backend.writes()[0].duration(), Duration::minutes(45));
}
