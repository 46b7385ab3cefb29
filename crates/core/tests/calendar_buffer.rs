//! Read-your-writes behaviour of the buffered calendar.

mod support;

use std::sync::Arc;

use chrono::Duration;
use rendezvous_core::Calendar;
use rendezvous_domain::{Event, RendezvousError, TimeRange};
use support::at;
use support::calendar::MockBackend;

fn standup() -> Event {
    Event::starting_at("Standup", at(9, 0), Duration::minutes(30)).unwrap()
}

#[tokio::test]
async fn buffered_standup_is_visible_without_remote_events() {
    let calendar = Calendar::new("alice", Arc::new(MockBackend::declining()));
    calendar.schedule_event(standup()).await.unwrap();

    let window = TimeRange::new(at(8, 0), at(10, 0)).unwrap();
    let events = calendar.get_events(window).await.unwrap();

    assert_eq!(events, vec![standup()]);
    assert_eq!(events[0].end - events[0].start, Duration::minutes(30));
}

#[tokio::test]
async fn accepted_write_is_not_listed_twice() {
    let calendar = Calendar::new("alice", Arc::new(MockBackend::accepting()));
    assert!(calendar.schedule_event(standup()).await.unwrap());

    let window = TimeRange::new(at(8, 0), at(10, 0)).unwrap();
    assert_eq!(calendar.get_events(window).await.unwrap(), vec![standup()]);
}

#[tokio::test]
async fn results_are_sorted_across_remote_and_buffer() {
    let lunch = Event::starting_at("Lunch", at(12, 0), Duration::hours(1)).unwrap();
    let review = Event::starting_at("Review", at(10, 0), Duration::minutes(45)).unwrap();
    let backend = MockBackend::declining().with_remote(vec![lunch.clone(), review.clone()]);
    let calendar = Calendar::new("alice", Arc::new(backend));
    calendar.schedule_event(standup()).await.unwrap();

    let window = TimeRange::new(at(0, 0), at(23, 0)).unwrap();
    let events = calendar.get_events(window).await.unwrap();

    assert_eq!(events, vec![standup(), review, lunch]);
}

#[tokio::test]
async fn failed_write_keeps_event_buffered() {
    let backend = MockBackend::failing(RendezvousError::Network("503".into()));
    let calendar = Calendar::new("alice", Arc::new(backend.clone()));

    let err = calendar.schedule_event(standup()).await.unwrap_err();

    assert!(err.is_remote());
    assert_eq!(calendar.buffered(), vec![standup()]);
    assert_eq!(backend.writes(), vec![standup()]);
}
