//! Speculative scheduling across independently-owned calendars

pub mod speculative;

pub use speculative::{
    run_speculative, ParticipantOutcome, ResultHandle, Speculation, TransactionWorld,
};
