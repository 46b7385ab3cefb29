//! Dialogue orchestrator

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rendezvous_domain::constants::MAX_LISTED_EVENTS;
use rendezvous_domain::{
    BotConfig, Classification, Conversant, Event, RendezvousError, Result, UserSettings,
};
use tracing::{debug, error, info, instrument, warn};

use super::ports::NluClassifier;
use super::query_loop::{query_loop, SlotOutcome};
use super::replies;
use super::route::Route;
use super::slots;
use crate::calendar::{BackendFactory, Calendar};
use crate::conversation::{Conversation, NewConversationHandler};
use crate::scheduling::run_speculative;
use crate::user::SettingsRepository;

/// Source of "now" for date-relative requests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Runs one conversation from its first message back to idle.
pub struct Assistant {
    nlu: Arc<dyn NluClassifier>,
    settings: Arc<dyn SettingsRepository>,
    backends: Arc<dyn BackendFactory>,
    config: BotConfig,
    clock: Clock,
}

impl Assistant {
    pub fn new(
        nlu: Arc<dyn NluClassifier>,
        settings: Arc<dyn SettingsRepository>,
        backends: Arc<dyn BackendFactory>,
        config: BotConfig,
    ) -> Self {
        Self { nlu, settings, backends, config, clock: Arc::new(Utc::now) }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Classify `text` once, run the selected handler and report any
    /// failure to the user.
    ///
    /// Returns an error only when the conversation can no longer be
    /// written to.
    #[instrument(skip_all, fields(conversant = %conversation.conversant()))]
    pub async fn handle(&self, text: &str, conversation: &dyn Conversation) -> Result<()> {
        let classification = match self.nlu.classify(text).await {
            Ok(classification) => classification,
            Err(err) => {
                warn!(error = %err, "classification failed");
                return conversation
                    .send(&replies::describe_failure(&err, conversation.conversant()))
                    .await;
            }
        };

        let route = Route::from_classification(&classification);
        debug!(?route, intent = ?classification.intent, "routing conversation");

        match self.run(route, &classification, conversation).await {
            Ok(()) => Ok(()),
            Err(RendezvousError::UserCancelled) => {
                debug!(?route, "handler cancelled by user");
                Ok(())
            }
            Err(err @ RendezvousError::ChannelClosed(_)) => Err(err),
            Err(err) => {
                warn!(?route, error = %err, "handler failed");
                let reply = replies::describe_failure(&err, conversation.conversant());
                conversation.send(&reply).await
            }
        }
    }

    async fn run(
        &self,
        route: Route,
        classification: &Classification,
        conversation: &dyn Conversation,
    ) -> Result<()> {
        match route {
            Route::Greeting => conversation.send(replies::GREETING).await,
            Route::Bye => conversation.send(replies::BYE).await,
            Route::Thanks => conversation.send(replies::THANKS).await,
            Route::Help => conversation.send(replies::HELP).await,
            Route::Who => self.who(conversation).await,
            Route::SetupCalendar => self.setup_calendar(conversation).await,
            Route::ShowCalendar => self.show_calendar(classification, conversation).await,
            Route::ScheduleMeeting => self.schedule_meeting(classification, conversation).await,
            Route::Default if classification.is_cancel() => {
                conversation.send(replies::NOTHING_TO_CANCEL).await
            }
            Route::Default => conversation.send(replies::DEFAULT).await,
        }
    }

    async fn who(&self, conversation: &dyn Conversation) -> Result<()> {
        let me = conversation.conversant();
        let settings = self.settings_of(me).await?;
        conversation.send(&replies::who(me, settings.display_name.as_deref())).await
    }

    async fn setup_calendar(&self, conversation: &dyn Conversation) -> Result<()> {
        let me = conversation.conversant();
        let settings = self.settings_of(me).await?;
        let url = format!(
            "{}/{}/{}",
            self.config.settings_url.trim_end_matches('/'),
            me.namespace,
            me.user
        );
        let current = settings.calendar.as_ref().map(|c| c.kind().as_str());
        conversation.send(&replies::setup_link(&url, current)).await
    }

    async fn show_calendar(
        &self,
        request: &Classification,
        conversation: &dyn Conversation,
    ) -> Result<()> {
        let me = conversation.conversant();
        let (calendar, settings) = self.calendar_of(me).await?;
        let tz = self.timezone(&settings);

        let range = slots::requested_range(request, tz, (self.clock)());
        let events = calendar.get_events(range).await?;
        debug!(count = events.len(), start = %range.start, end = %range.end, "fetched agenda");

        let shown = &events[..events.len().min(MAX_LISTED_EVENTS)];
        conversation.send(&replies::agenda(shown, tz)).await
    }

    /// Book a meeting between the caller and one counterpart.
    ///
    /// Slots missing from the first message are asked for in order: contact,
    /// start, duration. Only the initiating conversation is told the result.
    async fn schedule_meeting(
        &self,
        request: &Classification,
        conversation: &dyn Conversation,
    ) -> Result<()> {
        let me = conversation.conversant().clone();
        let (my_calendar, my_settings) = self.calendar_of(&me).await?;
        let tz = self.timezone(&my_settings);
        let nlu = self.nlu.as_ref();

        let contact = filled(
            query_loop(
                conversation,
                nlu,
                slots::CONTACT.extract(request),
                replies::ASK_CONTACT,
                &slots::CONTACT,
            )
            .await?,
        )?;
        let start = filled(
            query_loop(
                conversation,
                nlu,
                slots::START.extract(request),
                replies::ASK_START,
                &slots::START,
            )
            .await?,
        )?;
        let duration = filled(
            query_loop(
                conversation,
                nlu,
                slots::DURATION.extract(request),
                replies::ASK_DURATION,
                &slots::DURATION,
            )
            .await?,
        )?;

        let them = me.peer(&contact);
        if them == me {
            return Err(RendezvousError::InvalidInput(
                "You can't book a meeting with yourself.".into(),
            ));
        }
        let (their_calendar, _) = self.calendar_of(&them).await?;

        let title = slots::SUBJECT.extract(request).unwrap_or_else(|| {
            format!("{} with {} and {}", self.config.meeting_title, me.user, them.user)
        });
        let event = Event::starting_at(title, start, duration)?;
        info!(with = %them, start = %event.start, end = %event.end, "scheduling meeting");

        let world = run_speculative(|tx| {
            let mine = tx.schedule(&my_calendar, event.clone());
            let theirs = tx.schedule(&their_calendar, event.clone());
            Ok(tx.all(&[mine, theirs]))
        })
        .await?;
        debug!(both_confirmed = world.get(world.output()), "speculative writes joined");

        world.commit()?;
        conversation.send(&replies::booked(&event, &them, tz)).await
    }

    async fn settings_of(&self, who: &Conversant) -> Result<UserSettings> {
        Ok(self.settings.get(who).await?.unwrap_or_default())
    }

    /// `who`'s calendar, or `MissingCalendarConfig` naming their user id
    /// when they have none configured.
    async fn calendar_of(&self, who: &Conversant) -> Result<(Arc<Calendar>, UserSettings)> {
        let settings = self.settings_of(who).await?;
        let Some(calendar_settings) = settings.calendar.as_ref() else {
            return Err(RendezvousError::MissingCalendarConfig(who.user.clone()));
        };
        let backend = self.backends.create(calendar_settings)?;
        Ok((Arc::new(Calendar::new(who.user.clone(), backend)), settings))
    }

    fn timezone(&self, settings: &UserSettings) -> Tz {
        let name = settings.timezone.as_deref().unwrap_or(&self.config.default_timezone);
        name.parse().unwrap_or_else(|_| {
            warn!(timezone = name, "unknown timezone, using UTC");
            Tz::UTC
        })
    }
}

fn filled<T>(outcome: SlotOutcome<T>) -> Result<T> {
    match outcome {
        SlotOutcome::Filled(value) => Ok(value),
        SlotOutcome::Cancelled => Err(RendezvousError::UserCancelled),
    }
}

#[async_trait]
impl NewConversationHandler<Arc<dyn Conversation>> for Assistant {
    async fn on_new_conversation(&self, text: String, conversation: Arc<dyn Conversation>) {
        if let Err(err) = self.handle(&text, conversation.as_ref()).await {
            error!(
                conversant = %conversation.conversant(),
                error = %err,
                "conversation ended abnormally"
            );
        }
    }
}
