//! Per-user settings records
//!
//! Stored by the settings repository keyed by [`crate::Conversant`]. The
//! calendar section selects which backend a user's [`crate::Event`]s live on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::impl_label_conversions;

/// Settings stored for one conversant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub calendar: Option<CalendarSettings>,
    /// IANA zone name used when rendering times back to the user.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl UserSettings {
    pub fn with_calendar(calendar: CalendarSettings) -> Self {
        Self { calendar: Some(calendar), ..Self::default() }
    }
}

/// Backend selection plus the connection details it needs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum CalendarSettings {
    #[serde(rename = "caldav")]
    CalDav {
        /// Collection URL, e.g. `https://dav.example.com/calendars/alice/work/`
        url: String,
        username: String,
        password: String,
    },
    OfficeSuite {
        access_token: String,
        /// Overrides the public API root (tests, sovereign clouds).
        #[serde(default)]
        base_url: Option<String>,
        /// Calendar id; the default calendar when absent.
        #[serde(default)]
        calendar_id: Option<String>,
    },
    RemoteProxy {
        url: String,
        #[serde(default)]
        token: Option<String>,
    },
}

impl CalendarSettings {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::CalDav { .. } => BackendKind::CalDav,
            Self::OfficeSuite { .. } => BackendKind::OfficeSuite,
            Self::RemoteProxy { .. } => BackendKind::RemoteProxy,
        }
    }
}

// Credentials never end up in logs.
impl fmt::Debug for CalendarSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CalDav { url, username, .. } => f
                .debug_struct("CalDav")
                .field("url", url)
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::OfficeSuite { base_url, calendar_id, .. } => f
                .debug_struct("OfficeSuite")
                .field("access_token", &"<redacted>")
                .field("base_url", base_url)
                .field("calendar_id", calendar_id)
                .finish(),
            Self::RemoteProxy { url, token } => f
                .debug_struct("RemoteProxy")
                .field("url", url)
                .field("token", &token.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

/// Discriminant of [`CalendarSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    CalDav,
    OfficeSuite,
    RemoteProxy,
}

impl_label_conversions!(BackendKind {
    CalDav => "caldav",
    OfficeSuite => "office_suite",
    RemoteProxy => "remote_proxy",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_backend() {
        let json = r#"{
            "calendar": {"backend": "remote_proxy", "url": "http://proxy:8080"},
            "timezone": "Europe/Paris"
        }"#;
        let settings: UserSettings = serde_json::from_str(json).unwrap();

        assert_eq!(
            settings.calendar,
            Some(CalendarSettings::RemoteProxy { url: "http://proxy:8080".into(), token: None })
        );
        assert_eq!(settings.calendar.unwrap().kind(), BackendKind::RemoteProxy);
        assert_eq!(settings.timezone.as_deref(), Some("Europe/Paris"));
    }

    #[test]
    fn missing_sections_default_to_none() {
        let settings: UserSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn debug_output_hides_credentials() {
        let caldav = CalendarSettings::CalDav {
            url: "https://dav.example.com/".into(),
            username: "alice".into(),
            password: "hunter2".into(),
        };
        let office = CalendarSettings::OfficeSuite {
            access_token: "secret-token".into(),
            base_url: None,
            calendar_id: None,
        };

        assert!(!format!("{caldav:?}").contains("hunter2"));
        assert!(!format!("{office:?}").contains("secret-token"));
    }

    #[test]
    fn serde_tag_matches_backend_kind_label() {
        let caldav = CalendarSettings::CalDav {
            url: "https://dav.example.com/".into(),
            username: "alice".into(),
            password: "pw".into(),
        };
        let json = serde_json::to_value(&caldav).unwrap();
        assert_eq!(json["backend"], caldav.kind().as_str());
    }

    #[test]
    fn backend_kind_labels() {
        assert_eq!(BackendKind::OfficeSuite.to_string(), "office_suite");
        assert_eq!("CALDAV".parse::<BackendKind>().unwrap(), BackendKind::CalDav);
    }
}
