//! Macro for implementing Display and FromStr for label enums
//!
//! Intents, backend kinds and similar closed sets travel as lowercase strings
//! (NLU payloads, settings records, log fields). This macro keeps the string
//! mapping in one place.
//!
//! # Example
//!
//! ```rust
//! use rendezvous_domain::impl_label_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Channel {
//!     Slack,
//!     Terminal,
//! }
//!
//! impl_label_conversions!(Channel {
//!     Slack => "slack",
//!     Terminal => "terminal",
//! });
//!
//! assert_eq!(Channel::Slack.to_string(), "slack");
//! assert_eq!("TERMINAL".parse::<Channel>().unwrap(), Channel::Terminal);
//! ```

/// Implements `Display`, `FromStr` and `as_str` for a fieldless enum.
///
/// Parsing is case-insensitive and ignores surrounding whitespace.
#[macro_export]
macro_rules! impl_label_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical lowercase label.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mood {
        Calm,
        Busy,
    }

    impl_label_conversions!(Mood {
        Calm => "calm",
        Busy => "busy",
    });

    #[test]
    fn display_uses_label() {
        assert_eq!(Mood::Calm.to_string(), "calm");
        assert_eq!(Mood::Busy.as_str(), "busy");
    }

    #[test]
    fn parsing_ignores_case_and_whitespace() {
        assert_eq!(Mood::from_str("  BuSy ").unwrap(), Mood::Busy);
    }

    #[test]
    fn parsing_rejects_unknown_labels() {
        let err = Mood::from_str("sleepy").unwrap_err();
        assert!(err.contains("Invalid Mood: sleepy"));
        assert!(Mood::from_str("").is_err());
    }
}
