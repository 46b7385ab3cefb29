//! Calendar backends
//!
//! One adapter per [`rendezvous_domain::CalendarSettings`] variant:
//! - CalDAV collections (`REPORT` / `PUT` with iCalendar bodies)
//! - Office-suite REST calendars (`calendarView` / `events`)
//! - Another instance's calendar proxy

pub mod caldav;
pub mod factory;
pub mod ical;
pub mod office_suite;
pub mod remote_proxy;

pub use caldav::CalDavBackend;
pub use factory::{create_backend, CalendarBackendImpl, HttpBackendFactory};
pub use office_suite::OfficeSuiteBackend;
pub use remote_proxy::RemoteProxyBackend;
