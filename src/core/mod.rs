pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use calendar::{CachedCalendar, Holiday, HolidayTable};
pub use clock::{Clock, ManualClock, SystemClock};
pub use types::{CreatureId, Millis, Moment};
