//! Requirement evaluation
//!
//! A creature's clauses are checked in three groups, cheapest first:
//! accumulated progress, then calendar and time of day, then weather. Each
//! group short-circuits, and the weather group is split out so the caller
//! only looks the weather up once the other two have passed.
//!
//! All string comparisons ignore case and surrounding whitespace; catalog
//! text is never normalized ahead of time.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

use crate::core::calendar::HolidayTable;
use crate::creature::Requirement;
use crate::weather::WeatherSnapshot;

/// Everything but the weather, captured once per catch cycle
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub total_steps: u32,
    pub total_distance_m: f64,
    /// Local wall-clock time shared by every clause of the cycle
    pub now: NaiveDateTime,
    /// Holiday table for the year of `now`
    pub holidays: &'a HolidayTable,
}

/// Full evaluation with an already-known weather snapshot
///
/// `weather = None` means the weather is unavailable: any clause that looks
/// at the weather fails.
pub fn evaluate(
    requirements: &[Requirement],
    ctx: &EvaluationContext<'_>,
    weather: Option<&WeatherSnapshot>,
) -> bool {
    meets_progress(requirements, ctx)
        && meets_calendar(requirements, ctx)
        && meets_weather(requirements, weather)
}

/// Step and distance minimums
pub fn meets_progress(requirements: &[Requirement], ctx: &EvaluationContext<'_>) -> bool {
    requirements.iter().all(|req| {
        req.steps.map_or(true, |min| ctx.total_steps >= min)
            && req
                .distance
                .map_or(true, |min| ctx.total_distance_m >= f64::from(min))
    })
}

/// Weekday, month, hour range, day of month and holiday
pub fn meets_calendar(requirements: &[Requirement], ctx: &EvaluationContext<'_>) -> bool {
    let now = ctx.now;
    let weekday = weekday_name(now.weekday());
    let month = month_name(now.month());
    let hour = now.hour();
    let today = now.date();

    requirements.iter().all(|req| {
        if let Some(days) = &req.day {
            if !days.split(',').any(|day| same_text(day, weekday)) {
                return false;
            }
        }

        if let Some(months) = &req.month {
            if !months.iter().any(|m| same_text(m, month)) {
                return false;
            }
        }

        if let Some(range) = &req.time {
            if !range.contains(hour) {
                return false;
            }
        }

        if let Some(date_day) = req.date_day {
            if now.day() != date_day {
                return false;
            }
        }

        if let Some(holiday) = &req.holiday {
            if !ctx.holidays.is_holiday(holiday, today) {
                return false;
            }
        }

        true
    })
}

/// Condition text, temperature, wind direction and wind speed
///
/// Fails closed: without a snapshot, any weather-class field fails.
pub fn meets_weather(requirements: &[Requirement], weather: Option<&WeatherSnapshot>) -> bool {
    let Some(weather) = weather else {
        return !requirements.iter().any(Requirement::needs_weather);
    };

    requirements.iter().all(|req| {
        if let Some(conditions) = &req.weather {
            if !conditions.iter().any(|c| same_text(c, &weather.condition)) {
                return false;
            }
        }

        if let Some(range) = &req.temperature {
            if !range.contains(weather.temperature_c) {
                return false;
            }
        }

        if let Some(directions) = &req.wind_direction {
            if !directions
                .iter()
                .any(|d| same_text(d, &weather.wind_direction))
            {
                return false;
            }
        }

        if let Some(range) = &req.wind_speed {
            if !range.contains(weather.wind_kph) {
                return false;
            }
        }

        true
    })
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn month_name(month: u32) -> &'static str {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    MONTHS[(month as usize + 11) % 12]
}
