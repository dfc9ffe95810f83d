//! Holiday calendar: fixed-date feasts plus Easter and Trinity
//!
//! Easter is computed with the Gregorian Computus; Trinity (Pentecost) falls
//! 49 days later. Everything here is a pure function of the year, with
//! [`CachedCalendar`] as an optional one-year memo on top.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Named holidays a requirement can refer to
///
/// Declaration order is lookup priority when two holidays share a date:
/// moving feasts first, then fixed dates in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Holiday {
    Easter,
    Trinity,
    NewYear,
    TatianaDay,
    ValentinesDay,
    WomensDay,
    LabourDay,
    IvanKupala,
    KnowledgeDay,
    Halloween,
    Christmas,
}

impl Holiday {
    pub const ALL: [Holiday; 11] = [
        Holiday::Easter,
        Holiday::Trinity,
        Holiday::NewYear,
        Holiday::TatianaDay,
        Holiday::ValentinesDay,
        Holiday::WomensDay,
        Holiday::LabourDay,
        Holiday::IvanKupala,
        Holiday::KnowledgeDay,
        Holiday::Halloween,
        Holiday::Christmas,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Holiday::Easter => "Easter",
            Holiday::Trinity => "Trinity",
            Holiday::NewYear => "New Year",
            Holiday::TatianaDay => "Tatiana Day",
            Holiday::ValentinesDay => "Valentine's Day",
            Holiday::WomensDay => "Women's Day",
            Holiday::LabourDay => "Labour Day",
            Holiday::IvanKupala => "Ivan Kupala",
            Holiday::KnowledgeDay => "Knowledge Day",
            Holiday::Halloween => "Halloween",
            Holiday::Christmas => "Christmas",
        }
    }

    /// Lowercase spellings accepted in catalog requirements
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Holiday::Easter => &["easter", "великдень"],
            Holiday::Trinity => &["trinity", "pentecost", "трійця"],
            Holiday::NewYear => &["new year", "новий рік"],
            Holiday::TatianaDay => &["tatiana day", "день тетяни"],
            Holiday::ValentinesDay => &[
                "valentine's day",
                "valentines day",
                "день святого валентина",
            ],
            Holiday::WomensDay => &["women's day", "womens day", "день жінки"],
            Holiday::LabourDay => &["labour day", "labor day", "день працівника"],
            Holiday::IvanKupala => &["ivan kupala", "івана купала"],
            Holiday::KnowledgeDay => &["knowledge day", "день знань"],
            Holiday::Halloween => &["halloween", "хелловін"],
            Holiday::Christmas => &["christmas", "різдво"],
        }
    }

    /// Resolve a catalog spelling, ignoring case and surrounding whitespace
    ///
    /// Unknown names resolve to `None`; a requirement naming one can never pass.
    pub fn from_name(name: &str) -> Option<Holiday> {
        let wanted = name.trim().to_lowercase();
        Holiday::ALL
            .into_iter()
            .find(|h| h.aliases().iter().any(|alias| *alias == wanted))
    }

    /// Month and day of a fixed-date holiday
    fn fixed_date(&self) -> Option<(u32, u32)> {
        match self {
            Holiday::Easter | Holiday::Trinity => None,
            Holiday::NewYear => Some((1, 1)),
            Holiday::TatianaDay => Some((2, 12)),
            Holiday::ValentinesDay => Some((2, 14)),
            Holiday::WomensDay => Some((3, 8)),
            Holiday::LabourDay => Some((5, 1)),
            Holiday::IvanKupala => Some((6, 20)),
            Holiday::KnowledgeDay => Some((9, 1)),
            Holiday::Halloween => Some((10, 31)),
            Holiday::Christmas => Some((12, 25)),
        }
    }
}

/// Gregorian Easter Sunday for `year` (Computus)
///
/// Returns `None` only for years chrono cannot represent.
pub fn easter(year: i32) -> Option<NaiveDate> {
    let g = year % 19;
    let c = year / 100;
    let h = (c - c / 4 - (8 * c + 13) / 25 + 19 * g + 15) % 30;
    let i = h - (h / 28) * (1 - (29 / (h + 1)) * ((21 - g) / 11));
    let j = (year + year / 4 + i + 2 - c + c / 4) % 7;
    let l = i - j;
    let month = 3 + (l + 40) / 44;
    let day = l + 28 - 31 * (month / 4);

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Trinity Sunday (Pentecost): Easter + 49 days
pub fn trinity(year: i32) -> Option<NaiveDate> {
    easter(year).map(|date| date + Duration::days(49))
}

/// Every holiday of one year, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayTable {
    year: i32,
    dates: Vec<(Holiday, NaiveDate)>,
}

impl HolidayTable {
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Date of `holiday` this year
    pub fn date_of(&self, holiday: Holiday) -> Option<NaiveDate> {
        self.dates
            .iter()
            .find(|(h, _)| *h == holiday)
            .map(|(_, date)| *date)
    }

    /// Highest-priority holiday falling on `date`
    pub fn holiday_on(&self, date: NaiveDate) -> Option<Holiday> {
        self.holidays_on(date).next()
    }

    /// All holidays falling on `date`, in priority order
    pub fn holidays_on(&self, date: NaiveDate) -> impl Iterator<Item = Holiday> + '_ {
        self.dates
            .iter()
            .filter(move |(_, d)| *d == date)
            .map(|(h, _)| *h)
    }

    /// Whether the holiday called `name` falls on `date`
    pub fn is_holiday(&self, name: &str, date: NaiveDate) -> bool {
        Holiday::from_name(name)
            .and_then(|h| self.date_of(h))
            .is_some_and(|d| d == date)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Holiday, NaiveDate)> {
        self.dates.iter()
    }
}

/// Compute the holiday table for `year`
pub fn holidays_for_year(year: i32) -> HolidayTable {
    let dates = Holiday::ALL
        .into_iter()
        .filter_map(|holiday| {
            let date = match holiday {
                Holiday::Easter => easter(year),
                Holiday::Trinity => trinity(year),
                fixed => fixed
                    .fixed_date()
                    .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d)),
            };
            date.map(|d| (holiday, d))
        })
        .collect();

    HolidayTable { year, dates }
}

/// Single-slot memo over [`holidays_for_year`]
///
/// Holds exactly one year; asking for another year recomputes and replaces it.
#[derive(Debug, Clone, Default)]
pub struct CachedCalendar {
    slot: Option<HolidayTable>,
}

impl CachedCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_year(&mut self, year: i32) -> &HolidayTable {
        if self.slot.as_ref().map(HolidayTable::year) != Some(year) {
            tracing::debug!("Computing holiday table for {}", year);
            self.slot = Some(holidays_for_year(year));
        }
        self.slot.get_or_insert_with(|| holidays_for_year(year))
    }

    /// Holiday table for the year containing `date`
    pub fn for_date(&mut self, date: NaiveDate) -> &HolidayTable {
        self.for_year(date.year())
    }

    /// Holiday falling on `date`, if any
    pub fn today(&mut self, date: NaiveDate) -> Option<Holiday> {
        self.for_date(date).holiday_on(date)
    }

    pub fn cached_year(&self) -> Option<i32> {
        self.slot.as_ref().map(HolidayTable::year)
    }
}
