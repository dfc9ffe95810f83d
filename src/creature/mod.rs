//! Creature catalog records and their requirement clauses
//!
//! A creature is discovered when every one of its requirement clauses holds
//! and its probability roll succeeds. Clauses are sparse: only the fields
//! that are set take part, and a clause with no fields set always holds.

pub mod catalog;

pub use catalog::Catalog;

use serde::{Deserialize, Serialize};

use crate::core::types::CreatureId;

/// An immutable catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: CreatureId,
    pub name: String,
    /// One-line character sketch
    pub description: String,
    /// What the creature says when met
    pub story: String,
    /// Image resource key
    pub image: String,
    /// Human-readable hint about when the creature shows up
    pub requirements_text: String,
    /// Chance in [0, 1] that a satisfied creature is actually caught
    pub probability: f64,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

impl Creature {
    /// Whether any clause looks at the weather
    ///
    /// Such creatures are evaluated after all others in a catch cycle.
    pub fn needs_weather(&self) -> bool {
        self.requirements.iter().any(Requirement::needs_weather)
    }
}

/// One sparse predicate record; all present fields must hold
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Requirement {
    /// Minimum accumulated steps
    pub steps: Option<u32>,
    /// Weekday name, or several separated by commas
    pub day: Option<String>,
    /// Month names; the current month must be one of them
    pub month: Option<Vec<String>>,
    /// Hour range `[start, end)`, wrapping past midnight when `start > end`
    pub time: Option<HourRange>,
    /// Exact day of the month
    pub date_day: Option<u32>,
    /// Holiday name that must fall on today's date
    pub holiday: Option<String>,
    /// Accepted weather condition texts
    pub weather: Option<Vec<String>>,
    /// Temperature range in degrees Celsius
    pub temperature: Option<BoundRange>,
    /// Accepted compass directions of the wind
    pub wind_direction: Option<Vec<String>>,
    /// Wind speed range in km/h
    pub wind_speed: Option<BoundRange>,
    /// Minimum accumulated distance in metres
    pub distance: Option<u32>,
}

impl Requirement {
    pub fn needs_weather(&self) -> bool {
        self.weather.is_some()
            || self.temperature.is_some()
            || self.wind_direction.is_some()
            || self.wind_speed.is_some()
    }

    pub fn is_empty(&self) -> bool {
        *self == Requirement::default()
    }
}

/// Half-open hour range `[start, end)`
///
/// When `start > end` the range wraps past midnight: `[23, 5)` covers hours
/// 23, 0, 1, 2, 3 and 4. An equal start and end covers nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

impl HourRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: u32) -> bool {
        if self.start <= self.end {
            self.start <= hour && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

impl TryFrom<Vec<u32>> for HourRange {
    type Error = String;

    fn try_from(hours: Vec<u32>) -> Result<Self, Self::Error> {
        match hours.as_slice() {
            [start, end] if *start <= 24 && *end <= 24 => Ok(HourRange::new(*start, *end)),
            [start, end] => Err(format!("hour range [{}, {}] is outside 0..=24", start, end)),
            other => Err(format!(
                "hour range needs exactly two hours, got {}",
                other.len()
            )),
        }
    }
}

impl From<HourRange> for Vec<u32> {
    fn from(range: HourRange) -> Self {
        vec![range.start, range.end]
    }
}

/// One end of a numeric range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Unbounded,
    At(f64),
}

/// Sentinel used in catalog files for an open range end
pub const UNBOUNDED_SENTINEL: &str = "_";

/// Inclusive numeric range with optionally open ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BoundValue>", into = "Vec<BoundValue>")]
pub struct BoundRange {
    pub min: Bound,
    pub max: Bound,
}

impl BoundRange {
    pub fn new(min: Bound, max: Bound) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        let above_min = match self.min {
            Bound::Unbounded => true,
            Bound::At(min) => value >= min,
        };
        let below_max = match self.max {
            Bound::Unbounded => true,
            Bound::At(max) => value <= max,
        };
        above_min && below_max
    }
}

/// Raw catalog form of a bound: a number, a numeric string, or `"_"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundValue {
    Number(f64),
    Text(String),
}

impl TryFrom<BoundValue> for Bound {
    type Error = String;

    fn try_from(value: BoundValue) -> Result<Self, Self::Error> {
        match value {
            BoundValue::Number(n) if n.is_finite() => Ok(Bound::At(n)),
            BoundValue::Number(n) => Err(format!("bound {} is not finite", n)),
            BoundValue::Text(text) => {
                let text = text.trim();
                if text == UNBOUNDED_SENTINEL {
                    return Ok(Bound::Unbounded);
                }
                match text.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Bound::At(n)),
                    _ => Err(format!(
                        "bound {:?} is neither a number nor {:?}",
                        text, UNBOUNDED_SENTINEL
                    )),
                }
            }
        }
    }
}

impl TryFrom<Vec<BoundValue>> for BoundRange {
    type Error = String;

    fn try_from(values: Vec<BoundValue>) -> Result<Self, Self::Error> {
        let count = values.len();
        let mut values = values.into_iter();
        match (values.next(), values.next(), count) {
            (Some(min), Some(max), 2) => Ok(BoundRange::new(min.try_into()?, max.try_into()?)),
            _ => Err(format!("bound range needs exactly two values, got {}", count)),
        }
    }
}

impl From<BoundRange> for Vec<BoundValue> {
    fn from(range: BoundRange) -> Self {
        [range.min, range.max]
            .into_iter()
            .map(|bound| match bound {
                Bound::Unbounded => BoundValue::Text(UNBOUNDED_SENTINEL.into()),
                Bound::At(n) => BoundValue::Number(n),
            })
            .collect()
    }
}
