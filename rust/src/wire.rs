//! JSON wire schemas for timetables.
//!
//! Two schemas exist and the caller picks one explicitly:
//! - `plain`: `{"rate": 3600.0, "duration": 900.0}` in seconds.
//! - `v1`: `{"rate": {"hours": 1}, "duration": {"minutes": 15}}`, each value
//!   spelled as calendar components measured from the reference instant.
//!
//! Decoding under either schema runs the same validation as construction.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::calendar::{CalendarComponents, CalendarUnit};
use crate::error::TimetableError;
use crate::timetable::Timetable;

/// Selects the wire representation used by [`encode`] and [`decode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WireSchema {
    /// Rate and duration as seconds.
    #[default]
    Plain,
    /// Rate and duration as calendar component maps.
    V1,
}

impl WireSchema {
    pub fn name(self) -> &'static str {
        match self {
            WireSchema::Plain => "plain",
            WireSchema::V1 => "v1",
        }
    }
}

impl fmt::Display for WireSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WireSchema {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" => Ok(WireSchema::Plain),
            "v1" => Ok(WireSchema::V1),
            other => Err(TimetableError::Decode(format!(
                "unknown wire schema: {:?}",
                other
            ))),
        }
    }
}

/// The `plain` schema payload.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlainTimetable {
    pub rate: f64,
    pub duration: f64,
}

impl From<Timetable> for PlainTimetable {
    fn from(timetable: Timetable) -> Self {
        Self {
            rate: timetable.rate_seconds() as f64,
            duration: timetable.duration_seconds() as f64,
        }
    }
}

impl TryFrom<PlainTimetable> for Timetable {
    type Error = TimetableError;

    fn try_from(payload: PlainTimetable) -> Result<Self, Self::Error> {
        Timetable::new(payload.rate, payload.duration)
    }
}

/// Unit key to positive count, e.g. `{"hours": 1, "minutes": 30}`.
pub type ComponentMap = FxHashMap<String, i64>;

/// The `v1` schema payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarTimetable {
    pub rate: ComponentMap,
    pub duration: ComponentMap,
}

impl CalendarTimetable {
    /// Spell a timetable as calendar components.
    pub fn from_timetable(timetable: &Timetable) -> Result<Self, TimetableError> {
        Ok(Self {
            rate: components_to_map(&elapsed_components(timetable.rate())?),
            duration: components_to_map(&elapsed_components(timetable.duration())?),
        })
    }

    /// Resolve the component maps and validate the resulting pair.
    pub fn to_timetable(&self) -> Result<Timetable, TimetableError> {
        Timetable::from_calendar_components(
            &map_to_components(&self.rate),
            &map_to_components(&self.duration),
        )
    }
}

fn elapsed_components(value: chrono::Duration) -> Result<CalendarComponents, TimetableError> {
    CalendarComponents::from_elapsed(value)
        .ok_or_else(|| TimetableError::UnrepresentableInterval(format!("{}s", value.num_seconds())))
}

/// Positive components only; zero and negative counts are left out.
fn components_to_map(components: &CalendarComponents) -> ComponentMap {
    CalendarUnit::ALL
        .into_iter()
        .filter_map(|unit| {
            let value = components.get(unit);
            (value > 0).then(|| (unit.key().to_string(), value))
        })
        .collect()
}

/// Unknown keys are ignored.
fn map_to_components(map: &ComponentMap) -> CalendarComponents {
    let mut components = CalendarComponents::default();
    for (key, &value) in map {
        if let Some(unit) = CalendarUnit::from_key(key) {
            components.set(unit, value);
        }
    }
    components
}

/// Encode a timetable into a JSON value under `schema`.
pub fn encode(timetable: &Timetable, schema: WireSchema) -> Result<Value, TimetableError> {
    let value = match schema {
        WireSchema::Plain => serde_json::to_value(PlainTimetable::from(*timetable))?,
        WireSchema::V1 => serde_json::to_value(CalendarTimetable::from_timetable(timetable)?)?,
    };
    Ok(value)
}

/// Decode a timetable from a JSON value under `schema`.
///
/// # Errors
/// * `Decode` for payloads of the wrong shape
/// * `DurationExceedsRate` / `InvalidComponents` from validation
pub fn decode(value: &Value, schema: WireSchema) -> Result<Timetable, TimetableError> {
    match schema {
        WireSchema::Plain => Timetable::try_from(PlainTimetable::deserialize(value)?),
        WireSchema::V1 => CalendarTimetable::deserialize(value)?.to_timetable(),
    }
}

pub fn to_json_string(timetable: &Timetable, schema: WireSchema) -> Result<String, TimetableError> {
    Ok(serde_json::to_string(&encode(timetable, schema)?)?)
}

pub fn from_json_str(payload: &str, schema: WireSchema) -> Result<Timetable, TimetableError> {
    let value: Value = serde_json::from_str(payload)?;
    decode(&value, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hourly() -> Timetable {
        Timetable::new(3_600.0, 900.0).unwrap()
    }

    #[test]
    fn test_schema_names() {
        assert_eq!("plain".parse::<WireSchema>(), Ok(WireSchema::Plain));
        assert_eq!("v1".parse::<WireSchema>(), Ok(WireSchema::V1));
        assert!(matches!(
            "v2".parse::<WireSchema>(),
            Err(TimetableError::Decode(_))
        ));
        assert_eq!(WireSchema::V1.to_string(), "v1");
        assert_eq!(WireSchema::default(), WireSchema::Plain);
    }

    #[test]
    fn test_plain_encoding() {
        assert_eq!(
            encode(&hourly(), WireSchema::Plain).unwrap(),
            json!({"rate": 3600.0, "duration": 900.0})
        );
    }

    #[test]
    fn test_plain_decoding_validates() {
        let value = json!({"rate": 3600, "duration": 900.7});
        assert_eq!(decode(&value, WireSchema::Plain), Ok(hourly()));

        let wider = json!({"rate": 900, "duration": 3600});
        assert!(matches!(
            decode(&wider, WireSchema::Plain),
            Err(TimetableError::DurationExceedsRate { .. })
        ));

        let missing = json!({"rate": 900});
        assert!(matches!(
            decode(&missing, WireSchema::Plain),
            Err(TimetableError::Decode(_))
        ));
    }

    #[test]
    fn test_v1_encoding() {
        assert_eq!(
            encode(&hourly(), WireSchema::V1).unwrap(),
            json!({"rate": {"hours": 1}, "duration": {"minutes": 15}})
        );
        assert_eq!(
            encode(&Timetable::empty(), WireSchema::V1).unwrap(),
            json!({"rate": {}, "duration": {}})
        );

        // 31 days from the reference instant is exactly one month.
        let monthly = Timetable::new(31.0 * 86_400.0, 86_400.0 + 61.0).unwrap();
        assert_eq!(
            encode(&monthly, WireSchema::V1).unwrap(),
            json!({
                "rate": {"months": 1},
                "duration": {"days": 1, "minutes": 1, "seconds": 1}
            })
        );
    }

    #[test]
    fn test_v1_decoding() {
        let value = json!({
            "rate": {"days": 1, "weeks": 3},
            "duration": {"hours": 8, "minutes": 30}
        });
        let timetable = decode(&value, WireSchema::V1).unwrap();
        assert_eq!(timetable.rate_seconds(), 86_400);
        assert_eq!(timetable.duration_seconds(), 8 * 3_600 + 30 * 60);

        let wider = json!({"rate": {"hours": 1}, "duration": {"hours": 2}});
        assert!(matches!(
            decode(&wider, WireSchema::V1),
            Err(TimetableError::DurationExceedsRate { .. })
        ));

        let unresolvable = json!({"rate": {"years": i64::MAX}, "duration": {}});
        assert_eq!(
            decode(&unresolvable, WireSchema::V1),
            Err(TimetableError::InvalidComponents)
        );

        let malformed = json!({"rate": 3600, "duration": 900});
        assert!(matches!(
            decode(&malformed, WireSchema::V1),
            Err(TimetableError::Decode(_))
        ));
    }

    #[test]
    fn test_round_trips() {
        let timetables = [
            Timetable::empty(),
            hourly(),
            Timetable::new(3_600.0, 3_600.0).unwrap(),
            Timetable::new(400.0 * 86_400.0 + 7.0, 45.0 * 86_400.0).unwrap(),
            Timetable::new(1.0, 0.0).unwrap(),
        ];
        for schema in [WireSchema::Plain, WireSchema::V1] {
            for timetable in &timetables {
                let json = to_json_string(timetable, schema).unwrap();
                assert_eq!(&from_json_str(&json, schema).unwrap(), timetable, "{}", json);
            }
        }
    }

    #[test]
    fn test_serde_derive_uses_plain_schema() {
        let json = serde_json::to_string(&hourly()).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&json).unwrap(),
            json!({"rate": 3600.0, "duration": 900.0})
        );
        assert_eq!(serde_json::from_str::<Timetable>(&json).unwrap(), hourly());
        assert!(serde_json::from_str::<Timetable>(r#"{"rate": 1, "duration": 2}"#).is_err());
    }

    #[test]
    fn test_from_json_str_rejects_garbage() {
        assert!(matches!(
            from_json_str("not json", WireSchema::Plain),
            Err(TimetableError::Decode(_))
        ));
    }
}
