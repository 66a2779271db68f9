//! Weekly schedule types: slots, days, and locations.
//!
//! A slot is a recurring weekly class definition with a day, a time
//! range, a subject, and a single-point location. Slots are immutable
//! once created except by explicit delete.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geo::Coordinates;

/// Weekdays a slot can recur on. Stored and displayed as full English
/// names ("Monday" .. "Friday").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Monday" => Some(Weekday::Monday),
            "Tuesday" => Some(Weekday::Tuesday),
            "Wednesday" => Some(Weekday::Wednesday),
            "Thursday" => Some(Weekday::Thursday),
            "Friday" => Some(Weekday::Friday),
            _ => None,
        }
    }

    /// The tracked weekday for a calendar date, if it falls Mon-Fri.
    pub fn from_date(date: chrono::NaiveDate) -> Option<Self> {
        use chrono::Datelike;
        match date.weekday() {
            chrono::Weekday::Mon => Some(Weekday::Monday),
            chrono::Weekday::Tue => Some(Weekday::Tuesday),
            chrono::Weekday::Wed => Some(Weekday::Wednesday),
            chrono::Weekday::Thu => Some(Weekday::Thursday),
            chrono::Weekday::Fri => Some(Weekday::Friday),
            _ => None,
        }
    }

    fn order(&self) -> u8 {
        match self {
            Weekday::Monday => 0,
            Weekday::Tuesday => 1,
            Weekday::Wednesday => 2,
            Weekday::Thursday => 3,
            Weekday::Friday => 4,
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single-point location a slot's presence is checked against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotLocation {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    /// Opaque place identifier from the location picker; may be empty.
    #[serde(default)]
    pub place_id: String,
}

impl SlotLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    /// Shareable maps link for this location.
    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps/search/?api=1&query={},{}&query_place_id={}",
            self.lat, self.lng, self.place_id
        )
    }
}

/// A recurring weekly class slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: String,
    pub day: Weekday,
    pub subject: String,
    pub from_time: NaiveTime,
    pub to_time: NaiveTime,
    pub location: SlotLocation,
}

impl ScheduleSlot {
    /// Build a validated slot with a freshly assigned id.
    ///
    /// The id is the creation timestamp in epoch milliseconds --
    /// monotonic enough for a per-user schedule and never reused.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] if a field is empty, the time range
    /// is inverted, or a coordinate is non-finite or out of range.
    pub fn new(
        day: Weekday,
        subject: &str,
        from_time: NaiveTime,
        to_time: NaiveTime,
        location: SlotLocation,
    ) -> Result<Self, ValidationError> {
        if subject.trim().is_empty() {
            return Err(ValidationError::EmptyField("subject"));
        }
        if location.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("location name"));
        }
        if to_time <= from_time {
            return Err(ValidationError::InvalidTimeRange {
                from: from_time,
                to: to_time,
            });
        }
        if !location.lat.is_finite() || location.lat.abs() > 90.0 {
            return Err(ValidationError::InvalidCoordinate {
                field: "lat",
                value: location.lat,
            });
        }
        if !location.lng.is_finite() || location.lng.abs() > 180.0 {
            return Err(ValidationError::InvalidCoordinate {
                field: "lng",
                value: location.lng,
            });
        }

        Ok(Self {
            id: chrono::Utc::now().timestamp_millis().to_string(),
            day,
            subject: subject.trim().to_string(),
            from_time,
            to_time,
            location,
        })
    }
}

/// Sort slots by day of week, then by start time (display order).
pub fn sort_slots(slots: &mut [ScheduleSlot]) {
    slots.sort_by(|a, b| {
        a.day
            .order()
            .cmp(&b.day.order())
            .then(a.from_time.cmp(&b.from_time))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lng: f64) -> SlotLocation {
        SlotLocation {
            name: "Lecture Hall 2".into(),
            lat,
            lng,
            place_id: String::new(),
        }
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn valid_slot_gets_an_id() {
        let slot =
            ScheduleSlot::new(Weekday::Monday, "Physics", t(9, 0), t(10, 0), loc(12.0, 77.0))
                .unwrap();
        assert!(!slot.id.is_empty());
        assert_eq!(slot.day, Weekday::Monday);
    }

    #[test]
    fn inverted_time_range_is_rejected() {
        let err =
            ScheduleSlot::new(Weekday::Monday, "Physics", t(10, 0), t(9, 0), loc(12.0, 77.0))
                .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimeRange { .. }));
    }

    #[test]
    fn zero_length_slot_is_rejected() {
        let err =
            ScheduleSlot::new(Weekday::Monday, "Physics", t(9, 0), t(9, 0), loc(12.0, 77.0))
                .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTimeRange { .. }));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let err =
            ScheduleSlot::new(Weekday::Monday, "Physics", t(9, 0), t(10, 0), loc(91.0, 77.0))
                .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidCoordinate { field: "lat", .. }
        ));

        let err = ScheduleSlot::new(
            Weekday::Monday,
            "Physics",
            t(9, 0),
            t(10, 0),
            loc(12.0, f64::NAN),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidCoordinate { field: "lng", .. }
        ));
    }

    #[test]
    fn empty_subject_is_rejected() {
        let err =
            ScheduleSlot::new(Weekday::Monday, "  ", t(9, 0), t(10, 0), loc(12.0, 77.0))
                .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyField("subject")));
    }

    #[test]
    fn weekday_round_trips_through_strings() {
        for day in Weekday::ALL {
            assert_eq!(Weekday::parse(day.as_str()), Some(day));
        }
        assert_eq!(Weekday::parse("Saturday"), None);
    }

    #[test]
    fn weekday_from_date() {
        // 2026-08-24 is a Monday, 2026-08-29 a Saturday.
        let mon = chrono::NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let sat = chrono::NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        assert_eq!(Weekday::from_date(mon), Some(Weekday::Monday));
        assert_eq!(Weekday::from_date(sat), None);
    }

    #[test]
    fn slots_sort_by_day_then_time() {
        let mut slots = vec![
            ScheduleSlot::new(Weekday::Tuesday, "Chem", t(9, 0), t(10, 0), loc(1.0, 1.0))
                .unwrap(),
            ScheduleSlot::new(Weekday::Monday, "Math", t(11, 0), t(12, 0), loc(1.0, 1.0))
                .unwrap(),
            ScheduleSlot::new(Weekday::Monday, "Physics", t(9, 0), t(10, 0), loc(1.0, 1.0))
                .unwrap(),
        ];
        sort_slots(&mut slots);
        assert_eq!(slots[0].subject, "Physics");
        assert_eq!(slots[1].subject, "Math");
        assert_eq!(slots[2].subject, "Chem");
    }
}
