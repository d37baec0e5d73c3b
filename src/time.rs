// Copyright  (C) 2020, Kisio Digital and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Kisio Digital (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia
// www.navitia.io

use chrono::NaiveDateTime;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Duration since 00:00:00 UTC on the first day covered by the timetable data.
/// This is used in the scans to store a point in time in an unambiguous way.
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct SecondsSinceDatasetUTCStart {
    seconds: u32,
}

#[derive(Debug, Eq, PartialEq, Clone, Copy, Ord, PartialOrd, Hash)]
pub struct PositiveDuration {
    pub(crate) seconds: u32,
}

impl PositiveDuration {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> PositiveDuration {
        let total_seconds = seconds + 60 * minutes + 60 * 60 * hours;
        PositiveDuration {
            seconds: total_seconds,
        }
    }

    pub const fn from_seconds(seconds: u32) -> PositiveDuration {
        PositiveDuration { seconds }
    }

    pub fn is_zero(&self) -> bool {
        self.seconds == 0
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.seconds)
    }
}

impl Display for PositiveDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hours = self.seconds / (60 * 60);
        let minutes_in_secs = self.seconds % (60 * 60);
        let minutes = minutes_in_secs / 60;
        let seconds = minutes_in_secs % 60;
        if hours != 0 {
            write!(f, "{}h{:02}m{:02}s", hours, minutes, seconds)
        } else if minutes != 0 {
            write!(f, "{}m{:02}s", minutes, seconds)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}

#[derive(Debug)]
pub struct DurationParseError(String);

impl Display for DurationParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unable to parse '{}' as a duration. The expected format is 'hh:mm:ss'.",
            self.0
        )
    }
}

impl std::error::Error for DurationParseError {}

impl FromStr for PositiveDuration {
    type Err = DurationParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut fields = text.split(':');
        let mut parse_field = || -> Result<u32, DurationParseError> {
            fields
                .next()
                .and_then(|field| u32::from_str(field).ok())
                .ok_or_else(|| DurationParseError(text.to_string()))
        };
        let hours = parse_field()?;
        let minutes = parse_field()?;
        let seconds = parse_field()?;
        if minutes >= 60 || seconds >= 60 {
            return Err(DurationParseError(text.to_string()));
        }
        Ok(PositiveDuration::from_hms(hours, minutes, seconds))
    }
}

impl Serialize for PositiveDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let hours = self.seconds / (60 * 60);
        let minutes = (self.seconds % (60 * 60)) / 60;
        let seconds = self.seconds % 60;
        serializer.serialize_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds))
    }
}

impl<'de> Deserialize<'de> for PositiveDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        PositiveDuration::from_str(&text).map_err(D::Error::custom)
    }
}

impl std::ops::Add for PositiveDuration {
    type Output = PositiveDuration;

    fn add(self, other: Self) -> Self::Output {
        PositiveDuration {
            seconds: self.seconds + other.seconds,
        }
    }
}

impl SecondsSinceDatasetUTCStart {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_seconds(seconds: u32) -> Self {
        Self { seconds }
    }

    pub fn total_seconds(&self) -> u32 {
        self.seconds
    }

    /// The timestamp of `datetime` relative to `dataset_start`, or None when
    /// `datetime` falls before `dataset_start` or more than `u32::MAX` seconds after it.
    pub fn from_naive_datetime(
        dataset_start: &NaiveDateTime,
        datetime: &NaiveDateTime,
    ) -> Option<Self> {
        let seconds_i64 = (*datetime - *dataset_start).num_seconds();
        let seconds = u32::try_from(seconds_i64).ok()?;
        Some(Self { seconds })
    }

    pub fn to_naive_datetime(self, dataset_start: &NaiveDateTime) -> NaiveDateTime {
        *dataset_start + chrono::Duration::seconds(i64::from(self.seconds))
    }

    pub fn checked_sub(self, duration: PositiveDuration) -> Option<Self> {
        let seconds = self.seconds.checked_sub(duration.seconds)?;
        Some(Self { seconds })
    }

    pub fn duration_since(self, earlier: Self) -> Option<PositiveDuration> {
        let seconds = self.seconds.checked_sub(earlier.seconds)?;
        Some(PositiveDuration { seconds })
    }
}

/// The (always positive) duration between two timestamps, whatever their order.
pub fn duration_between(
    a: SecondsSinceDatasetUTCStart,
    b: SecondsSinceDatasetUTCStart,
) -> PositiveDuration {
    let seconds = if a.seconds >= b.seconds {
        a.seconds - b.seconds
    } else {
        b.seconds - a.seconds
    };
    PositiveDuration { seconds }
}

impl std::ops::Add<PositiveDuration> for SecondsSinceDatasetUTCStart {
    type Output = Self;

    fn add(self, duration: PositiveDuration) -> Self::Output {
        Self {
            seconds: self.seconds.saturating_add(duration.seconds),
        }
    }
}

impl Display for SecondsSinceDatasetUTCStart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.seconds)
    }
}
