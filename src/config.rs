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

use crate::time::PositiveDuration;

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestParams {
    /// time needed to change vehicles within a station
    #[serde(default = "default_transfer_duration")]
    pub transfer_duration: PositiveDuration,

    /// maximum crows-flight walking distance between two stops, in meters
    #[serde(default = "default_max_walk_distance")]
    pub max_walk_distance: f64,

    /// walking speed, in meters per second
    #[serde(default = "default_walking_speed")]
    pub walking_speed: f64,

    /// maximum duration of a journey
    #[serde(default = "default_max_journey_duration")]
    pub max_journey_duration: PositiveDuration,
}

pub const DEFAULT_TRANSFER_DURATION: &str = "00:03:00";
pub const DEFAULT_MAX_WALK_DISTANCE: f64 = 500.0;
pub const DEFAULT_WALKING_SPEED: f64 = 1.4;
pub const DEFAULT_MAX_JOURNEY_DURATION: &str = "24:00:00";

pub fn default_transfer_duration() -> PositiveDuration {
    PositiveDuration::from_str(DEFAULT_TRANSFER_DURATION).unwrap()
}

pub fn default_max_walk_distance() -> f64 {
    DEFAULT_MAX_WALK_DISTANCE
}

pub fn default_walking_speed() -> f64 {
    DEFAULT_WALKING_SPEED
}

pub fn default_max_journey_duration() -> PositiveDuration {
    PositiveDuration::from_str(DEFAULT_MAX_JOURNEY_DURATION).unwrap()
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            transfer_duration: default_transfer_duration(),
            max_walk_distance: DEFAULT_MAX_WALK_DISTANCE,
            walking_speed: DEFAULT_WALKING_SPEED,
            max_journey_duration: default_max_journey_duration(),
        }
    }
}

impl Display for RequestParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "--transfer_duration {} --max_walk_distance {} --walking_speed {} --max_journey_duration {}",
            self.transfer_duration,
            self.max_walk_distance,
            self.walking_speed,
            self.max_journey_duration
        )
    }
}
