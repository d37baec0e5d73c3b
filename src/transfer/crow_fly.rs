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

use super::TransferProvider;
use crate::geometry::distance_coord_to_coord;
use crate::time::PositiveDuration;
use crate::transit_data::{StopId, StopsData};

pub const DEFAULT_MAX_WALK_DISTANCE: f64 = 500.0; // meters
pub const DEFAULT_WALKING_SPEED: f64 = 1.4; // meters per second

/// Walks between two distinct stops, priced by straight-line distance.
/// Pairs farther apart than `max_distance` and same-stop pairs are
/// unreachable : staying put is the internal transfer provider's business.
#[derive(Debug, Clone, Copy)]
pub struct CrowFlyWalk {
    max_distance: f64,
    speed: f64,
}

impl CrowFlyWalk {
    /// `max_distance` in meters, `speed` in meters per second.
    pub fn new(max_distance: f64, speed: f64) -> Self {
        debug_assert!(speed > 0.0);
        Self {
            max_distance,
            speed,
        }
    }
}

impl Default for CrowFlyWalk {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_WALK_DISTANCE,
            speed: DEFAULT_WALKING_SPEED,
        }
    }
}

impl TransferProvider for CrowFlyWalk {
    fn time_between(
        &self,
        stops: &dyn StopsData,
        from: StopId,
        to: StopId,
    ) -> Option<PositiveDuration> {
        if from == to {
            return None;
        }
        let from_coord = stops.coord(from)?;
        let to_coord = stops.coord(to)?;
        let distance = distance_coord_to_coord(&from_coord, &to_coord);
        if distance > self.max_distance {
            return None;
        }
        // never pretend to arrive earlier than the distance allows
        let seconds = (distance / self.speed).ceil() as u32;
        Some(PositiveDuration::from_seconds(seconds))
    }

    fn range(&self) -> f64 {
        self.max_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit_data::TransitDataBuilder;

    #[test]
    fn walk_rejects_same_stop_and_out_of_range_pairs() {
        let mut builder = TransitDataBuilder::new();
        let a = builder.add_stop(48.85, 2.35);
        let near = builder.add_stop(48.8502, 2.3503);
        let far = builder.add_stop(50.0, 3.0);
        let data = builder.build();

        let walk = CrowFlyWalk::default();
        assert_eq!(walk.time_between(&data, a, a), None);
        assert_eq!(walk.time_between(&data, a, far), None);

        let duration = walk.time_between(&data, a, near).unwrap();
        assert!(duration > PositiveDuration::zero());
        // ~31m away, at 1.4 m/s that stays well under a minute
        assert!(duration < PositiveDuration::from_seconds(60));
    }

    #[test]
    fn walk_needs_coordinates_on_both_sides() {
        let mut builder = TransitDataBuilder::new();
        let a = builder.add_stop(48.85, 2.35);
        let no_coord = builder.add_stop_without_coord();
        let data = builder.build();

        let walk = CrowFlyWalk::default();
        assert_eq!(walk.time_between(&data, a, no_coord), None);
        assert_eq!(walk.time_between(&data, no_coord, a), None);
    }
}
