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

use crate::config::RequestParams;
use crate::metric::TransferCompare;
use crate::time::{PositiveDuration, SecondsSinceDatasetUTCStart};
use crate::transfer::{CrowFlyWalk, InternalTransfer, TransferProvider};
use crate::transit_data::{StopId, StopsData};

use std::fmt;
use tracing::warn;

/// The optimization profile of a request : how to transfer within a station,
/// how (and whether) to walk between stations, and how to compare journeys.
/// The metric itself needs no value here, its zero comes from the `Metric`
/// trait.
pub struct Profile<T, W, C> {
    pub transfer: T,
    pub walks: Option<W>,
    pub comparator: C,
}

impl<T, W, C> Profile<T, W, C>
where
    T: TransferProvider,
    W: TransferProvider,
{
    pub fn new(transfer: T, walks: Option<W>, comparator: C) -> Self {
        Self {
            transfer,
            walks,
            comparator,
        }
    }
}

/// The everyday profile : fixed-cost in-station transfers, crows-flight
/// walks, journeys compared on vehicles boarded and time in motion.
pub type DefaultProfile = Profile<InternalTransfer, CrowFlyWalk, TransferCompare>;

impl DefaultProfile {
    pub fn default_profile() -> Self {
        Self {
            transfer: InternalTransfer::default(),
            walks: Some(CrowFlyWalk::default()),
            comparator: TransferCompare,
        }
    }

    pub fn from_params(params: &RequestParams) -> Self {
        Self {
            transfer: InternalTransfer::new(params.transfer_duration),
            walks: Some(CrowFlyWalk::new(
                params.max_walk_distance,
                params.walking_speed,
            )),
            comparator: TransferCompare,
        }
    }
}

/// What the caller asks for : where to depart from, where to go, and the
/// time window. The fallback duration attached to each stop is extra
/// non-scheduled time spent before boarding anything there (departure side)
/// or after debarking (arrival side), e.g. the leg between the user's actual
/// address and the stop.
#[derive(Debug, Clone)]
pub struct RequestInput {
    pub earliest_departure: SecondsSinceDatasetUTCStart,
    pub latest_arrival: SecondsSinceDatasetUTCStart,
    pub departures: Vec<(StopId, PositiveDuration)>,
    pub arrivals: Vec<(StopId, PositiveDuration)>,
}

impl RequestInput {
    pub fn between(
        from: StopId,
        to: StopId,
        earliest_departure: SecondsSinceDatasetUTCStart,
        latest_arrival: SecondsSinceDatasetUTCStart,
    ) -> Self {
        Self {
            earliest_departure,
            latest_arrival,
            departures: vec![(from, PositiveDuration::zero())],
            arrivals: vec![(to, PositiveDuration::zero())],
        }
    }

    /// A window starting at `departure_datetime` and closing once the
    /// journey would exceed `max_journey_duration`.
    pub fn depart_after(
        from: StopId,
        to: StopId,
        departure_datetime: SecondsSinceDatasetUTCStart,
        max_journey_duration: PositiveDuration,
    ) -> Self {
        Self::between(
            from,
            to,
            departure_datetime,
            departure_datetime + max_journey_duration,
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum BadRequest {
    BadTimeWindow,
    NoValidDepartureStop,
    NoValidArrivalStop,
}

impl fmt::Display for BadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadRequest::BadTimeWindow => {
                write!(f, "The requested time window closes before it opens.")
            }
            BadRequest::NoValidDepartureStop => {
                write!(f, "No valid departure stop among the provided ones.")
            }
            BadRequest::NoValidArrivalStop => {
                write!(f, "No valid arrival stop among the provided ones.")
            }
        }
    }
}

impl std::error::Error for BadRequest {}

/// Keeps the stops a scan can actually work with. A stop without a usable
/// coordinate contributes nothing; it is logged and skipped, not an error.
pub(crate) fn usable_stops<Data: StopsData>(
    data: &Data,
    role: &str,
    stops: &[(StopId, PositiveDuration)],
) -> Vec<(StopId, PositiveDuration)> {
    stops
        .iter()
        .filter_map(|&(stop, fallback)| {
            if data.coord(stop).is_none() {
                warn!(
                    "The {} stop {} has no usable coordinate. I ignore it.",
                    role, stop
                );
                return None;
            }
            Some((stop, fallback))
        })
        .collect()
}

pub(crate) fn check_window(request: &RequestInput) -> Result<(), BadRequest> {
    if request.latest_arrival <= request.earliest_departure {
        return Err(BadRequest::BadTimeWindow);
    }
    Ok(())
}
