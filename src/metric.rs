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

use crate::journey::{JourneyArena, JourneyId, Leg, Move};
use crate::time::PositiveDuration;
use crate::transit_data::StopId;

use std::cmp::Ordering;
use std::collections::HashMap;

/// An accumulator of comparison statistics along a journey.
///
/// `add` must never mutate in place, and the accumulated value must be
/// monotonically non-decreasing along the legs of a journey : the scans'
/// early-termination arguments rely on it.
pub trait Metric: Clone + std::fmt::Debug {
    fn zero() -> Self;

    #[must_use]
    fn add(&self, leg: &Leg) -> Self;
}

/// Outcome of a dominance duel between two journeys.
///
/// The closed set of outcomes is the whole contract : a comparator cannot
/// return anything else, so the "out of domain duel result" failure mode of
/// integer-coded protocols cannot occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domination {
    AWins,
    BWins,
    Tied,
    Incomparable,
}

/// Compares two journeys on their accumulated metric. Comparators may also
/// look at the journeys themselves (e.g. to break ties on the stations
/// passed through), which is why they receive the arena and not the metrics.
pub trait MetricComparator<M: Metric> {
    fn a_dominates_b(&self, arena: &JourneyArena<M>, a: JourneyId, b: JourneyId) -> Domination;
}

/// The default journey statistics : total walking time, total time in
/// motion, and the number of vehicles boarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferMetric {
    pub walking_time: PositiveDuration,
    pub travel_time: PositiveDuration,
    pub nb_of_vehicles: u32,
}

impl Metric for TransferMetric {
    fn zero() -> Self {
        Self {
            walking_time: PositiveDuration::zero(),
            travel_time: PositiveDuration::zero(),
            nb_of_vehicles: 0,
        }
    }

    fn add(&self, leg: &Leg) -> Self {
        let mut result = self.clone();
        match leg.mov {
            Move::Scheduled(_) => {
                result.travel_time = result.travel_time + leg.duration;
                if leg.boarding {
                    result.nb_of_vehicles += 1;
                }
            }
            Move::Walk | Move::OtherMode => {
                result.walking_time = result.walking_time + leg.duration;
                result.travel_time = result.travel_time + leg.duration;
            }
            // waiting inside a station moves nobody
            Move::Transfer => {}
        }
        result
    }
}

/// Pareto comparison of `TransferMetric`s over (vehicles boarded, time in
/// motion). Journey times are not compared here : the frontier handles the
/// time window itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferCompare;

impl MetricComparator<TransferMetric> for TransferCompare {
    fn a_dominates_b(
        &self,
        arena: &JourneyArena<TransferMetric>,
        a: JourneyId,
        b: JourneyId,
    ) -> Domination {
        let metric_a = arena.metric(a);
        let metric_b = arena.metric(b);
        let vehicles = metric_a.nb_of_vehicles.cmp(&metric_b.nb_of_vehicles);
        let travel = metric_a.travel_time.cmp(&metric_b.travel_time);
        match (vehicles, travel) {
            (Ordering::Equal, Ordering::Equal) => Domination::Tied,
            (Ordering::Greater, Ordering::Less) | (Ordering::Less, Ordering::Greater) => {
                Domination::Incomparable
            }
            (Ordering::Less, _) | (_, Ordering::Less) => Domination::AWins,
            _ => Domination::BWins,
        }
    }
}

/// The pragmatic statistics : minimize walking, then time seated in a
/// vehicle, and between journeys doing equally well, prefer the one whose
/// tightest transfer leaves the most slack. Meant to weed out equivalent
/// journeys after a profiled scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravellingTimeMinimizer {
    pub walking_time: PositiveDuration,
    pub in_vehicle_time: PositiveDuration,
    // None while the journey has no transfer at all
    pub smallest_transfer: Option<PositiveDuration>,
}

impl Metric for TravellingTimeMinimizer {
    fn zero() -> Self {
        Self {
            walking_time: PositiveDuration::zero(),
            in_vehicle_time: PositiveDuration::zero(),
            smallest_transfer: None,
        }
    }

    fn add(&self, leg: &Leg) -> Self {
        let mut result = self.clone();
        match leg.mov {
            Move::Scheduled(_) => {
                result.in_vehicle_time = result.in_vehicle_time + leg.duration;
            }
            Move::Walk | Move::OtherMode => {
                result.walking_time = result.walking_time + leg.duration;
            }
            Move::Transfer => {
                result.smallest_transfer = Some(match result.smallest_transfer {
                    Some(smallest) => smallest.min(leg.duration),
                    None => leg.duration,
                });
            }
        }
        result
    }
}

/// Total-order comparator for `TravellingTimeMinimizer`. Optionally breaks
/// remaining ties by the importance of the stations passed through : bigger
/// interchange stations usually have better facilities, so between otherwise
/// identical journeys the one transferring there wins.
#[derive(Debug, Clone, Default)]
pub struct TravellingTimeCompare {
    station_importances: Option<HashMap<StopId, u32>>,
}

impl TravellingTimeCompare {
    pub fn new() -> Self {
        Self {
            station_importances: None,
        }
    }

    pub fn with_importances(station_importances: HashMap<StopId, u32>) -> Self {
        Self {
            station_importances: Some(station_importances),
        }
    }

    /// Walks both journeys node by node and sums the importance differences.
    /// Positive means `b` passes through more important stations.
    fn compare_stations(
        &self,
        arena: &JourneyArena<TravellingTimeMinimizer>,
        a: JourneyId,
        b: JourneyId,
    ) -> i64 {
        let importances = match &self.station_importances {
            Some(importances) => importances,
            None => return 0,
        };
        let importance_of = |stop: StopId| -> i64 {
            importances.get(&stop).copied().unwrap_or(0).into()
        };
        let mut sum = 0;
        let mut current_a = Some(a);
        let mut current_b = Some(b);
        while let (Some(id_a), Some(id_b)) = (current_a, current_b) {
            sum += importance_of(arena.stop(id_b)) - importance_of(arena.stop(id_a));
            current_a = arena.previous(id_a);
            current_b = arena.previous(id_b);
        }
        sum
    }
}

impl MetricComparator<TravellingTimeMinimizer> for TravellingTimeCompare {
    fn a_dominates_b(
        &self,
        arena: &JourneyArena<TravellingTimeMinimizer>,
        a: JourneyId,
        b: JourneyId,
    ) -> Domination {
        let metric_a = arena.metric(a);
        let metric_b = arena.metric(b);

        if metric_a.walking_time != metric_b.walking_time {
            return if metric_a.walking_time < metric_b.walking_time {
                Domination::AWins
            } else {
                Domination::BWins
            };
        }
        if metric_a.in_vehicle_time != metric_b.in_vehicle_time {
            return if metric_a.in_vehicle_time < metric_b.in_vehicle_time {
                Domination::AWins
            } else {
                Domination::BWins
            };
        }
        if metric_a.smallest_transfer != metric_b.smallest_transfer {
            // to be maximized; a journey without any transfer is best of all
            let slack = |smallest: Option<PositiveDuration>| {
                smallest.map_or(u64::MAX, |duration| duration.total_seconds())
            };
            return if slack(metric_a.smallest_transfer) > slack(metric_b.smallest_transfer) {
                Domination::AWins
            } else {
                Domination::BWins
            };
        }
        match self.compare_stations(arena, a, b) {
            sum if sum < 0 => Domination::AWins,
            sum if sum > 0 => Domination::BWins,
            _ => Domination::Tied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SecondsSinceDatasetUTCStart;
    use crate::transit_data::{Connection, ConnectionId, FlowDirection, TripId};

    fn seconds(s: u32) -> SecondsSinceDatasetUTCStart {
        SecondsSinceDatasetUTCStart::from_seconds(s)
    }

    fn stop(local: u32) -> StopId {
        StopId { tile: 0, local }
    }

    fn connection(local: u32, from: u32, to: u32, dep: u32, travel: u32, trip: u32) -> Connection {
        Connection {
            id: ConnectionId { dataset: 0, local },
            departure_stop: stop(from),
            arrival_stop: stop(to),
            departure_time: seconds(dep),
            travel_time: PositiveDuration::from_seconds(travel),
            trip: TripId {
                dataset: 0,
                local: trip,
            },
            flow: FlowDirection::BoardAndDebark,
        }
    }

    #[test]
    fn transfer_metric_accumulates_walks_and_vehicles() {
        let mut arena = JourneyArena::<TransferMetric>::new();
        let root = arena.single(stop(0), seconds(0));
        let walking = arena.chain_special(root, Move::Walk, stop(1), seconds(100), None);
        let first = connection(0, 1, 2, 200, 600, 0);
        let riding = arena.chain_forward(walking, &first);
        let transferring =
            arena.chain_special(riding, Move::Transfer, stop(2), seconds(980), None);
        let second = connection(1, 2, 3, 1000, 300, 1);
        let journey = arena.chain_forward(transferring, &second);

        let metric = arena.metric(journey);
        assert_eq!(metric.walking_time, PositiveDuration::from_seconds(100));
        assert_eq!(metric.travel_time, PositiveDuration::from_seconds(1000));
        assert_eq!(metric.nb_of_vehicles, 2);
    }

    #[test]
    fn staying_on_the_same_trip_counts_one_vehicle() {
        let mut arena = JourneyArena::<TransferMetric>::new();
        let root = arena.single(stop(0), seconds(0));
        let first = connection(0, 0, 1, 100, 60, 4);
        let second = connection(1, 1, 2, 200, 60, 4);
        let riding = arena.chain_forward(root, &first);
        let journey = arena.chain_forward(riding, &second);
        assert_eq!(arena.metric(journey).nb_of_vehicles, 1);
    }

    #[test]
    fn transfer_compare_partial_order() {
        let mut arena = JourneyArena::<TransferMetric>::new();
        let root = arena.single(stop(0), seconds(0));
        // one vehicle, 600s
        let slow_direct = arena.chain_forward(root, &connection(0, 0, 1, 0, 600, 0));
        // one vehicle, 300s : dominates slow_direct
        let root2 = arena.single(stop(0), seconds(0));
        let fast_direct = arena.chain_forward(root2, &connection(1, 0, 1, 0, 300, 1));
        // two vehicles, 200s total : incomparable with slow_direct
        let root3 = arena.single(stop(0), seconds(0));
        let first = arena.chain_forward(root3, &connection(2, 0, 2, 0, 100, 2));
        let two_legs = arena.chain_forward(first, &connection(3, 2, 1, 200, 100, 3));

        let comparator = TransferCompare;
        assert_eq!(
            comparator.a_dominates_b(&arena, fast_direct, slow_direct),
            Domination::AWins
        );
        assert_eq!(
            comparator.a_dominates_b(&arena, slow_direct, fast_direct),
            Domination::BWins
        );
        assert_eq!(
            comparator.a_dominates_b(&arena, slow_direct, two_legs),
            Domination::Incomparable
        );
        assert_eq!(
            comparator.a_dominates_b(&arena, slow_direct, slow_direct),
            Domination::Tied
        );
    }

    #[test]
    fn travelling_time_minimizer_prefers_larger_smallest_transfer() {
        let mut arena = JourneyArena::<TravellingTimeMinimizer>::new();

        let build = |arena: &mut JourneyArena<TravellingTimeMinimizer>, slack: u32| {
            let root = arena.single(stop(0), seconds(0));
            let riding = arena.chain_forward(root, &connection(0, 0, 1, 0, 100, 0));
            let transferring = arena.chain_special(
                riding,
                Move::Transfer,
                stop(1),
                seconds(100 + slack),
                None,
            );
            arena.chain_forward(transferring, &connection(1, 1, 2, 600, 100, 1))
        };
        let tight = build(&mut arena, 120);
        let comfortable = build(&mut arena, 360);

        let comparator = TravellingTimeCompare::new();
        assert_eq!(
            comparator.a_dominates_b(&arena, comfortable, tight),
            Domination::AWins
        );
    }

    #[test]
    fn station_importance_breaks_remaining_ties() {
        let mut arena = JourneyArena::<TravellingTimeMinimizer>::new();
        let via_small = {
            let root = arena.single(stop(0), seconds(0));
            arena.chain_forward(root, &connection(0, 0, 1, 0, 100, 0))
        };
        let via_big = {
            let root = arena.single(stop(0), seconds(0));
            arena.chain_forward(root, &connection(1, 0, 2, 0, 100, 1))
        };

        let mut importances = HashMap::new();
        importances.insert(stop(1), 1);
        importances.insert(stop(2), 10);
        let comparator = TravellingTimeCompare::with_importances(importances);
        assert_eq!(
            comparator.a_dominates_b(&arena, via_big, via_small),
            Domination::AWins
        );
        assert_eq!(
            comparator.a_dominates_b(&arena, via_small, via_big),
            Domination::BWins
        );
    }
}
