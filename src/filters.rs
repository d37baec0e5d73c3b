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

use crate::engine::pareto_front::ProfiledParetoFront;
use crate::journey::{JourneyArena, JourneyId};
use crate::metric::{Domination, Metric, MetricComparator};
use crate::time::SecondsSinceDatasetUTCStart;
use crate::transit_data::{Connection, StopId};

use std::collections::HashMap;

/// Rejects connections that provably cannot contribute anything to a scan.
///
/// A filter is only meaningful within the time window it was computed over;
/// `check_window` must be called by the consuming scan before the first
/// `can_be_taken`, and panics on misuse rather than returning wrong answers.
pub trait ConnectionFilter {
    /// Panics if the consuming scan's window is not contained in the window
    /// this filter was computed over, or if the producing scan never ran.
    fn check_window(
        &self,
        earliest_departure: SecondsSinceDatasetUTCStart,
        latest_arrival: SecondsSinceDatasetUTCStart,
    );

    /// True unless the connection can be skipped outright. Exact at the
    /// boundary : a connection whose relevant timestamp equals the bound
    /// must be accepted, ties favour correctness over pruning.
    fn can_be_taken(&self, connection: &Connection) -> bool;
}

/// Prunes connections against a previously computed reachability bound :
/// either the earliest arrival at each stop when scanning away from a point,
/// or the latest usable departure from each stop when scanning towards one.
pub struct IsochroneFilter {
    forward: bool,
    bounds: HashMap<StopId, SecondsSinceDatasetUTCStart>,
    earliest_departure: SecondsSinceDatasetUTCStart,
    latest_arrival: SecondsSinceDatasetUTCStart,
}

impl IsochroneFilter {
    /// `bounds` maps each reachable stop to its earliest arrival time.
    ///
    /// Panics on an empty profile : the producing scan has not run.
    pub fn forward(
        bounds: HashMap<StopId, SecondsSinceDatasetUTCStart>,
        earliest_departure: SecondsSinceDatasetUTCStart,
        latest_arrival: SecondsSinceDatasetUTCStart,
    ) -> Self {
        assert!(
            !bounds.is_empty(),
            "an isochrone filter needs the reachability profile of a scan that has run"
        );
        Self {
            forward: true,
            bounds,
            earliest_departure,
            latest_arrival,
        }
    }

    /// `bounds` maps each stop to the latest departure still reaching the
    /// destination.
    pub fn backward(
        bounds: HashMap<StopId, SecondsSinceDatasetUTCStart>,
        earliest_departure: SecondsSinceDatasetUTCStart,
        latest_arrival: SecondsSinceDatasetUTCStart,
    ) -> Self {
        assert!(
            !bounds.is_empty(),
            "an isochrone filter needs the reachability profile of a scan that has run"
        );
        Self {
            forward: false,
            bounds,
            earliest_departure,
            latest_arrival,
        }
    }
}

impl ConnectionFilter for IsochroneFilter {
    fn check_window(
        &self,
        earliest_departure: SecondsSinceDatasetUTCStart,
        latest_arrival: SecondsSinceDatasetUTCStart,
    ) {
        if earliest_departure < self.earliest_departure || latest_arrival > self.latest_arrival {
            panic!(
                "this isochrone filter was computed over [{}, {}] and cannot answer for [{}, {}]",
                self.earliest_departure, self.latest_arrival, earliest_departure, latest_arrival
            );
        }
    }

    fn can_be_taken(&self, connection: &Connection) -> bool {
        if self.forward {
            // can we be at the departure stop on time to board?
            match self.bounds.get(&connection.departure_stop) {
                Some(&earliest_arrival) => earliest_arrival <= connection.departure_time,
                None => false,
            }
        } else {
            // does debarking still leave a way to the destination?
            match self.bounds.get(&connection.arrival_stop) {
                Some(&latest_departure) => latest_departure >= connection.arrival_time(),
                None => false,
            }
        }
    }
}

/// Filters candidate journeys before they enter a Pareto frontier.
pub trait JourneyFilter<M: Metric> {
    fn can_be_taken_backwards(&self, arena: &JourneyArena<M>, journey: JourneyId) -> bool;
}

/// Caps the number of nodes of a journey, i.e. its number of legs plus one.
#[derive(Debug, Clone, Copy)]
pub struct MaxPartsFilter {
    max_parts: usize,
}

impl MaxPartsFilter {
    pub fn new(max_parts: usize) -> Self {
        Self { max_parts }
    }
}

impl<M: Metric> JourneyFilter<M> for MaxPartsFilter {
    fn can_be_taken_backwards(&self, arena: &JourneyArena<M>, journey: JourneyId) -> bool {
        arena.nb_of_parts(journey) <= self.max_parts
    }
}

/// Estimates the best any journey starting with a given connection could
/// still achieve, so the profiled scan can drop connections that provably
/// cannot produce a non-dominated result.
pub trait MetricGuesser<M: Metric, C: MetricComparator<M>> {
    fn can_improve(
        &self,
        arena: &mut JourneyArena<M>,
        comparator: &C,
        frontiers: &HashMap<StopId, ProfiledParetoFront>,
        connection: &Connection,
    ) -> bool;
}

/// Duels the best conceivable completion of a connection (ride it, then
/// finish instantly at no further cost) against the frontier of one tracked
/// stop, usually the request's departure stop. Any real journey through the
/// connection spans a wider window and accumulates at least as much metric,
/// so a strict loss of the ideal completion is a sound reason to prune.
/// A tie is not : ties favour correctness.
pub struct SimpleMetricGuesser {
    clean_stop: StopId,
}

impl SimpleMetricGuesser {
    pub fn new(clean_stop: StopId) -> Self {
        Self { clean_stop }
    }
}

impl<M: Metric, C: MetricComparator<M>> MetricGuesser<M, C> for SimpleMetricGuesser {
    fn can_improve(
        &self,
        arena: &mut JourneyArena<M>,
        comparator: &C,
        frontiers: &HashMap<StopId, ProfiledParetoFront>,
        connection: &Connection,
    ) -> bool {
        let front = match frontiers.get(&self.clean_stop) {
            Some(front) if !front.is_empty() => front,
            _ => return true,
        };
        let root = arena.single(connection.arrival_stop, connection.arrival_time());
        let ideal = arena.chain_backward(root, connection);
        let ideal_departure = connection.departure_time;
        let ideal_arrival = connection.arrival_time();
        for &guard in front.iter() {
            let guard_departure = arena.time(guard);
            let guard_arrival = arena.time(arena.root_of(guard));
            let guard_within_ideal =
                ideal_departure <= guard_departure && guard_arrival <= ideal_arrival;
            if guard_within_ideal
                && comparator.a_dominates_b(arena, guard, ideal) == Domination::AWins
            {
                return false;
            }
        }
        true
    }
}
