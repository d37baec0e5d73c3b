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

use crate::filters::ConnectionFilter;
use crate::journey::{JourneyArena, JourneyId, Move};
use crate::metric::{Metric, MetricComparator};
use crate::request::{check_window, usable_stops, BadRequest, Profile, RequestInput};
use crate::response::Response;
use crate::time::{PositiveDuration, SecondsSinceDatasetUTCStart};
use crate::transfer::TransferProvider;
use crate::transit_data::{Connection, ConnectionsIter, StopId, StopsData, TripId};

use std::collections::HashMap;
use std::iter::Peekable;
use tracing::debug;

/// Forward connection scan : the single journey arriving earliest at any of
/// the requested targets, departing no earlier than the window start.
///
/// Connections are consumed in batches of equal departure timestamp; within
/// a batch every connection is integrated against the pre-batch state, so
/// tied departures cannot interfere with each other. The scan stops as soon
/// as no later batch can still improve the best target arrival.
///
/// Running the scan also computes, as a side effect, the earliest arrival at
/// every touched stop. With `calculate_journey_with_profile` this reachability
/// profile is extended past convergence and the scan becomes usable as a
/// `ConnectionFilter` for a later profiled scan.
pub struct EarliestArrivalScan<'a, Data, M, T, W, C>
where
    Data: for<'d> ConnectionsIter<'d> + StopsData,
    M: Metric,
    T: TransferProvider,
    W: TransferProvider,
    C: MetricComparator<M>,
{
    data: &'a Data,
    profile: &'a Profile<T, W, C>,
    arena: JourneyArena<M>,
    // the journey arriving as early as possible, per stop
    best_by_stop: HashMap<StopId, JourneyId>,
    // where we are on each trip, so that staying seated needs no transfer
    onboard_by_trip: HashMap<TripId, JourneyId>,
    departures: Vec<(StopId, PositiveDuration)>,
    arrivals: Vec<(StopId, PositiveDuration)>,
    earliest_departure: SecondsSinceDatasetUTCStart,
    latest_arrival: SecondsSinceDatasetUTCStart,
    // how far the reachability profile is reliable, once built
    filter_end: Option<SecondsSinceDatasetUTCStart>,
    has_run: bool,
}

impl<'a, Data, M, T, W, C> EarliestArrivalScan<'a, Data, M, T, W, C>
where
    Data: for<'d> ConnectionsIter<'d> + StopsData,
    M: Metric,
    T: TransferProvider,
    W: TransferProvider,
    C: MetricComparator<M>,
{
    pub fn new(
        data: &'a Data,
        request: &RequestInput,
        profile: &'a Profile<T, W, C>,
    ) -> Result<Self, BadRequest> {
        check_window(request)?;
        let departures = usable_stops(data, "departure", &request.departures);
        if departures.is_empty() {
            return Err(BadRequest::NoValidDepartureStop);
        }
        let arrivals = usable_stops(data, "arrival", &request.arrivals);
        if arrivals.is_empty() {
            return Err(BadRequest::NoValidArrivalStop);
        }

        let mut scan = Self {
            data,
            profile,
            arena: JourneyArena::new(),
            best_by_stop: HashMap::new(),
            onboard_by_trip: HashMap::new(),
            departures,
            arrivals,
            earliest_departure: request.earliest_departure,
            latest_arrival: request.latest_arrival,
            filter_end: None,
            has_run: false,
        };
        scan.seed();
        Ok(scan)
    }

    fn seed(&mut self) {
        let departures = self.departures.clone();
        let mut seeded = Vec::new();
        for (stop, fallback) in departures {
            let root = self.arena.single(stop, self.earliest_departure);
            let journey = if fallback.is_zero() {
                root
            } else {
                self.arena.chain_special(
                    root,
                    Move::OtherMode,
                    stop,
                    self.earliest_departure + fallback,
                    None,
                )
            };
            let time = self.arena.time(journey);
            let keep = self
                .best_by_stop
                .get(&stop)
                .is_none_or(|&existing| time < self.arena.time(existing));
            if keep {
                self.best_by_stop.insert(stop, journey);
                seeded.push(stop);
            }
        }
        // the journey may start with a walk to a nearby stop
        self.walk_away_from(&seeded);
    }

    /// The earliest-arrival journey, or None when no target is reachable
    /// within the window. No route is a perfectly valid answer, not an error.
    pub fn earliest_arrival_journey(&mut self) -> Option<JourneyId> {
        self.calculate_journey(None)
    }

    /// Like `earliest_arrival_journey`, but keeps scanning past convergence
    /// until `dep_arrival_to_timeout(journey departure, journey arrival)`,
    /// building a reachability profile a profiled scan can prune with.
    pub fn calculate_journey_with_profile(
        &mut self,
        dep_arrival_to_timeout: &dyn Fn(
            SecondsSinceDatasetUTCStart,
            SecondsSinceDatasetUTCStart,
        ) -> SecondsSinceDatasetUTCStart,
    ) -> Option<JourneyId> {
        self.calculate_journey(Some(dep_arrival_to_timeout))
    }

    fn calculate_journey(
        &mut self,
        dep_arrival_to_timeout: Option<
            &dyn Fn(
                SecondsSinceDatasetUTCStart,
                SecondsSinceDatasetUTCStart,
            ) -> SecondsSinceDatasetUTCStart,
        >,
    ) -> Option<JourneyId> {
        self.has_run = true;
        let data = self.data;
        let mut connections = data.connections_after(self.earliest_departure).peekable();

        let mut last_departure = self.latest_arrival;
        loop {
            let next_departure = match connections.peek() {
                Some(connection) => connection.departure_time,
                None => break,
            };
            if next_departure > last_departure {
                // no later connection can still improve the answer
                break;
            }
            self.integrate_batch(&mut connections);
            if let Some((best_time, _)) = self.best_time_at_targets() {
                last_departure = last_departure.min(best_time);
            }
        }

        let (arrival_time, target, fallback) = self.best_time_at_targets().map(
            |(time, (stop, fallback))| (time, stop, fallback),
        )?;
        let mut journey = self.best_by_stop[&target];
        if !fallback.is_zero() {
            journey = self
                .arena
                .chain_special(journey, Move::OtherMode, target, arrival_time, None);
        }

        if let Some(timeout) = dep_arrival_to_timeout {
            // the caller wants the reachability profile : keep scanning
            let end = timeout(
                self.arena.departure_time(journey),
                self.arena.arrival_time(journey),
            );
            self.filter_end = Some(end);
            while let Some(connection) = connections.peek() {
                if connection.departure_time >= end {
                    break;
                }
                self.integrate_batch(&mut connections);
            }
        }

        debug!(
            "earliest-arrival scan reached {} at {}",
            target, arrival_time
        );
        Some(journey)
    }

    /// Scans the whole window regardless of the targets and returns nothing :
    /// afterwards `earliest_arrival_times` holds the full isochrone and the
    /// scan is usable as a connection filter over the window.
    pub fn calculate_reachable(&mut self) {
        self.has_run = true;
        let data = self.data;
        let mut connections = data.connections_after(self.earliest_departure).peekable();
        while let Some(connection) = connections.peek() {
            if connection.departure_time > self.latest_arrival {
                break;
            }
            self.integrate_batch(&mut connections);
        }
        self.filter_end = Some(self.latest_arrival);
    }

    /// Earliest arrival per touched stop, reliable up to the latest scanned
    /// departure.
    pub fn earliest_arrival_times(&self) -> HashMap<StopId, SecondsSinceDatasetUTCStart> {
        self.best_by_stop
            .iter()
            .map(|(&stop, &journey)| (stop, self.arena.time(journey)))
            .collect()
    }

    pub fn arena(&self) -> &JourneyArena<M> {
        &self.arena
    }

    pub fn response(&self, journey: JourneyId) -> Response<M> {
        Response::from_journey(&self.arena, journey)
    }

    /// One-stop shop : run the scan and unfold the winning journey.
    pub fn solve(&mut self) -> Option<Response<M>> {
        let journey = self.earliest_arrival_journey()?;
        Some(self.response(journey))
    }

    /// Integrates every connection of the next equal-departure-time batch.
    /// Improvements are recorded against the pre-batch state and applied
    /// once the batch is exhausted, then walks fan out from improved stops.
    fn integrate_batch<I>(&mut self, connections: &mut Peekable<I>)
    where
        I: Iterator<Item = &'a Connection>,
    {
        let batch_time = match connections.peek() {
            Some(connection) => connection.departure_time,
            None => return,
        };
        let mut batch_arrivals: HashMap<StopId, JourneyId> = HashMap::new();
        while let Some(&connection) = connections.peek() {
            if connection.departure_time != batch_time {
                break;
            }
            self.integrate_connection(connection, &mut batch_arrivals);
            connections.next();
        }

        let mut improved = Vec::new();
        for (stop, journey) in batch_arrivals {
            let time = self.arena.time(journey);
            let better = self
                .best_by_stop
                .get(&stop)
                .is_none_or(|&existing| time < self.arena.time(existing));
            if better {
                self.best_by_stop.insert(stop, journey);
                improved.push(stop);
            }
        }
        self.walk_away_from(&improved);
    }

    fn integrate_connection(
        &mut self,
        connection: &Connection,
        batch_arrivals: &mut HashMap<StopId, JourneyId>,
    ) {
        let data = self.data;
        if data.coord(connection.departure_stop).is_none()
            || data.coord(connection.arrival_stop).is_none()
        {
            // endpoints without coordinates contribute nothing
            return;
        }

        let onboard = self.onboard_by_trip.get(&connection.trip).copied();
        let at_departure = self.best_by_stop.get(&connection.departure_stop).copied();

        let reachable_in_time = at_departure
            .is_some_and(|journey| self.arena.time(journey) <= connection.departure_time);
        if !reachable_in_time && onboard.is_none() {
            // the connection already left before we can make it to the stop
            return;
        }

        // candidate 1 : board at the departure stop
        let boarded = match at_departure {
            Some(journey) if reachable_in_time => {
                if self.arena.last_trip(journey) == Some(connection.trip) {
                    // same vehicle : no transfer needed
                    Some(self.arena.chain_forward(journey, connection))
                } else if connection.flow.can_board() {
                    self.departure_transfer(journey, connection)
                        .map(|transferred| self.arena.chain_forward(transferred, connection))
                } else {
                    None
                }
            }
            _ => None,
        };

        // candidate 2 : stay seated on an already boarded trip
        let seated = match onboard {
            Some(onboard) => {
                let extended = self.arena.chain_forward(onboard, connection);
                self.onboard_by_trip.insert(connection.trip, extended);
                Some(extended)
            }
            None => {
                // first encounter of this trip : remember the boarding
                if let Some(boarded) = boarded {
                    self.onboard_by_trip.insert(connection.trip, boarded);
                }
                None
            }
        };

        if !connection.flow.can_debark() {
            // we may keep riding, but this arrival is unusable
            return;
        }

        let candidate = match (boarded, seated) {
            (None, None) => return,
            (Some(journey), None) | (None, Some(journey)) => journey,
            (Some(first), Some(second)) => {
                if self.arena.time(second) < self.arena.time(first) {
                    second
                } else {
                    first
                }
            }
        };

        let candidate_time = self.arena.time(candidate);
        let entry = batch_arrivals
            .entry(connection.arrival_stop)
            .or_insert(candidate);
        if candidate_time < self.arena.time(*entry) {
            *entry = candidate;
        }
    }

    /// The journey prolonged up to the departure stop of `connection`,
    /// transfer included when the traveller is stepping off a vehicle.
    fn departure_transfer(
        &mut self,
        journey: JourneyId,
        connection: &Connection,
    ) -> Option<JourneyId> {
        if !self.arena.ends_with_vehicle(journey) {
            // coming from the origin or from a walk : board directly
            return Some(journey);
        }
        let stops: &dyn StopsData = self.data;
        let duration = self.profile.transfer.time_between(
            stops,
            self.arena.stop(journey),
            connection.departure_stop,
        )?;
        let transfer_end = self.arena.time(journey) + duration;
        if transfer_end > connection.departure_time {
            return None;
        }
        Some(self.arena.chain_special(
            journey,
            Move::Transfer,
            connection.departure_stop,
            transfer_end,
            None,
        ))
    }

    /// Walks from every improved stop towards its neighbourhood, keeping
    /// arrivals that beat the current best.
    fn walk_away_from(&mut self, improved: &[StopId]) {
        let data = self.data;
        let profile = self.profile;
        let walks = match profile.walks.as_ref() {
            Some(walks) => walks,
            None => return,
        };
        for &stop in improved {
            let journey = match self.best_by_stop.get(&stop) {
                Some(&journey) => journey,
                None => continue,
            };
            let center = match data.coord(stop) {
                Some(center) => center,
                None => continue,
            };
            let neighbours: Vec<StopId> = data
                .stops_in_range(center, walks.range())
                .into_iter()
                .filter(|&neighbour| neighbour != stop)
                .collect();
            if neighbours.is_empty() {
                continue;
            }
            let stops: &dyn StopsData = data;
            let times = walks.times_between(stops, stop, &neighbours);
            for (neighbour, duration) in times {
                let walked_time = self.arena.time(journey) + duration;
                if walked_time > self.latest_arrival {
                    continue;
                }
                let better = self
                    .best_by_stop
                    .get(&neighbour)
                    .is_none_or(|&existing| walked_time < self.arena.time(existing));
                if better {
                    let walked = self.arena.chain_special(
                        journey,
                        Move::Walk,
                        neighbour,
                        walked_time,
                        None,
                    );
                    self.best_by_stop.insert(neighbour, walked);
                }
            }
        }
    }

    /// The earliest completed arrival over all targets, fallbacks included,
    /// with the winning target. The first target wins ties.
    fn best_time_at_targets(
        &self,
    ) -> Option<(SecondsSinceDatasetUTCStart, (StopId, PositiveDuration))> {
        let mut best: Option<(SecondsSinceDatasetUTCStart, (StopId, PositiveDuration))> = None;
        for &(stop, fallback) in &self.arrivals {
            let journey = match self.best_by_stop.get(&stop) {
                Some(&journey) => journey,
                None => continue,
            };
            let arrival = self.arena.time(journey) + fallback;
            let improves = best.is_none_or(|(best_time, _)| arrival < best_time);
            if improves {
                best = Some((arrival, (stop, fallback)));
            }
        }
        best
    }
}

impl<Data, M, T, W, C> ConnectionFilter for EarliestArrivalScan<'_, Data, M, T, W, C>
where
    Data: for<'d> ConnectionsIter<'d> + StopsData,
    M: Metric,
    T: TransferProvider,
    W: TransferProvider,
    C: MetricComparator<M>,
{
    fn check_window(
        &self,
        earliest_departure: SecondsSinceDatasetUTCStart,
        latest_arrival: SecondsSinceDatasetUTCStart,
    ) {
        if !self.has_run {
            panic!("this earliest-arrival scan cannot be used as a connection filter, it has not run yet");
        }
        if earliest_departure < self.earliest_departure {
            panic!(
                "this earliest-arrival scan cannot answer for connections before {}, \
                 the requesting algorithm asks from {}",
                self.earliest_departure, earliest_departure
            );
        }
        match self.filter_end {
            None => panic!(
                "this earliest-arrival scan did not build a reachability profile, \
                 run it with a departure/arrival timeout first"
            ),
            Some(end) if latest_arrival > end => panic!(
                "this earliest-arrival scan is only reliable up to {}, \
                 the requesting algorithm asks until {}",
                end, latest_arrival
            ),
            Some(_) => {}
        }
    }

    fn can_be_taken(&self, connection: &Connection) -> bool {
        // a trip we boarded somewhere can be ridden through stops the
        // arrival map never records (e.g. no-debark calls)
        if self.onboard_by_trip.contains_key(&connection.trip) {
            return true;
        }
        // otherwise : can we realistically be at the departure stop before it leaves?
        match self.best_by_stop.get(&connection.departure_stop) {
            Some(&journey) => self.arena.time(journey) <= connection.departure_time,
            None => false,
        }
    }
}
