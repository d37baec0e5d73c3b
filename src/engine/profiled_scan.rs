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
use crate::filters::{ConnectionFilter, JourneyFilter, MetricGuesser};
use crate::journey::{JourneyArena, JourneyId, Move};
use crate::metric::{Metric, MetricComparator};
use crate::request::{check_window, usable_stops, BadRequest, Profile, RequestInput};
use crate::response::Response;
use crate::time::{PositiveDuration, SecondsSinceDatasetUTCStart};
use crate::transfer::TransferProvider;
use crate::transit_data::{Connection, ConnectionsIter, StopId, StopsData, TripId};

use std::collections::HashMap;
use tracing::debug;

/// How a stop relates to one of the requested endpoints : directly (no walk)
/// or through a walk of the given duration, plus the endpoint's fallback.
#[derive(Debug, Clone)]
struct EndpointLink {
    endpoint: StopId,
    walk: Option<PositiveDuration>,
    fallback: PositiveDuration,
}

/// Backward connection scan : every Pareto-optimal journey (by the profile's
/// comparator) departing within the window and arriving no later than its
/// end.
///
/// Connections are consumed in decreasing departure time, batched by equal
/// timestamp; candidate journeys are built against the pre-batch frontiers
/// and inserted once the batch is exhausted, so tied departures cannot
/// interfere with each other. Per stop, a time-aware Pareto frontier holds
/// the non-dominated partial journeys towards the targets; per trip, a
/// frontier of onboard journeys models staying seated, mirroring the
/// earliest-arrival scan.
pub struct ProfiledConnectionScan<'a, Data, M, T, W, C>
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
    stop_fronts: HashMap<StopId, ProfiledParetoFront>,
    trip_fronts: HashMap<TripId, ProfiledParetoFront>,
    // the answer : non-dominated journeys over the departure stop set
    source_front: ProfiledParetoFront,
    earliest_departure: SecondsSinceDatasetUTCStart,
    latest_arrival: SecondsSinceDatasetUTCStart,
    // stop -> ways to finish the journey from there
    target_links: HashMap<StopId, Vec<EndpointLink>>,
    // stop -> ways to have started the journey there
    source_links: HashMap<StopId, Vec<EndpointLink>>,
    connection_filter: Option<&'a dyn ConnectionFilter>,
    metric_guesser: Option<&'a dyn MetricGuesser<M, C>>,
    journey_filter: Option<&'a dyn JourneyFilter<M>>,
}

impl<'a, Data, M, T, W, C> ProfiledConnectionScan<'a, Data, M, T, W, C>
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

        let target_links = endpoint_links(data, profile, &arrivals, Direction::TowardsEndpoint);
        let source_links = endpoint_links(data, profile, &departures, Direction::FromEndpoint);

        Ok(Self {
            data,
            profile,
            arena: JourneyArena::new(),
            stop_fronts: HashMap::new(),
            trip_fronts: HashMap::new(),
            source_front: ProfiledParetoFront::new(),
            earliest_departure: request.earliest_departure,
            latest_arrival: request.latest_arrival,
            target_links,
            source_links,
            connection_filter: None,
            metric_guesser: None,
            journey_filter: None,
        })
    }

    /// Prunes connections with a previously computed reachability bound.
    /// The filter's window is checked once, loudly, when the scan starts.
    pub fn set_connection_filter(&mut self, filter: &'a dyn ConnectionFilter) {
        self.connection_filter = Some(filter);
    }

    pub fn set_metric_guesser(&mut self, guesser: &'a dyn MetricGuesser<M, C>) {
        self.metric_guesser = Some(guesser);
    }

    pub fn set_journey_filter(&mut self, filter: &'a dyn JourneyFilter<M>) {
        self.journey_filter = Some(filter);
    }

    /// Runs the scan. Returns one entry per Pareto-optimal journey, in no
    /// particular order, or None when strictly nothing satisfies the window.
    pub fn calculate_journeys(&mut self) -> Option<Vec<JourneyId>> {
        if let Some(filter) = self.connection_filter {
            filter.check_window(self.earliest_departure, self.latest_arrival);
        }

        let data = self.data;
        let mut connections = data.connections_before(self.latest_arrival).peekable();
        loop {
            let batch_time = match connections.peek() {
                Some(connection) => connection.departure_time,
                None => break,
            };
            if batch_time < self.earliest_departure {
                break;
            }
            let mut pending: Vec<(StopId, JourneyId)> = Vec::new();
            while let Some(&connection) = connections.peek() {
                if connection.departure_time != batch_time {
                    break;
                }
                self.integrate_connection(connection, &mut pending);
                connections.next();
            }
            self.apply_batch(pending);
        }

        if self.source_front.is_empty() {
            debug!("profiled scan found no journey within the window");
            return None;
        }
        Some(self.source_front.elements().to_vec())
    }

    /// Runs the scan and unfolds every optimal journey.
    pub fn solve(&mut self) -> Option<Vec<Response<M>>> {
        let journeys = self.calculate_journeys()?;
        Some(
            journeys
                .into_iter()
                .map(|journey| Response::from_journey(&self.arena, journey))
                .collect(),
        )
    }

    pub fn arena(&self) -> &JourneyArena<M> {
        &self.arena
    }

    pub fn response(&self, journey: JourneyId) -> Response<M> {
        Response::from_journey(&self.arena, journey)
    }

    /// Latest departure still reaching a target, per stop. Valid only within
    /// the scanned window; usable as a backward isochrone bound.
    pub fn latest_departure_times(&self) -> HashMap<StopId, SecondsSinceDatasetUTCStart> {
        let mut bounds = HashMap::new();
        for (&stop, front) in &self.stop_fronts {
            for &journey in front.iter() {
                let departure = self.arena.time(journey);
                bounds
                    .entry(stop)
                    .and_modify(|latest: &mut SecondsSinceDatasetUTCStart| {
                        *latest = (*latest).max(departure);
                    })
                    .or_insert(departure);
            }
        }
        bounds
    }

    fn integrate_connection(
        &mut self,
        connection: &Connection,
        pending: &mut Vec<(StopId, JourneyId)>,
    ) {
        let data = self.data;
        let profile = self.profile;
        if data.coord(connection.departure_stop).is_none()
            || data.coord(connection.arrival_stop).is_none()
        {
            return;
        }
        if connection.arrival_time() > self.latest_arrival {
            return;
        }
        if let Some(filter) = self.connection_filter {
            if !filter.can_be_taken(connection) {
                return;
            }
        }
        if let Some(guesser) = self.metric_guesser {
            if !guesser.can_improve(
                &mut self.arena,
                &profile.comparator,
                &self.stop_fronts,
                connection,
            ) {
                return;
            }
        }

        let mut candidates: Vec<JourneyId> = Vec::new();

        if connection.flow.can_debark() {
            // finish : the arrival stop is a target, or walking distance from one
            if let Some(links) = self.target_links.get(&connection.arrival_stop).cloned() {
                for link in links {
                    let after_walk =
                        connection.arrival_time() + link.walk.unwrap_or_else(PositiveDuration::zero);
                    let final_arrival = after_walk + link.fallback;
                    if final_arrival > self.latest_arrival {
                        continue;
                    }
                    let root = self.arena.single(link.endpoint, final_arrival);
                    let mut journey = root;
                    if !link.fallback.is_zero() {
                        journey = self.arena.chain_special(
                            journey,
                            Move::OtherMode,
                            link.endpoint,
                            after_walk,
                            None,
                        );
                    }
                    if link.walk.is_some() {
                        journey = self.arena.chain_special(
                            journey,
                            Move::Walk,
                            connection.arrival_stop,
                            connection.arrival_time(),
                            None,
                        );
                    }
                    candidates.push(self.arena.chain_backward(journey, connection));
                }
            }

            // continue : ride this connection, then one of the journeys
            // already known to depart from its arrival stop
            let continuations: Vec<JourneyId> = self
                .stop_fronts
                .get(&connection.arrival_stop)
                .map(|front| front.elements().to_vec())
                .unwrap_or_default();
            for continuation in continuations {
                let continuation_departure = self.arena.time(continuation);
                let journey = if self.arena.ends_with_vehicle(continuation) {
                    // changing vehicles : the transfer must fit in between
                    let stops: &dyn StopsData = data;
                    let transfer_time = match profile.transfer.time_between(
                        stops,
                        connection.arrival_stop,
                        connection.arrival_stop,
                    ) {
                        Some(duration) => duration,
                        None => continue,
                    };
                    let board_time = match continuation_departure.checked_sub(transfer_time) {
                        Some(time) => time,
                        None => continue,
                    };
                    if connection.arrival_time() > board_time {
                        continue;
                    }
                    let transferring = self.arena.chain_special(
                        continuation,
                        Move::Transfer,
                        connection.arrival_stop,
                        board_time,
                        None,
                    );
                    self.arena.chain_backward(transferring, connection)
                } else {
                    // the continuation starts with a walk : debark into it
                    if connection.arrival_time() > continuation_departure {
                        continue;
                    }
                    self.arena.chain_backward(continuation, connection)
                };
                candidates.push(journey);
            }
        }

        // stay aboard : journeys already riding this trip, moved one
        // connection earlier. The previous onboard states are gone for good,
        // the sweep will never come back to them.
        let onboard = self.trip_fronts.remove(&connection.trip);
        if let Some(onboard) = onboard {
            for &seated in onboard.iter() {
                if self.arena.stop(seated) != connection.arrival_stop
                    || connection.arrival_time() > self.arena.time(seated)
                {
                    continue;
                }
                candidates.push(self.arena.chain_backward(seated, connection));
            }
        }

        if candidates.is_empty() {
            return;
        }

        // all candidates ride this connection, so all of them are onboard
        // states of its trip
        let journey_filter = self.journey_filter;
        let mut new_onboard = ProfiledParetoFront::new();
        for &candidate in &candidates {
            new_onboard.add_to_frontier(
                &mut self.arena,
                &profile.comparator,
                journey_filter,
                candidate,
            );
        }
        self.trip_fronts.insert(connection.trip, new_onboard);

        // only a boardable connection makes its departure stop reachable
        if connection.flow.can_board() {
            for candidate in candidates {
                pending.push((connection.departure_stop, candidate));
            }
        }
    }

    /// Inserts the batch's candidates into the stop frontiers, then fans the
    /// accepted ones out : walks into the neighbourhood, and prefixes
    /// towards the requested departure stops.
    fn apply_batch(&mut self, pending: Vec<(StopId, JourneyId)>) {
        let data = self.data;
        let profile = self.profile;
        let journey_filter = self.journey_filter;

        for (stop, journey) in pending {
            let accepted = self
                .stop_fronts
                .entry(stop)
                .or_default()
                .add_to_frontier(&mut self.arena, &profile.comparator, journey_filter, journey);
            if !accepted {
                continue;
            }

            self.extend_towards_sources(stop, journey, true);

            // a debark can be followed by a walk : the journey, prefixed with
            // the walk, also departs from each stop in range
            let walks = match profile.walks.as_ref() {
                Some(walks) => walks,
                None => continue,
            };
            let center = match data.coord(stop) {
                Some(center) => center,
                None => continue,
            };
            let departure = self.arena.time(journey);
            let neighbours = data.stops_in_range(center, walks.range());
            for neighbour in neighbours {
                if neighbour == stop {
                    continue;
                }
                let stops: &dyn StopsData = data;
                let walk_time = match walks.time_between(stops, neighbour, stop) {
                    Some(duration) => duration,
                    None => continue,
                };
                let walk_start = match departure.checked_sub(walk_time) {
                    Some(time) => time,
                    None => continue,
                };
                if walk_start < self.earliest_departure {
                    // the walk falls before the window
                    continue;
                }
                let walked =
                    self.arena
                        .chain_special(journey, Move::Walk, neighbour, walk_start, None);
                let kept = self.stop_fronts.entry(neighbour).or_default().add_to_frontier(
                    &mut self.arena,
                    &profile.comparator,
                    journey_filter,
                    walked,
                );
                if kept {
                    // no walk-after-walk : only the direct source link applies
                    self.extend_towards_sources(neighbour, walked, false);
                }
            }
        }
    }

    /// Tries to register `journey` (departing from `stop`) as a full answer,
    /// through every way `stop` relates to the requested departure stops.
    fn extend_towards_sources(&mut self, stop: StopId, journey: JourneyId, allow_walk: bool) {
        let profile = self.profile;
        let journey_filter = self.journey_filter;
        let links = match self.source_links.get(&stop) {
            Some(links) => links.clone(),
            None => return,
        };
        for link in links {
            if link.walk.is_some() && !allow_walk {
                continue;
            }
            let mut candidate = journey;
            if let Some(walk_time) = link.walk {
                let walk_start = match self.arena.time(candidate).checked_sub(walk_time) {
                    Some(time) => time,
                    None => continue,
                };
                if walk_start < self.earliest_departure {
                    continue;
                }
                candidate = self.arena.chain_special(
                    candidate,
                    Move::Walk,
                    link.endpoint,
                    walk_start,
                    None,
                );
            }
            if !link.fallback.is_zero() {
                let fallback_start = match self.arena.time(candidate).checked_sub(link.fallback) {
                    Some(time) => time,
                    None => continue,
                };
                if fallback_start < self.earliest_departure {
                    continue;
                }
                candidate = self.arena.chain_special(
                    candidate,
                    Move::OtherMode,
                    link.endpoint,
                    fallback_start,
                    None,
                );
            }
            if self.arena.time(candidate) < self.earliest_departure {
                continue;
            }
            self.source_front.add_to_frontier(
                &mut self.arena,
                &profile.comparator,
                journey_filter,
                candidate,
            );
        }
    }
}

enum Direction {
    /// walks go from the neighbourhood towards the endpoint (arrival side)
    TowardsEndpoint,
    /// walks go from the endpoint towards the neighbourhood (departure side)
    FromEndpoint,
}

/// For each requested endpoint : itself (no walk), plus every stop within
/// walking range when the profile has a walk generator.
fn endpoint_links<Data, T, W, C>(
    data: &Data,
    profile: &Profile<T, W, C>,
    endpoints: &[(StopId, PositiveDuration)],
    direction: Direction,
) -> HashMap<StopId, Vec<EndpointLink>>
where
    Data: StopsData,
    T: TransferProvider,
    W: TransferProvider,
{
    let mut links: HashMap<StopId, Vec<EndpointLink>> = HashMap::new();
    for &(endpoint, fallback) in endpoints {
        links.entry(endpoint).or_default().push(EndpointLink {
            endpoint,
            walk: None,
            fallback,
        });
        let walks = match profile.walks.as_ref() {
            Some(walks) => walks,
            None => continue,
        };
        let center = match data.coord(endpoint) {
            Some(center) => center,
            None => continue,
        };
        for neighbour in data.stops_in_range(center, walks.range()) {
            if neighbour == endpoint {
                continue;
            }
            let stops: &dyn StopsData = data;
            let walk = match direction {
                Direction::TowardsEndpoint => walks.time_between(stops, neighbour, endpoint),
                Direction::FromEndpoint => walks.time_between(stops, endpoint, neighbour),
            };
            if let Some(walk) = walk {
                links.entry(neighbour).or_default().push(EndpointLink {
                    endpoint,
                    walk: Some(walk),
                    fallback,
                });
            }
        }
    }
    links
}
