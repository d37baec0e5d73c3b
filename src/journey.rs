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

use crate::metric::Metric;
use crate::time::{duration_between, PositiveDuration, SecondsSinceDatasetUTCStart};
use crate::transit_data::{Connection, ConnectionId, StopId, TripId};

/// How a journey node was reached : by a scheduled connection, or by one of
/// the non-scheduled move kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Scheduled(ConnectionId),
    Walk,
    Transfer,
    OtherMode,
}

impl Move {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Move::Scheduled(_))
    }
}

/// Index of a journey node in a `JourneyArena`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JourneyId {
    id: usize,
}

/// One new section of a journey, handed to the metric accumulator.
/// `boarding` is true when a scheduled leg boards a vehicle the journey was
/// not already riding.
#[derive(Debug, Clone)]
pub struct Leg {
    pub mov: Move,
    pub duration: PositiveDuration,
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub boarding: bool,
}

#[derive(Debug, Clone)]
struct Node<M> {
    stop: StopId,
    time: SecondsSinceDatasetUTCStart,
    mov: Option<Move>, // None on roots
    trip: Option<TripId>,
    metric: M,
    previous: Option<JourneyId>,
    root: JourneyId,
    // another journey with the same time window and metric, merged into this slot
    alternative: Option<JourneyId>,
}

/// All journeys built during one scan, as a chain-linked arena addressed by
/// `JourneyId`. A journey is never mutated once created : extending it
/// allocates a new node pointing backwards to its predecessor, so superseded
/// journeys simply stop being referenced.
///
/// Forward scans grow journeys towards later times, backward scans towards
/// earlier times; the arena does not care. `departure_time`/`arrival_time`
/// take the min/max of the node and root times so both directions read the
/// same way.
pub struct JourneyArena<M> {
    nodes: Vec<Node<M>>,
}

impl<M: Metric> JourneyArena<M> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: Node<M>) -> JourneyId {
        let id = self.nodes.len();
        self.nodes.push(node);
        JourneyId { id }
    }

    /// A journey reduced to its starting point, carrying the metric zero.
    pub fn single(&mut self, stop: StopId, time: SecondsSinceDatasetUTCStart) -> JourneyId {
        let id = self.nodes.len();
        self.push(Node {
            stop,
            time,
            mov: None,
            trip: None,
            metric: M::zero(),
            previous: None,
            root: JourneyId { id },
            alternative: None,
        })
    }

    /// Rides `connection` after `tail` : the new node is at the connection's
    /// arrival, at its arrival time.
    pub fn chain_forward(&mut self, tail: JourneyId, connection: &Connection) -> JourneyId {
        let boarding = self.last_trip(tail) != Some(connection.trip);
        let leg = Leg {
            mov: Move::Scheduled(connection.id),
            duration: connection.travel_time,
            from_stop: connection.departure_stop,
            to_stop: connection.arrival_stop,
            boarding,
        };
        let metric = self.nodes[tail.id].metric.add(&leg);
        let root = self.nodes[tail.id].root;
        self.push(Node {
            stop: connection.arrival_stop,
            time: connection.arrival_time(),
            mov: Some(leg.mov),
            trip: Some(connection.trip),
            metric,
            previous: Some(tail),
            root,
            alternative: None,
        })
    }

    /// Rides `connection` before `tail` (backward scan) : the new node is at
    /// the connection's departure, at its departure time.
    pub fn chain_backward(&mut self, tail: JourneyId, connection: &Connection) -> JourneyId {
        let boarding = self.last_trip(tail) != Some(connection.trip);
        let leg = Leg {
            mov: Move::Scheduled(connection.id),
            duration: connection.travel_time,
            from_stop: connection.departure_stop,
            to_stop: connection.arrival_stop,
            boarding,
        };
        let metric = self.nodes[tail.id].metric.add(&leg);
        let root = self.nodes[tail.id].root;
        self.push(Node {
            stop: connection.departure_stop,
            time: connection.departure_time,
            mov: Some(leg.mov),
            trip: Some(connection.trip),
            metric,
            previous: Some(tail),
            root,
            alternative: None,
        })
    }

    /// Extends `tail` with a non-scheduled move ending at `stop` at `time`.
    pub fn chain_special(
        &mut self,
        tail: JourneyId,
        mov: Move,
        stop: StopId,
        time: SecondsSinceDatasetUTCStart,
        trip: Option<TripId>,
    ) -> JourneyId {
        debug_assert!(!mov.is_scheduled());
        let tail_node = &self.nodes[tail.id];
        let leg = Leg {
            mov,
            duration: duration_between(time, tail_node.time),
            from_stop: tail_node.stop,
            to_stop: stop,
            boarding: false,
        };
        let metric = tail_node.metric.add(&leg);
        let root = tail_node.root;
        self.push(Node {
            stop,
            time,
            mov: Some(mov),
            trip,
            metric,
            previous: Some(tail),
            root,
            alternative: None,
        })
    }

    /// Records that `kept` and `other` are a family of equally good journeys
    /// over the same time window. The returned journey reads like `kept` and
    /// additionally references `other`.
    pub fn merge(&mut self, kept: JourneyId, other: JourneyId) -> JourneyId {
        let mut node = self.nodes[kept.id].clone();
        node.alternative = Some(other);
        self.push(node)
    }

    pub fn stop(&self, journey: JourneyId) -> StopId {
        self.nodes[journey.id].stop
    }

    pub fn time(&self, journey: JourneyId) -> SecondsSinceDatasetUTCStart {
        self.nodes[journey.id].time
    }

    pub fn mov(&self, journey: JourneyId) -> Option<Move> {
        self.nodes[journey.id].mov
    }

    pub fn trip(&self, journey: JourneyId) -> Option<TripId> {
        self.nodes[journey.id].trip
    }

    pub fn metric(&self, journey: JourneyId) -> &M {
        &self.nodes[journey.id].metric
    }

    pub fn previous(&self, journey: JourneyId) -> Option<JourneyId> {
        self.nodes[journey.id].previous
    }

    pub fn root_of(&self, journey: JourneyId) -> JourneyId {
        self.nodes[journey.id].root
    }

    pub fn alternative(&self, journey: JourneyId) -> Option<JourneyId> {
        self.nodes[journey.id].alternative
    }

    /// The trip of the most recently chained scheduled leg, if any.
    pub fn last_trip(&self, journey: JourneyId) -> Option<TripId> {
        let mut current = Some(journey);
        while let Some(id) = current {
            let node = &self.nodes[id.id];
            if let Some(trip) = node.trip {
                return Some(trip);
            }
            current = node.previous;
        }
        None
    }

    /// True when the journey's latest chained move is a scheduled connection,
    /// i.e. the traveller is stepping off a vehicle.
    pub fn ends_with_vehicle(&self, journey: JourneyId) -> bool {
        self.mov(journey).is_some_and(|mov| mov.is_scheduled())
    }

    pub fn departure_time(&self, journey: JourneyId) -> SecondsSinceDatasetUTCStart {
        let node_time = self.time(journey);
        let root_time = self.time(self.root_of(journey));
        node_time.min(root_time)
    }

    pub fn arrival_time(&self, journey: JourneyId) -> SecondsSinceDatasetUTCStart {
        let node_time = self.time(journey);
        let root_time = self.time(self.root_of(journey));
        node_time.max(root_time)
    }

    /// Structural equality : both chains have the same length and every node
    /// matches on (stop, time, move, trip). Merge alternatives are ignored.
    pub fn equal_journeys(&self, a: JourneyId, b: JourneyId) -> bool {
        let mut current_a = Some(a);
        let mut current_b = Some(b);
        while let (Some(id_a), Some(id_b)) = (current_a, current_b) {
            let node_a = &self.nodes[id_a.id];
            let node_b = &self.nodes[id_b.id];
            if node_a.stop != node_b.stop
                || node_a.time != node_b.time
                || node_a.mov != node_b.mov
                || node_a.trip != node_b.trip
            {
                return false;
            }
            current_a = node_a.previous;
            current_b = node_b.previous;
        }
        current_a.is_none() && current_b.is_none()
    }

    /// Number of nodes in the chain, root included.
    pub fn nb_of_parts(&self, journey: JourneyId) -> usize {
        let mut count = 0;
        let mut current = Some(journey);
        while let Some(id) = current {
            count += 1;
            current = self.nodes[id.id].previous;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl<M: Metric> Default for JourneyArena<M> {
    fn default() -> Self {
        Self::new()
    }
}
