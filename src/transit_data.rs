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

use crate::geometry::{bounding_box, distance_coord_to_coord, within_box, Coord};
use crate::time::{PositiveDuration, SecondsSinceDatasetUTCStart};

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Identifies a physical stop. Stops are partitioned (e.g. by spatial tile or
/// contributing dataset); a stop is the pair of its partition and its key within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StopId {
    pub tile: u32,
    pub local: u32,
}

/// Identifies a scheduled vehicle run. Two connections with the same `TripId`
/// are served by the same physical vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TripId {
    pub dataset: u32,
    pub local: u32,
}

/// Identifies one scheduled departure/arrival edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId {
    pub dataset: u32,
    pub local: u32,
}

impl Display for StopId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "stop:{}:{}", self.tile, self.local)
    }
}

impl Display for TripId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "trip:{}:{}", self.dataset, self.local)
    }
}

impl Display for ConnectionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "connection:{}:{}", self.dataset, self.local)
    }
}

/// Whether a connection allows boarding and/or debarking.
/// A vehicle passing through a stop without service, or a cancelled call,
/// yields `NoBoardDebark`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum FlowDirection {
    BoardAndDebark,
    BoardOnly,
    DebarkOnly,
    NoBoardDebark,
}

impl FlowDirection {
    pub fn can_board(&self) -> bool {
        matches!(self, FlowDirection::BoardAndDebark | FlowDirection::BoardOnly)
    }

    pub fn can_debark(&self) -> bool {
        matches!(
            self,
            FlowDirection::BoardAndDebark | FlowDirection::DebarkOnly
        )
    }
}

/// One scheduled vehicle edge between two stops.
/// Immutable value; the arrival time is always `departure_time + travel_time`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub departure_stop: StopId,
    pub arrival_stop: StopId,
    pub departure_time: SecondsSinceDatasetUTCStart,
    pub travel_time: PositiveDuration,
    pub trip: TripId,
    pub flow: FlowDirection,
}

impl Connection {
    pub fn arrival_time(&self) -> SecondsSinceDatasetUTCStart {
        self.departure_time + self.travel_time
    }
}

pub trait ConnectionsData {
    fn nb_of_connections(&self) -> usize;

    fn connection(&self, id: ConnectionId) -> Option<&Connection>;
}

/// Ordered enumeration of connections, in both scan directions.
pub trait ConnectionsIter<'a>: ConnectionsData {
    /// Connections departing at or after `departure`, by increasing departure time.
    type Forward: Iterator<Item = &'a Connection>;
    fn connections_after(&'a self, departure: SecondsSinceDatasetUTCStart) -> Self::Forward;

    /// Connections departing at or before `departure`, by decreasing departure time.
    type Backward: Iterator<Item = &'a Connection>;
    fn connections_before(&'a self, departure: SecondsSinceDatasetUTCStart) -> Self::Backward;
}

/// Resolves stops to coordinates and answers radius queries.
/// A stop without a usable coordinate contributes nothing to a scan;
/// it is skipped, never an error.
pub trait StopsData {
    fn coord(&self, stop: StopId) -> Option<Coord>;

    fn stops_in_range(&self, center: Coord, radius: f64) -> Vec<StopId>;
}

/// In-memory reference implementation of the timetable source and stop
/// resolver traits. Connections are kept sorted by departure time; ties keep
/// their insertion order.
pub struct TransitData {
    connections: Vec<Connection>,
    by_id: HashMap<ConnectionId, usize>,
    stops: HashMap<StopId, Option<Coord>>,
}

impl TransitData {
    fn new() -> Self {
        Self {
            connections: Vec::new(),
            by_id: HashMap::new(),
            stops: HashMap::new(),
        }
    }

    pub fn nb_of_stops(&self) -> usize {
        self.stops.len()
    }

    pub fn has_stop(&self, stop: StopId) -> bool {
        self.stops.contains_key(&stop)
    }
}

impl ConnectionsData for TransitData {
    fn nb_of_connections(&self) -> usize {
        self.connections.len()
    }

    fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.by_id.get(&id).map(|&idx| &self.connections[idx])
    }
}

impl<'a> ConnectionsIter<'a> for TransitData {
    type Forward = std::slice::Iter<'a, Connection>;

    fn connections_after(&'a self, departure: SecondsSinceDatasetUTCStart) -> Self::Forward {
        let start = self
            .connections
            .partition_point(|c| c.departure_time < departure);
        self.connections[start..].iter()
    }

    type Backward = std::iter::Rev<std::slice::Iter<'a, Connection>>;

    fn connections_before(&'a self, departure: SecondsSinceDatasetUTCStart) -> Self::Backward {
        let end = self
            .connections
            .partition_point(|c| c.departure_time <= departure);
        self.connections[..end].iter().rev()
    }
}

impl StopsData for TransitData {
    fn coord(&self, stop: StopId) -> Option<Coord> {
        self.stops.get(&stop).copied().flatten()
    }

    fn stops_in_range(&self, center: Coord, radius: f64) -> Vec<StopId> {
        if radius <= 0.0 {
            return Vec::new();
        }
        let bbox = bounding_box(center, radius);
        self.stops
            .iter()
            .filter_map(|(stop, has_coord)| {
                let coord = (*has_coord)?;
                // cheap bbox rejection before the expensive distance computation
                if !within_box(&bbox, &coord) {
                    return None;
                }
                if distance_coord_to_coord(&center, &coord) <= radius {
                    Some(*stop)
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Assembles a `TransitData` stop by stop and connection by connection.
pub struct TransitDataBuilder {
    data: TransitData,
    next_stop: u32,
    next_connection: u32,
}

impl Default for TransitDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitDataBuilder {
    pub fn new() -> Self {
        Self {
            data: TransitData::new(),
            next_stop: 0,
            next_connection: 0,
        }
    }

    pub fn add_stop(&mut self, lat: f64, lon: f64) -> StopId {
        let stop = StopId {
            tile: 0,
            local: self.next_stop,
        };
        self.next_stop += 1;
        self.data.stops.insert(stop, Some(Coord { lat, lon }));
        stop
    }

    /// A stop with no usable coordinate. Scans treat connections touching it
    /// as unreachable.
    pub fn add_stop_without_coord(&mut self) -> StopId {
        let stop = StopId {
            tile: 0,
            local: self.next_stop,
        };
        self.next_stop += 1;
        self.data.stops.insert(stop, None);
        stop
    }

    pub fn add_connection(
        &mut self,
        departure_stop: StopId,
        arrival_stop: StopId,
        departure_time: SecondsSinceDatasetUTCStart,
        travel_time: PositiveDuration,
        trip: TripId,
    ) -> ConnectionId {
        self.add_connection_with_flow(
            departure_stop,
            arrival_stop,
            departure_time,
            travel_time,
            trip,
            FlowDirection::BoardAndDebark,
        )
    }

    pub fn add_connection_with_flow(
        &mut self,
        departure_stop: StopId,
        arrival_stop: StopId,
        departure_time: SecondsSinceDatasetUTCStart,
        travel_time: PositiveDuration,
        trip: TripId,
        flow: FlowDirection,
    ) -> ConnectionId {
        let id = ConnectionId {
            dataset: 0,
            local: self.next_connection,
        };
        self.next_connection += 1;
        let connection = Connection {
            id,
            departure_stop,
            arrival_stop,
            departure_time,
            travel_time,
            trip,
            flow,
        };
        self.insert(connection);
        id
    }

    /// Inserts a fully specified connection. A connection with an already
    /// known id replaces the previous one.
    pub fn insert(&mut self, connection: Connection) {
        if let Some(&idx) = self.data.by_id.get(&connection.id) {
            self.data.connections.remove(idx);
            self.reindex_from(idx);
        }
        let position = self
            .data
            .connections
            .partition_point(|c| c.departure_time <= connection.departure_time);
        self.data.connections.insert(position, connection);
        self.reindex_from(position);
    }

    fn reindex_from(&mut self, from: usize) {
        for idx in from..self.data.connections.len() {
            let id = self.data.connections[idx].id;
            self.data.by_id.insert(id, idx);
        }
    }

    pub fn build(self) -> TransitData {
        self.data
    }
}
