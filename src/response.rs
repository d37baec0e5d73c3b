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

use crate::journey::{JourneyArena, JourneyId, Move};
use crate::metric::Metric;
use crate::time::SecondsSinceDatasetUTCStart;
use crate::transit_data::{ConnectionId, StopId, TripId};

/// One vehicle ride, possibly spanning several consecutive connections of
/// the same trip.
#[derive(Debug, Clone)]
pub struct VehicleSection {
    pub trip: TripId,
    pub connections: Vec<ConnectionId>,
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub from_time: SecondsSinceDatasetUTCStart,
    pub to_time: SecondsSinceDatasetUTCStart,
}

#[derive(Debug, Clone)]
pub struct TransferSection {
    pub stop: StopId,
    pub from_time: SecondsSinceDatasetUTCStart,
    pub to_time: SecondsSinceDatasetUTCStart,
}

#[derive(Debug, Clone)]
pub struct WalkSection {
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub from_time: SecondsSinceDatasetUTCStart,
    pub to_time: SecondsSinceDatasetUTCStart,
}

#[derive(Debug, Clone)]
pub enum Section {
    Vehicle(VehicleSection),
    Transfer(TransferSection),
    Walk(WalkSection),
    OtherMode(WalkSection),
}

/// A journey unfolded for the caller : sections in travel order, whichever
/// direction the producing scan ran in.
#[derive(Debug, Clone)]
pub struct Response<M> {
    pub sections: Vec<Section>,
    pub departure_time: SecondsSinceDatasetUTCStart,
    pub arrival_time: SecondsSinceDatasetUTCStart,
    pub metric: M,
}

struct NodeView {
    stop: StopId,
    time: SecondsSinceDatasetUTCStart,
    mov: Option<Move>,
    trip: Option<TripId>,
}

impl<M: Metric> Response<M> {
    pub fn from_journey(arena: &JourneyArena<M>, journey: JourneyId) -> Self {
        // the chain runs newest node first, down to the root
        let mut chain: Vec<NodeView> = Vec::new();
        let mut current = Some(journey);
        while let Some(id) = current {
            chain.push(NodeView {
                stop: arena.stop(id),
                time: arena.time(id),
                mov: arena.mov(id),
                trip: arena.trip(id),
            });
            current = arena.previous(id);
        }

        // (move, from node, to node) in travel order. In a backward journey
        // the chain already runs from the earliest node to the root; in a
        // forward journey it must be reversed.
        let backward = arena.time(journey) <= arena.time(arena.root_of(journey));
        let mut legs: Vec<(Move, &NodeView, &NodeView)> = Vec::new();
        if backward {
            for index in 0..chain.len().saturating_sub(1) {
                let node = &chain[index];
                let mov = node.mov.expect("only the root node has no move");
                legs.push((mov, node, &chain[index + 1]));
            }
        } else {
            for index in (0..chain.len().saturating_sub(1)).rev() {
                let node = &chain[index];
                let mov = node.mov.expect("only the root node has no move");
                legs.push((mov, &chain[index + 1], node));
            }
        }

        let mut sections: Vec<Section> = Vec::new();
        for (mov, from, to) in legs {
            match mov {
                Move::Scheduled(connection) => {
                    let trip = if backward { from.trip } else { to.trip }
                        .expect("a scheduled journey node always carries its trip");
                    let extends_previous = match sections.last_mut() {
                        Some(Section::Vehicle(vehicle)) if vehicle.trip == trip => {
                            vehicle.connections.push(connection);
                            vehicle.to_stop = to.stop;
                            vehicle.to_time = to.time;
                            true
                        }
                        _ => false,
                    };
                    if !extends_previous {
                        sections.push(Section::Vehicle(VehicleSection {
                            trip,
                            connections: vec![connection],
                            from_stop: from.stop,
                            to_stop: to.stop,
                            from_time: from.time,
                            to_time: to.time,
                        }));
                    }
                }
                Move::Transfer => {
                    sections.push(Section::Transfer(TransferSection {
                        stop: to.stop,
                        from_time: from.time,
                        to_time: to.time,
                    }));
                }
                Move::Walk => {
                    sections.push(Section::Walk(WalkSection {
                        from_stop: from.stop,
                        to_stop: to.stop,
                        from_time: from.time,
                        to_time: to.time,
                    }));
                }
                Move::OtherMode => {
                    sections.push(Section::OtherMode(WalkSection {
                        from_stop: from.stop,
                        to_stop: to.stop,
                        from_time: from.time,
                        to_time: to.time,
                    }));
                }
            }
        }

        Self {
            sections,
            departure_time: arena.departure_time(journey),
            arrival_time: arena.arrival_time(journey),
            metric: arena.metric(journey).clone(),
        }
    }

    pub fn nb_of_sections(&self) -> usize {
        self.sections.len()
    }

    pub fn vehicle_sections(&self) -> impl Iterator<Item = &VehicleSection> {
        self.sections.iter().filter_map(|section| match section {
            Section::Vehicle(vehicle) => Some(vehicle),
            _ => None,
        })
    }

    pub fn nb_of_vehicle_sections(&self) -> usize {
        self.vehicle_sections().count()
    }

    pub fn first_vehicle(&self) -> Option<&VehicleSection> {
        self.vehicle_sections().next()
    }

    pub fn has_walk(&self) -> bool {
        self.sections
            .iter()
            .any(|section| matches!(section, Section::Walk(_) | Section::OtherMode(_)))
    }
}
