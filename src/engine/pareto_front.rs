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

use crate::filters::JourneyFilter;
use crate::journey::{JourneyArena, JourneyId};
use crate::metric::{Domination, Metric, MetricComparator};

/// A time-aware Pareto frontier of backward journeys for one stop.
///
/// Every kept journey outperforms the others on at least one criterion, the
/// time window [departure, arrival] being a criterion of its own : a journey
/// departing later but arriving earlier coexists with anything, whatever its
/// statistics.
///
/// The list tends to be sorted by descending departure time because the
/// backward scan inserts later departures first. Walk-generated journeys can
/// break that order, so it is only ever used as a heuristic, never relied
/// upon for correctness.
pub struct ProfiledParetoFront {
    elements: Vec<JourneyId>,
}

impl ProfiledParetoFront {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[JourneyId] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JourneyId> {
        self.elements.iter()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Inserts `candidate` if it is Pareto-optimal with respect to the
    /// current frontier, evicting anything it dominates. Returns true when
    /// the frontier retained the candidate (possibly merged with an equally
    /// good journey over the same window).
    ///
    /// Panics if `candidate` is not a backward journey, i.e. if its root
    /// (arrival side) is earlier than its last node (departure side).
    pub fn add_to_frontier<M: Metric, C: MetricComparator<M>>(
        &mut self,
        arena: &mut JourneyArena<M>,
        comparator: &C,
        journey_filter: Option<&dyn JourneyFilter<M>>,
        candidate: JourneyId,
    ) -> bool {
        let candidate_departure = arena.time(candidate);
        let candidate_arrival = arena.time(arena.root_of(candidate));
        if candidate_arrival < candidate_departure {
            panic!("a forward journey was inserted into a profiled Pareto frontier");
        }

        if let Some(filter) = journey_filter {
            if !filter.can_be_taken_backwards(arena, candidate) {
                return false;
            }
        }

        let mut index = self.elements.len();
        while index > 0 {
            index -= 1;
            let guard = self.elements[index];
            let guard_departure = arena.time(guard);
            let guard_arrival = arena.time(arena.root_of(guard));

            if candidate_departure <= guard_departure && guard_arrival <= candidate_arrival {
                // the guard's window falls entirely within the candidate's
                let windows_equal =
                    candidate_departure == guard_departure && candidate_arrival == guard_arrival;
                match comparator.a_dominates_b(arena, guard, candidate) {
                    Domination::AWins => {
                        return false;
                    }
                    Domination::Tied => {
                        if windows_equal {
                            if arena.equal_journeys(candidate, guard) {
                                // already present
                                return false;
                            }
                            // a genuinely different journey with identical
                            // window and statistics : keep both as one family
                            self.elements[index] = arena.merge(guard, candidate);
                            return true;
                        }
                        // same statistics over a longer window : strictly worse
                        return false;
                    }
                    Domination::BWins => {
                        if windows_equal {
                            self.elements.remove(index);
                        }
                        // otherwise the guard keeps its place : it is still
                        // better on the time aspect even though its
                        // statistics lost the duel
                    }
                    Domination::Incomparable => continue,
                }
            } else if guard_departure <= candidate_departure && candidate_arrival <= guard_arrival {
                // the candidate's window falls strictly within the guard's
                match comparator.a_dominates_b(arena, guard, candidate) {
                    Domination::AWins | Domination::Incomparable => continue,
                    Domination::Tied | Domination::BWins => {
                        // strictly faster and at least as good : down with the
                        // guard, and keep scanning, several nested entries can
                        // fall in one pass
                        self.elements.remove(index);
                        continue;
                    }
                }
            } else {
                // neither window contains the other : automatically coexistent
                continue;
            }
        }

        self.elements.push(candidate);
        true
    }

    /// Considers every journey in turn; returns the ones the frontier kept.
    pub fn add_all_to_frontier<M: Metric, C: MetricComparator<M>>(
        &mut self,
        arena: &mut JourneyArena<M>,
        comparator: &C,
        journey_filter: Option<&dyn JourneyFilter<M>>,
        candidates: impl IntoIterator<Item = JourneyId>,
    ) -> Vec<JourneyId> {
        candidates
            .into_iter()
            .filter(|&candidate| {
                self.add_to_frontier(arena, comparator, journey_filter, candidate)
            })
            .collect()
    }
}

impl Default for ProfiledParetoFront {
    fn default() -> Self {
        Self::new()
    }
}
