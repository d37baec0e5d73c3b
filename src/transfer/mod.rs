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

pub mod cacher;
pub mod crow_fly;
pub mod internal;

pub use cacher::{ClosedTransferCache, TransferCache};
pub use crow_fly::CrowFlyWalk;
pub use internal::InternalTransfer;

use crate::time::PositiveDuration;
use crate::transit_data::{StopId, StopsData};

use std::collections::HashMap;

/// How long a non-scheduled move (walk, in-station change, ...) takes from
/// one stop to another.
///
/// `None` means the move is not possible, or is not this provider's
/// responsibility : a provider modeling in-station transfers answers only
/// `from == to` pairs, a provider modeling walks answers only distinct
/// pairs. Ordinary infeasibility is always `None`, never a panic.
pub trait TransferProvider {
    fn time_between(
        &self,
        stops: &dyn StopsData,
        from: StopId,
        to: StopId,
    ) -> Option<PositiveDuration>;

    /// Batched form of `time_between`. Exists for performance (cachers
    /// memoize whole batches); must stay behaviorally equivalent to repeated
    /// single calls. Unreachable targets are absent from the result.
    fn times_between(
        &self,
        stops: &dyn StopsData,
        from: StopId,
        to: &[StopId],
    ) -> HashMap<StopId, PositiveDuration> {
        let mut times = HashMap::new();
        for &target in to {
            if let Some(duration) = self.time_between(stops, from, target) {
                times.insert(target, duration);
            }
        }
        times
    }

    /// The maximum distance in meters this provider will ever be asked
    /// about. Callers restrict candidate target sets to this range.
    fn range(&self) -> f64;
}

impl<P: TransferProvider + ?Sized> TransferProvider for &P {
    fn time_between(
        &self,
        stops: &dyn StopsData,
        from: StopId,
        to: StopId,
    ) -> Option<PositiveDuration> {
        (**self).time_between(stops, from, to)
    }

    fn times_between(
        &self,
        stops: &dyn StopsData,
        from: StopId,
        to: &[StopId],
    ) -> HashMap<StopId, PositiveDuration> {
        (**self).times_between(stops, from, to)
    }

    fn range(&self) -> f64 {
        (**self).range()
    }
}
