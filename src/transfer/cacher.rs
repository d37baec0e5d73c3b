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

use super::TransferProvider;
use crate::time::PositiveDuration;
use crate::transit_data::{StopId, StopsData};

use std::collections::HashMap;
use std::sync::RwLock;

/// Memoizes a fallback provider, per pair and per batch.
///
/// One instance may be shared by several concurrent scans : lookups take a
/// read lock, only an actual miss takes the write lock to record the
/// computed value. Unreachable answers are cached too, they are just as
/// expensive to recompute.
pub struct TransferCache<P> {
    fallback: P,
    single: RwLock<HashMap<(StopId, StopId), Option<PositiveDuration>>>,
    batched: RwLock<HashMap<(StopId, Vec<StopId>), HashMap<StopId, PositiveDuration>>>,
}

impl<P: TransferProvider> TransferCache<P> {
    pub fn new(fallback: P) -> Self {
        Self {
            fallback,
            single: RwLock::new(HashMap::new()),
            batched: RwLock::new(HashMap::new()),
        }
    }

    /// Computes (and records in the shared cache) the answers for `pairs`,
    /// then hands them out as a closed, request-scoped cache. The closed
    /// cache never writes; anything outside its prefilled pairs falls
    /// through to this shared cache.
    pub fn prefill(
        &self,
        stops: &dyn StopsData,
        pairs: &[(StopId, StopId)],
    ) -> ClosedTransferCache<'_, P> {
        let mut frozen = HashMap::new();
        for &(from, to) in pairs {
            let duration = self.time_between(stops, from, to);
            frozen.insert((from, to), duration);
        }
        ClosedTransferCache {
            shared: self,
            frozen,
        }
    }
}

impl<P: TransferProvider> TransferProvider for TransferCache<P> {
    fn time_between(
        &self,
        stops: &dyn StopsData,
        from: StopId,
        to: StopId,
    ) -> Option<PositiveDuration> {
        {
            let cache = self.single.read().expect("poisoned transfer cache lock");
            if let Some(cached) = cache.get(&(from, to)) {
                return *cached;
            }
        }
        let computed = self.fallback.time_between(stops, from, to);
        let mut cache = self.single.write().expect("poisoned transfer cache lock");
        cache.insert((from, to), computed);
        computed
    }

    fn times_between(
        &self,
        stops: &dyn StopsData,
        from: StopId,
        to: &[StopId],
    ) -> HashMap<StopId, PositiveDuration> {
        let key = (from, to.to_vec());
        {
            let cache = self.batched.read().expect("poisoned transfer cache lock");
            if let Some(cached) = cache.get(&key) {
                return cached.clone();
            }
        }
        let computed = self.fallback.times_between(stops, from, to);
        let mut cache = self.batched.write().expect("poisoned transfer cache lock");
        cache.insert(key, computed.clone());
        computed
    }

    fn range(&self) -> f64 {
        self.fallback.range()
    }
}

/// The short-lived tier of a two-tier cache : its own map is filled once by
/// `TransferCache::prefill` and then closed. Being read-only, it can be
/// consulted without any locking; misses fall through to the long-lived
/// shared cache.
pub struct ClosedTransferCache<'cache, P> {
    shared: &'cache TransferCache<P>,
    frozen: HashMap<(StopId, StopId), Option<PositiveDuration>>,
}

impl<P: TransferProvider> TransferProvider for ClosedTransferCache<'_, P> {
    fn time_between(
        &self,
        stops: &dyn StopsData,
        from: StopId,
        to: StopId,
    ) -> Option<PositiveDuration> {
        if let Some(cached) = self.frozen.get(&(from, to)) {
            return *cached;
        }
        self.shared.time_between(stops, from, to)
    }

    fn range(&self) -> f64 {
        self.shared.range()
    }
}
