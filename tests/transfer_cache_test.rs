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

mod utils;

use anyhow::Error;
use hermod::metric::TransferCompare;
use hermod::transfer::{CrowFlyWalk, InternalTransfer, TransferCache, TransferProvider};
use hermod::{EarliestArrivalScan, Profile, RequestInput, TransitData, TransitDataBuilder};
use utils::{duration, init, seconds, trip};

fn transfer_network() -> (TransitData, hermod::StopId, hermod::StopId) {
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    let c = builder.add_stop(0.2, 0.2);
    builder.add_connection(a, b, seconds(1000), duration(600), trip(0));
    builder.add_connection(b, c, seconds(2000), duration(600), trip(1));
    (builder.build(), a, c)
}

#[test]
fn concurrent_scans_share_one_transfer_cache() -> Result<(), Error> {
    init();
    let (data, a, c) = transfer_network();
    let cache = TransferCache::new(InternalTransfer::default());
    let request = RequestInput::between(a, c, seconds(900), seconds(7200));

    std::thread::scope(|scope| {
        let mut workers = Vec::new();
        for _ in 0..4 {
            let cache = &cache;
            let data = &data;
            let request = request.clone();
            workers.push(scope.spawn(move || {
                let profile = Profile::new(cache, None::<CrowFlyWalk>, TransferCompare);
                let mut scan = EarliestArrivalScan::new(data, &request, &profile)
                    .expect("the request is valid");
                scan.solve().expect("a journey should exist")
            }));
        }
        let arrivals: Vec<_> = workers
            .into_iter()
            .map(|worker| worker.join().unwrap().arrival_time)
            .collect();
        for arrival in arrivals {
            assert_eq!(arrival, seconds(2600));
        }
    });
    Ok(())
}

#[test]
fn a_closed_cache_serves_a_scan_and_falls_through_to_the_shared_tier() -> Result<(), Error> {
    init();
    let (data, a, c) = transfer_network();
    let shared = TransferCache::new(InternalTransfer::default());

    // the request-scoped tier knows the one pair the scan will ask about
    let b = hermod::StopId { tile: 0, local: 1 };
    let closed = shared.prefill(&data, &[(b, b)]);
    assert_eq!(
        closed.time_between(&data, b, b),
        Some(duration(180))
    );

    let profile = Profile::new(closed, None::<CrowFlyWalk>, TransferCompare);
    let request = RequestInput::between(a, c, seconds(900), seconds(7200));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("a journey should exist");
    assert_eq!(response.arrival_time, seconds(2600));
    assert_eq!(response.metric.nb_of_vehicles, 2);
    Ok(())
}
