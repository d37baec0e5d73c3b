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
use hermod::request::DefaultProfile;
use hermod::transit_data::FlowDirection;
use hermod::{
    BadRequest, EarliestArrivalScan, PositiveDuration, RequestInput, TransitDataBuilder,
};
use utils::{duration, init, seconds, trip};

#[test]
fn one_connection_journey() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    let connection = builder.add_connection(a, b, seconds(1000), duration(600), trip(0));
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(a, b, seconds(900), seconds(2000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("a journey should exist");

    assert_eq!(response.arrival_time, seconds(1600));
    assert_eq!(response.nb_of_vehicle_sections(), 1);
    assert_eq!(response.first_vehicle().unwrap().connections, vec![connection]);
    assert_eq!(response.metric.nb_of_vehicles, 1);
    assert_eq!(response.metric.walking_time, PositiveDuration::zero());
    Ok(())
}

#[test]
fn no_overscan_past_the_best_arrival() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    builder.add_connection(a, b, seconds(1000), duration(600), trip(0));
    // departures after the best arrival must not change the answer
    builder.add_connection(a, b, seconds(2000), duration(600), trip(1));
    builder.add_connection(a, b, seconds(3000), duration(600), trip(2));
    builder.add_connection(a, b, seconds(4000), duration(600), trip(3));
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(a, b, seconds(900), seconds(20_000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("a journey should exist");

    assert_eq!(response.arrival_time, seconds(1600));
    assert_eq!(response.nb_of_sections(), 1);
    Ok(())
}

#[test]
fn journey_with_begin_walk() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    // a few meters from `a`
    let origin = builder.add_stop(0.0001, 0.0001);
    builder.add_connection(a, b, seconds(1000), duration(600), trip(0));
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(origin, b, seconds(900), seconds(2000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("a journey should exist");

    assert!(response.has_walk());
    assert_eq!(response.arrival_time, seconds(1600));
    assert_eq!(response.nb_of_vehicle_sections(), 1);
    Ok(())
}

#[test]
fn journey_with_end_walk() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    let destination = builder.add_stop(0.1001, 0.1001);
    builder.add_connection(a, b, seconds(1000), duration(600), trip(0));
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(a, destination, seconds(900), seconds(2000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("a journey should exist");

    assert!(response.has_walk());
    assert!(response.arrival_time > seconds(1600));
    assert_eq!(response.nb_of_vehicle_sections(), 1);
    Ok(())
}

#[test]
fn journey_with_begin_and_end_walk() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    let origin = builder.add_stop(0.0001, 0.0001);
    let destination = builder.add_stop(0.1001, 0.1001);
    builder.add_connection(a, b, seconds(1000), duration(600), trip(0));
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(origin, destination, seconds(900), seconds(2000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("a journey should exist");

    assert!(response.has_walk());
    assert_eq!(response.nb_of_vehicle_sections(), 1);
    Ok(())
}

#[test]
fn journey_with_intermediate_walk() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(50.0, 50.0);
    let b = builder.add_stop(0.0, 0.0);
    // walking distance from `b`
    let c = builder.add_stop(0.0001, 0.0001);
    let d = builder.add_stop(60.0, 60.0);
    builder.add_connection(a, b, seconds(1000), duration(600), trip(0));
    builder.add_connection(c, d, seconds(2000), duration(600), trip(1));
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(a, d, seconds(900), seconds(20_000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("a journey should exist");

    assert!(response.has_walk());
    assert_eq!(response.nb_of_vehicle_sections(), 2);
    assert_eq!(response.arrival_time, seconds(2600));
    assert_eq!(response.metric.nb_of_vehicles, 2);
    Ok(())
}

#[test]
fn get_on_only_then_get_off_only_on_different_trips_is_no_route() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    let c = builder.add_stop(0.2, 0.2);
    builder.add_connection_with_flow(
        a,
        b,
        seconds(1000),
        duration(600),
        trip(0),
        FlowDirection::BoardOnly,
    );
    builder.add_connection_with_flow(
        b,
        c,
        seconds(2000),
        duration(600),
        trip(1),
        FlowDirection::DebarkOnly,
    );
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(a, c, seconds(900), seconds(20_000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    // cannot alight from the first vehicle, cannot board the second
    assert!(scan.earliest_arrival_journey().is_none());
    Ok(())
}

#[test]
fn get_on_only_then_get_off_only_on_the_same_trip_rides_through() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    let c = builder.add_stop(0.2, 0.2);
    builder.add_connection_with_flow(
        a,
        b,
        seconds(1000),
        duration(600),
        trip(0),
        FlowDirection::BoardOnly,
    );
    builder.add_connection_with_flow(
        b,
        c,
        seconds(2000),
        duration(600),
        trip(0),
        FlowDirection::DebarkOnly,
    );
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(a, c, seconds(900), seconds(20_000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("staying seated rides through");

    assert_eq!(response.arrival_time, seconds(2600));
    assert_eq!(response.metric.nb_of_vehicles, 1);
    assert_eq!(response.nb_of_vehicle_sections(), 1);
    Ok(())
}

#[test]
fn no_board_no_debark_is_no_route() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    builder.add_connection_with_flow(
        a,
        b,
        seconds(1000),
        duration(600),
        trip(0),
        FlowDirection::NoBoardDebark,
    );
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(a, b, seconds(900), seconds(2000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    assert!(scan.earliest_arrival_journey().is_none());
    Ok(())
}

#[test]
fn get_on_only_cannot_be_the_alighting_edge() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    builder.add_connection_with_flow(
        a,
        b,
        seconds(1000),
        duration(600),
        trip(0),
        FlowDirection::BoardOnly,
    );
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(a, b, seconds(900), seconds(2000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    assert!(scan.earliest_arrival_journey().is_none());
    Ok(())
}

/// Regression : the scan once produced "depart from A, ride to a detour stop,
/// board the direct trip there, pass through A again while seated". The
/// direct boarding at A must win instead.
#[test]
fn via_start_location_again() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let departure = builder.add_stop(0.0, 0.0);
    let arrival = builder.add_stop(1.0, 1.0);
    let detour = builder.add_stop(2.0, 2.0);

    builder.add_connection(departure, detour, seconds(1000), duration(100), trip(0));
    builder.add_connection(detour, departure, seconds(1500), duration(100), trip(1));
    builder.add_connection(departure, arrival, seconds(1700), duration(100), trip(1));
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(departure, arrival, seconds(1000), seconds(2000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("a journey should exist");

    assert_eq!(response.arrival_time, seconds(1800));
    // only the last connection is used
    assert_eq!(response.nb_of_sections(), 1);
    assert_eq!(response.first_vehicle().unwrap().connections.len(), 1);
    Ok(())
}

#[test]
fn departure_fallback_delays_the_first_boarding() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    // leaves before the fallback is over
    builder.add_connection(a, b, seconds(1000), duration(600), trip(0));
    builder.add_connection(a, b, seconds(1500), duration(600), trip(1));
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput {
        earliest_departure: seconds(900),
        latest_arrival: seconds(20_000),
        departures: vec![(a, duration(300))],
        arrivals: vec![(b, PositiveDuration::zero())],
    };
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("a journey should exist");

    // ready at 1200 only : the 1000 departure is gone
    assert_eq!(response.arrival_time, seconds(2100));
    assert_eq!(response.metric.walking_time, duration(300));
    Ok(())
}

#[test]
fn arrival_fallback_is_appended_to_the_journey() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    builder.add_connection(a, b, seconds(1000), duration(600), trip(0));
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput {
        earliest_departure: seconds(900),
        latest_arrival: seconds(20_000),
        departures: vec![(a, PositiveDuration::zero())],
        arrivals: vec![(b, duration(100))],
    };
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("a journey should exist");

    assert_eq!(response.arrival_time, seconds(1700));
    assert_eq!(response.metric.walking_time, duration(100));
    assert_eq!(response.metric.travel_time, duration(700));
    Ok(())
}

#[test]
fn a_profile_built_from_request_params() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    let c = builder.add_stop(0.2, 0.2);
    builder.add_connection(a, b, seconds(1000), duration(600), trip(0));
    // only boardable with a one-minute transfer, not with the default three
    builder.add_connection(b, c, seconds(1700), duration(600), trip(1));
    let data = builder.build();

    let params: hermod::config::RequestParams =
        serde_json::from_str(r#"{"transfer_duration": "00:01:00"}"#)?;
    let profile = DefaultProfile::from_params(&params);
    let request = RequestInput::depart_after(a, c, seconds(900), params.max_journey_duration);
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    let response = scan.solve().expect("a journey should exist");
    assert_eq!(response.arrival_time, seconds(2300));

    let strict = DefaultProfile::default_profile();
    let mut scan = EarliestArrivalScan::new(&data, &request, &strict)?;
    assert!(scan.earliest_arrival_journey().is_none());
    Ok(())
}

#[test]
fn empty_window_is_a_bad_request() {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(a, b, seconds(2000), seconds(2000));
    let result = EarliestArrivalScan::new(&data, &request, &profile);
    assert!(matches!(result, Err(BadRequest::BadTimeWindow)));
}

#[test]
fn no_connection_within_the_window_is_no_route() -> Result<(), Error> {
    init();
    let mut builder = TransitDataBuilder::new();
    let a = builder.add_stop(0.0, 0.0);
    let b = builder.add_stop(0.1, 0.1);
    builder.add_connection(a, b, seconds(5000), duration(600), trip(0));
    let data = builder.build();

    let profile = DefaultProfile::default_profile();
    let request = RequestInput::between(a, b, seconds(900), seconds(2000));
    let mut scan = EarliestArrivalScan::new(&data, &request, &profile)?;
    assert!(scan.earliest_arrival_journey().is_none());
    Ok(())
}
