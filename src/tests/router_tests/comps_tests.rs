use crate::tests::utils::{body_json, Seed, TestEnv};

fn golden_street(env: &TestEnv) {
    env.seed(&[
        Seed {
            value_current: Some(200_000.0),
            neighborhood: Some("APPLEWOOD"),
            x: Some(0.0),
            y: Some(0.0),
            ..Seed::at(1, "200", "MAIN", "GOLDEN")
        },
        Seed {
            value_current: Some(300_000.0),
            neighborhood: Some("APPLEWOOD"),
            x: Some(1000.0),
            y: Some(0.0),
            ..Seed::at(2, "300", "MAIN", "GOLDEN")
        },
        Seed {
            value_current: Some(400_000.0),
            neighborhood: Some("PLEASANT VIEW"),
            x: Some(0.0),
            y: Some(2000.0),
            ..Seed::at(3, "400", "MAIN", "GOLDEN")
        },
        // unpriced parcels never count toward stats
        Seed {
            x: Some(500.0),
            y: Some(0.0),
            ..Seed::at(4, "500", "MAIN", "GOLDEN")
        },
        Seed {
            value_current: Some(900_000.0),
            x: Some(5000.0),
            y: Some(0.0),
            ..Seed::at(5, "900", "MAIN", "ARVADA")
        },
    ]);
}

#[test]
fn city_comps_cover_every_priced_parcel_in_the_city() {
    let env = TestEnv::new();
    golden_street(&env);

    let resp = env.get("/comps/city?address=200%20main%20st&city=golden");
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert_eq!(json["property"]["address"], "200 MAIN ST");
    assert_eq!(json["property"]["price"], 200_000.0);

    let stats = &json["city_stats"];
    assert_eq!(stats["num_properties"], 3);
    assert_eq!(stats["avg_price"], 300_000.0);
    assert_eq!(stats["min_price"], 200_000.0);
    assert_eq!(stats["max_price"], 400_000.0);
    assert_eq!(stats["price_range"], 200_000.0);
}

#[test]
fn city_comps_for_unknown_address_is_not_found() {
    let env = TestEnv::new();
    golden_street(&env);

    let resp = env.get("/comps/city?address=1%20nowhere%20st&city=golden");
    assert_eq!(resp.status(), 404);
}

#[test]
fn city_comps_require_both_parameters() {
    let env = TestEnv::new();

    let resp = env.get("/comps/city?address=200%20main%20st");
    assert_eq!(resp.status(), 400);
    assert_eq!(body_json(resp)["error"], "city is required");
}

#[test]
fn neighborhood_comps_stay_inside_the_neighborhood() {
    let env = TestEnv::new();
    golden_street(&env);

    let resp = env.get("/comps/neighborhood?address=300+Main+St&neighborhood=applewood");
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert_eq!(json["property"]["neighborhood"], "APPLEWOOD");
    assert_eq!(json["neighborhood_stats"]["num_properties"], 2);
    assert_eq!(json["neighborhood_stats"]["avg_price"], 250_000.0);
}

#[test]
fn radius_comps_are_nearest_first_and_exclude_the_subject() {
    let env = TestEnv::new();
    golden_street(&env);

    // default radius is half a mile (2640 ft)
    let resp = env.get("/comps/radius?address=200%20main%20st&city=golden");
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert_eq!(json["radius_miles"], 0.5);

    let comps = json["comparables"].as_array().unwrap();
    let addresses: Vec<_> = comps.iter().map(|c| c["address"].as_str().unwrap()).collect();
    assert_eq!(addresses, ["300 MAIN ST", "400 MAIN ST"]);

    let first = comps[0]["distance_miles"].as_f64().unwrap();
    assert!((first - 1000.0 / 5280.0).abs() < 1e-9);

    assert_eq!(json["comp_stats"]["num_properties"], 2);
    assert_eq!(json["comp_stats"]["avg_price"], 350_000.0);
}

#[test]
fn wider_radius_reaches_other_cities() {
    let env = TestEnv::new();
    golden_street(&env);

    let resp = env.get("/comps/radius?address=200%20main%20st&city=golden&radius=1");
    let json = body_json(resp);
    let comps = json["comparables"].as_array().unwrap();
    assert_eq!(comps.len(), 3);
    assert_eq!(comps[2]["city"], "ARVADA");
}

#[test]
fn zero_radius_yields_no_comparables() {
    let env = TestEnv::new();
    golden_street(&env);

    let resp = env.get("/comps/radius?address=200%20main%20st&city=golden&radius=0");
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert!(json["comparables"].as_array().unwrap().is_empty());
    assert_eq!(json["comp_stats"]["num_properties"], 0);
    assert!(json["comp_stats"]["avg_price"].is_null());
}

#[test]
fn negative_or_malformed_radius_is_rejected() {
    let env = TestEnv::new();
    golden_street(&env);

    for radius in ["-1", "wide"] {
        let resp = env.get(&format!(
            "/comps/radius?address=200%20main%20st&city=golden&radius={radius}"
        ));
        assert_eq!(resp.status(), 400, "radius={radius}");
    }
}
