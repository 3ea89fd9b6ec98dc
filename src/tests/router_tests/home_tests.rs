use crate::tests::utils::{body_json, body_string, Seed, TestEnv};

#[test]
fn index_lists_the_api() {
    let env = TestEnv::new();

    let resp = env.get("/");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("<!DOCTYPE html>"));
    assert!(body.contains("/comps/radius"));
    assert!(body.contains("/neighbors"));
}

#[test]
fn unknown_route_is_json_not_found() {
    let env = TestEnv::new();

    let resp = env.get("/listings");
    assert_eq!(resp.status(), 404);
    assert_eq!(body_json(resp)["error"], "not found");
}

#[test]
fn street_fun_facts_rank_by_value() {
    let env = TestEnv::new();
    let priced = |id: i64, name: &'static str, kind: &'static str, value: f64| Seed {
        street_type: Some(kind),
        value_current: Some(value),
        ..Seed::at(id, "1", name, "GOLDEN")
    };
    env.seed(&[
        priced(1, "MAIN", "ST", 1_000_000.0),
        priced(2, "MAIN", "ST", 500_000.0),
        priced(3, "LOOKOUT", "RD", 2_000_000.0),
        priced(4, "ELM", "AVE", 100_000.0),
        priced(5, "ASH", "CT", 50_000.0),
    ]);

    let streets = body_json(env.get("/fun-facts/streets"));
    let streets = streets.as_array().unwrap();
    assert_eq!(streets.len(), 3);
    assert_eq!(streets[0]["name"], "LOOKOUT");
    assert_eq!(streets[0]["value"], "2,000,000");
    assert_eq!(streets[1]["name"], "MAIN");
    assert_eq!(streets[1]["num_val"], 1_500_000.0);

    let types = body_json(env.get("/fun-facts/street-types"));
    let names: Vec<_> = types
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["RD", "ST", "AVE", "CT"]);
    assert_eq!(types[1]["num_val"], 750_000.0);
}
