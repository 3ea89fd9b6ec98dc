use crate::tests::utils::{body_json, request, Seed, TestEnv};
use astra::Body;
use http::Method;

fn env_with_parcels() -> TestEnv {
    let env = TestEnv::new();
    env.seed(&[
        Seed::at(1, "1", "CEDAR", "GOLDEN"),
        Seed::at(2, "2", "CEDAR", "GOLDEN"),
    ]);
    env
}

fn call(env: &TestEnv, method: Method, uri: &str, session: Option<&str>) -> astra::Response {
    env.send(request(method, uri, session, Body::empty()))
}

#[test]
fn star_routes_require_a_session() {
    let env = env_with_parcels();

    assert_eq!(call(&env, Method::GET, "/stars", None).status(), 401);
    assert_eq!(call(&env, Method::POST, "/stars/1", None).status(), 401);
    assert_eq!(call(&env, Method::GET, "/me", Some("forged")).status(), 401);
}

#[test]
fn me_reports_the_session_user() {
    let env = env_with_parcels();
    let token = env.session_for("kkubaska");

    let resp = call(&env, Method::GET, "/me", Some(&token));
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp)["username"], "kkubaska");
}

#[test]
fn starring_is_idempotent_and_listed_newest_first() {
    let env = env_with_parcels();
    let token = env.session_for("kkubaska");

    let first = body_json(call(&env, Method::POST, "/stars/1", Some(&token)));
    assert_eq!(first["ok"], true);
    assert_eq!(first["rows_affected"], 1);

    let again = body_json(call(&env, Method::POST, "/stars/1", Some(&token)));
    assert_eq!(again["rows_affected"], 0);

    call(&env, Method::POST, "/stars/2", Some(&token));

    let listed = body_json(call(&env, Method::GET, "/stars", Some(&token)));
    let ids: Vec<_> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["object_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [2, 1]);
    assert_eq!(listed[0]["username"], "kkubaska");
}

#[test]
fn stars_are_private_to_their_owner() {
    let env = env_with_parcels();
    let owner = env.session_for("kkubaska");
    let other = env.session_for("mlee");

    call(&env, Method::POST, "/stars/1", Some(&owner));

    let listed = body_json(call(&env, Method::GET, "/stars", Some(&other)));
    assert!(listed.as_array().unwrap().is_empty());

    let resp = call(&env, Method::DELETE, "/stars/1", Some(&other));
    assert_eq!(resp.status(), 400);

    let resp = call(&env, Method::DELETE, "/stars/1", Some(&owner));
    assert_eq!(resp.status(), 200);
    assert_eq!(body_json(resp)["rows_affected"], 1);

    let listed = body_json(call(&env, Method::GET, "/stars", Some(&owner)));
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn starring_requires_an_existing_parcel() {
    let env = env_with_parcels();
    let token = env.session_for("kkubaska");

    assert_eq!(call(&env, Method::POST, "/stars/999", Some(&token)).status(), 404);
    assert_eq!(call(&env, Method::POST, "/stars/abc", Some(&token)).status(), 400);
}
