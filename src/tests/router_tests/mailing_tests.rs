use crate::db::{Field, ParcelStore, Predicate};
use crate::domain::address::parse_mailing_address;
use crate::tests::utils::{body_json, request, Seed, TestEnv};
use astra::Body;
use http::Method;

fn post(env: &TestEnv, pin: &str, body: &str) -> astra::Response {
    env.send(request(
        Method::POST,
        &format!("/parcels/{pin}/mailing-address"),
        None,
        Body::from(body.as_bytes().to_vec()),
    ))
}

fn env_with_pin() -> TestEnv {
    let env = TestEnv::new();
    env.seed(&[
        Seed {
            pin: "3904417",
            mail_street_number: Some("1"),
            mail_street_name: Some("OLD"),
            mail_street_type: Some("RD"),
            ..Seed::at(1, "8", "WILLOW", "GOLDEN")
        },
        // second row of the same PIN
        Seed {
            pin: "3904417",
            record_code: Some("2"),
            ..Seed::at(2, "8", "WILLOW", "GOLDEN")
        },
    ]);
    env
}

#[test]
fn edit_rewrites_every_row_of_the_pin() {
    let env = env_with_pin();

    let resp = post(
        &env,
        "3904417",
        r#"{"address":"2301 n washington ave apt 4","city":"golden","state":"co","zip":"80401-1234"}"#,
    );
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert_eq!(json["ok"], true);
    assert_eq!(json["rows_affected"], 2);
    assert_eq!(json["mailing_address"]["street_name"], "WASHINGTON");
    assert_eq!(json["mailing_address"]["suffix"], "APT 4");
    assert_eq!(json["mailing_address"]["zip4"], "1234");

    // what was stored re-parses to the same address
    let stored = env
        .state
        .store
        .range_query(
            &Predicate::matches(Field::Pin, "3904417"),
            &crate::db::OrderBy::Natural,
            None,
        )
        .unwrap();
    assert_eq!(stored.len(), 2);
    let expected = parse_mailing_address("2301 N WASHINGTON AVE APT 4", "GOLDEN", "CO", "80401-1234")
        .unwrap();
    for row in stored {
        assert_eq!(row.mailing_key(), "2301 N WASHINGTON AVE APT 4");
        let line = [
            row.mail_street_number.as_deref(),
            row.mail_direction.as_deref(),
            row.mail_street_name.as_deref(),
            row.mail_street_type.as_deref(),
            row.mail_suffix.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
        let zip = match &row.mail_zip4 {
            Some(ext) => format!("{}-{ext}", row.mail_zip5.as_deref().unwrap_or_default()),
            None => row.mail_zip5.clone().unwrap_or_default(),
        };
        let reparsed = parse_mailing_address(
            &line,
            row.mail_city.as_deref().unwrap_or_default(),
            row.mail_state.as_deref().unwrap_or_default(),
            &zip,
        )
        .unwrap();
        assert_eq!(reparsed, expected);
    }
}

#[test]
fn invalid_street_type_changes_nothing() {
    let env = env_with_pin();

    let resp = post(
        &env,
        "3904417",
        r#"{"address":"12 Main Qq","city":"golden","state":"co","zip":"80401"}"#,
    );
    assert_eq!(resp.status(), 400);
    assert!(body_json(resp)["error"]
        .as_str()
        .unwrap()
        .contains("street type"));

    let row = env
        .state
        .store
        .find_one(&Predicate::matches(Field::ObjectId, "1"))
        .unwrap()
        .unwrap();
    assert_eq!(row.mailing_key(), "1 OLD RD");
}

#[test]
fn malformed_zip_state_or_body_is_rejected() {
    let env = env_with_pin();

    for body in [
        r#"{"address":"12 Main St","city":"golden","state":"co","zip":"8040"}"#,
        r#"{"address":"12 Main St","city":"golden","state":"colorado","zip":"80401"}"#,
        r#"{"address":"12 Main St","city":" ","state":"co","zip":"80401"}"#,
        r#"{"address":"12 Main St"}"#,
        "not json",
    ] {
        assert_eq!(post(&env, "3904417", body).status(), 400, "{body}");
    }
}

#[test]
fn unknown_pin_is_not_found() {
    let env = env_with_pin();

    let resp = post(
        &env,
        "0000000",
        r#"{"address":"12 Main St","city":"golden","state":"co","zip":"80401"}"#,
    );
    assert_eq!(resp.status(), 404);
}
