use crate::tests::utils::{body_json, Seed, TestEnv};
use chrono::{Months, Utc};
use std::io::Read;

fn years_ago(years: u32) -> String {
    let today = Utc::now().date_naive();
    today
        .checked_sub_months(Months::new(12 * years))
        .unwrap_or(today)
        .to_string()
}

fn parcel(id: i64, neighborhood: &'static str, sold: Option<String>) -> Seed {
    Seed {
        neighborhood: Some(neighborhood),
        tax_class: Some("1112"),
        sale_date1: sold,
        ..Seed::at(id, "1", "ASPEN", "ARVADA")
    }
}

fn neighborhoods(env: &TestEnv) {
    env.seed(&[
        parcel(1, "RALSTON", Some(years_ago(1))),
        parcel(2, "RALSTON", Some(years_ago(20))),
        parcel(3, "RALSTON", None),
        parcel(4, "RALSTON", Some(years_ago(2))),
        parcel(5, "OLDE TOWN", Some(years_ago(3))),
        parcel(6, "OLDE TOWN", None),
        parcel(7, "QUIET", None),
    ]);
}

#[test]
fn neighborhood_turnover_counts_sales_inside_the_window() {
    let env = TestEnv::new();
    neighborhoods(&env);

    let resp = env.get("/turnover/neighborhoods?years=10");
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert_eq!(json["group_by"], "neighborhood");
    assert_eq!(json["years"], 10);

    let rows: Vec<_> = json["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| {
            (
                r["name"].as_str().unwrap(),
                r["sold_parcels"].as_i64().unwrap(),
                r["turnover_percent"].as_f64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        [("OLDE TOWN", 1, 50.0), ("RALSTON", 2, 50.0), ("QUIET", 0, 0.0)]
    );
}

#[test]
fn shorter_window_drops_older_sales() {
    let env = TestEnv::new();
    neighborhoods(&env);

    let json = body_json(env.get("/turnover/neighborhoods?years=1"));
    let ralston = json["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "RALSTON")
        .cloned()
        .unwrap();
    assert_eq!(ralston["sold_parcels"], 1);
    assert_eq!(ralston["turnover_percent"], 25.0);
}

#[test]
fn years_out_of_range_are_rejected() {
    let env = TestEnv::new();
    for years in ["0", "101", "-3", "ten"] {
        let resp = env.get(&format!("/turnover/neighborhoods?years={years}"));
        assert_eq!(resp.status(), 400, "years={years}");
    }
}

#[test]
fn subdivision_turnover_suppresses_small_and_non_residential_groups() {
    let env = TestEnv::new();
    let mut seeds = Vec::new();
    for id in 1..=20 {
        seeds.push(Seed {
            subdivision: Some("CANDELAS"),
            tax_class: Some("1112"),
            sale_date1: (id <= 5).then(|| years_ago(1)),
            ..Seed::at(id, "1", "CANDELAS", "ARVADA")
        });
    }
    for id in 21..=23 {
        seeds.push(Seed {
            subdivision: Some("TINY ACRES"),
            tax_class: Some("1112"),
            sale_date1: Some(years_ago(1)),
            ..Seed::at(id, "1", "TINY", "ARVADA")
        });
    }
    for id in 24..=50 {
        seeds.push(Seed {
            subdivision: Some("OFFICE PARK"),
            tax_class: Some("2212"),
            ..Seed::at(id, "1", "OFFICE", "ARVADA")
        });
    }
    env.seed(&seeds);

    let json = body_json(env.get("/turnover/subdivisions"));
    assert_eq!(json["group_by"], "subdivision");
    assert_eq!(json["years"], 10);

    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "CANDELAS");
    assert_eq!(rows[0]["total_parcels"], 20);
    assert_eq!(rows[0]["turnover_percent"], 25.0);
}

#[test]
fn value_change_is_ranked_by_percent() {
    let env = TestEnv::new();
    let valued = |id: i64,
                  neighborhood: &'static str,
                  current: f64,
                  prior: f64,
                  tax_class: &'static str| Seed {
        neighborhood: Some(neighborhood),
        value_current: Some(current),
        value_prior: Some(prior),
        tax_class: Some(tax_class),
        ..Seed::at(id, "1", "BIRCH", "GOLDEN")
    };
    env.seed(&[
        valued(1, "NORTH", 110.0, 100.0, "1112"),
        valued(2, "NORTH", 220.0, 200.0, "1112"),
        valued(3, "SOUTH", 90.0, 100.0, "1112"),
        valued(4, "NEW BUILD", 500.0, 0.0, "1112"),
        valued(5, "DOWNTOWN", 900.0, 100.0, "2212"),
    ]);

    let resp = env.get("/value-change/neighborhoods");
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    let rows = json.as_array().unwrap();
    let names: Vec<_> = rows.iter().map(|r| r["neighborhood"].as_str().unwrap()).collect();
    assert_eq!(names, ["NORTH", "SOUTH"]);

    assert_eq!(rows[0]["current_total"], 330.0);
    assert_eq!(rows[0]["prior_total"], 300.0);
    assert_eq!(rows[0]["value_change"], 30.0);
    assert_eq!(rows[0]["percent_change"], 10.0);
    assert_eq!(rows[1]["percent_change"], -10.0);
}

#[test]
fn neighborhood_report_downloads_as_xlsx() {
    let env = TestEnv::new();
    neighborhoods(&env);

    let resp = env.get("/reports/neighborhoods.xlsx?years=5");
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert!(resp
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("attachment; filename=\"neighborhoods_"));

    let mut bytes = Vec::new();
    resp.into_body().reader().read_to_end(&mut bytes).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn multi_record_parcels_count_once() {
    let env = TestEnv::new();
    env.seed(&[
        Seed {
            pin: "3907001",
            ..parcel(1, "RALSTON", Some(years_ago(1)))
        },
        Seed {
            pin: "3907001",
            record_code: Some("2"),
            ..parcel(2, "RALSTON", Some(years_ago(1)))
        },
        Seed {
            pin: "3907002",
            ..parcel(3, "RALSTON", None)
        },
    ]);

    let json = body_json(env.get("/turnover/neighborhoods"));
    let rows = json["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["total_parcels"], 2);
    assert_eq!(rows[0]["sold_parcels"], 1);
    assert_eq!(rows[0]["turnover_percent"], 50.0);
}

#[test]
fn a_sale_in_any_sale_column_counts() {
    let env = TestEnv::new();
    env.seed(&[
        // only sale is in the third column
        Seed {
            sale_date3: Some(years_ago(2)),
            ..parcel(1, "RALSTON", None)
        },
        // most recent column is stale, the oldest one is not
        Seed {
            sale_date4: Some(years_ago(3)),
            ..parcel(2, "RALSTON", Some(years_ago(30)))
        },
        Seed {
            sale_date2: Some(years_ago(40)),
            ..parcel(3, "RALSTON", Some(years_ago(30)))
        },
        parcel(4, "RALSTON", None),
    ]);

    let json = body_json(env.get("/turnover/neighborhoods?years=10"));
    let row = &json["rows"][0];
    assert_eq!(row["name"], "RALSTON");
    assert_eq!(row["total_parcels"], 4);
    assert_eq!(row["sold_parcels"], 2);
    assert_eq!(row["turnover_percent"], 50.0);
}

#[test]
fn value_change_ignores_secondary_records() {
    let env = TestEnv::new();
    let valued = |id: i64, pin: &'static str, record_code: &'static str| Seed {
        pin,
        record_code: Some(record_code),
        neighborhood: Some("NORTH"),
        value_current: Some(110.0),
        value_prior: Some(100.0),
        tax_class: Some("1112"),
        ..Seed::at(id, "1", "BIRCH", "GOLDEN")
    };
    env.seed(&[
        valued(1, "3908001", "1"),
        valued(2, "3908001", "2"),
        valued(3, "3908002", "1"),
    ]);

    let json = body_json(env.get("/value-change/neighborhoods"));
    assert_eq!(json[0]["current_total"], 220.0);
    assert_eq!(json[0]["prior_total"], 200.0);
    assert_eq!(json[0]["percent_change"], 10.0);
}
