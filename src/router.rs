use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

use astra::Request;
use chrono::Utc;
use tracing::info;

use crate::analytics::mailing::{edit_mailing_address, MailingEdit};
use crate::analytics::neighbors::{find_neighbors, NeighborTarget, DEFAULT_NEIGHBOR_LIMIT};
use crate::analytics::turnover::{TurnoverWindow, DEFAULT_TURNOVER_YEARS};
use crate::analytics::{comps, fun_facts, occupancy, owners, stars, turnover, Lookup};
use crate::auth::sessions::{cookie_value, load_user_from_session};
use crate::config::AppConfig;
use crate::db::SqliteParcelStore;
use crate::errors::{ResultResp, ServerError};
use crate::responses::{html_response, json_ok, xlsx_response};
use crate::spreadsheets::export_neighborhood_report;
use crate::templates;

/// Everything a request handler may touch. Built once in `main`.
pub struct AppState {
    pub store: SqliteParcelStore,
    pub config: AppConfig,
}

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = Query::from_request(&req);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    info!(%method, %path, "request");

    let store = &state.store;
    let cfg = &state.config.analytics;

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => html_response(templates::pages::home_page()),

        ("GET", ["owners"]) => json_ok(&owners::owners_by_name(
            store,
            query.text("name"),
            cfg.owner_search_limit,
        )?),

        ("GET", ["comps", "city"]) => json_ok(&found(comps::city_comps(
            store,
            query.text("address"),
            query.text("city"),
        )?)?),

        ("GET", ["comps", "neighborhood"]) => json_ok(&found(comps::neighborhood_comps(
            store,
            query.text("address"),
            query.text("neighborhood"),
        )?)?),

        ("GET", ["comps", "radius"]) => json_ok(&found(comps::radius_comps(
            store,
            query.text("address"),
            query.text("city"),
            query.parse::<f64>("radius")?,
            cfg.radius_comp_limit,
        )?)?),

        ("GET", ["cities", "property-types"]) => {
            json_ok(&occupancy::property_types_by_city(store, query.text("city"))?)
        }

        ("GET", ["cities", "occupancy"]) => {
            json_ok(&occupancy::occupancy_by_city(
                store,
                query.text("city"),
                &cfg.primary_record_code,
            )?)
        }

        ("GET", ["neighbors"]) => {
            let target =
                NeighborTarget::from_params(query.get("pin"), query.get("address"), query.get("city"))?;
            let limit = query
                .parse::<usize>("limit")?
                .unwrap_or(DEFAULT_NEIGHBOR_LIMIT)
                .min(cfg.neighbor_limit_max);
            json_ok(&found(find_neighbors(
                store,
                &target,
                limit,
                &cfg.primary_record_code,
            )?)?)
        }

        ("GET", ["turnover", "neighborhoods"]) => {
            json_ok(&turnover::turnover_by_neighborhood(store, window(&query)?)?)
        }

        ("GET", ["turnover", "subdivisions"]) => json_ok(&turnover::turnover_by_subdivision(
            store,
            window(&query)?,
            &cfg.subdivision_tax_class_prefix,
            cfg.subdivision_min_parcels,
        )?),

        ("GET", ["value-change", "neighborhoods"]) => json_ok(&turnover::value_change_by_neighborhood(
            store,
            &cfg.residential_tax_class_prefix,
            &cfg.primary_record_code,
        )?),

        ("GET", ["fun-facts", "streets"]) => json_ok(&fun_facts::most_valuable_streets(store)?),

        ("GET", ["fun-facts", "street-types"]) => {
            json_ok(&fun_facts::most_valuable_street_types(store)?)
        }

        ("GET", ["reports", "neighborhoods.xlsx"]) => {
            let window = window(&query)?;
            let report = turnover::turnover_by_neighborhood(store, window)?;
            let value_change = turnover::value_change_by_neighborhood(
                store,
                &cfg.residential_tax_class_prefix,
                &cfg.primary_record_code,
            )?;
            let buffer = export_neighborhood_report(&report, &value_change)?;
            xlsx_response(buffer, &format!("neighborhoods_{}.xlsx", window.as_of()))
        }

        ("GET", ["me"]) => {
            let username = current_user(&req, state)?;
            json_ok(&serde_json::json!({ "username": username }))
        }

        ("GET", ["stars"]) => {
            let username = current_user(&req, state)?;
            json_ok(&stars::list_stars(store, &username)?)
        }

        ("POST", ["stars", object_id]) => {
            let username = current_user(&req, state)?;
            let object_id = parse_object_id(object_id)?;
            let now = Utc::now().timestamp();
            json_ok(&found(stars::star_parcel(store, &username, object_id, now)?)?)
        }

        ("DELETE", ["stars", object_id]) => {
            let username = current_user(&req, state)?;
            let object_id = parse_object_id(object_id)?;
            json_ok(&stars::unstar_parcel(store, &username, object_id)?)
        }

        ("POST", ["parcels", pin, "mailing-address"]) => {
            let edit: MailingEdit = read_json(req)?;
            json_ok(&found(edit_mailing_address(store, pin, &edit)?)?)
        }

        _ => Err(ServerError::NotFound),
    }
}

fn found<T>(lookup: Lookup<T>) -> Result<T, ServerError> {
    lookup.found().ok_or(ServerError::NotFound)
}

fn window(query: &Query) -> Result<TurnoverWindow, ServerError> {
    let years = query.parse::<u32>("years")?.unwrap_or(DEFAULT_TURNOVER_YEARS);
    Ok(TurnoverWindow::new(years, Utc::now().date_naive())?)
}

fn parse_object_id(raw: &str) -> Result<i64, ServerError> {
    raw.parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid object id {raw:?}")))
}

fn read_json<T: serde::de::DeserializeOwned>(req: Request) -> Result<T, ServerError> {
    let mut body = String::new();
    req.into_body()
        .reader()
        .read_to_string(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("unreadable body: {e}")))?;
    serde_json::from_str(&body).map_err(|e| ServerError::BadRequest(format!("invalid JSON body: {e}")))
}

/// Username behind the request's session cookie.
fn current_user(req: &Request, state: &AppState) -> Result<String, ServerError> {
    let token = req
        .headers()
        .get("Cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|header| cookie_value(header, &state.config.session_cookie))
        .ok_or_else(|| ServerError::Unauthorized("sign in required".into()))?;

    let now = Utc::now().timestamp();
    state
        .store
        .database()
        .with_conn(|conn| load_user_from_session(conn, token, now))?
        .ok_or_else(|| ServerError::Unauthorized("session expired or invalid".into()))
}

/// Percent-decoded query parameters.
struct Query(HashMap<String, String>);

impl Query {
    fn from_request(req: &Request) -> Self {
        let map = req
            .uri()
            .query()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Query(map)
    }

    /// Trimmed value, or None when absent or blank.
    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value or empty string; required-ness is checked by the operation.
    fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, ServerError> {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| ServerError::BadRequest(format!("invalid {key}: {raw:?}")))
            })
            .transpose()
    }
}
