// templates/pages/home.rs

use crate::templates::{card, components::endpoint_row, desktop_layout};
use maud::{html, Markup};

const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/owners?name=", "Parcels whose owner names contain the text"),
    ("GET", "/comps/city?address=&city=", "City-wide value comparison"),
    ("GET", "/comps/neighborhood?address=&neighborhood=", "Neighborhood value comparison"),
    ("GET", "/comps/radius?address=&city=&radius=", "Comparables within a radius (miles, default 0.5)"),
    ("GET", "/cities/property-types?city=", "Parcel counts by property type"),
    ("GET", "/cities/occupancy?city=", "Owner-occupied / rental / commercial mix"),
    ("GET", "/neighbors?pin= | ?address=&city=", "Nearest parcels (limit defaults to 50)"),
    ("GET", "/turnover/neighborhoods?years=", "Sale turnover per neighborhood"),
    ("GET", "/turnover/subdivisions?years=", "Sale turnover per subdivision"),
    ("GET", "/value-change/neighborhoods", "Year-over-year assessed value change"),
    ("GET", "/fun-facts/streets", "Top streets by total assessed value"),
    ("GET", "/fun-facts/street-types", "Street types by average assessed value"),
    ("GET", "/reports/neighborhoods.xlsx?years=", "Turnover and value change workbook"),
    ("GET", "/me", "Current user"),
    ("GET", "/stars", "Your starred parcels"),
    ("POST", "/stars/{object_id}", "Star a parcel"),
    ("DELETE", "/stars/{object_id}", "Remove a star"),
    ("POST", "/parcels/{pin}/mailing-address", "Validate and save a mailing address"),
];

pub fn home_page() -> Markup {
    desktop_layout(
        "Parcel Comparables",
        html! {
            h1 { "Parcel Comparables" }

            (card("API", html! {
                p { "All endpoints answer JSON. Text matching ignores case and extra spaces." }
                table {
                    @for (method, path, about) in ENDPOINTS {
                        (endpoint_row(method, path, about))
                    }
                }
            }))
        },
    )
}
