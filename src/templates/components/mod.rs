use maud::{html, Markup};

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        div class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

/// One API route: method, path template, and a short description.
pub fn endpoint_row(method: &str, path: &str, about: &str) -> Markup {
    html! {
        tr {
            td { code { (method) } }
            td { code { (path) } }
            td { (about) }
        }
    }
}
