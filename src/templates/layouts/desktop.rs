use maud::{html, Markup, DOCTYPE};

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style {
                    "body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }"
                    "table { border-collapse: collapse; width: 100%; }"
                    "td { padding: 0.3rem 0.6rem; border-bottom: 1px solid #eee; vertical-align: top; }"
                    "code { background: #f4f4f4; padding: 0.1rem 0.3rem; border-radius: 4px; }"
                }
            }
            body {
                header {
                    h3 { "Parcel Comparables" }
                }
                (content)
            }
        }
    }
}
