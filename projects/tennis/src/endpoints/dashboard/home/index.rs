use axum::{extract::Extension, response::Html};

use crate::endpoints::dashboard::router::DashboardState;
use crate::utils::leaderboard::ServeStat;

/// Axum handler: GET /
pub async fn handler(Extension(state): Extension<DashboardState>) -> Html<String> {
    Html(render_home(&state.year, state.limit))
}

fn render_home(year: &str, limit: usize) -> String {
    let mut sections = String::new();
    for stat in ServeStat::ALL {
        sections.push_str(&format!(
            "<section>\
                <h2>{label}</h2>\
                <p>{description}</p>\
                <p><a href=\"/stats/{slug}\">Top {limit} table</a> | <a href=\"/stats/{slug}/chart\">Chart</a></p>\
            </section>",
            label = stat.label(),
            description = stat.description(),
            slug = stat.slug(),
        ));
    }

    format!(
        "<!DOCTYPE html>\
        <html lang=\"en\">\
        <head><meta charset=\"utf-8\"><title>ATP serve statistics {year}</title></head>\
        <body>\
            <h1>ATP serve statistics {year}</h1>\
            <p>Pick a statistic to see the top {limit} players.</p>\
            {sections}\
        </body>\
        </html>"
    )
}
