use plotters::prelude::*;

use super::leaderboard::Leaderboard;

/// Chart configuration options
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
    pub bar_color: RGBColor,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            bar_color: RGBColor(31, 119, 180),
        }
    }
}

/// Renders a leaderboard as an SVG bar chart, one bar per player in rank order.
pub fn generate_leaderboard_chart(
    leaderboard: &Leaderboard,
    config: &ChartConfig,
) -> Result<String, String> {
    if leaderboard.rows.is_empty() {
        return Ok(generate_empty_chart(leaderboard.label, config.width, config.height));
    }

    let names: Vec<String> = leaderboard.rows.iter().map(|row| short_name(&row.player_name)).collect();
    let values: Vec<f64> = leaderboard.rows.iter().map(|row| row.value).collect();
    let y_max = calculate_y_max(&values);
    let percentage = leaderboard.stat.is_percentage();

    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, (config.width, config.height))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| format!("Failed to fill background: {}", e))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(leaderboard.label, ("sans-serif", 24).into_font())
            .margin(20)
            .x_label_area_size(80)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..names.len() as u32).into_segmented(), 0f64..y_max)
            .map_err(|e| format!("Failed to build chart: {}", e))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(names.len())
            .x_label_style(("sans-serif", 11).into_font().transform(FontTransform::Rotate90))
            .x_label_formatter(&|segment| match segment {
                SegmentValue::CenterOf(idx) => names.get(*idx as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_desc(leaderboard.label)
            .y_label_formatter(&|y| format_y_value(*y, percentage))
            .draw()
            .map_err(|e| format!("Failed to configure mesh: {}", e))?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(config.bar_color.filled())
                    .margin(6)
                    .data(values.iter().enumerate().map(|(idx, value)| (idx as u32, *value))),
            )
            .map_err(|e| format!("Failed to draw bars: {}", e))?;

        root.present()
            .map_err(|e| format!("Failed to present chart: {}", e))?;
    }

    Ok(buffer)
}

/// Top of the value axis: 10% headroom above the tallest bar.
fn calculate_y_max(values: &[f64]) -> f64 {
    let max_val = values.iter().cloned().fold(0.0_f64, f64::max);
    if max_val <= 0.0 {
        10.0
    } else {
        max_val * 1.1
    }
}

fn format_y_value(value: f64, percentage: bool) -> String {
    if percentage {
        format!("{:.0}%", value)
    } else {
        format!("{:.1}", value)
    }
}

/// Initial plus surname, so long names fit under a bar.
fn short_name(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [first, rest @ ..] => {
            let initial = first.chars().next().map(|c| c.to_string()).unwrap_or_default();
            format!("{}. {}", initial, rest.join(" "))
        }
    }
}

/// Generates an empty chart when no data is available
fn generate_empty_chart(title: &str, width: u32, height: u32) -> String {
    format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\
            <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\
            <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"18\" fill=\"#666666\">\
                No data available for: {}\
            </text>\
        </svg>",
        width,
        height,
        width / 2,
        height / 2,
        title
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::serve_stats::PlayerServeStats;
    use crate::utils::leaderboard::{build_leaderboard, ServeStat};

    #[test]
    fn test_empty_leaderboard_renders_placeholder() {
        let board = build_leaderboard(&[], ServeStat::AvgAces, 15);
        let svg = generate_leaderboard_chart(&board, &ChartConfig::default()).unwrap();
        assert!(svg.starts_with("<svg width=\"1200\" height=\"600\""));
        assert!(svg.contains("No data available for: Average aces per match"));
    }

    #[test]
    fn test_leaderboard_renders_bars_and_labels() {
        let players = vec![
            PlayerServeStats {
                player_name_raw: Some("Hubert Hurkacz".into()),
                avg_aces_match: Some(13.1),
                ..Default::default()
            },
            PlayerServeStats {
                player_name_raw: Some("Casper Ruud".into()),
                avg_aces_match: Some(4.3),
                ..Default::default()
            },
        ];
        let board = build_leaderboard(&players, ServeStat::AvgAces, 15);

        let svg = generate_leaderboard_chart(&board, &ChartConfig::default()).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<rect"));
        assert!(svg.contains("H. Hurkacz"));
        assert!(svg.contains("C. Ruud"));
        assert!(!svg.contains("No data available"));
    }

    #[test]
    fn test_y_max_has_headroom() {
        assert_eq!(calculate_y_max(&[]), 10.0);
        assert!((calculate_y_max(&[50.0, 80.0]) - 88.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_y_value() {
        assert_eq!(format_y_value(64.4, true), "64%");
        assert_eq!(format_y_value(7.26, false), "7.3");
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("Alex de Minaur"), "A. de Minaur");
        assert_eq!(short_name("Sinner"), "Sinner");
        assert_eq!(short_name(""), "");
    }
}
