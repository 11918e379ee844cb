use std::collections::VecDeque;

use hydromap_core::schema::MatchTier;
use hydromap_core::{
    Category, DashboardView, EntityRecord, FetchStatus, GeoBounds, Layer, Renderable,
};
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Map,
    Recommendations,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Map => Focus::Recommendations,
            Focus::Recommendations => Focus::Map,
        }
    }
}

pub struct UiState {
    pub logs: VecDeque<String>,
    pub max_logs: usize,
    pub focus: Focus,
    pub map_cursor: usize,
    pub recommendation_cursor: usize,
    pub viewport: Option<GeoBounds>,
    pub analysis_pending: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            logs: VecDeque::new(),
            max_logs: 8,
            focus: Focus::default(),
            map_cursor: 0,
            recommendation_cursor: 0,
            viewport: None,
            analysis_pending: false,
        }
    }
}

impl UiState {
    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        let mut text: String = line.into();
        while text.ends_with('\n') || text.ends_with('\r') {
            text.pop();
        }
        if text.is_empty() {
            return;
        }
        self.logs.push_front(text);
        while self.logs.len() > self.max_logs {
            self.logs.pop_back();
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let cursor = match self.focus {
            Focus::Map => &mut self.map_cursor,
            Focus::Recommendations => &mut self.recommendation_cursor,
        };
        *cursor = cursor.saturating_add_signed(delta);
    }

    /// Keep both cursors inside their lists after the view shrank.
    pub fn clamp_cursors(&mut self, view: &DashboardView) {
        self.map_cursor = self.map_cursor.min(view.points.len().saturating_sub(1));
        self.recommendation_cursor = self
            .recommendation_cursor
            .min(view.recommendations.len().saturating_sub(1));
    }
}

/// `1.2K`, `3.4M`, `5.6B`; smaller values print as-is.
pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{value}")
    }
}

pub fn draw_ui(frame: &mut Frame, state: &UiState, view: &DashboardView, radius_km: f64) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(10),
        ])
        .split(frame.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(34),
            Constraint::Min(30),
            Constraint::Length(48),
        ])
        .split(rows[1]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(6)])
        .split(columns[0]);

    let center = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(columns[2]);

    let footer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(rows[2]);

    draw_header(frame, rows[0], state, view);
    draw_layers(frame, sidebar[0], view);
    draw_filters(frame, sidebar[1], state, view);
    draw_map(frame, center[0], state, view);
    draw_recommendations(frame, center[1], state, view);
    draw_details(frame, right[0], view, radius_km);
    draw_analytics(frame, right[1], view);
    draw_commands(frame, footer[0]);
    draw_logs(frame, footer[1], state);
}

fn render_block(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title.to_string());
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(block, area);
    frame.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn status_span(label: String, status: &FetchStatus) -> Span<'static> {
    let (suffix, color) = match status {
        FetchStatus::Idle => ("idle", Color::DarkGray),
        FetchStatus::Loading => ("loading", Color::Yellow),
        FetchStatus::Ready => ("ready", Color::Green),
        FetchStatus::Failed(_) => ("failed", Color::Red),
    };
    Span::styled(format!("{label}:{suffix} "), Style::default().fg(color))
}

fn draw_header(frame: &mut Frame, area: Rect, state: &UiState, view: &DashboardView) {
    let mut spans: Vec<Span> = view
        .statuses
        .iter()
        .map(|(dataset, status)| status_span(dataset.to_string(), status))
        .collect();
    if state.analysis_pending {
        spans.push(Span::styled(
            "| analysis running",
            Style::default().fg(Color::Magenta),
        ));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Hydrogen Infrastructure Inspector");
    let text = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true });
    frame.render_widget(block, area);
    frame.render_widget(
        text,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn draw_layers(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let lines: Vec<Line> = Layer::ALL
        .iter()
        .enumerate()
        .map(|(index, layer)| {
            let on = view.layers.is_on(*layer);
            let marker = if on { "[x]" } else { "[ ]" };
            let style = if on {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(vec![
                Span::styled(format!("{} ", index + 1), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{marker} {}", layer.label()), style),
                Span::raw(format!(" ({})", view.layer_counts.get(*layer))),
            ])
        })
        .collect();
    render_block(frame, area, "Layers", lines, false);
}

fn joined<T: ToString>(values: impl IntoIterator<Item = T>) -> String {
    let parts: Vec<String> = values.into_iter().map(|value| value.to_string()).collect();
    if parts.is_empty() {
        "all".to_string()
    } else {
        parts.join(", ")
    }
}

fn draw_filters(frame: &mut Frame, area: Rect, state: &UiState, view: &DashboardView) {
    let filter = &view.filter;
    let mut lines = vec![
        Line::from(format!("type    {}", joined(filter.types.iter()))),
        Line::from(format!("region  {}", joined(filter.regions.iter()))),
        Line::from(format!(
            "status  {}",
            joined(filter.status.iter().map(|status| status.as_str()))
        )),
        Line::from(format!("assets  {} shown", view.assets.len())),
    ];
    if let Some(bounds) = state.viewport {
        lines.push(Line::from(format!(
            "view    {:.2},{:.2} to {:.2},{:.2}",
            bounds.south, bounds.west, bounds.north, bounds.east
        )));
    }
    render_block(frame, area, "Filters", lines, false);
}

fn category_color(category: Category) -> Color {
    match category {
        Category::HydrogenPlant => Color::Cyan,
        Category::StorageFacility => Color::Blue,
        Category::Pipeline => Color::Magenta,
        Category::DistributionHub => Color::LightBlue,
        Category::RenewableSource => Color::Green,
        Category::DemandCenter => Color::LightRed,
        Category::Recommendation => Color::Yellow,
    }
}

/// First row to draw so that `cursor` stays inside a window of `height` rows.
fn window_start(cursor: usize, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    cursor.saturating_sub(height - 1)
}

fn draw_map(frame: &mut Frame, area: Rect, state: &UiState, view: &DashboardView) {
    let height = area.height.saturating_sub(2) as usize;
    let start = window_start(state.map_cursor, height);
    let selected = view.selected.as_ref().map(|record| record.view().entity_ref());
    let lines: Vec<Line> = view
        .points
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(index, point)| {
            let cursor = if index == state.map_cursor { ">" } else { " " };
            let mark = if selected.as_ref() == Some(&point.entity) {
                "*"
            } else {
                " "
            };
            Line::from(vec![
                Span::raw(format!("{cursor}{mark} ")),
                Span::styled(
                    format!("{:<17}", point.category.as_str()),
                    Style::default().fg(category_color(point.category)),
                ),
                Span::raw(format!(
                    " {} ({:.3}, {:.3})",
                    point.label, point.position.lat, point.position.lng
                )),
            ])
        })
        .collect();
    let title = format!("Map ({} markers)", view.points.len());
    render_block(frame, area, &title, lines, state.focus == Focus::Map);
}

fn tier_style(tier: MatchTier) -> Style {
    match tier {
        MatchTier::Top => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        MatchTier::Strong => Style::default().fg(Color::Yellow),
        MatchTier::Candidate => Style::default().fg(Color::Gray),
    }
}

fn draw_recommendations(frame: &mut Frame, area: Rect, state: &UiState, view: &DashboardView) {
    let height = area.height.saturating_sub(2) as usize;
    let start = window_start(state.recommendation_cursor, height);
    let predicted = view.prediction.as_ref().map(|site| site.id.as_str());
    let lines: Vec<Line> = view
        .recommendations
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(index, site)| {
            let cursor = if index == state.recommendation_cursor {
                ">"
            } else {
                " "
            };
            let mark = if predicted == Some(site.id.as_str()) {
                "*"
            } else {
                " "
            };
            Line::from(vec![
                Span::raw(format!("{cursor}{mark} ")),
                Span::styled(
                    format!("{:>5.1}", site.match_score),
                    tier_style(site.match_tier()),
                ),
                Span::raw(format!(
                    "  {}  ${}",
                    site.site_name,
                    format_compact(site.estimated_cost * 1_000_000.0)
                )),
            ])
        })
        .collect();
    let title = format!("Recommendations ({})", view.recommendations.len());
    render_block(
        frame,
        area,
        &title,
        lines,
        state.focus == Focus::Recommendations,
    );
}

fn optional(value: Option<f64>, unit: &str) -> String {
    value
        .map(|value| format!("{value}{unit}"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn record_lines(record: &EntityRecord) -> Vec<Line<'static>> {
    match record {
        EntityRecord::Asset(asset) => vec![
            Line::from(Span::styled(
                asset.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("{} | {}", asset.asset_type.label(), asset.status.as_str())),
            Line::from(format!("region    {}", asset.region)),
            Line::from(format!(
                "capacity  {}",
                asset.capacity_display().unwrap_or_else(|| "n/a".to_string())
            )),
            Line::from(format!("efficiency {}", optional(asset.efficiency, "%"))),
            Line::from(format!(
                "owner     {}",
                asset.owner.as_deref().unwrap_or("n/a")
            )),
            Line::from(format!(
                "built     {}",
                asset
                    .year_built
                    .map(|year| year.to_string())
                    .unwrap_or_else(|| "n/a".to_string())
            )),
        ],
        EntityRecord::HydrogenPlant(plant) => vec![
            Line::from(plant.plant_name.clone()),
            Line::from("existing hydrogen plant"),
        ],
        EntityRecord::Renewable(station) => vec![
            Line::from(station.station.clone()),
            Line::from("renewable source"),
        ],
        EntityRecord::DemandCenter(center) => vec![
            Line::from(center.name.clone()),
            Line::from(format!("{} | {}", center.center_type, center.region)),
            Line::from(format!(
                "demand    {} t/yr",
                format_compact(center.estimated_demand)
            )),
        ],
        EntityRecord::Recommendation(site) => vec![
            Line::from(site.site_name.clone()),
            Line::from(format!(
                "match {:.1} | proximity {} | demand {}",
                site.match_score,
                optional(site.proximity_score, ""),
                optional(site.demand_score, "")
            )),
            Line::from(format!(
                "regulatory {} | cost {}",
                optional(site.regulatory_score, ""),
                optional(site.cost_score, "")
            )),
            Line::from(site.reasoning.clone()),
        ],
    }
}

fn draw_details(frame: &mut Frame, area: Rect, view: &DashboardView, radius_km: f64) {
    let mut lines = match &view.selected {
        Some(record) => record_lines(record),
        None => vec![Line::from(Span::styled(
            "Nothing selected",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    if let Some(position) = view.selected_position() {
        lines.push(Line::from(format!(
            "at {:.4}, {:.4}",
            position.lat, position.lng
        )));
    }
    let nearby = view.nearby_selected(radius_km);
    if !nearby.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("within {radius_km} km"),
            Style::default().fg(Color::Yellow),
        )));
        for hit in nearby.iter().take(5) {
            lines.push(Line::from(format!(
                "  {:>6.1} km  {}",
                hit.distance_km, hit.point.label
            )));
        }
    }
    render_block(frame, area, "Details", lines, false);
}

fn draw_analytics(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let summary = &view.analytics;
    let mut lines = vec![
        Line::from(vec![
            Span::raw("source "),
            Span::styled(
                format!("{:?}", view.analytics_origin),
                Style::default().fg(Color::Cyan),
            ),
        ]),
        Line::from(format!(
            "assets {} | active {} | capacity {} MW",
            summary.total_assets,
            summary.active_projects,
            format_compact(summary.total_capacity)
        )),
        Line::from(format!(
            "avg efficiency {:.0}% | investment ${}",
            summary.average_efficiency,
            format_compact(summary.total_investment * 1_000_000.0)
        )),
    ];
    for share in &summary.type_distribution {
        lines.push(Line::from(format!(
            "  {:<17} {:>4} {:>5.1}%",
            share.asset_type.as_str(),
            share.count,
            share.percentage
        )));
    }
    let max_count = summary
        .region_distribution
        .iter()
        .map(|share| share.count)
        .max()
        .unwrap_or(0);
    for share in &summary.region_distribution {
        let bar = "#".repeat((share.relative_to(max_count) / 10.0).round() as usize);
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<12} ", share.region)),
            Span::styled(format!("{bar:<10}"), Style::default().fg(Color::Green)),
            Span::raw(format!(" {} | {} MW", share.count, format_compact(share.capacity))),
        ]));
    }
    if let Some(latest) = summary.capacity_trend.last() {
        lines.push(Line::from(format!(
            "  cumulative {} MW by {}",
            format_compact(latest.capacity),
            latest.year
        )));
    }
    for divergence in &view.divergences {
        lines.push(Line::from(Span::styled(
            format!(
                "  {} local {} vs server {}",
                divergence.metric, divergence.local, divergence.server
            ),
            Style::default().fg(Color::Red),
        )));
    }
    render_block(frame, area, "Analytics", lines, false);
}

fn draw_commands(frame: &mut Frame, area: Rect) {
    let key = |binding: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(format!("{binding:<6}"), Style::default().fg(Color::Yellow)),
            Span::raw(text),
        ])
    };
    let lines = vec![
        key("1-6", "toggle layer"),
        key("t r s", "cycle type/region/status"),
        key("tab", "switch map/recommendations"),
        key("enter", "select, c clears"),
        key("a", "run analysis, A poll analytics"),
        key("R x", "refetch all, reset state"),
        key("q", "exit inspector"),
    ];
    render_block(frame, area, "Commands", lines, false);
}

fn draw_logs(frame: &mut Frame, area: Rect, state: &UiState) {
    let lines: Vec<Line> = state
        .logs
        .iter()
        .map(|entry| Line::from(Span::raw(entry.as_str())))
        .collect();
    render_block(frame, area, "Logs", lines, false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_numbers_pick_the_largest_suffix() {
        assert_eq!(format_compact(950.0), "950");
        assert_eq!(format_compact(12.5), "12.5");
        assert_eq!(format_compact(1_250.0), "1.2K");
        assert_eq!(format_compact(3_400_000.0), "3.4M");
        assert_eq!(format_compact(5_600_000_000.0), "5.6B");
    }

    #[test]
    fn cursor_window_keeps_cursor_visible() {
        assert_eq!(window_start(0, 10), 0);
        assert_eq!(window_start(9, 10), 0);
        assert_eq!(window_start(12, 10), 3);
        assert_eq!(window_start(5, 0), 0);
    }

    #[test]
    fn logs_are_trimmed_and_bounded() {
        let mut state = UiState::default();
        state.push_log("\n");
        assert!(state.logs.is_empty());
        for i in 0..20 {
            state.push_log(format!("line {i}\n"));
        }
        assert_eq!(state.logs.len(), state.max_logs);
        assert_eq!(state.logs.front().map(String::as_str), Some("line 19"));
    }
}
