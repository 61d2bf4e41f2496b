//! Summary counts.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};
use vitrine_core::remote::HttpClient;

use crate::app::App;

pub fn draw<C: HttpClient>(f: &mut Frame, area: Rect, app: &App<C>) {
  let stats = app.stats();

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(area);

  draw_card(f, cols[0], " Products ", &[
    ("Total", stats.products, Color::White),
    ("Available", stats.available_products, Color::Green),
    (
      "Unavailable",
      stats.products - stats.available_products,
      Color::DarkGray,
    ),
  ]);
  draw_card(f, cols[1], " Promotions ", &[
    ("Total", stats.promotions, Color::White),
    ("Active", stats.active_promotions, Color::Green),
    ("Scheduled", stats.scheduled_promotions, Color::Yellow),
    ("Expired", stats.expired_promotions, Color::DarkGray),
  ]);
}

fn draw_card(f: &mut Frame, area: Rect, title: &str, rows: &[(&str, usize, Color)]) {
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let lines: Vec<Line> = rows
    .iter()
    .map(|(label, count, colour)| {
      Line::from(vec![
        Span::styled(
          format!("{label:<14}"),
          Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(count.to_string(), Style::default().fg(*colour)),
      ])
    })
    .collect();

  f.render_widget(Paragraph::new(lines).block(block), area);
}
