//! Promotion list.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};
use vitrine_core::{
  activity::PromotionStatus,
  dates::DATE_FORMAT,
  promotion::Promotion,
  remote::HttpClient,
};

use super::with_filter;
use crate::app::App;

pub fn draw<C: HttpClient>(f: &mut Frame, area: Rect, app: &App<C>) {
  let filtered = app.filtered_promotions();
  let total = app.catalog.promotions().len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Promotions ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Promotions ({total}) ")
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  let inner = with_filter(f, inner, app);

  let items: Vec<ListItem> = filtered.iter().map(|p| row(app, p)).collect();

  let mut state = ListState::default();
  state.select((!filtered.is_empty()).then_some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}

fn row<'a, C: HttpClient>(app: &App<C>, promotion: &'a Promotion) -> ListItem<'a> {
  let status = promotion.status_on(app.today);
  let badge_colour = match status {
    PromotionStatus::Active => Color::Green,
    PromotionStatus::Scheduled => Color::Yellow,
    PromotionStatus::Expired => Color::DarkGray,
  };
  let end = promotion
    .end_date
    .map(|d| d.format(DATE_FORMAT).to_string())
    .unwrap_or_else(|| "open".to_owned());

  ListItem::new(Line::from(vec![
    Span::styled(
      format!(" {:<10}", status.label()),
      Style::default().fg(badge_colour).add_modifier(Modifier::BOLD),
    ),
    Span::raw(format!("{:<28} ", promotion.name)),
    Span::styled(
      format!("{:<20} ", promotion.promotion_type.label()),
      Style::default().fg(Color::Cyan),
    ),
    Span::raw(format!("{:<18} ", app.promotion_value(promotion))),
    Span::styled(
      format!("{} → {end}", promotion.start_date.format(DATE_FORMAT)),
      Style::default().fg(Color::DarkGray),
    ),
  ]))
}
