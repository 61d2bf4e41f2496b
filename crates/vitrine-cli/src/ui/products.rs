//! Product list.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};
use vitrine_core::{product::Product, remote::HttpClient};

use super::with_filter;
use crate::app::App;

pub fn draw<C: HttpClient>(f: &mut Frame, area: Rect, app: &App<C>) {
  let filtered = app.filtered_products();
  let total = app.catalog.products().len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Products ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Products ({total}) ")
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

fn row<'a, C: HttpClient>(app: &App<C>, product: &'a Product) -> ListItem<'a> {
  let (available, colour) = if product.available {
    ("available", Color::Green)
  } else {
    ("unavailable", Color::DarkGray)
  };
  let price = product
    .price
    .as_ref()
    .map(|p| app.formatter.format_price(p))
    .unwrap_or_else(|| "-".to_owned());

  ListItem::new(Line::from(vec![
    Span::styled(format!(" #{:<5}", product.id), Style::default().fg(Color::DarkGray)),
    Span::raw(format!("{:<30} ", product.name)),
    Span::styled(
      format!("{:<6} ", product.condition.label()),
      Style::default().fg(Color::Cyan),
    ),
    Span::styled(format!("{available:<12} "), Style::default().fg(colour)),
    Span::raw(price),
  ]))
}
