//! Screen navigation: left panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem},
};
use vitrine_core::remote::HttpClient;

use crate::app::{App, Screen};

pub const WIDTH: u16 = 18;

pub fn draw<C: HttpClient>(f: &mut Frame, area: Rect, app: &App<C>) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = Screen::ALL
    .iter()
    .enumerate()
    .map(|(i, screen)| {
      let style = if *screen == app.screen {
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };
      ListItem::new(Line::from(vec![
        Span::styled(format!(" {} ", i + 1), Style::default().fg(Color::DarkGray)),
        Span::styled(screen.title(), style),
      ]))
    })
    .collect();

  f.render_widget(List::new(items).block(block), area);
}
