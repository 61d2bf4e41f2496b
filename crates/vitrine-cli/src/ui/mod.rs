//! TUI rendering. Orchestrates the header, sidebar, screen and dialogs.

pub mod dashboard;
pub mod dialog;
pub mod products;
pub mod promotions;
pub mod sidebar;

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};
use vitrine_core::{dates::DATE_FORMAT, remote::HttpClient};

use crate::{
  app::{App, Dialog, Screen},
  notifier::ToastKind,
};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<C: HttpClient>(f: &mut Frame, app: &App<C>) {
  let area = f.area();

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);

  if let Some(dialog) = &app.dialog {
    dialog::draw(f, rows[1], dialog);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<C: HttpClient>(f: &mut Frame, area: Rect, app: &App<C>) {
  let left = Span::styled(
    " vitrine  [tab] screens  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let user = app
    .user
    .as_ref()
    .map(|u| format!("{}  ", u.name))
    .unwrap_or_default();
  let right = Span::styled(
    format!("{user}{} ", app.today.format(DATE_FORMAT)),
    Style::default().fg(Color::Gray),
  );

  let left_width = left.width() as u16;
  let right_width = right.width() as u16;
  let pad = area
    .width
    .saturating_sub(left_width)
    .saturating_sub(right_width);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<C: HttpClient>(f: &mut Frame, area: Rect, app: &App<C>) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Length(sidebar::WIDTH), Constraint::Min(0)])
    .split(area);

  sidebar::draw(f, cols[0], app);
  match app.screen {
    Screen::Dashboard => dashboard::draw(f, cols[1], app),
    Screen::Products => products::draw(f, cols[1], app),
    Screen::Promotions => promotions::draw(f, cols[1], app),
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<C: HttpClient>(f: &mut Frame, area: Rect, app: &App<C>) {
  let (mode_label, hints) = match (&app.dialog, app.screen) {
    (Some(Dialog::ConfirmDelete(_)), _) => ("CONFIRM", "y/Enter delete  n/Esc cancel"),
    (Some(_), _) => (
      "EDIT",
      "Tab/↑↓ field  ←→ choose  Enter save  Esc cancel",
    ),
    (None, _) if app.filter_active => ("SEARCH", "Type to filter  Esc clear  Enter done"),
    (None, Screen::Dashboard) => ("NORMAL", "Tab/1-3 screens  r reload  q quit"),
    (None, _) => (
      "NORMAL",
      "↑↓/jk move  / search  n new  e edit  d delete  r reload  q quit",
    ),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  let message = match app.notifier.current() {
    Some(toast) => {
      let colour = match toast.kind {
        ToastKind::Success => Color::Green,
        ToastKind::Error => Color::Red,
      };
      Span::styled(
        format!("  {}", toast.message),
        Style::default().fg(colour).add_modifier(Modifier::BOLD),
      )
    }
    None => Span::styled(format!("  {hints}"), Style::default().fg(Color::DarkGray)),
  };

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, message]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// A `width` x `height` rect centred in `area`, clamped to fit.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

/// The `/filter` line shown under a list while filtering.
pub(crate) fn filter_line<C: HttpClient>(app: &App<C>) -> Option<Paragraph<'static>> {
  if !app.filter_active && app.filter.is_empty() {
    return None;
  }
  let text = if app.filter_active {
    format!("/{}_", app.filter)
  } else {
    format!("/{}", app.filter)
  };
  Some(Paragraph::new(text).style(Style::default().fg(Color::Yellow)))
}

/// Split off the last line of `area` for the filter bar when one is shown.
pub(crate) fn with_filter<C: HttpClient>(
  f: &mut Frame,
  area: Rect,
  app: &App<C>,
) -> Rect {
  match filter_line(app) {
    Some(line) if area.height > 2 => {
      let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
      f.render_widget(line, rows[1]);
      rows[0]
    }
    _ => area,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn centered_clamps_to_area() {
    let area = Rect::new(0, 0, 40, 10);
    assert_eq!(centered(area, 20, 4), Rect::new(10, 3, 20, 4));
    assert_eq!(centered(area, 80, 40), area);
  }
}
