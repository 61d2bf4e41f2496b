//! Modal dialogs drawn over the body: the two entity forms and the delete
//! confirmation.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use vitrine_core::{
  form::{FormField, ProductField},
  product::Condition,
  promotion::PromotionType,
};

use super::centered;
use crate::app::{DeleteTarget, Dialog, ProductDialog, PromotionDialog};

const LABEL_WIDTH: usize = 20;

pub fn draw(f: &mut Frame, area: Rect, dialog: &Dialog) {
  match dialog {
    Dialog::Promotion(dialog) => draw_promotion(f, area, dialog),
    Dialog::Product(dialog) => draw_product(f, area, dialog),
    Dialog::ConfirmDelete(target) => draw_confirm(f, area, target),
  }
}

// ─── Forms ────────────────────────────────────────────────────────────────────

fn draw_promotion(f: &mut Frame, area: Rect, dialog: &PromotionDialog) {
  let title = match dialog.editing {
    Some(id) => format!(" Edit promotion #{id} "),
    None => " New promotion ".to_owned(),
  };

  let fields = dialog.form.visible_fields();
  let mut lines = Vec::new();
  for (i, field) in fields.iter().enumerate() {
    let raw = dialog.form.value(*field);
    let shown = match field {
      FormField::PromotionType => dialog
        .form
        .promotion_type()
        .map(PromotionType::label)
        .unwrap_or("(choose)")
        .to_owned(),
      FormField::Config(config) if config.is_product_reference() => dialog.product_label(raw),
      _ => raw.to_owned(),
    };
    lines.push(field_line(
      field.label(),
      &shown,
      i == dialog.focus,
      field.is_selector(),
    ));
    if let Some(error) = dialog.errors.get(*field) {
      lines.push(error_line(error));
    }
  }
  if dialog.busy {
    lines.push(Line::from(Span::styled(
      "Saving…",
      Style::default().fg(Color::Yellow),
    )));
  }

  render_modal(f, area, &title, lines);
}

fn draw_product(f: &mut Frame, area: Rect, dialog: &ProductDialog) {
  let title = match dialog.editing {
    Some(id) => format!(" Edit product #{id} "),
    None => " New product ".to_owned(),
  };

  let focused = dialog.focused();
  let mut lines = Vec::new();
  for field in ProductField::ALL {
    let raw = dialog.form.value(field);
    let shown = match field {
      ProductField::Condition => dialog
        .form
        .condition()
        .map(Condition::label)
        .unwrap_or(raw)
        .to_owned(),
      ProductField::Available => match dialog.form.available() {
        Some(true) => "Yes".to_owned(),
        Some(false) => "No".to_owned(),
        None => raw.to_owned(),
      },
      _ => raw.to_owned(),
    };
    lines.push(field_line(
      field.label(),
      &shown,
      field == focused,
      field.is_selector(),
    ));
    if let Some(error) = dialog.errors.get(field) {
      lines.push(error_line(error));
    }
  }
  if dialog.busy {
    lines.push(Line::from(Span::styled(
      "Saving…",
      Style::default().fg(Color::Yellow),
    )));
  }

  render_modal(f, area, &title, lines);
}

fn field_line(label: &str, value: &str, focused: bool, selector: bool) -> Line<'static> {
  let label_style = if focused {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
  } else {
    Style::default().fg(Color::Cyan)
  };
  let value = match (focused, selector) {
    (true, true) => format!("‹ {value} ›"),
    (true, false) => format!("{value}_"),
    (false, _) => value.to_owned(),
  };
  let value_style = if focused {
    Style::default().bg(Color::Blue).fg(Color::White)
  } else {
    Style::default()
  };
  Line::from(vec![
    Span::styled(format!("{label:<LABEL_WIDTH$}"), label_style),
    Span::styled(value, value_style),
  ])
}

fn error_line(message: &str) -> Line<'static> {
  Line::from(Span::styled(
    format!("{:<LABEL_WIDTH$}{message}", ""),
    Style::default().fg(Color::Red),
  ))
}

// ─── Confirm ──────────────────────────────────────────────────────────────────

fn draw_confirm(f: &mut Frame, area: Rect, target: &DeleteTarget) {
  let lines = vec![
    Line::from(format!("Delete {}?", target.describe())),
    Line::from(""),
    Line::from(Span::styled(
      "y/Enter delete   n/Esc cancel",
      Style::default().fg(Color::DarkGray),
    )),
  ];
  render_modal(f, area, " Confirm ", lines);
}

fn render_modal(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
  let height = lines.len() as u16 + 2;
  let rect = centered(area, 64, height);
  let block = Block::default()
    .title(title.to_owned())
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  f.render_widget(Clear, rect);
  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
    rect,
  );
}
