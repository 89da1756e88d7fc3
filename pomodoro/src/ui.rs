use crate::app::{App, MenuItem};
use crate::phase::Phase;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area);

    draw_header(f, chunks[0], app);
    draw_phase(f, chunks[1], app);
    draw_menu(f, chunks[2], app);
    draw_status_bar(f, chunks[3], app);
}

fn phase_color(app: &App) -> Color {
    let theme = &app.config.theme;
    if app.controller.is_paused() {
        return theme.pause;
    }
    match app.controller.phase() {
        Some(Phase::Task) => theme.task,
        Some(Phase::Break) => theme.rest,
        None => theme.gray,
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let text = Line::from(vec![
        Span::raw(icons.header_left.clone()),
        Span::styled(
            app.controller.title(),
            Style::default()
                .fg(phase_color(app))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(icons.header_right.clone()),
    ]);
    f.render_widget(
        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.black)),
        ),
        area,
    );
}

fn draw_phase(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let name = match app.controller.phase() {
        Some(Phase::Task) => "Task",
        Some(Phase::Break) => "Break",
        None => "Idle",
    };
    let state_icon = if app.controller.is_paused() {
        &icons.pause
    } else {
        &icons.play
    };
    let block = Block::default()
        .title(Span::styled(
            format!(" {} {} ", state_icon, name),
            Style::default().fg(theme.gray),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(phase_color(app)));
    let inner_area = block.inner(area);
    f.render_widget(block, area);
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(1)])
        .split(inner_area);
    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(phase_color(app)).bg(theme.black))
            .percent((app.progress() * 100.0) as u16),
        v_chunks[0],
    );
}

fn draw_menu(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let icons = &app.config.icons;
    let block = Block::default()
        .title(Span::styled(" Menu ", Style::default().fg(theme.gray)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.gray));
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let paused = app.controller.is_paused();
    let constraints: Vec<Constraint> = MenuItem::ALL.iter().map(|_| Constraint::Length(1)).collect();
    let rows = Layout::default().constraints(constraints).split(inner_area);
    for (i, item) in MenuItem::ALL.iter().enumerate() {
        let Some(row) = rows.get(i) else { continue };
        let selected = i == app.selected;
        let marker = if selected {
            Span::styled(icons.select.clone(), Style::default().fg(theme.selection))
        } else {
            Span::raw(" ")
        };
        let label = Span::styled(
            format!(" {}", item.label(paused)),
            if selected {
                Style::default()
                    .fg(theme.selection)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.foreground)
            },
        );
        if selected {
            f.render_widget(Block::default().style(Style::default().bg(theme.black)), *row);
        }
        f.render_widget(Paragraph::new(Line::from(vec![marker, label])), *row);
        f.render_widget(
            Paragraph::new(Span::styled(
                format!("{} ", item.shortcut()),
                Style::default().fg(theme.gray),
            ))
            .alignment(Alignment::Right),
            *row,
        );
    }
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.config.theme;
    let (mode_text, mode_color) = match (app.controller.phase(), app.controller.is_paused()) {
        (None, _) => ("IDLE", theme.gray),
        (Some(_), true) => ("PAUSED", theme.pause),
        (Some(Phase::Task), false) => ("TASK", theme.task),
        (Some(Phase::Break), false) => ("BREAK", theme.rest),
    };
    let sep = &app.config.icons.separator;
    let help = format!("t:task {sep} b:break {sep} space:pause {sep} j/k+enter:menu {sep} q:quit");
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" {} ", mode_text),
                Style::default()
                    .bg(mode_color)
                    .fg(theme.background)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::raw(help),
        ]))
        .block(Block::default().style(Style::default().bg(theme.black).fg(theme.gray))),
        area,
    );
}
