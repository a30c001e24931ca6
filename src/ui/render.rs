use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::{
    db::models::SessionStatus,
    events::NoticeLevel,
    timer::{state::format_mm_ss, TaskStore, TimerStatus},
};

use super::app::{App, Dialog, TaskField, TaskForm};

pub fn render<S: TaskStore>(f: &mut Frame, app: &mut App<S>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Status
        ])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(rows[0]);

    render_projects(f, app, columns[0]);
    render_content(f, app, columns[1]);
    render_status(f, app, rows[1]);

    if let Some(dialog) = &app.dialog {
        render_dialog(f, app, dialog);
    }
}

fn render_projects<S: TaskStore>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let items: Vec<ListItem> = app
        .projects
        .iter()
        .map(|project| ListItem::new(project.name.clone()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    "PROJECTS",
                    Style::default()
                        .fg(Color::LightBlue)
                        .add_modifier(Modifier::BOLD),
                ))
                .title_alignment(Alignment::Center)
                .border_style(Style::default().fg(Color::LightBlue)),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::REVERSED)
                .fg(Color::LightBlue),
        )
        .highlight_symbol("▶ ");

    f.render_stateful_widget(list, area, &mut app.project_state);
}

fn render_content<S: TaskStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Timer
            Constraint::Length(3), // Current task
            Constraint::Min(0),    // History and notes
        ])
        .split(area);

    let timer = app.controller().timer();
    let timer_color = match timer.status() {
        TimerStatus::Idle => Color::Gray,
        TimerStatus::Running => Color::LightGreen,
        TimerStatus::Paused => Color::Yellow,
        TimerStatus::Finished => Color::LightRed,
    };
    let timer_widget = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            app.timer_text.clone(),
            Style::default().fg(timer_color).add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Timer ({:?})", timer.status()))
            .border_style(Style::default().fg(timer_color)),
    );
    f.render_widget(timer_widget, chunks[0]);

    let current = match app.controller().current() {
        Some(session) => Line::from(vec![
            Span::styled(session.title.clone(), Style::default().fg(Color::White)),
            Span::styled(
                session
                    .description
                    .as_ref()
                    .map(|d| format!(" - {d}"))
                    .unwrap_or_default(),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        None => Line::from(Span::styled(
            "No task. Press 'n' to start one.",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(
        Paragraph::new(current).block(Block::default().borders(Borders::ALL).title("Current task")),
        chunks[1],
    );

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);

    let history: Vec<ListItem> = app
        .history
        .iter()
        .map(|session| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<11}", session.status.as_str()),
                    Style::default().fg(status_color(session.status)),
                ),
                Span::raw(format!(
                    "{} {} ",
                    session.start_time.format("%Y-%m-%d %H:%M"),
                    format_mm_ss(u32::try_from(session.duration_seconds).unwrap_or(u32::MAX)),
                )),
                Span::styled(session.title.clone(), Style::default().fg(Color::White)),
            ]))
        })
        .collect();
    let history_title = app
        .selected_project()
        .map(|p| format!("Sessions: {}", p.name))
        .unwrap_or_else(|| "Sessions".to_string());
    f.render_widget(
        List::new(history).block(Block::default().borders(Borders::ALL).title(history_title)),
        lower[0],
    );

    let notes: Vec<ListItem> = app
        .notes
        .iter()
        .map(|note| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    note.created_at.format("%H:%M ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(note.content.clone()),
            ]))
        })
        .collect();
    f.render_widget(
        List::new(notes).block(Block::default().borders(Borders::ALL).title("Notes")),
        lower[1],
    );
}

fn render_status<S: TaskStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let key_style = Style::default().fg(Color::Yellow);
    let line = match &app.notice {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Info => Color::LightGreen,
                NoticeLevel::Warning => Color::Yellow,
                NoticeLevel::Error => Color::LightRed,
            };
            Line::from(Span::styled(notice.message.clone(), Style::default().fg(color)))
        }
        None => Line::from(vec![
            Span::styled("s", key_style),
            Span::raw(": start | "),
            Span::styled("p", key_style),
            Span::raw(": pause | "),
            Span::styled("r", key_style),
            Span::raw(": reset | "),
            Span::styled("n", key_style),
            Span::raw(": new task | "),
            Span::styled("a", key_style),
            Span::raw(": add project | "),
            Span::styled("o", key_style),
            Span::raw(": note | "),
            Span::styled("q", key_style),
            Span::raw(": quit"),
        ]),
    };

    let status = Paragraph::new(line)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title("Status"),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(status, area);
}

fn render_dialog<S: TaskStore>(f: &mut Frame, app: &App<S>, dialog: &Dialog) {
    let area = centered(f.area(), 60, 12);
    f.render_widget(Clear, area);

    let (title, mut lines, error) = match dialog {
        Dialog::AddProject { name, error } => (
            "Add project",
            vec![
                Line::from("Project name:"),
                input_line(name, true),
            ],
            error,
        ),
        Dialog::AddNote { content, error } => (
            "Add note",
            vec![Line::from("Note:"), input_line(content, true)],
            error,
        ),
        Dialog::NewTask(form) => ("New task", task_form_lines(app, form), &form.error),
    };

    if let Some(error) = error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::LightRed),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Enter: confirm | Esc: cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(widget, area);
}

fn task_form_lines<'a, S: TaskStore>(app: &'a App<S>, form: &'a TaskForm) -> Vec<Line<'a>> {
    let project = form
        .project_index
        .and_then(|index| app.projects.get(index))
        .map(|p| p.name.as_str())
        .unwrap_or("(no projects)");

    vec![
        Line::from("Title:"),
        input_line(&form.title, form.field == TaskField::Title),
        Line::from("Description (optional):"),
        input_line(&form.description, form.field == TaskField::Description),
        Line::from(vec![
            Span::raw("Project: "),
            Span::styled(format!("◀ {project} ▶"), Style::default().fg(Color::LightBlue)),
        ]),
        Line::from(Span::styled(
            "Tab: switch field | ←/→: change project",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn input_line(value: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::LightGreen)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if focused { "█" } else { "" };
    Line::from(Span::styled(format!("> {value}{cursor}"), style))
}

fn status_color(status: SessionStatus) -> Color {
    match status {
        SessionStatus::InProgress => Color::LightGreen,
        SessionStatus::Paused => Color::Yellow,
        SessionStatus::Completed => Color::LightBlue,
        SessionStatus::Reset => Color::DarkGray,
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::Database, events::EventEmitter, settings::Settings, timer::SessionController};
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn draws_timer_projects_and_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("tasky.db")).unwrap();
        db.add_project("Writing").await.unwrap();
        let (events, _rx) = EventEmitter::channel();
        let mut app = App::new(SessionController::new(db, 1500, events), Settings::default());
        app.reload().await;

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &mut app)).unwrap();
        let text = screen(&terminal);
        assert!(text.contains("25:00"));
        assert!(text.contains("Writing"));
        assert!(text.contains("No task."));

        app.dialog = Some(Dialog::AddProject {
            name: "Mus".into(),
            error: Some("Project name cannot be empty.".into()),
        });
        terminal.draw(|f| render(f, &mut app)).unwrap();
        let text = screen(&terminal);
        assert!(text.contains("> Mus"));
        assert!(text.contains("Project name cannot be empty."));
    }

    #[test]
    fn centered_fits_inside_small_areas() {
        let area = Rect::new(0, 0, 40, 8);
        assert_eq!(centered(area, 60, 12), Rect::new(0, 0, 40, 8));
        assert_eq!(centered(Rect::new(0, 0, 100, 30), 60, 12), Rect::new(20, 9, 60, 12));
    }
}
