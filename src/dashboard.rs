use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::{io, path::Path};

use crate::applications::{read_applications, ApplicationRecord};

/// Interactive view of the application log. `q` quits, arrows move.
pub fn run_dashboard(csv_path: &Path) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut table_state = TableState::default();
    table_state.select(Some(0));

    let result = (|| -> anyhow::Result<()> {
        loop {
            let records = read_applications(csv_path).unwrap_or_default(); // missing log shows an empty table
            terminal.draw(|f| ui(f, &records, &mut table_state))?;

            if event::poll(std::time::Duration::from_millis(250))? {
                if let Event::Key(key) = event::read()? {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Down => step(&mut table_state, records.len(), 1),
                        KeyCode::Up => step(&mut table_state, records.len(), -1),
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    })();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    result
}

/// Moves the selection by `delta`, wrapping at both ends.
fn step(state: &mut TableState, len: usize, delta: isize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(len as isize) as usize;
    state.select(Some(next));
}

fn ui(f: &mut Frame, records: &[ApplicationRecord], table_state: &mut TableState) {
    let rects = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(7)])
        .margin(1)
        .split(f.size());

    let selected_style = Style::default().add_modifier(Modifier::REVERSED).fg(Color::Yellow);
    let normal_style = Style::default().fg(Color::White);
    let header_cells = ["Item #", "Title", "Agency", "Match", "Date", "Status"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).style(normal_style).height(1).bottom_margin(1);

    let rows = records.iter().map(|item| {
        let level_style = match item.match_level.as_str() {
            "good" => Style::default().fg(Color::Green),
            "minimum" => Style::default().fg(Color::Yellow),
            _ => normal_style,
        };
        Row::new(vec![
            Cell::from(item.item_number.clone()),
            Cell::from(item.job_title.clone()),
            Cell::from(item.agency.clone()),
            Cell::from(item.match_level.clone()).style(level_style),
            Cell::from(item.generated_at.clone()),
            Cell::from(item.status.clone()),
        ])
        .style(normal_style)
    });

    let col_widths = [
        Constraint::Length(10), // Item
        Constraint::Min(24),    // Title
        Constraint::Min(20),    // Agency
        Constraint::Length(9),  // Match
        Constraint::Length(12), // Date
        Constraint::Length(10), // Status
    ];

    let table = Table::new(rows, col_widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Applications"))
        .highlight_style(selected_style)
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, rects[0], table_state);

    // Files of the selected package
    let detail_lines: Vec<Line> = match table_state.selected().and_then(|i| records.get(i)) {
        Some(r) => vec![
            Line::from(format!("Tracking:     {}", r.tracking_number)),
            Line::from(format!("Cover letter: {}", r.cover_letter_path)),
            Line::from(format!("Resume:       {}", r.resume_path)),
            Line::from(format!("Instructions: {}", r.instructions_path)),
        ],
        None => vec![Line::from("No applications generated yet. Press q to quit.")],
    };
    let files = Paragraph::new(detail_lines)
        .block(Block::default().borders(Borders::ALL).title("Files"))
        .wrap(Wrap { trim: true });
    f.render_widget(files, rects[1]);
}
