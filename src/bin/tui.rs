mod tui_app;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use tui_app::{
    format_change, format_market_cap, format_price, truncate, AppState, ConnectionStatus,
};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(io::Error::other)?;

    let mut app = AppState::new(base_url);

    // Initial fetch before rendering
    app.refresh(&client).await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut table_state = TableState::default();
    table_state.select(None);

    let result = run_loop(&mut terminal, &mut app, &client, &mut table_state).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
    table_state: &mut TableState,
) -> io::Result<()> {
    let refresh_interval = Duration::from_secs(10);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| render(f, app, table_state))?;

        let timeout = refresh_interval
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let mut refetch = false;
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char('r') | KeyCode::Char('R') => refetch = true,
                        KeyCode::Char('s') => {
                            app.cycle_sort();
                            refetch = true;
                        }
                        KeyCode::Char('o') => {
                            app.toggle_order();
                            refetch = true;
                        }
                        KeyCode::Char('f') => {
                            app.cycle_risk_filter();
                            refetch = true;
                        }
                        KeyCode::Down | KeyCode::Char('j') => {
                            let max = app.cryptos.len().saturating_sub(1);
                            let next = table_state.selected().map_or(0, |i| (i + 1).min(max));
                            table_state.select(Some(next));
                        }
                        KeyCode::Up | KeyCode::Char('k') => {
                            let prev = table_state.selected().map_or(0, |i| i.saturating_sub(1));
                            table_state.select(Some(prev));
                        }
                        _ => {}
                    }
                    if refetch {
                        app.refresh(client).await;
                        last_tick = std::time::Instant::now();
                    }
                }
            }
        }

        if last_tick.elapsed() >= refresh_interval {
            app.refresh(client).await;
            last_tick = std::time::Instant::now();
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, table_state: &mut TableState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_body(f, app, table_state, chunks[1]);
    render_footer(f, app, chunks[2]);
}

fn risk_color(level: &str) -> Color {
    match level {
        "low" => Color::Green,
        "medium" => Color::Yellow,
        "high" => Color::Red,
        _ => Color::White,
    }
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let s = &app.summary;
    let d = s.risk_distribution;
    let spans = vec![
        Span::styled(
            " Crypto Risk Dashboard  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::raw(format!("{} assets", s.total_records)),
        Span::raw("  │  "),
        Span::raw(format!("cap {}", format_market_cap(s.total_market_cap))),
        Span::raw("  │  "),
        Span::raw(format!("vol {}", format_market_cap(s.total_volume_24h))),
        Span::raw("  │  "),
        Span::styled(format!("{} low ", d.low), Style::default().fg(Color::Green)),
        Span::styled(format!("{} med ", d.medium), Style::default().fg(Color::Yellow)),
        Span::styled(format!("{} high", d.high), Style::default().fg(Color::Red)),
        Span::raw("  │  "),
        Span::raw(format!("community avg {}", s.avg_community_score)),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, table_state: &mut TableState, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    render_crypto_table(f, app, table_state, halves[0]);
    render_category_table(f, app, halves[1]);
}

fn render_crypto_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let header_cells = ["#", "Name", "Symbol", "Price", "Mkt cap", "24h", "Risk", "Category"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .cryptos
        .iter()
        .map(|c| {
            let usd = &c.quote.usd;
            let change_color = if usd.percent_change_24h >= 0.0 { Color::Green } else { Color::Red };
            Row::new(vec![
                Cell::from(c.cmc_rank.to_string()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(&c.name, 18)),
                Cell::from(truncate(&c.symbol, 8)).style(Style::default().fg(Color::Cyan)),
                Cell::from(format_price(usd.price)),
                Cell::from(format_market_cap(usd.market_cap)),
                Cell::from(format_change(usd.percent_change_24h)).style(Style::default().fg(change_color)),
                Cell::from(format!("{:>3} {}", c.risk_score, c.risk_level))
                    .style(Style::default().fg(risk_color(&c.risk_level))),
                Cell::from(truncate(c.primary_category.as_deref().unwrap_or("—"), 14))
                    .style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let title = format!(
        " ASSETS · sort {} {} · risk {} ",
        app.sort_key(),
        if app.descending { "↓" } else { "↑" },
        app.risk_filter(),
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(11),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                title,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    f.render_stateful_widget(table, area, state);
}

fn render_category_table(f: &mut Frame, app: &AppState, area: Rect) {
    let header_cells = ["Category", "#", "Mkt cap"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let mut categories: Vec<_> = app.categories.iter().collect();
    categories.sort_by(|a, b| b.total_market_cap.total_cmp(&a.total_market_cap));

    let rows: Vec<Row> = categories
        .into_iter()
        .map(|c| {
            Row::new(vec![
                Cell::from(truncate(&c.category, 16)),
                Cell::from(c.count.to_string()).style(Style::default().fg(Color::Cyan)),
                Cell::from(format_market_cap(c.total_market_cap)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [Constraint::Min(8), Constraint::Length(5), Constraint::Length(10)],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " CATEGORIES ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, app: &AppState, area: Rect) {
    let cycle = app
        .latency
        .p50_ms
        .map_or("—".to_string(), |ms| format!("{:.1}s", ms as f64 / 1000.0));
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("refresh  "),
        Span::styled("[s] ", Style::default().fg(Color::Yellow)),
        Span::raw("sort  "),
        Span::styled("[o] ", Style::default().fg(Color::Yellow)),
        Span::raw("order  "),
        Span::styled("[f] ", Style::default().fg(Color::Yellow)),
        Span::raw("risk filter  "),
        Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
        Span::raw("scroll  "),
        Span::styled(
            format!(
                "server: {} · cycle p50 {} ({} runs) · updated {}s ago",
                app.health.status,
                cycle,
                app.latency.samples,
                app.last_refresh.elapsed().as_secs()
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
