use std::io;
use std::time::Duration;
use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;

use vizdesk_core::actions::{AgentAction, DataPointEdit, DeskAction, UserAction};
use vizdesk_core::document::{FieldName, INDUSTRY_CATALOG};
use vizdesk_core::reducer::{reduce, DeskEffect};
use vizdesk_core::state::{DeskState, LogLevel};
use vizdesk_render::chart::{self, ChartTag};
use vizdesk_render::templates;

use crate::channel::FileChannel;

const VALUE_STEP: f64 = 100.0;

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

/// Editor-local view state that never reaches the session store.
#[derive(Debug, Default)]
struct ViewState {
    selected_point: usize,
    title_draft: Option<String>,
    needs_draw: bool,
    route: String,
}

pub fn run(
    mut state: DeskState,
    mut channel: FileChannel,
    poll_interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    run_app(&mut terminal, &mut state, &mut channel, poll_interval).map_err(|e| e.into())
}

enum KeyHandlerResult {
    Continue(Vec<DeskEffect>),
    Exit,
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut DeskState,
    channel: &mut FileChannel,
    poll_interval: Duration,
) -> io::Result<()> {
    let mut view = ViewState {
        needs_draw: true,
        route: format!(
            "{} -> {}",
            channel.inbox().display(),
            channel.outbox().display()
        ),
        ..ViewState::default()
    };
    let mut last_poll = Instant::now()
        .checked_sub(poll_interval)
        .unwrap_or_else(Instant::now);

    loop {
        let mut effects = Vec::new();

        if last_poll.elapsed() >= poll_interval {
            last_poll = Instant::now();
            match channel.poll() {
                Ok(Some(envelope)) => {
                    for action in envelope.into_actions() {
                        effects.extend(reduce(state, action));
                    }
                }
                Ok(None) => {}
                Err(err) => effects.extend(reduce(
                    state,
                    DeskAction::Agent(AgentAction::ReportChannelError(err.to_string())),
                )),
            }
        }

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match handle_key_event(key, state, &mut view) {
                        KeyHandlerResult::Continue(e) => effects.extend(e),
                        KeyHandlerResult::Exit => return Ok(()),
                    }
                    view.needs_draw = true;
                }
                Event::Resize(_, _) => view.needs_draw = true,
                _ => {}
            }
        }

        apply_effects(effects, state, channel, &mut view);

        // Keep the spinner moving while the agent streams.
        if view.needs_draw || state.agent.busy {
            terminal.draw(|f| ui(f, state, &view))?;
            view.needs_draw = false;
        }
    }
}

fn apply_effects(
    effects: Vec<DeskEffect>,
    state: &mut DeskState,
    channel: &FileChannel,
    view: &mut ViewState,
) {
    let mut pending = effects;
    while !pending.is_empty() {
        let mut follow_up = Vec::new();
        for effect in pending {
            let failure = match effect {
                DeskEffect::PublishState(document) => {
                    channel.publish(&document).err().map(|e| e.to_string())
                }
                DeskEffect::SubmitChat { message } => {
                    channel.send_message(&message).err().map(|e| e.to_string())
                }
                DeskEffect::CopyToClipboard(text) => arboard::Clipboard::new()
                    .and_then(|mut clipboard| clipboard.set_text(text))
                    .err()
                    .map(|e| format!("clipboard unavailable: {e}")),
                DeskEffect::RequestFrame => {
                    view.needs_draw = true;
                    None
                }
            };
            if let Some(message) = failure {
                follow_up.extend(reduce(
                    state,
                    DeskAction::Agent(AgentAction::ReportChannelError(message)),
                ));
            }
        }
        pending = follow_up;
    }
    let points = state.document.data_points.len();
    view.selected_point = view.selected_point.min(points.saturating_sub(1));
}

fn handle_key_event(key: KeyEvent, state: &mut DeskState, view: &mut ViewState) -> KeyHandlerResult {
    if view.title_draft.is_some() {
        return handle_title_keys(key, state, view);
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyHandlerResult::Exit;
    }
    match key_action(key, state, view) {
        Some(action) => KeyHandlerResult::Continue(reduce(state, DeskAction::User(action))),
        None if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) => KeyHandlerResult::Exit,
        None => KeyHandlerResult::Continue(Vec::new()),
    }
}

fn handle_title_keys(key: KeyEvent, state: &mut DeskState, view: &mut ViewState) -> KeyHandlerResult {
    let effects = match key.code {
        KeyCode::Esc => {
            view.title_draft = None;
            Vec::new()
        }
        KeyCode::Enter => match view.title_draft.take() {
            Some(title) => reduce(state, DeskAction::User(UserAction::SetTitle(title))),
            None => Vec::new(),
        },
        KeyCode::Backspace => {
            if let Some(draft) = view.title_draft.as_mut() {
                draft.pop();
            }
            Vec::new()
        }
        KeyCode::Char(c) => {
            if let Some(draft) = view.title_draft.as_mut() {
                draft.push(c);
            }
            Vec::new()
        }
        _ => Vec::new(),
    };
    KeyHandlerResult::Continue(effects)
}

/// Maps a key outside title editing onto a store action. Keys that only touch
/// the view (selection, entering title edit) return `None`.
fn key_action(key: KeyEvent, state: &DeskState, view: &mut ViewState) -> Option<UserAction> {
    let doc = &state.document;
    match key.code {
        KeyCode::Char('e') => {
            view.title_draft = Some(doc.title.clone());
            None
        }
        KeyCode::Char('t') => Some(UserAction::CycleType),
        KeyCode::Char('r') => Some(UserAction::CycleTimeRange),
        KeyCode::Char(c @ '1'..='8') => {
            let index = c.to_digit(10)? as usize - 1;
            let industry = INDUSTRY_CATALOG.get(index)?.to_string();
            let checked = !doc.industry_filters.contains(&industry);
            Some(UserAction::ToggleIndustryFilter { industry, checked })
        }
        KeyCode::Up => {
            view.selected_point = view.selected_point.saturating_sub(1);
            None
        }
        KeyCode::Down => {
            if view.selected_point + 1 < doc.data_points.len() {
                view.selected_point += 1;
            }
            None
        }
        KeyCode::Char('+') | KeyCode::Char('-') => {
            let point = doc.data_points.get(view.selected_point)?;
            let step = if key.code == KeyCode::Char('+') {
                VALUE_STEP
            } else {
                -VALUE_STEP
            };
            Some(UserAction::UpdateDataPoint {
                index: view.selected_point,
                edit: DataPointEdit::Value(point.value + step),
            })
        }
        KeyCode::Char('a') => {
            view.selected_point = doc.data_points.len();
            Some(UserAction::AddDataPoint)
        }
        KeyCode::Char('x') => Some(UserAction::RemoveDataPoint(view.selected_point)),
        KeyCode::Char('i') => Some(UserAction::AddInsight),
        KeyCode::Char('d') => Some(UserAction::RemoveInsight(doc.insights.len().checked_sub(1)?)),
        KeyCode::Char('g') => Some(UserAction::RequestGenerate),
        KeyCode::Char('y') => Some(UserAction::CopyDocument),
        KeyCode::Char('n') => Some(UserAction::ResetSession),
        KeyCode::Char('c') => Some(UserAction::ClearLogs),
        _ => None,
    }
}

fn get_spinner() -> &'static str {
    let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let tick = chrono::Utc::now().timestamp_millis() / 100;
    let idx = tick.rem_euclid(frames.len() as i64) as usize;
    frames[idx]
}

fn field_label(state: &DeskState, field: FieldName, text: &str) -> Span<'static> {
    if state.highlight.is_highlighted(field) {
        Span::styled(
            format!("● {text}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(format!("  {text}"), Style::default().fg(Color::Cyan))
    }
}

fn document_lines(state: &DeskState, view: &ViewState) -> Vec<Line<'static>> {
    let doc = &state.document;
    let title = match &view.title_draft {
        Some(draft) => format!("{draft}▏"),
        None => doc.title.clone(),
    };
    let mut lines = vec![
        Line::from(vec![
            field_label(state, FieldName::Title, "Title      "),
            Span::raw(title),
        ]),
        Line::from(vec![
            field_label(state, FieldName::Type, "Type       "),
            Span::raw(doc.kind.label()),
        ]),
        Line::from(vec![
            field_label(state, FieldName::TimeRange, "Time range "),
            Span::raw(doc.time_range.label()),
        ]),
        Line::from(field_label(state, FieldName::IndustryFilters, "Industries")),
    ];
    for (index, industry) in INDUSTRY_CATALOG.iter().enumerate() {
        let mark = if doc.industry_filters.contains(*industry) {
            "x"
        } else {
            " "
        };
        lines.push(Line::from(format!("    {} [{mark}] {industry}", index + 1)));
    }
    for extra in doc
        .filters_in_display_order()
        .into_iter()
        .filter(|tag| !INDUSTRY_CATALOG.contains(tag))
    {
        lines.push(Line::from(format!("      [x] {extra}")));
    }

    lines.push(Line::from(field_label(state, FieldName::DataPoints, "Data points")));
    for (index, point) in doc.data_points.iter().enumerate() {
        let cursor = if index == view.selected_point { ">" } else { " " };
        let category = point.category.as_deref().unwrap_or_default();
        lines.push(Line::from(format!(
            "   {cursor} {:<16} {:>10} {category}",
            point.label,
            chart::format_amount(point.value)
        )));
    }

    lines.push(Line::from(field_label(state, FieldName::Insights, "Insights")));
    for (index, insight) in doc.insights.iter().enumerate() {
        lines.push(Line::from(format!("    {}. {insight}", index + 1)));
    }
    lines
}

fn log_lines(state: &DeskState, limit: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = state
        .logs
        .iter()
        .rev()
        .take(limit)
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Error => Color::Red,
                LogLevel::Warn => Color::Yellow,
                LogLevel::Info => Color::Gray,
                LogLevel::Debug => Color::DarkGray,
            };
            let context = entry.context.as_deref().unwrap_or("-");
            Line::from(Span::styled(
                format!(
                    "#{:<4} {:<5} {}/{} {}",
                    entry.seq,
                    entry.level.label(),
                    entry.source.label(),
                    context,
                    entry.message
                ),
                Style::default().fg(color),
            ))
        })
        .collect();
    lines.reverse();
    lines
}

fn ui(f: &mut ratatui::Frame, state: &DeskState, view: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(1),
        ])
        .split(f.area());

    let status = if state.agent.busy {
        Span::styled(
            format!("{} agent busy", get_spinner()),
            Style::default().fg(Color::Yellow),
        )
    } else {
        Span::styled("agent idle", Style::default().fg(Color::Green))
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("vizdesk | {} ", state.document.title),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "| {} | snapshots:{} | mode:{} | ",
            view.route,
            state.agent.snapshots_seen,
            state.settings.snapshot_mode.label()
        )),
        status,
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let editor = Paragraph::new(document_lines(state, view))
        .block(Block::default().borders(Borders::ALL).title(" Document "));
    f.render_widget(editor, body[0]);

    let chart_tree = chart::render(&ChartTag::from(state.document.kind), &state.document.data_points);
    let mut preview: Vec<Line<'static>> = chart_tree.outline().into_iter().map(Line::from).collect();
    if let Some(request) = &state.last_component {
        let tree = templates::resolve(&request.component, &request.data);
        preview.push(Line::from(""));
        preview.push(Line::from(Span::styled(
            format!("── {} ──", request.component),
            Style::default().fg(Color::Magenta),
        )));
        preview.extend(tree.outline().into_iter().map(Line::from));
    }
    let preview = Paragraph::new(preview)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Preview "));
    f.render_widget(preview, body[1]);

    let log_height = chunks[2].height.saturating_sub(2) as usize;
    let logs = Paragraph::new(log_lines(state, log_height))
        .block(Block::default().borders(Borders::ALL).title(" Log "));
    f.render_widget(logs, chunks[2]);

    let generate = if state.generate_enabled() {
        "g generate"
    } else {
        "g (waiting)"
    };
    let keys = if view.title_draft.is_some() {
        "editing title: Enter save | Esc cancel".to_string()
    } else {
        format!(
            "e title | t type | r range | 1-8 filters | ↑↓ +/- points | a/x point | i/d insight | {generate} | y copy | n new | c clear log | q quit"
        )
    };
    f.render_widget(
        Paragraph::new(keys).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );
}
