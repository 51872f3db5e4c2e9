use crate::{
    client::{
        AppSnapshot,
        HistoryEntry,
        hash_preview,
    },
    notifications::Level,
};
use coinflip::{
    CoinSide,
    FlipMode,
    Phase,
};
use color_eyre::eyre::{
    Result,
    eyre,
};
use crossterm::{
    event::{
        Event,
        EventStream,
        KeyCode,
        KeyEvent,
        KeyEventKind,
        KeyModifiers,
    },
    terminal::{
        disable_raw_mode,
        enable_raw_mode,
    },
};
use futures::StreamExt;
use itertools::Itertools;
use ratatui::{
    prelude::*,
    widgets::*,
};
use std::io::stdout;
use unicode_width::UnicodeWidthStr;

const MAX_BET_INPUT: usize = 24;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserEvent {
    Quit,
    Redraw,
    ChooseHeads,
    ChooseTails,
    NextCurrency,
    PrevCurrency,
    SetBet(String),
    Flip,
    ToggleMode,
    Reset,
    ConnectWallet,
    DisconnectWallet,
    NextNetwork,
}

#[derive(Debug, Default)]
pub struct UiState {
    mode: Mode,
    bet_input: String,
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl UiState {
    pub fn is_modal_open(&self) -> bool {
        !matches!(self.mode, Mode::Normal)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Mode {
    #[default]
    Normal,
    BetModal(BetState),
    QuitModal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct BetState {
    input: String,
}

pub type InputEventReceiver = EventStream;

pub fn input_event_stream() -> InputEventReceiver {
    EventStream::new()
}

pub async fn next_raw_event(events: &mut InputEventReceiver) -> Result<Event> {
    match events.next().await {
        Some(event) => Ok(event?),
        None => Err(eyre!("terminal input stream closed")),
    }
}

pub fn terminal_enter(state: &mut UiState) -> Result<()> {
    enable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::EnterAlternateScreen)?;
    // Create a single persistent Terminal to preserve buffers across draws
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    state.terminal = Some(terminal);
    Ok(())
}

pub fn terminal_exit() -> Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
    Ok(())
}

pub fn draw(state: &mut UiState, snap: &AppSnapshot) -> Result<()> {
    // bet modal opens prefilled with the current form value
    state.bet_input = snap.bet_input.clone();
    if let Some(mut term) = state.terminal.take() {
        term.draw(|f| ui(f, state, snap))?;
        state.terminal = Some(term);
    }
    Ok(())
}

/// Maps a terminal event onto an app event, tracking modal state.
pub fn interpret_event(state: &mut UiState, event: Event) -> Option<UserEvent> {
    let key = match event {
        Event::Key(key) => key,
        Event::Resize(..) => return Some(UserEvent::Redraw),
        _ => return None,
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if is_interrupt(&key) {
        return Some(UserEvent::Quit);
    }
    match &mut state.mode {
        Mode::BetModal(bs) => {
            return match key.code {
                KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                KeyCode::Enter => {
                    let input = std::mem::take(&mut bs.input);
                    state.mode = Mode::Normal;
                    Some(UserEvent::SetBet(input))
                }
                KeyCode::Backspace => {
                    bs.input.pop();
                    Some(UserEvent::Redraw)
                }
                KeyCode::Char(c)
                    if (c.is_ascii_digit() || c == '.') && bs.input.len() < MAX_BET_INPUT =>
                {
                    bs.input.push(c);
                    Some(UserEvent::Redraw)
                }
                _ => None,
            };
        }
        Mode::QuitModal => {
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => Some(UserEvent::Quit),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    state.mode = Mode::Normal;
                    Some(UserEvent::Redraw)
                }
                _ => None,
            };
        }
        Mode::Normal => {}
    }
    let event = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            state.mode = Mode::QuitModal;
            UserEvent::Redraw
        }
        KeyCode::Char('h') => UserEvent::ChooseHeads,
        KeyCode::Char('t') => UserEvent::ChooseTails,
        KeyCode::Right | KeyCode::Char('l') => UserEvent::NextCurrency,
        KeyCode::Left => UserEvent::PrevCurrency,
        KeyCode::Char('b') => {
            state.mode = Mode::BetModal(BetState {
                input: state.bet_input.clone(),
            });
            UserEvent::Redraw
        }
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('f') => UserEvent::Flip,
        KeyCode::Char('m') => UserEvent::ToggleMode,
        KeyCode::Char('r') => UserEvent::Reset,
        KeyCode::Char('c') => UserEvent::ConnectWallet,
        KeyCode::Char('d') => UserEvent::DisconnectWallet,
        KeyCode::Char('n') => UserEvent::NextNetwork,
        _ => return None,
    };
    Some(event)
}

// raw mode swallows SIGINT, so Ctrl+C arrives as a key press
fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

fn ui(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    f.render_widget(Clear, f.area());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // wallet
            Constraint::Length(9),  // game + balances
            Constraint::Length(12), // history
            Constraint::Min(5),     // notifications/status
            Constraint::Length(3),  // help
        ])
        .split(f.area());

    draw_wallet_panel(f, chunks[0], snap);
    draw_game_row(f, chunks[1], snap);
    draw_history(f, chunks[2], snap);
    draw_status(f, chunks[3], snap);
    draw_help(f, chunks[4]);
    draw_modals(f, state, snap);
}

fn draw_wallet_panel(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let wallet = &snap.wallet;
    let text = match (wallet.detected, wallet.account) {
        (false, _) => "No wallet provider detected".to_string(),
        (true, Some(account)) if wallet.connected => {
            let balance = wallet
                .balance_label()
                .unwrap_or_else(|| String::from("N/A"));
            format!(
                "Wallet: {} | Network: {} | Balance: {}",
                account.short(),
                wallet.network,
                balance
            )
        }
        (true, _) => "Wallet: not connected (c to connect)".to_string(),
    };
    let widget =
        Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Wallet"));
    f.render_widget(widget, area);
}

fn draw_game_row(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    draw_game_panel(f, cols[0], snap);
    draw_balances(f, cols[1], snap);
}

fn draw_game_panel(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let state = &snap.game.state;
    let trigger = snap.game.trigger;
    let choice_span = |side: CoinSide| {
        let label = format!(" {} ", side.label().to_uppercase());
        if state.selected_choice == Some(side) {
            Span::styled(label, Style::default().fg(Color::Black).bg(Color::Yellow))
        } else {
            Span::raw(label)
        }
    };
    let coin = match &state.phase {
        Phase::Flipping(_) => "spinning".to_string(),
        _ => state
            .game_result
            .map_or_else(|| "-".to_string(), |r| r.label().to_uppercase()),
    };
    let mode = match snap.mode {
        FlipMode::Demo => Span::styled("Demo", Style::default().fg(Color::Cyan)),
        FlipMode::Blockchain => Span::styled("Blockchain", Style::default().fg(Color::Magenta)),
    };
    let trigger_style = if trigger.enabled {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let lines = vec![
        Line::from(vec![Span::raw("Mode: "), mode]),
        Line::from(vec![
            Span::raw("Choice: "),
            choice_span(CoinSide::Heads),
            Span::raw(" "),
            choice_span(CoinSide::Tails),
        ]),
        Line::from(format!(
            "Bet: {} {} | Balance: {} {}",
            snap.bet_input,
            state.selected_currency,
            snap.game.balance.fixed(8),
            state.selected_currency
        )),
        Line::from(format!("Coin: {coin}")),
        Line::from(""),
        Line::from(Span::styled(format!("[ {} ]", trigger.label), trigger_style)),
    ];
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Coinflip"));
    f.render_widget(widget, area);
}

fn draw_balances(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let selected = snap.game.state.selected_currency;
    let rows = snap
        .balances
        .iter()
        .map(|(currency, amount)| {
            let style = if *currency == selected {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(pad_to_width(currency.symbol(), 5)),
                Cell::from(amount.fixed(8)),
            ])
            .style(style)
        })
        .collect_vec();
    let table = Table::new(rows, [Constraint::Length(6), Constraint::Min(10)])
        .block(Block::default().borders(Borders::ALL).title("Demo Balances"));
    f.render_widget(table, area);
}

fn draw_history(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let lines = if snap.history.is_empty() {
        vec![Line::from("No flips yet")]
    } else {
        snap.history.iter().map(history_line).collect_vec()
    };
    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Recent Flips"));
    f.render_widget(widget, area);
}

fn history_line(entry: &HistoryEntry) -> Line<'static> {
    let verdict = if entry.won {
        Span::styled("WIN ", Style::default().fg(Color::Green))
    } else {
        Span::styled("LOSS", Style::default().fg(Color::Red))
    };
    let details = [
        entry.at.format("%H:%M:%S").to_string(),
        pad_to_width(&entry.mode.to_string(), 10),
        format!(
            "{} -> {}",
            pad_to_width(entry.choice.label(), 5),
            pad_to_width(entry.outcome.label(), 5)
        ),
        format!("{} {}", entry.amount.fixed(8), entry.currency),
    ]
    .iter()
    .join(" | ");
    let mut spans = vec![verdict, Span::raw(format!(" {details}"))];
    if let Some(hash) = &entry.tx_hash {
        spans.push(Span::styled(
            format!(" | {}", hash_preview(hash)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn draw_status(f: &mut Frame, area: Rect, snap: &AppSnapshot) {
    let mut lines = vec![Line::from(Span::styled(
        snap.status.clone(),
        Style::default().fg(Color::Green),
    ))];
    for notification in snap.notifications.iter().rev() {
        let color = match notification.level {
            Level::Info => Color::Cyan,
            Level::Success => Color::Green,
            Level::Warning => Color::Yellow,
            Level::Error => Color::Red,
        };
        lines.push(Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(color),
        )));
    }
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Status"));
    f.render_widget(widget, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(
        "h heads | t tails | ←/→ currency | b bet | Enter flip | m mode | r reset | c connect | d disconnect | n network | q/Esc quit",
    )
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, area);
}

fn draw_modals(f: &mut Frame, state: &UiState, snap: &AppSnapshot) {
    match &state.mode {
        Mode::BetModal(bs) => {
            let area = centered_rect(40, 30, f.area());
            let block = Block::default().borders(Borders::ALL).title("Bet Amount");
            let p = Paragraph::new(format!(
                "Amount: {}_ {}\nEnter=confirm Esc=cancel digits or . to edit",
                bs.input, snap.game.state.selected_currency
            ));
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::QuitModal => {
            let area = centered_rect(40, 20, f.area());
            let block = Block::default().borders(Borders::ALL).title("Confirm Quit");
            let p = Paragraph::new("Quit the game? (Y/N)");
            f.render_widget(Clear, area);
            f.render_widget(block.clone(), area);
            f.render_widget(p, block.inner(area));
        }
        Mode::Normal => {}
    }
}

fn pad_to_width(text: &str, width: usize) -> String {
    let used = text.width();
    if used >= width {
        text.to_string()
    } else {
        format!("{text}{}", " ".repeat(width - used))
    }
}

fn centered_rect(w_percent: u16, h_percent: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h_percent) / 2),
            Constraint::Percentage(h_percent),
            Constraint::Percentage((100 - h_percent) / 2),
        ])
        .split(r);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w_percent) / 2),
            Constraint::Percentage(w_percent),
            Constraint::Percentage((100 - w_percent) / 2),
        ])
        .split(popup_layout[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests;
