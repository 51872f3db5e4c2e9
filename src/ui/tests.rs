#![allow(non_snake_case)]

use super::*;
use crossterm::event::KeyEventState;

fn press(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_keys(state: &mut UiState, keys: &str) -> Vec<Option<UserEvent>> {
    keys.chars()
        .map(|c| interpret_event(state, press(KeyCode::Char(c))))
        .collect()
}

#[test]
fn interpret_event__maps_game_keys() {
    // given
    let mut state = UiState::default();

    // when
    let actual = vec![
        interpret_event(&mut state, press(KeyCode::Char('h'))),
        interpret_event(&mut state, press(KeyCode::Char('t'))),
        interpret_event(&mut state, press(KeyCode::Right)),
        interpret_event(&mut state, press(KeyCode::Left)),
        interpret_event(&mut state, press(KeyCode::Enter)),
        interpret_event(&mut state, press(KeyCode::Char('m'))),
        interpret_event(&mut state, press(KeyCode::Char('x'))),
    ];

    // then
    let expected = vec![
        Some(UserEvent::ChooseHeads),
        Some(UserEvent::ChooseTails),
        Some(UserEvent::NextCurrency),
        Some(UserEvent::PrevCurrency),
        Some(UserEvent::Flip),
        Some(UserEvent::ToggleMode),
        None,
    ];
    assert_eq!(expected, actual);
}

#[test]
fn interpret_event__bet_modal_edits_prefilled_amount() {
    // given
    let mut state = UiState {
        bet_input: "0.001".to_string(),
        ..UiState::default()
    };
    interpret_event(&mut state, press(KeyCode::Char('b')));
    assert!(state.is_modal_open());

    // when
    interpret_event(&mut state, press(KeyCode::Backspace));
    let typed = type_keys(&mut state, "5x");
    let confirmed = interpret_event(&mut state, press(KeyCode::Enter));

    // then
    assert_eq!(vec![Some(UserEvent::Redraw), None], typed);
    assert_eq!(Some(UserEvent::SetBet("0.005".to_string())), confirmed);
    assert!(!state.is_modal_open());
}

#[test]
fn interpret_event__bet_modal_swallows_game_keys() {
    let mut state = UiState::default();
    interpret_event(&mut state, press(KeyCode::Char('b')));
    assert_eq!(None, interpret_event(&mut state, press(KeyCode::Char('h'))));
    assert_eq!(
        Some(UserEvent::Redraw),
        interpret_event(&mut state, press(KeyCode::Esc))
    );
    assert!(!state.is_modal_open());
}

#[test]
fn interpret_event__quit_requires_confirmation() {
    // given
    let mut state = UiState::default();

    // when
    let opened = interpret_event(&mut state, press(KeyCode::Char('q')));
    let declined = interpret_event(&mut state, press(KeyCode::Char('n')));
    interpret_event(&mut state, press(KeyCode::Esc));
    let confirmed = interpret_event(&mut state, press(KeyCode::Char('y')));

    // then
    assert_eq!(Some(UserEvent::Redraw), opened);
    assert_eq!(Some(UserEvent::Redraw), declined);
    assert_eq!(Some(UserEvent::Quit), confirmed);
}

#[test]
fn interpret_event__ctrl_c_quits_immediately() {
    let mut state = UiState::default();
    let event = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert_eq!(Some(UserEvent::Quit), interpret_event(&mut state, event));
}

#[test]
fn interpret_event__ignores_key_releases() {
    let mut state = UiState::default();
    let release = Event::Key(KeyEvent {
        code: KeyCode::Char('h'),
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Release,
        state: KeyEventState::NONE,
    });
    assert_eq!(None, interpret_event(&mut state, release));
}

#[test]
fn pad_to_width__accounts_for_wide_characters() {
    assert_eq!("BTC  ", pad_to_width("BTC", 5));
    assert_eq!("币币 ", pad_to_width("币币", 5));
    assert_eq!("DOGECOIN", pad_to_width("DOGECOIN", 5));
}
