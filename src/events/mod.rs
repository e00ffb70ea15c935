use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    Quit,
    ToggleHelp,
    Login,
    NavigateUp,
    NavigateDown,
    NavigateLeft,
    NavigateRight,
    Select,
    Back,
    TogglePlay,
    NextTrack,
    PrevTrack,
    VolumeUp,
    VolumeDown,
    LikeTrack,
    OpenSearch,
    OpenFilter,
    Input(char),
    InputBackspace,
    InputSubmit,
    SwitchScreen(u8),
    Refresh,
    Export,
    Analyze,
    CreatePlaylist,
    PruneCache,
}

pub fn map_key_to_action(key: KeyEvent, editing: bool) -> Option<UserAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UserAction::Quit);
    }

    if editing {
        return match key.code {
            KeyCode::Esc => Some(UserAction::Back),
            KeyCode::Enter => Some(UserAction::InputSubmit),
            KeyCode::Backspace => Some(UserAction::InputBackspace),
            KeyCode::Char(c) => Some(UserAction::Input(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(UserAction::Quit),
        KeyCode::Char('?') => Some(UserAction::ToggleHelp),
        KeyCode::Char('L') => Some(UserAction::Login),
        KeyCode::Up | KeyCode::Char('k') => Some(UserAction::NavigateUp),
        KeyCode::Down | KeyCode::Char('j') => Some(UserAction::NavigateDown),
        KeyCode::Left | KeyCode::Char('h') => Some(UserAction::NavigateLeft),
        KeyCode::Right => Some(UserAction::NavigateRight),
        KeyCode::Enter => Some(UserAction::Select),
        KeyCode::Esc | KeyCode::Char('b') => Some(UserAction::Back),
        KeyCode::Char(' ') => Some(UserAction::TogglePlay),
        KeyCode::Char('n') => Some(UserAction::NextTrack),
        KeyCode::Char('p') => Some(UserAction::PrevTrack),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(UserAction::VolumeUp),
        KeyCode::Char('-') => Some(UserAction::VolumeDown),
        KeyCode::Char('l') => Some(UserAction::LikeTrack),
        KeyCode::Char('s') => Some(UserAction::OpenSearch),
        KeyCode::Char('/') => Some(UserAction::OpenFilter),
        KeyCode::Char('r') => Some(UserAction::Refresh),
        KeyCode::Char('x') => Some(UserAction::Export),
        KeyCode::Char('i') => Some(UserAction::Analyze),
        KeyCode::Char('c') => Some(UserAction::CreatePlaylist),
        KeyCode::Char('D') => Some(UserAction::PruneCache),
        KeyCode::Char('1') => Some(UserAction::SwitchScreen(1)),
        KeyCode::Char('2') => Some(UserAction::SwitchScreen(2)),
        KeyCode::Char('3') => Some(UserAction::SwitchScreen(3)),
        KeyCode::Char('4') => Some(UserAction::SwitchScreen(4)),
        _ => None,
    }
}

/// Keys honoured while the login overlay waits for the browser redirect.
pub fn map_login_key(key: KeyEvent) -> Option<UserAction> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(UserAction::Quit),
        KeyCode::Char('q') => Some(UserAction::Quit),
        KeyCode::Esc => Some(UserAction::Back),
        _ => None,
    }
}
