use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Playback
    PlayPause,
    Stop,
    NextTrack,
    PrevTrack,
    SeekForward,
    SeekBackward,
    VolumeUp,
    VolumeDown,
    ToggleMute,

    // Modes
    ToggleRepeat,
    ToggleShuffle,
    ToggleSpectrum,

    Quit,

    // No action
    None,
}

impl Action {
    pub fn from_key_event(key: KeyEvent) -> Self {
        match (key.code, key.modifiers) {
            // Quit
            (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

            // Playback
            (KeyCode::Char(' '), KeyModifiers::NONE) => Action::PlayPause,
            (KeyCode::Char('s'), KeyModifiers::NONE) => Action::Stop,
            (KeyCode::Char('n'), KeyModifiers::NONE) => Action::NextTrack,
            (KeyCode::Char('p'), KeyModifiers::NONE) => Action::PrevTrack,
            (KeyCode::Right | KeyCode::Char(']'), KeyModifiers::NONE) => Action::SeekForward,
            (KeyCode::Left | KeyCode::Char('['), KeyModifiers::NONE) => Action::SeekBackward,
            (KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('='), _) => Action::VolumeUp,
            (KeyCode::Down | KeyCode::Char('-'), KeyModifiers::NONE) => Action::VolumeDown,
            (KeyCode::Char('m'), KeyModifiers::NONE) => Action::ToggleMute,

            // Modes
            (KeyCode::Char('r'), KeyModifiers::NONE) => Action::ToggleRepeat,
            (KeyCode::Char('h'), KeyModifiers::NONE) => Action::ToggleShuffle,
            (KeyCode::Char('v'), KeyModifiers::NONE) => Action::ToggleSpectrum,

            _ => Action::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Action {
        Action::from_key_event(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn maps_playback_keys() {
        assert_eq!(key(KeyCode::Char(' '), KeyModifiers::NONE), Action::PlayPause);
        assert_eq!(key(KeyCode::Char('s'), KeyModifiers::NONE), Action::Stop);
        assert_eq!(key(KeyCode::Left, KeyModifiers::NONE), Action::SeekBackward);
        assert_eq!(key(KeyCode::Up, KeyModifiers::NONE), Action::VolumeUp);
        assert_eq!(key(KeyCode::Char('v'), KeyModifiers::NONE), Action::ToggleSpectrum);
    }

    #[test]
    fn maps_mode_keys() {
        assert_eq!(key(KeyCode::Char('r'), KeyModifiers::NONE), Action::ToggleRepeat);
        assert_eq!(key(KeyCode::Char('h'), KeyModifiers::NONE), Action::ToggleShuffle);
        assert_eq!(key(KeyCode::Char('h'), KeyModifiers::CONTROL), Action::None);
    }

    #[test]
    fn ctrl_c_quits() {
        assert_eq!(key(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
        assert_eq!(key(KeyCode::Char('c'), KeyModifiers::NONE), Action::None);
    }
}
