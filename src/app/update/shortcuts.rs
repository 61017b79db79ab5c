use super::super::messages::Message;
use super::super::state::App;
use iced::keyboard::{Key, Modifiers, key};

impl App {
    pub(super) fn shortcut_message_for_key(
        &self,
        key: Key,
        modifiers: Modifiers,
    ) -> Option<Message> {
        let pressed = match key.as_ref() {
            Key::Named(key::Named::Space) => "space".to_string(),
            Key::Character(ch) => ch.to_ascii_lowercase(),
            _ => return None,
        };

        if Self::shortcut_matches(&self.config.key_safe_quit, "q", &pressed, modifiers) {
            return Some(Message::SafeQuit);
        }
        // Playback keys only apply while the reader is open.
        if !self.show_reader {
            return None;
        }

        if Self::shortcut_matches(
            &self.config.key_toggle_play_pause,
            "space",
            &pressed,
            modifiers,
        ) {
            Some(Message::TogglePlayPause)
        } else if Self::shortcut_matches(&self.config.key_skip_forward, "f", &pressed, modifiers) {
            Some(Message::SkipForward)
        } else if Self::shortcut_matches(&self.config.key_skip_back, "b", &pressed, modifiers) {
            Some(Message::SkipBack)
        } else {
            None
        }
    }

    pub(super) fn shortcut_matches(
        raw: &str,
        fallback: &str,
        pressed: &str,
        modifiers: Modifiers,
    ) -> bool {
        let normalized = Self::normalize_shortcut_token(raw, fallback);

        let mut required_ctrl = false;
        let mut required_alt = false;
        let mut required_logo = false;
        let mut required_shift = false;
        let mut required_key: Option<&str> = None;

        for token in normalized
            .split('+')
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            match token {
                "ctrl" | "control" => required_ctrl = true,
                "alt" => required_alt = true,
                "logo" | "meta" | "super" | "cmd" | "command" => required_logo = true,
                "shift" => required_shift = true,
                key => required_key = Some(key),
            }
        }

        let required_key = required_key.unwrap_or(fallback);
        if pressed != required_key {
            return false;
        }

        modifiers.control() == required_ctrl
            && modifiers.alt() == required_alt
            && modifiers.logo() == required_logo
            && modifiers.shift() == required_shift
    }

    pub(super) fn normalize_shortcut_token(raw: &str, fallback: &str) -> String {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            fallback.to_string()
        } else {
            normalized.replace("spacebar", "space")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn reader_app() -> App {
        let mut app = App::new(AppConfig::default(), None);
        app.show_reader = true;
        app
    }

    #[test]
    fn normalizes_spacebar_alias() {
        assert_eq!(App::normalize_shortcut_token(" SpaceBar ", "x"), "space");
    }

    #[test]
    fn blank_binding_uses_fallback() {
        assert!(App::shortcut_matches("  ", "b", "b", Modifiers::empty()));
    }

    #[test]
    fn rejects_unexpected_extra_modifier() {
        assert!(!App::shortcut_matches(
            "ctrl+f",
            "x",
            "f",
            Modifiers::CTRL | Modifiers::SHIFT,
        ));
    }

    #[test]
    fn default_keys_map_to_reader_controls() {
        let app = reader_app();
        let space = Key::Named(key::Named::Space);
        assert!(matches!(
            app.shortcut_message_for_key(space, Modifiers::empty()),
            Some(Message::TogglePlayPause)
        ));
        assert!(matches!(
            app.shortcut_message_for_key(Key::Character("F".into()), Modifiers::empty()),
            Some(Message::SkipForward)
        ));
        assert!(matches!(
            app.shortcut_message_for_key(Key::Character("b".into()), Modifiers::empty()),
            Some(Message::SkipBack)
        ));
    }

    #[test]
    fn playback_keys_are_ignored_outside_the_reader() {
        let mut app = reader_app();
        app.show_reader = false;
        let space = Key::Named(key::Named::Space);
        assert!(app.shortcut_message_for_key(space, Modifiers::empty()).is_none());
        assert!(matches!(
            app.shortcut_message_for_key(Key::Character("q".into()), Modifiers::empty()),
            Some(Message::SafeQuit)
        ));
    }
}
