//! Keybinding configuration for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

/// Key strings per action. Any key in a list triggers the action.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub next_page: Vec<String>,
    pub prev_page: Vec<String>,
    pub select: Vec<String>,
    pub back: Vec<String>,
    pub refresh: Vec<String>,
    pub load_more: Vec<String>,
    pub retry: Vec<String>,
    pub search: Vec<String>,
    pub open_in_browser: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: keys(&["q", "Ctrl+c"]),
            move_up: keys(&["k", "Up"]),
            move_down: keys(&["j", "Down"]),
            next_page: keys(&["PageDown"]),
            prev_page: keys(&["PageUp"]),
            select: keys(&["Enter"]),
            back: keys(&["Esc", "Backspace", "h"]),
            refresh: keys(&["R"]),
            load_more: keys(&["n"]),
            retry: keys(&["r"]),
            search: keys(&["/"]),
            open_in_browser: keys(&["o"]),
        }
    }
}

impl KeybindingConfig {
    /// Resolve a key press. Earlier entries win when a key is bound twice.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table: [(&[String], Action); 12] = [
            (&self.quit, Action::Quit),
            (&self.move_up, Action::MoveUp),
            (&self.move_down, Action::MoveDown),
            (&self.next_page, Action::NextPage),
            (&self.prev_page, Action::PrevPage),
            (&self.select, Action::Select),
            (&self.back, Action::Back),
            (&self.refresh, Action::Refresh),
            (&self.load_more, Action::LoadMore),
            (&self.retry, Action::Retry),
            (&self.search, Action::Search),
            (&self.open_in_browser, Action::OpenInBrowser),
        ];

        table
            .iter()
            .find(|(bindings, _)| matches_any(key, bindings))
            .map(|(_, action)| *action)
            .unwrap_or(Action::None)
    }
}

fn matches_any(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings
        .iter()
        .filter_map(|binding| parse_key_string(binding).ok())
        .any(|parsed| parsed.matches(key))
}

/// A parsed key binding with code and modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Shift is ignored on the event side so "R" matches Shift+r terminals.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (self.modifiers == key.modifiers
                || self.modifiers == (key.modifiers & !KeyModifiers::SHIFT))
    }
}

/// Parse `"j"`, `"PageDown"`, `"Ctrl+c"`, `"Shift+Tab"` and the like.
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    // "+" on its own is a key, not a separator.
    if s == "+" {
        return Ok(KeyBinding {
            code: KeyCode::Char('+'),
            modifiers: KeyModifiers::NONE,
        });
    }

    let (modifier_part, key_part) = match s.rsplit_once('+') {
        Some((mods, key)) => (Some(mods), key),
        None => (None, s),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in modifier_part.into_iter().flat_map(|m| m.split('+')) {
        modifiers |= match part.to_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" => KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        };
    }

    Ok(KeyBinding {
        code: parse_key_code(key_part)?,
        modifiers,
    })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    match lower.as_str() {
        "enter" | "return" => Ok(KeyCode::Enter),
        "tab" => Ok(KeyCode::Tab),
        "backtab" => Ok(KeyCode::BackTab),
        "backspace" | "bs" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdn" => Ok(KeyCode::PageDown),
        "up" => Ok(KeyCode::Up),
        "down" => Ok(KeyCode::Down),
        "left" => Ok(KeyCode::Left),
        "right" => Ok(KeyCode::Right),
        "esc" | "escape" => Ok(KeyCode::Esc),
        "space" => Ok(KeyCode::Char(' ')),
        _ => Err(format!("Unknown key: {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_parse_plain_and_special_keys() {
        assert_eq!(parse_key_string("/").unwrap().code, KeyCode::Char('/'));
        assert_eq!(parse_key_string("Esc").unwrap().code, KeyCode::Esc);
        assert_eq!(parse_key_string("pgdn").unwrap().code, KeyCode::PageDown);
        assert_eq!(parse_key_string("F5").unwrap().code, KeyCode::F(5));
        assert_eq!(parse_key_string("+").unwrap().code, KeyCode::Char('+'));
        assert!(parse_key_string("F13").is_err());
        assert!(parse_key_string("Hyper").is_err());
    }

    #[test]
    fn test_parse_modifiers() {
        let binding = parse_key_string("Ctrl+Shift+r").unwrap();
        assert_eq!(binding.code, KeyCode::Char('r'));
        assert_eq!(
            binding.modifiers,
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        );
        assert!(parse_key_string("Meta+r").is_err());
    }

    #[test]
    fn test_uppercase_binding_matches_shifted_event() {
        let binding = parse_key_string("R").unwrap();
        assert!(binding.matches(&KeyEvent::new(KeyCode::Char('R'), KeyModifiers::SHIFT)));
        assert!(!binding.matches(&KeyEvent::new(KeyCode::Char('R'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_default_actions() {
        let config = KeybindingConfig::default();
        assert_eq!(config.get_action(&press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            config.get_action(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(config.get_action(&press(KeyCode::Enter)), Action::Select);
        assert_eq!(config.get_action(&press(KeyCode::Esc)), Action::Back);
        assert_eq!(config.get_action(&press(KeyCode::Char('n'))), Action::LoadMore);
        assert_eq!(config.get_action(&press(KeyCode::Char('r'))), Action::Retry);
        assert_eq!(config.get_action(&press(KeyCode::Char('R'))), Action::Refresh);
        assert_eq!(config.get_action(&press(KeyCode::Char('/'))), Action::Search);
        assert_eq!(config.get_action(&press(KeyCode::Char('x'))), Action::None);
    }

    #[test]
    fn test_custom_bindings_from_toml() {
        let config: KeybindingConfig = toml::from_str(r#"load_more = ["Space"]"#).unwrap();
        assert_eq!(config.get_action(&press(KeyCode::Char(' '))), Action::LoadMore);
        assert_eq!(config.get_action(&press(KeyCode::Char('n'))), Action::None);
        assert_eq!(config.get_action(&press(KeyCode::Char('j'))), Action::MoveDown);
    }
}
