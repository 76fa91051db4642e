//! Window actions and their keyboard accelerators.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Actions a window exposes to menus and accelerators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Save,
    SaveAs,
    Open,
    Print,
    Export,
    ToggleFullscreen,
    Quit,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Save,
        Action::SaveAs,
        Action::Open,
        Action::Print,
        Action::Export,
        Action::ToggleFullscreen,
        Action::Quit,
    ];

    /// Name used in config files and by the host transport.
    pub fn name(self) -> &'static str {
        match self {
            Action::Save => "save",
            Action::SaveAs => "save_as",
            Action::Open => "open",
            Action::Print => "print",
            Action::Export => "export",
            Action::ToggleFullscreen => "toggle_fullscreen",
            Action::Quit => "quit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }
}

/// A key with optional modifiers, e.g. `Ctrl+Shift+S`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    /// Parses an accelerator. Modifiers may come in any order and spaces
    /// around `+` are ignored; `Ctrl++` binds the plus key.
    pub fn parse(s: &str) -> Result<Self, String> {
        let normalized: String = s.split_whitespace().collect();
        if normalized.is_empty() {
            return Err("Empty keybinding string".to_string());
        }

        let (modifiers, key) = if normalized == "+" {
            ("", "+")
        } else if let Some(rest) = normalized.strip_suffix("++") {
            (rest, "+")
        } else {
            normalized.rsplit_once('+').unwrap_or(("", normalized.as_str()))
        };
        if key.is_empty() {
            return Err(format!("No key specified in: {}", s));
        }

        let mut binding = Self {
            key: key.to_string(),
            ctrl: false,
            shift: false,
            alt: false,
        };
        for modifier in modifiers.split('+').filter(|m| !m.is_empty()) {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "primary" => binding.ctrl = true,
                "shift" => binding.shift = true,
                "alt" => binding.alt = true,
                other => return Err(format!("Unknown modifier '{}' in: {}", other, s)),
            }
        }
        Ok(binding)
    }

    pub fn matches(&self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == ctrl
            && self.shift == shift
            && self.alt == alt
    }
}

/// Accelerators for every window action.
///
/// ```toml
/// [keybindings]
/// save = ["Ctrl+S"]
/// toggle_fullscreen = ["Escape", "F11"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KeybindingsConfig {
    #[serde(default = "default_save")]
    pub save: Vec<String>,

    #[serde(default = "default_save_as")]
    pub save_as: Vec<String>,

    #[serde(default = "default_open")]
    pub open: Vec<String>,

    #[serde(default = "default_print")]
    pub print: Vec<String>,

    #[serde(default = "default_export")]
    pub export: Vec<String>,

    #[serde(default = "default_toggle_fullscreen")]
    pub toggle_fullscreen: Vec<String>,

    #[serde(default = "default_quit")]
    pub quit: Vec<String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            save: default_save(),
            save_as: default_save_as(),
            open: default_open(),
            print: default_print(),
            export: default_export(),
            toggle_fullscreen: default_toggle_fullscreen(),
            quit: default_quit(),
        }
    }
}

impl KeybindingsConfig {
    pub fn accelerators(&self, action: Action) -> &[String] {
        match action {
            Action::Save => &self.save,
            Action::SaveAs => &self.save_as,
            Action::Open => &self.open,
            Action::Print => &self.print,
            Action::Export => &self.export,
            Action::ToggleFullscreen => &self.toggle_fullscreen,
            Action::Quit => &self.quit,
        }
    }

    /// Builds the accelerator lookup table. Fails on an unparsable
    /// accelerator or one bound to two actions.
    pub fn build_action_map(&self) -> Result<HashMap<KeyBinding, Action>, String> {
        let mut map = HashMap::new();
        for action in Action::ALL {
            for accel in self.accelerators(action) {
                let binding = KeyBinding::parse(accel)?;
                if let Some(existing) = map.insert(binding, action) {
                    return Err(format!(
                        "Duplicate keybinding '{}' assigned to both {} and {}",
                        accel,
                        existing.name(),
                        action.name()
                    ));
                }
            }
        }
        Ok(map)
    }
}

fn default_save() -> Vec<String> {
    vec!["Ctrl+S".to_string()]
}

fn default_save_as() -> Vec<String> {
    vec!["Ctrl+Shift+S".to_string()]
}

fn default_open() -> Vec<String> {
    vec!["Ctrl+O".to_string()]
}

fn default_print() -> Vec<String> {
    vec!["Ctrl+P".to_string()]
}

fn default_export() -> Vec<String> {
    vec!["Ctrl+E".to_string()]
}

fn default_toggle_fullscreen() -> Vec<String> {
    vec!["Escape".to_string()]
}

fn default_quit() -> Vec<String> {
    vec!["Ctrl+Q".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_key() {
        let binding = KeyBinding::parse("Escape").unwrap();
        assert_eq!(binding.key, "Escape");
        assert!(!binding.ctrl && !binding.shift && !binding.alt);
    }

    #[test]
    fn test_parse_modifiers_in_any_order() {
        let a = KeyBinding::parse("Ctrl+Shift+S").unwrap();
        let b = KeyBinding::parse("shift + ctrl + S").unwrap();
        assert_eq!(a, b);
        assert!(a.ctrl && a.shift && !a.alt);
    }

    #[test]
    fn test_parse_plus_key() {
        let binding = KeyBinding::parse("Ctrl++").unwrap();
        assert_eq!(binding.key, "+");
        assert!(binding.ctrl);
        assert_eq!(KeyBinding::parse("+").unwrap().key, "+");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(KeyBinding::parse("").is_err());
        assert!(KeyBinding::parse("Ctrl+").is_err());
        assert!(KeyBinding::parse("Hyper+S").is_err());
    }

    #[test]
    fn test_matches_ignores_key_case() {
        let binding = KeyBinding::parse("Ctrl+Shift+S").unwrap();
        assert!(binding.matches("s", true, true, false));
        assert!(!binding.matches("S", true, false, false));
        assert!(!binding.matches("O", true, true, false));
    }

    #[test]
    fn test_action_names_round_trip() {
        for action in Action::ALL {
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("undo"), None);
    }

    #[test]
    fn test_default_action_map() {
        let map = KeybindingsConfig::default().build_action_map().unwrap();
        assert_eq!(map.len(), 7);
        assert_eq!(
            map.get(&KeyBinding::parse("Ctrl+Shift+S").unwrap()),
            Some(&Action::SaveAs)
        );
        assert_eq!(
            map.get(&KeyBinding::parse("Escape").unwrap()),
            Some(&Action::ToggleFullscreen)
        );
    }

    #[test]
    fn test_duplicate_keybinding_detection() {
        let config = KeybindingsConfig {
            export: vec!["Shift+Ctrl+S".to_string()],
            ..KeybindingsConfig::default()
        };
        let err = config.build_action_map().unwrap_err();
        assert!(err.contains("Duplicate keybinding"));
        assert!(err.contains("save_as"));
    }
}
