use crate::dashboard::Keybinds;

/// A key press as reported by the host page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
    pub repeat: bool,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

/// A parsed binding such as `Mod+K` or `Shift+Enter`.
///
/// `Mod` accepts either Ctrl or Meta so one binding covers both platforms.
/// Modifiers that are not named are ignored when matching, so `Enter` also
/// fires for `Shift+Enter`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyCombo {
    pub needs_mod: bool,
    pub needs_ctrl: bool,
    pub needs_meta: bool,
    pub needs_shift: bool,
    pub needs_alt: bool,
    pub key: Option<String>,
}

impl KeyCombo {
    /// Parses a binding. Returns `None` for an empty definition, which never
    /// matches anything.
    pub fn parse(definition: &str) -> Option<Self> {
        let mut combo = Self::default();
        let mut any = false;
        for part in definition.split('+') {
            let token = part.trim();
            if token.is_empty() {
                continue;
            }
            any = true;
            match token.to_ascii_lowercase().as_str() {
                "mod" => combo.needs_mod = true,
                "shift" => combo.needs_shift = true,
                "alt" | "option" => combo.needs_alt = true,
                "ctrl" | "control" => combo.needs_ctrl = true,
                "cmd" | "meta" => combo.needs_meta = true,
                _ => combo.key = Some(normalize_key(token)),
            }
        }
        any.then_some(combo)
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        let mod_ok = !self.needs_mod || event.ctrl || event.meta;
        let ctrl_ok = !self.needs_ctrl || event.ctrl;
        let meta_ok = !self.needs_meta || event.meta;
        let shift_ok = !self.needs_shift || event.shift;
        let alt_ok = !self.needs_alt || event.alt;
        let key_ok = match &self.key {
            Some(expected) => normalize_key(&event.key) == *expected,
            None => true,
        };
        mod_ok && ctrl_ok && meta_ok && shift_ok && alt_ok && key_ok
    }
}

pub fn matches_binding(event: &KeyEvent, definition: &str) -> bool {
    KeyCombo::parse(definition).is_some_and(|combo| combo.matches(event))
}

/// Maps browser key names onto one spelling; single characters compare
/// case-insensitively.
pub fn normalize_key(key: &str) -> String {
    let standard = match key {
        "Esc" => "Escape",
        "Spacebar" => " ",
        other => other,
    };
    if standard.chars().count() == 1 {
        standard.to_lowercase()
    } else {
        standard.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherKey {
    Open,
    Close,
    Next,
    Prev,
    Confirm { open_all: bool },
}

/// Parsed launcher bindings.
#[derive(Debug, Clone)]
pub struct Keymap {
    open: Option<KeyCombo>,
    close: Option<KeyCombo>,
    next: Option<KeyCombo>,
    prev: Option<KeyCombo>,
    confirm: Option<KeyCombo>,
}

impl Keymap {
    pub fn from_config(keybinds: &Keybinds) -> Self {
        Self {
            open: KeyCombo::parse(&keybinds.quick_launcher_open),
            close: KeyCombo::parse(&keybinds.quick_launcher_close),
            next: KeyCombo::parse(&keybinds.quick_launcher_next),
            prev: KeyCombo::parse(&keybinds.quick_launcher_prev),
            confirm: KeyCombo::parse(&keybinds.quick_launcher_open_in_tab),
        }
    }

    /// Resolves a key press. While the launcher is open only its own keys
    /// apply; while closed only the open binding does, and auto-repeat is
    /// swallowed.
    pub fn action_for(&self, event: &KeyEvent, launcher_open: bool) -> Option<LauncherKey> {
        let hit = |combo: &Option<KeyCombo>| combo.as_ref().is_some_and(|c| c.matches(event));
        if !launcher_open {
            return (hit(&self.open) && !event.repeat).then_some(LauncherKey::Open);
        }
        if hit(&self.close) {
            Some(LauncherKey::Close)
        } else if hit(&self.next) {
            Some(LauncherKey::Next)
        } else if hit(&self.prev) {
            Some(LauncherKey::Prev)
        } else if hit(&self.confirm) {
            Some(LauncherKey::Confirm {
                open_all: event.shift,
            })
        } else {
            None
        }
    }
}
