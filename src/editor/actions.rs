//! Key input and the semantic actions it maps to.
//!
//! Platform code turns native key events into a `KeyCombo`; the editor maps
//! that to an `EditorAction` and runs it through the handler chain.

/// Key values for keyboard input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(String),

    // === Whitespace / editing ===
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,

    // === Navigation ===
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
}

impl Key {
    /// Create a character key.
    pub fn character(s: impl Into<String>) -> Self {
        Self::Character(s.into())
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Self::ArrowLeft
                | Self::ArrowRight
                | Self::ArrowUp
                | Self::ArrowDown
                | Self::Home
                | Self::End
        )
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    /// Ctrl, Alt or Meta held: the key is a shortcut, not text input.
    pub fn is_command(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// A key combination for triggering an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn shift(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::SHIFT,
        }
    }
}

/// Which way a deletion goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Backspace.
    Backward,
    /// Delete.
    Forward,
}

/// Semantic editing actions, independent of the key that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Insert text at the selection, replacing a non-collapsed one.
    InsertText(String),
    /// Split the current block (Enter).
    EnterHard,
    /// Insert a line break inside the block (Shift+Enter).
    EnterSoft,
    /// Delete one unit, or the selected content.
    Delete { direction: Direction },
    /// The selection moved. Dispatched by the editor after a batch settles.
    SelectionChanged,
}

impl EditorAction {
    /// Map a key combination to an action, if it has one.
    pub fn from_key(combo: &KeyCombo) -> Option<Self> {
        let modifiers = combo.modifiers;
        match &combo.key {
            Key::Enter if modifiers.shift => Some(Self::EnterSoft),
            Key::Enter => Some(Self::EnterHard),
            Key::Backspace => Some(Self::Delete {
                direction: Direction::Backward,
            }),
            Key::Delete => Some(Self::Delete {
                direction: Direction::Forward,
            }),
            Key::Character(text) if !modifiers.is_command() => {
                Some(Self::InsertText(text.clone()))
            }
            _ => None,
        }
    }
}

/// Result of offering an action to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handling {
    /// The handler consumed the action; the chain stops.
    Handled,
    /// Pass the action on to the next handler.
    NotHandled,
}

/// Position of a handler in the chain. Higher runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_mapping() {
        assert_eq!(
            EditorAction::from_key(&KeyCombo::new(Key::Enter)),
            Some(EditorAction::EnterHard)
        );
        assert_eq!(
            EditorAction::from_key(&KeyCombo::shift(Key::Enter)),
            Some(EditorAction::EnterSoft)
        );
    }

    #[test]
    fn test_delete_mapping() {
        assert_eq!(
            EditorAction::from_key(&KeyCombo::new(Key::Backspace)),
            Some(EditorAction::Delete {
                direction: Direction::Backward
            })
        );
        assert_eq!(
            EditorAction::from_key(&KeyCombo::new(Key::Delete)),
            Some(EditorAction::Delete {
                direction: Direction::Forward
            })
        );
    }

    #[test]
    fn test_characters_and_shortcuts() {
        assert_eq!(
            EditorAction::from_key(&KeyCombo::shift(Key::character("A"))),
            Some(EditorAction::InsertText("A".into()))
        );
        assert_eq!(
            EditorAction::from_key(&KeyCombo::with_modifiers(
                Key::character("b"),
                Modifiers::CTRL
            )),
            None
        );
        assert!(Key::ArrowLeft.is_navigation());
        assert_eq!(EditorAction::from_key(&KeyCombo::new(Key::ArrowLeft)), None);
    }

    #[test]
    fn test_priority_order() {
        assert!(Priority::High > Priority::Normal);
        assert!(Priority::Normal > Priority::Low);
    }
}
