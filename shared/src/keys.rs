//! Two-character key codes.
//!
//! The host maps its native key names to a `(class, key)` pair of ASCII
//! characters, e.g. `"ca"` for the letter A or `"au"` for arrow up. Modules
//! query keys with the same two characters, so the code is the whole contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A two-character key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyCode {
    pub class: u8,
    pub key: u8,
}

impl KeyCode {
    /// Code the host emits for keys missing from its table.
    pub const UNKNOWN: KeyCode = KeyCode::new(b' ', b' ');

    pub const fn new(class: u8, key: u8) -> Self {
        Self { class, key }
    }

    /// Build a code from the two `char` arguments a module passes to
    /// `key_pressed`/`key_down`. Values outside ASCII never match a host code.
    pub fn from_module_args(class: i32, key: i32) -> Option<Self> {
        let class = u8::try_from(class).ok().filter(u8::is_ascii)?;
        let key = u8::try_from(key).ok().filter(u8::is_ascii)?;
        Some(Self::new(class, key))
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class as char, self.key as char)
    }
}

impl From<KeyCode> for String {
    fn from(code: KeyCode) -> Self {
        code.to_string()
    }
}

impl TryFrom<String> for KeyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}

impl std::str::FromStr for KeyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            [class, key] if class.is_ascii() && key.is_ascii() => Ok(Self::new(*class, *key)),
            _ => Err(format!("key code must be two ASCII characters, got {s:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let code: KeyCode = "ca".parse().unwrap();
        assert_eq!(code, KeyCode::new(b'c', b'a'));
        assert_eq!(code.to_string(), "ca");
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!("c".parse::<KeyCode>().is_err());
        assert!("cab".parse::<KeyCode>().is_err());
        assert!("".parse::<KeyCode>().is_err());
    }

    #[test]
    fn test_rejects_non_ascii() {
        assert!("é".parse::<KeyCode>().is_err());
    }

    #[test]
    fn test_from_module_args() {
        assert_eq!(
            KeyCode::from_module_args('a' as i32, 'u' as i32),
            Some(KeyCode::new(b'a', b'u'))
        );
        assert_eq!(KeyCode::from_module_args(-1, 'a' as i32), None);
        assert_eq!(KeyCode::from_module_args(0x1F600, 'a' as i32), None);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&KeyCode::new(b's', b'x')).unwrap();
        assert_eq!(json, "\"sx\"");
        let back: KeyCode = serde_json::from_str("\"  \"").unwrap();
        assert_eq!(back, KeyCode::UNKNOWN);
    }
}
