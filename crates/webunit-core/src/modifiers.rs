//! Assertion modifiers.
//!
//! A [`Modifiers`] value is a small bit set over `NOT`, `CASE_INSENSITIVE`
//! and `REGEXP`. In test files each flag is written as a trailing token:
//!
//! | Flag               | Token |
//! |--------------------|-------|
//! | `NOT`              | `!`   |
//! | `CASE_INSENSITIVE` | `~`   |
//! | `REGEXP`           | `/`   |

use std::fmt;
use std::ops::BitOr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u8);

const FLAGS: [(Modifiers, &str, &str); 3] = [
    (Modifiers::NOT, "!", "not"),
    (Modifiers::CASE_INSENSITIVE, "~", "case insensitive"),
    (Modifiers::REGEXP, "/", "regexp"),
];

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const NOT: Self = Self(0b001);
    pub const CASE_INSENSITIVE: Self = Self(0b010);
    pub const REGEXP: Self = Self(0b100);
    pub const ALL: Self = Self(0b111);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn combined_with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the flags of `self` that are not set in `other`.
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// True iff every flag of `other` is also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_not(self) -> bool {
        self.contains(Self::NOT)
    }

    pub const fn is_case_insensitive(self) -> bool {
        self.contains(Self::CASE_INSENSITIVE)
    }

    pub const fn is_regexp(self) -> bool {
        self.contains(Self::REGEXP)
    }

    /// Maps a single modifier token (`!`, `~`, `/`) to its flag.
    pub fn from_token(token: &str) -> Option<Self> {
        FLAGS
            .iter()
            .find(|(_, t, _)| *t == token)
            .map(|(flag, _, _)| *flag)
    }

    /// Lists every set flag by name, `NOT` included.
    pub fn describe(self) -> String {
        self.names(true).join(", ")
    }

    /// The rendering appended to assertion failure messages, e.g.
    /// `" (case insensitive, regexp)"`, or an empty string.
    pub fn suffix(self) -> String {
        let names = self.names(false);
        if names.is_empty() {
            String::new()
        } else {
            format!(" ({})", names.join(", "))
        }
    }

    fn names(self, with_not: bool) -> Vec<&'static str> {
        FLAGS
            .iter()
            .filter(|(flag, _, _)| (with_not || *flag != Self::NOT) && self.contains(*flag))
            .map(|(_, _, name)| *name)
            .collect()
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.combined_with(rhs)
    }
}

/// Canonical text: the set flags in the order case insensitive, regexp.
/// `NOT` changes the wording of a message and is never rendered here.
impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names(false).join(", "))
    }
}
