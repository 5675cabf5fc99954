//! Small-integer recodings of categorical source values.
//!
//! Unknown and unrecognized inputs map to `None` rather than an error; the
//! caller stores them as nulls.

/// Binary outcome label carried through every dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Negative,
    Positive,
}

impl Label {
    /// Recode a raw `YES`/`NO` value. `UNKNOWN` and anything else is `None`.
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim() {
            "YES" => Some(Self::Positive),
            "NO" => Some(Self::Negative),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Negative => 0,
            Self::Positive => 1,
        }
    }
}

/// Recorded gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn from_raw(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Male => 1,
            Self::Female => 2,
        }
    }
}
