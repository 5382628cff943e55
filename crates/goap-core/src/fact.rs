use core::fmt;
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a single world condition, e.g. `logs_in_stockpile`.
///
/// Keys declared in code borrow `&'static str` and never allocate; keys read
/// from configuration own their storage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FactKey(Cow<'static, str>);

impl FactKey {
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for FactKey {
    fn from(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }
}

impl From<String> for FactKey {
    fn from(key: String) -> Self {
        Self(Cow::Owned(key))
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fact value. The model is deliberately closed: world conditions are
/// either flags or counters, and equality is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FactValue {
    Bool(bool),
    Int(i64),
}

impl FactValue {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            FactValue::Bool(value) => Some(value),
            FactValue::Int(_) => None,
        }
    }

    pub fn as_int(self) -> Option<i64> {
        match self {
            FactValue::Bool(_) => None,
            FactValue::Int(value) => Some(value),
        }
    }

    pub fn is_true(self) -> bool {
        matches!(self, FactValue::Bool(true))
    }
}

impl From<bool> for FactValue {
    fn from(value: bool) -> Self {
        FactValue::Bool(value)
    }
}

impl From<i64> for FactValue {
    fn from(value: i64) -> Self {
        FactValue::Int(value)
    }
}

impl From<i32> for FactValue {
    fn from(value: i32) -> Self {
        FactValue::Int(value as i64)
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Bool(value) => write!(f, "{value}"),
            FactValue::Int(value) => write!(f, "{value}"),
        }
    }
}

/// An atomic `(key, value)` statement about the world.
///
/// Equality is structural over both components: `("logs", 4)` and
/// `("logs", 5)` are different facts. Whether two facts with the same key
/// may coexist is decided by the container, not by the fact itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fact {
    key: FactKey,
    value: FactValue,
}

impl Fact {
    pub fn new(key: impl Into<FactKey>, value: impl Into<FactValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &FactKey {
        &self.key
    }

    pub fn value(&self) -> FactValue {
        self.value
    }

    pub fn into_parts(self) -> (FactKey, FactValue) {
        (self.key, self.value)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
