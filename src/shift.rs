//! Signed clock correction applied to every selected image.

use chrono::TimeDelta;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::errors::ShiftError;

/// A literal hours/minutes delta. No timezone rules are involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Shift {
    minutes: i64,
}

impl Shift {
    pub const ZERO: Shift = Shift { minutes: 0 };

    /// Build from unsigned hours/minutes plus a direction.
    pub fn from_hm(negative: bool, hours: u32, minutes: u32) -> Self {
        let total = i64::from(hours) * 60 + i64::from(minutes);
        Self {
            minutes: if negative { -total } else { total },
        }
    }

    /// Parse `[+|-]HH:MM`. A missing sign means positive.
    pub fn parse(s: &str) -> Result<Self, ShiftError> {
        let trimmed = s.trim();
        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (h, m) = body
            .split_once(':')
            .ok_or_else(|| ShiftError::Format(s.to_string()))?;
        let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(h) || !all_digits(m) {
            return Err(ShiftError::Format(s.to_string()));
        }
        let hours: u32 = h.parse().map_err(|_| ShiftError::Format(s.to_string()))?;
        let minutes: u32 = m.parse().map_err(|_| ShiftError::Format(s.to_string()))?;
        if minutes >= 60 {
            return Err(ShiftError::Minutes(s.to_string()));
        }
        Ok(Self::from_hm(negative, hours, minutes))
    }

    /// Flip the direction (`--negative`).
    pub fn negated(self) -> Self {
        Self {
            minutes: -self.minutes,
        }
    }

    /// Negate when `flip` is set; identity otherwise.
    pub fn with_sign_flip(self, flip: bool) -> Self {
        if flip { self.negated() } else { self }
    }

    /// `None` when the minute count does not fit a `TimeDelta`.
    pub fn delta(self) -> Option<TimeDelta> {
        TimeDelta::try_minutes(self.minutes)
    }

    pub fn minutes(self) -> i64 {
        self.minutes
    }

    pub fn is_positive(self) -> bool {
        self.minutes > 0
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minutes < 0 { '-' } else { '+' };
        let abs = self.minutes.unsigned_abs();
        write!(f, "{}{:02}:{:02}", sign, abs / 60, abs % 60)
    }
}

impl FromStr for Shift {
    type Err = ShiftError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
