//! Constraint strengths.
//!
//! Strengths form a fixed total order used to decide which constraint gets to
//! determine a shared variable. `Required` constraints can never be overridden;
//! `Weakest` is the background level every variable starts at.

use std::fmt;
use std::str::FromStr;

/// Priority level of a constraint, strongest first.
///
/// The discriminant is the level's rank: a lower value is a stronger level.
///
/// # Example
///
/// ```
/// use deltablue_core::Strength;
///
/// assert!(Strength::stronger(Strength::Required, Strength::Preferred));
/// assert!(Strength::weaker(Strength::Normal, Strength::StrongDefault));
/// assert_eq!(Strength::weakest(Strength::Normal, Strength::Preferred), Strength::Normal);
/// assert_eq!(Strength::Preferred.next_weaker(), Strength::StrongDefault);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Strength {
    /// Must be satisfied; never overridden.
    Required = 0,
    StrongPreferred = 1,
    Preferred = 2,
    StrongDefault = 3,
    Normal = 4,
    WeakDefault = 5,
    /// Background level of undetermined variables.
    Weakest = 6,
}

impl Strength {
    /// All levels, strongest first.
    pub const ALL: [Strength; 7] = [
        Strength::Required,
        Strength::StrongPreferred,
        Strength::Preferred,
        Strength::StrongDefault,
        Strength::Normal,
        Strength::WeakDefault,
        Strength::Weakest,
    ];

    /// Returns the rank of this level (0 is strongest).
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Returns the snake_case name of this level.
    pub fn name(self) -> &'static str {
        match self {
            Strength::Required => "required",
            Strength::StrongPreferred => "strong_preferred",
            Strength::Preferred => "preferred",
            Strength::StrongDefault => "strong_default",
            Strength::Normal => "normal",
            Strength::WeakDefault => "weak_default",
            Strength::Weakest => "weakest",
        }
    }

    /// Returns true if `a` is strictly stronger than `b`.
    #[inline]
    pub fn stronger(a: Strength, b: Strength) -> bool {
        a.rank() < b.rank()
    }

    /// Returns true if `a` is strictly weaker than `b`.
    #[inline]
    pub fn weaker(a: Strength, b: Strength) -> bool {
        a.rank() > b.rank()
    }

    /// Returns the weaker of the two levels (`b` when they are equal).
    #[inline]
    pub fn weakest(a: Strength, b: Strength) -> Strength {
        if Strength::weaker(a, b) {
            a
        } else {
            b
        }
    }

    /// Returns the next lower-priority level.
    ///
    /// # Panics
    ///
    /// Panics when called on [`Strength::Weakest`]; there is nothing weaker.
    pub fn next_weaker(self) -> Strength {
        match self.try_next_weaker() {
            Some(next) => next,
            None => panic!("no strength is weaker than {}", self),
        }
    }

    /// Returns the next lower-priority level, or `None` at `Weakest`.
    pub fn try_next_weaker(self) -> Option<Strength> {
        Strength::ALL.get(self.rank() as usize + 1).copied()
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error when parsing a strength from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrengthParseError {
    pub input: String,
}

impl fmt::Display for StrengthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown strength: {:?}", self.input)
    }
}

impl std::error::Error for StrengthParseError {}

impl FromStr for Strength {
    type Err = StrengthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strength::ALL
            .into_iter()
            .find(|level| level.name() == s)
            .ok_or_else(|| StrengthParseError {
                input: s.to_string(),
            })
    }
}
