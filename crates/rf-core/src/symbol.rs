//! Wheel symbols, reel outcomes and the numeric outcome key

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Maximum number of reels an outcome key can encode
///
/// One decimal digit per reel; 18 digits always fit in a `u64`.
pub const MAX_REELS: u32 = 18;

/// Drawable wheel symbol
///
/// The discriminant is the digit used by [`OutcomeKey`]. Enumeration order
/// (Bell first, Shoe last) is significant: symbol draws and probability
/// redistribution both walk symbols in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Symbol {
    Bell = 1,
    Cherry = 2,
    Clover = 3,
    Melon = 4,
    Seven = 5,
    Shoe = 6,
}

impl Symbol {
    /// All symbols in enumeration order
    pub const ALL: [Symbol; 6] = [
        Symbol::Bell,
        Symbol::Cherry,
        Symbol::Clover,
        Symbol::Melon,
        Symbol::Seven,
        Symbol::Shoe,
    ];

    /// Number of symbols
    pub const COUNT: usize = Self::ALL.len();

    /// Key digit (1-6)
    #[inline]
    pub fn digit(self) -> u8 {
        self as u8
    }

    /// Position in [`Symbol::ALL`]
    #[inline]
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// Symbol for a key digit
    pub fn from_digit(digit: u8) -> Option<Symbol> {
        match digit {
            1..=6 => Some(Self::ALL[digit as usize - 1]),
            _ => None,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Symbol::Bell => "Bell",
            Symbol::Cherry => "Cherry",
            Symbol::Clover => "Clover",
            Symbol::Melon => "Melon",
            Symbol::Seven => "Seven",
            Symbol::Shoe => "Shoe",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One spin result: a symbol per reel, reel 0 first
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outcome(Vec<Symbol>);

impl Outcome {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    /// Outcome showing the same symbol on every reel
    pub fn uniform(symbol: Symbol, reels: usize) -> Self {
        Self(vec![symbol; reels])
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// Number of reels
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// How many reels show `symbol`
    pub fn count_of(&self, symbol: Symbol) -> u32 {
        self.0.iter().filter(|&&s| s == symbol).count() as u32
    }

    /// Occurrence count per symbol, indexed like [`Symbol::ALL`]
    pub fn symbol_counts(&self) -> [u32; Symbol::COUNT] {
        let mut counts = [0u32; Symbol::COUNT];
        for symbol in &self.0 {
            counts[symbol.index()] += 1;
        }
        counts
    }

    /// Canonical numeric key (reel 0 is the least significant digit)
    pub fn key(&self) -> SlotResult<OutcomeKey> {
        if self.0.is_empty() || self.0.len() > MAX_REELS as usize {
            return Err(SlotError::InvalidArgument(format!(
                "outcome must have 1..={} reels, got {}",
                MAX_REELS,
                self.0.len()
            )));
        }

        let mut multiplier = 1u64;
        let mut key = 0u64;
        for symbol in &self.0 {
            key += multiplier * symbol.digit() as u64;
            multiplier *= 10;
        }
        Ok(OutcomeKey(key))
    }
}

impl From<Vec<Symbol>> for Outcome {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, symbol) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{:<6}", symbol.name())?;
        }
        Ok(())
    }
}

/// Order-sensitive digit encoding of an [`Outcome`]
///
/// The most significant digit is the last reel, so `[Bell, Bell, Cherry]`
/// encodes as `211`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeKey(u64);

impl OutcomeKey {
    /// Wrap a raw key without validating its digits
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    /// Key of `count` copies of `symbol`
    pub fn for_symbol_count(symbol: Symbol, count: u32) -> SlotResult<OutcomeKey> {
        Outcome::uniform(symbol, count as usize).key()
    }

    /// Decode back into reels
    pub fn decode(self) -> SlotResult<Outcome> {
        if self.0 == 0 {
            return Err(SlotError::InvalidOutcomeKey(self.0));
        }

        let mut symbols = Vec::new();
        let mut residual = self.0;
        while residual > 0 {
            let digit = (residual % 10) as u8;
            residual /= 10;
            let symbol = Symbol::from_digit(digit).ok_or(SlotError::InvalidOutcomeKey(self.0))?;
            symbols.push(symbol);
        }
        Ok(Outcome(symbols))
    }
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
