//! Textual cell encoding: an optional base character followed by gimmick keys.
//!
//! `.` marks Mass, `#` marks Rock, an empty string (or a leading `0`) marks
//! nothing. Every character after the base is one single-character key.

use serde::{Deserialize, Serialize};

pub const MASS_CHAR: char = '.';
pub const ROCK_CHAR: char = '#';
pub const NONE_CHAR: char = '0';
pub const EMPTY_CELL: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellBase {
    Mass,
    Rock,
}

impl CellBase {
    pub const fn as_char(self) -> char {
        match self {
            CellBase::Mass => MASS_CHAR,
            CellBase::Rock => ROCK_CHAR,
        }
    }

    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            MASS_CHAR => Some(CellBase::Mass),
            ROCK_CHAR => Some(CellBase::Rock),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCell {
    pub base: Option<CellBase>,
    /// Gimmick keys in first-seen order, duplicates dropped.
    pub keys: Vec<char>,
}

impl ParsedCell {
    pub fn has_key(&self, key: char) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_mass(&self) -> bool {
        self.base == Some(CellBase::Mass)
    }

    pub fn is_rock(&self) -> bool {
        self.base == Some(CellBase::Rock)
    }

    pub fn encode(&self) -> String {
        encode(self.base, &self.keys)
    }
}

/// Never fails: unknown leading characters are treated as keys on a
/// base-less cell.
pub fn parse(cell: &str) -> ParsedCell {
    let mut chars = cell.chars().peekable();
    let base = match chars.peek().copied() {
        Some(NONE_CHAR) => {
            chars.next();
            None
        }
        Some(c) => {
            let base = CellBase::from_char(c);
            if base.is_some() {
                chars.next();
            }
            base
        }
        None => None,
    };

    let mut keys = Vec::new();
    for c in chars {
        if !keys.contains(&c) {
            keys.push(c);
        }
    }
    ParsedCell { base, keys }
}

pub fn encode(base: Option<CellBase>, keys: &[char]) -> String {
    let mut out = String::with_capacity(keys.len() + 1);
    if let Some(base) = base {
        out.push(base.as_char());
    }
    for &k in keys {
        if !out.chars().skip(base.is_some() as usize).any(|c| c == k) {
            out.push(k);
        }
    }
    out
}

pub fn base_of(cell: &str) -> Option<CellBase> {
    cell.chars().next().and_then(CellBase::from_char)
}

pub fn is_mass(cell: &str) -> bool {
    base_of(cell) == Some(CellBase::Mass)
}

pub fn is_rock(cell: &str) -> bool {
    base_of(cell) == Some(CellBase::Rock)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_zero_have_no_base_and_no_keys() {
        assert_eq!(parse(""), ParsedCell::default());
        assert_eq!(parse("0"), ParsedCell::default());
    }

    #[test]
    fn base_then_keys() {
        let cell = parse("#SH");
        assert_eq!(cell.base, Some(CellBase::Rock));
        assert_eq!(cell.keys, vec!['S', 'H']);
        assert!(cell.has_key('H'));
        assert!(!cell.has_key('C'));

        let mass = parse(".C");
        assert!(mass.is_mass());
        assert_eq!(mass.keys, vec!['C']);
    }

    #[test]
    fn malformed_cells_become_baseless_keys() {
        let cell = parse("S#");
        assert_eq!(cell.base, None);
        assert_eq!(cell.keys, vec!['S', '#']);

        let zero_prefixed = parse("0S");
        assert_eq!(zero_prefixed.base, None);
        assert_eq!(zero_prefixed.keys, vec!['S']);
    }

    #[test]
    fn duplicate_keys_are_ignored() {
        assert_eq!(parse(".SSH").keys, vec!['S', 'H']);
        assert_eq!(encode(Some(CellBase::Mass), &['S', 'S']), ".S");
    }

    #[test]
    fn encode_matches_source_for_canonical_cells() {
        for src in ["", ".", "#", ".S", "#SH"] {
            assert_eq!(parse(src).encode(), src);
        }
    }

    #[test]
    fn quick_predicates_look_only_at_first_char() {
        assert!(is_rock("#S"));
        assert!(!is_rock("S#"));
        assert!(is_mass("."));
        assert!(!is_mass(""));
        assert_eq!(base_of("0"), None);
    }
}
