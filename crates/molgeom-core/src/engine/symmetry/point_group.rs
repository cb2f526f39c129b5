use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Schoenflies point-group labels.
///
/// Finite axial families carry the order of the principal axis; `Cinfv` and
/// `Dinfh` label linear molecules and `Kh` the full rotation group of a
/// single atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointGroup {
    C1,
    Cs,
    Ci,
    Cn(u32),
    Cnv(u32),
    Cnh(u32),
    Dn(u32),
    Dnh(u32),
    Dnd(u32),
    Sn(u32),
    T,
    Td,
    Th,
    O,
    Oh,
    I,
    Ih,
    Cinfv,
    Dinfh,
    Kh,
}

impl PointGroup {
    /// Returns whether the group contains any operation besides the identity.
    pub fn is_nontrivial(&self) -> bool {
        *self != PointGroup::C1
    }
}

impl fmt::Display for PointGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::C1 => write!(f, "C1"),
            Self::Cs => write!(f, "Cs"),
            Self::Ci => write!(f, "Ci"),
            Self::Cn(n) => write!(f, "C{n}"),
            Self::Cnv(n) => write!(f, "C{n}v"),
            Self::Cnh(n) => write!(f, "C{n}h"),
            Self::Dn(n) => write!(f, "D{n}"),
            Self::Dnh(n) => write!(f, "D{n}h"),
            Self::Dnd(n) => write!(f, "D{n}d"),
            Self::Sn(n) => write!(f, "S{n}"),
            Self::T => write!(f, "T"),
            Self::Td => write!(f, "Td"),
            Self::Th => write!(f, "Th"),
            Self::O => write!(f, "O"),
            Self::Oh => write!(f, "Oh"),
            Self::I => write!(f, "I"),
            Self::Ih => write!(f, "Ih"),
            Self::Cinfv => write!(f, "C*v"),
            Self::Dinfh => write!(f, "D*h"),
            Self::Kh => write!(f, "Kh"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid Schoenflies symbol: '{0}'")]
pub struct ParsePointGroupError(String);

impl FromStr for PointGroup {
    type Err = ParsePointGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbol = s.trim();
        match symbol {
            "C1" => return Ok(Self::C1),
            "Cs" => return Ok(Self::Cs),
            "Ci" => return Ok(Self::Ci),
            "T" => return Ok(Self::T),
            "Td" => return Ok(Self::Td),
            "Th" => return Ok(Self::Th),
            "O" => return Ok(Self::O),
            "Oh" => return Ok(Self::Oh),
            "I" => return Ok(Self::I),
            "Ih" => return Ok(Self::Ih),
            "C*v" | "Cinfv" => return Ok(Self::Cinfv),
            "D*h" | "Dinfh" => return Ok(Self::Dinfh),
            "Kh" => return Ok(Self::Kh),
            _ => {}
        }

        let err = || ParsePointGroupError(symbol.to_string());
        let family = symbol.chars().next().ok_or_else(err)?;
        let rest = &symbol[family.len_utf8()..];
        let (digits, suffix) = match rest.find(|c: char| !c.is_ascii_digit()) {
            Some(split) => rest.split_at(split),
            None => (rest, ""),
        };
        let n: u32 = digits.parse().map_err(|_| err())?;
        if n < 2 {
            return Err(err());
        }
        match (family, suffix) {
            ('C', "") => Ok(Self::Cn(n)),
            ('C', "v") => Ok(Self::Cnv(n)),
            ('C', "h") => Ok(Self::Cnh(n)),
            ('D', "") => Ok(Self::Dn(n)),
            ('D', "h") => Ok(Self::Dnh(n)),
            ('D', "d") => Ok(Self::Dnd(n)),
            ('S', "") => Ok(Self::Sn(n)),
            _ => Err(err()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_schoenflies_symbols() {
        assert_eq!(PointGroup::C1.to_string(), "C1");
        assert_eq!(PointGroup::Cnv(2).to_string(), "C2v");
        assert_eq!(PointGroup::Dnh(6).to_string(), "D6h");
        assert_eq!(PointGroup::Sn(4).to_string(), "S4");
        assert_eq!(PointGroup::Dinfh.to_string(), "D*h");
    }

    #[test]
    fn from_str_round_trips_the_axial_families() {
        for group in [
            PointGroup::Cn(3),
            PointGroup::Cnv(2),
            PointGroup::Cnh(4),
            PointGroup::Dn(5),
            PointGroup::Dnh(6),
            PointGroup::Dnd(2),
            PointGroup::Sn(4),
        ] {
            assert_eq!(group.to_string().parse::<PointGroup>(), Ok(group));
        }
    }

    #[test]
    fn from_str_parses_special_groups() {
        assert_eq!("Td".parse(), Ok(PointGroup::Td));
        assert_eq!("Kh".parse(), Ok(PointGroup::Kh));
        assert_eq!("C*v".parse(), Ok(PointGroup::Cinfv));
        assert_eq!("Cinfv".parse(), Ok(PointGroup::Cinfv));
    }

    #[test]
    fn from_str_rejects_malformed_symbols() {
        assert!("C0".parse::<PointGroup>().is_err());
        assert!("C1v".parse::<PointGroup>().is_err());
        assert!("Q3".parse::<PointGroup>().is_err());
        assert!("D2x".parse::<PointGroup>().is_err());
        assert!("".parse::<PointGroup>().is_err());
    }

    #[test]
    fn from_str_rejects_multibyte_symbols_without_panicking() {
        assert!("Ω3".parse::<PointGroup>().is_err());
        assert!("Ćs".parse::<PointGroup>().is_err());
        assert!("∞".parse::<PointGroup>().is_err());
    }

    #[test]
    fn only_c1_is_trivial() {
        assert!(!PointGroup::C1.is_nontrivial());
        assert!(PointGroup::Cs.is_nontrivial());
        assert!(PointGroup::Ih.is_nontrivial());
    }
}
