use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(pub String);

/// Chemical elements from hydrogen through bismuth.
///
/// Discriminants are atomic numbers. Masses are IUPAC standard atomic weights in g/mol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Sc,
    Ti,
    V,
    Cr,
    Mn,
    Fe,
    Co,
    Ni,
    Cu,
    Zn,
    Ga,
    Ge,
    As,
    Se,
    Br,
    Kr,
    Rb,
    Sr,
    Y,
    Zr,
    Nb,
    Mo,
    Tc,
    Ru,
    Rh,
    Pd,
    Ag,
    Cd,
    In,
    Sn,
    Sb,
    Te,
    I,
    Xe,
    Cs,
    Ba,
    La,
    Ce,
    Pr,
    Nd,
    Pm,
    Sm,
    Eu,
    Gd,
    Tb,
    Dy,
    Ho,
    Er,
    Tm,
    Yb,
    Lu,
    Hf,
    Ta,
    W,
    Re,
    Os,
    Ir,
    Pt,
    Au,
    Hg,
    Tl,
    Pb,
    Bi,
}

static SYMBOLS: Map<&'static str, Element> = phf_map! {
    "h" => Element::H,
    "he" => Element::He,
    "li" => Element::Li,
    "be" => Element::Be,
    "b" => Element::B,
    "c" => Element::C,
    "n" => Element::N,
    "o" => Element::O,
    "f" => Element::F,
    "ne" => Element::Ne,
    "na" => Element::Na,
    "mg" => Element::Mg,
    "al" => Element::Al,
    "si" => Element::Si,
    "p" => Element::P,
    "s" => Element::S,
    "cl" => Element::Cl,
    "ar" => Element::Ar,
    "k" => Element::K,
    "ca" => Element::Ca,
    "sc" => Element::Sc,
    "ti" => Element::Ti,
    "v" => Element::V,
    "cr" => Element::Cr,
    "mn" => Element::Mn,
    "fe" => Element::Fe,
    "co" => Element::Co,
    "ni" => Element::Ni,
    "cu" => Element::Cu,
    "zn" => Element::Zn,
    "ga" => Element::Ga,
    "ge" => Element::Ge,
    "as" => Element::As,
    "se" => Element::Se,
    "br" => Element::Br,
    "kr" => Element::Kr,
    "rb" => Element::Rb,
    "sr" => Element::Sr,
    "y" => Element::Y,
    "zr" => Element::Zr,
    "nb" => Element::Nb,
    "mo" => Element::Mo,
    "tc" => Element::Tc,
    "ru" => Element::Ru,
    "rh" => Element::Rh,
    "pd" => Element::Pd,
    "ag" => Element::Ag,
    "cd" => Element::Cd,
    "in" => Element::In,
    "sn" => Element::Sn,
    "sb" => Element::Sb,
    "te" => Element::Te,
    "i" => Element::I,
    "xe" => Element::Xe,
    "cs" => Element::Cs,
    "ba" => Element::Ba,
    "la" => Element::La,
    "ce" => Element::Ce,
    "pr" => Element::Pr,
    "nd" => Element::Nd,
    "pm" => Element::Pm,
    "sm" => Element::Sm,
    "eu" => Element::Eu,
    "gd" => Element::Gd,
    "tb" => Element::Tb,
    "dy" => Element::Dy,
    "ho" => Element::Ho,
    "er" => Element::Er,
    "tm" => Element::Tm,
    "yb" => Element::Yb,
    "lu" => Element::Lu,
    "hf" => Element::Hf,
    "ta" => Element::Ta,
    "w" => Element::W,
    "re" => Element::Re,
    "os" => Element::Os,
    "ir" => Element::Ir,
    "pt" => Element::Pt,
    "au" => Element::Au,
    "hg" => Element::Hg,
    "tl" => Element::Tl,
    "pb" => Element::Pb,
    "bi" => Element::Bi,
};

impl Element {
    pub fn atomic_mass(&self) -> f64 {
        match self {
            Element::H => 1.008,
            Element::He => 4.002602,
            Element::Li => 6.94,
            Element::Be => 9.0121831,
            Element::B => 10.81,
            Element::C => 12.011,
            Element::N => 14.007,
            Element::O => 15.999,
            Element::F => 18.998403163,
            Element::Ne => 20.1797,
            Element::Na => 22.98976928,
            Element::Mg => 24.305,
            Element::Al => 26.9815385,
            Element::Si => 28.085,
            Element::P => 30.973761998,
            Element::S => 32.06,
            Element::Cl => 35.45,
            Element::Ar => 39.948,
            Element::K => 39.0983,
            Element::Ca => 40.078,
            Element::Sc => 44.955908,
            Element::Ti => 47.867,
            Element::V => 50.9415,
            Element::Cr => 51.9961,
            Element::Mn => 54.938044,
            Element::Fe => 55.845,
            Element::Co => 58.933194,
            Element::Ni => 58.6934,
            Element::Cu => 63.546,
            Element::Zn => 65.38,
            Element::Ga => 69.723,
            Element::Ge => 72.63,
            Element::As => 74.921595,
            Element::Se => 78.971,
            Element::Br => 79.904,
            Element::Kr => 83.798,
            Element::Rb => 85.4678,
            Element::Sr => 87.62,
            Element::Y => 88.90584,
            Element::Zr => 91.224,
            Element::Nb => 92.90637,
            Element::Mo => 95.95,
            Element::Tc => 97.90721,
            Element::Ru => 101.07,
            Element::Rh => 102.9055,
            Element::Pd => 106.42,
            Element::Ag => 107.8682,
            Element::Cd => 112.414,
            Element::In => 114.818,
            Element::Sn => 118.71,
            Element::Sb => 121.76,
            Element::Te => 127.6,
            Element::I => 126.90447,
            Element::Xe => 131.293,
            Element::Cs => 132.90545196,
            Element::Ba => 137.327,
            Element::La => 138.90547,
            Element::Ce => 140.116,
            Element::Pr => 140.90766,
            Element::Nd => 144.242,
            Element::Pm => 144.91276,
            Element::Sm => 150.36,
            Element::Eu => 151.964,
            Element::Gd => 157.25,
            Element::Tb => 158.92535,
            Element::Dy => 162.5,
            Element::Ho => 164.93033,
            Element::Er => 167.259,
            Element::Tm => 168.93422,
            Element::Yb => 173.045,
            Element::Lu => 174.9668,
            Element::Hf => 178.49,
            Element::Ta => 180.94788,
            Element::W => 183.84,
            Element::Re => 186.207,
            Element::Os => 190.23,
            Element::Ir => 192.217,
            Element::Pt => 195.084,
            Element::Au => 196.966569,
            Element::Hg => 200.592,
            Element::Tl => 204.38,
            Element::Pb => 207.2,
            Element::Bi => 208.9804,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::He => "He",
            Element::Li => "Li",
            Element::Be => "Be",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Ne => "Ne",
            Element::Na => "Na",
            Element::Mg => "Mg",
            Element::Al => "Al",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Ar => "Ar",
            Element::K => "K",
            Element::Ca => "Ca",
            Element::Sc => "Sc",
            Element::Ti => "Ti",
            Element::V => "V",
            Element::Cr => "Cr",
            Element::Mn => "Mn",
            Element::Fe => "Fe",
            Element::Co => "Co",
            Element::Ni => "Ni",
            Element::Cu => "Cu",
            Element::Zn => "Zn",
            Element::Ga => "Ga",
            Element::Ge => "Ge",
            Element::As => "As",
            Element::Se => "Se",
            Element::Br => "Br",
            Element::Kr => "Kr",
            Element::Rb => "Rb",
            Element::Sr => "Sr",
            Element::Y => "Y",
            Element::Zr => "Zr",
            Element::Nb => "Nb",
            Element::Mo => "Mo",
            Element::Tc => "Tc",
            Element::Ru => "Ru",
            Element::Rh => "Rh",
            Element::Pd => "Pd",
            Element::Ag => "Ag",
            Element::Cd => "Cd",
            Element::In => "In",
            Element::Sn => "Sn",
            Element::Sb => "Sb",
            Element::Te => "Te",
            Element::I => "I",
            Element::Xe => "Xe",
            Element::Cs => "Cs",
            Element::Ba => "Ba",
            Element::La => "La",
            Element::Ce => "Ce",
            Element::Pr => "Pr",
            Element::Nd => "Nd",
            Element::Pm => "Pm",
            Element::Sm => "Sm",
            Element::Eu => "Eu",
            Element::Gd => "Gd",
            Element::Tb => "Tb",
            Element::Dy => "Dy",
            Element::Ho => "Ho",
            Element::Er => "Er",
            Element::Tm => "Tm",
            Element::Yb => "Yb",
            Element::Lu => "Lu",
            Element::Hf => "Hf",
            Element::Ta => "Ta",
            Element::W => "W",
            Element::Re => "Re",
            Element::Os => "Os",
            Element::Ir => "Ir",
            Element::Pt => "Pt",
            Element::Au => "Au",
            Element::Hg => "Hg",
            Element::Tl => "Tl",
            Element::Pb => "Pb",
            Element::Bi => "Bi",
        }
    }

    /// Resolves an atom label as written in structure files.
    ///
    /// Labels are matched case-insensitively on their leading letters, so `CL`, `cl`
    /// and `Cl2` all resolve to chlorine. When the two-letter prefix is not an element
    /// (force-field style names such as `OW` or `HW1`), the first letter alone is tried.
    pub fn from_label(label: &str) -> Result<Self, ParseElementError> {
        let letters: String = label
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .take(2)
            .collect::<String>()
            .to_ascii_lowercase();

        if letters.is_empty() {
            return Err(ParseElementError(label.to_string()));
        }
        if let Some(element) = SYMBOLS.get(letters.as_str()) {
            return Ok(*element);
        }
        letters
            .get(..1)
            .and_then(|first| SYMBOLS.get(first))
            .copied()
            .ok_or_else(|| ParseElementError(label.to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    /// Parses an exact element symbol (`"Cl"`, not `"CL"` or `"Cl1"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SYMBOLS
            .get(s.to_ascii_lowercase().as_str())
            .copied()
            .filter(|element| element.symbol() == s)
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}
