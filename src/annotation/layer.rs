//! Fat depot layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color_utils::golden_angle_color;

/// One traced fat depot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    /// Epicardial adipose tissue
    #[serde(rename = "EAT")]
    Eat,
    /// Intermuscular adipose tissue
    #[serde(rename = "IMAT")]
    Imat,
    /// Pericardial adipose tissue
    #[serde(rename = "PAAT")]
    Paat,
    /// Paracardial adipose tissue
    #[serde(rename = "PAT")]
    Pat,
    /// Subcutaneous adipose tissue
    #[serde(rename = "SCAT")]
    Scat,
    /// Visceral adipose tissue
    #[serde(rename = "VAT")]
    Vat,
}

impl Layer {
    /// Every layer, in storage order.
    pub const ALL: [Layer; 6] = [
        Layer::Eat,
        Layer::Imat,
        Layer::Paat,
        Layer::Pat,
        Layer::Scat,
        Layer::Vat,
    ];

    /// Position in `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Layer at `index` in `ALL`.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Short upper-case name, as used in file names.
    pub fn name(self) -> &'static str {
        match self {
            Layer::Eat => "EAT",
            Layer::Imat => "IMAT",
            Layer::Paat => "PAAT",
            Layer::Pat => "PAT",
            Layer::Scat => "SCAT",
            Layer::Vat => "VAT",
        }
    }

    /// Name of the points file (`EAT.txt`).
    pub fn file_name(self) -> String {
        format!("{}.txt", self.name())
    }

    /// Overlay colour.
    pub fn color(self) -> [u8; 3] {
        golden_angle_color(self.index())
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|layer| layer.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown layer '{}'", s))
    }
}
