use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QuizError, Result};

/// Disposal category an item belongs in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    strum_macros::Display,
)]
#[serde(try_from = "String", into = "String")]
pub enum BinLabel {
    Yellow,
    Red,
    White,
    Blue,
    Green,
}

impl BinLabel {
    pub const ALL: [BinLabel; 5] = [
        BinLabel::Yellow,
        BinLabel::Red,
        BinLabel::White,
        BinLabel::Blue,
        BinLabel::Green,
    ];

    /// Long form shown to players; white bins are the translucent sharps containers
    pub fn description(&self) -> &'static str {
        match self {
            BinLabel::Yellow => "Yellow",
            BinLabel::Red => "Red",
            BinLabel::White => "White/Translucent",
            BinLabel::Blue => "Blue",
            BinLabel::Green => "Green",
        }
    }
}

impl FromStr for BinLabel {
    type Err = QuizError;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_lowercase();
        let label = match normalized.as_str() {
            "yellow" => BinLabel::Yellow,
            "red" => BinLabel::Red,
            "white" | "translucent" | "white/translucent" | "white (translucent)" => {
                BinLabel::White
            }
            "blue" => BinLabel::Blue,
            "green" => BinLabel::Green,
            _ => return Err(QuizError::UnknownBin(raw.trim().to_string())),
        };
        Ok(label)
    }
}

impl TryFrom<String> for BinLabel {
    type Error = QuizError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<BinLabel> for String {
    fn from(label: BinLabel) -> Self {
        label.to_string()
    }
}

/// One thing the player has to sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    #[serde(rename = "image")]
    pub image_ref: String,
    #[serde(rename = "bin")]
    pub correct_bin: BinLabel,
}

impl CatalogItem {
    pub fn new(name: impl Into<String>, image_ref: impl Into<String>, correct_bin: BinLabel) -> Self {
        Self {
            name: name.into(),
            image_ref: image_ref.into(),
            correct_bin,
        }
    }
}

// Bins stay raw strings here so label errors are reported as such, not as JSON errors
#[derive(Deserialize)]
struct RawItem {
    name: String,
    image: String,
    bin: String,
}

/// Ordered, non-empty list of items a session draws its rounds from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Result<Self> {
        if items.is_empty() {
            return Err(QuizError::EmptyCatalog);
        }
        Ok(Self { items })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<RawItem> =
            serde_json::from_str(json).map_err(|e| QuizError::CatalogUnavailable(e.to_string()))?;
        let items = raw
            .into_iter()
            .map(|r| {
                Ok(CatalogItem {
                    correct_bin: r.bin.parse()?,
                    name: r.name,
                    image_ref: r.image,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(items)
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn get(&self, idx: usize) -> Option<&CatalogItem> {
        self.items.get(idx)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for CatalogItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.correct_bin)
    }
}
