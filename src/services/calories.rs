use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;

use crate::models::CalorieValue::{self, Known, Unknown};

/// Static lookup table mapping detector class labels to kcal per 100g.
///
/// Loaded once at startup and read-only afterwards; shared across requests
/// behind an `Arc` with no locking. Labels must match the detector
/// vocabulary byte for byte.
pub struct CalorieTable {
    entries: HashMap<String, CalorieValue>,
}

impl CalorieTable {
    /// Built-in table covering the detector's 100-food vocabulary.
    /// `Unknown` marks foods with no reliable per-100g figure.
    pub fn builtin() -> Self {
        let entries = BUILTIN_TABLE
            .iter()
            .map(|(label, kcal)| (label.to_string(), *kcal))
            .collect();
        Self { entries }
    }

    /// Load a replacement table from a JSON object of label -> kcal number
    /// or marker string. Extending supported foods is a data change only.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let entries: HashMap<String, CalorieValue> = serde_json::from_str(raw)?;
        if entries.is_empty() {
            anyhow::bail!("calorie table is empty");
        }
        Ok(Self { entries })
    }

    /// A label missing from the table is a normal outcome, not an error.
    pub fn lookup(&self, label: &str) -> CalorieValue {
        self.entries.get(label).copied().unwrap_or(Unknown)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

const BUILTIN_TABLE: &[(&str, CalorieValue)] = &[
    ("rice", Known(130)),
    ("eels on rice", Unknown),
    ("pilaf", Known(125)),
    ("chicken-'n'-egg on rice", Unknown),
    ("pork cutlet on rice", Unknown),
    ("beef curry", Known(184)),
    ("sushi", Known(143)),
    ("chicken rice", Unknown),
    ("fried rice", Known(180)),
    ("tempura bowl", Unknown),
    ("bibimbap", Known(79)),
    ("toast", Known(265)),
    ("croissant", Unknown),
    ("roll bread", Unknown),
    ("raisin bread", Known(280)),
    ("chip butty", Unknown),
    ("hamburger", Known(250)),
    ("pizza", Known(268)),
    ("sandwiches", Known(220)),
    ("udon noodle", Known(130)),
    ("tempura udon", Unknown),
    ("soba noodle", Known(110)),
    ("ramen noodle", Known(440)),
    ("beef noodle", Known(200)),
    ("tensin noodle", Unknown),
    ("fried noodle", Known(350)),
    ("spaghetti", Known(160)),
    ("Japanese-style pancake", Known(110)),
    ("takoyaki", Known(150)),
    ("gratin", Known(180)),
    ("sauteed vegetables", Known(50)),
    ("croquette", Known(200)),
    ("grilled eggplant", Known(60)),
    ("sauteed spinach", Known(40)),
    ("vegetable tempura", Known(180)),
    ("miso soup", Known(50)),
    ("potage", Known(60)),
    ("sausage", Known(300)),
    ("oden", Known(70)),
    ("omelet", Known(150)),
    ("ganmodoki", Known(140)),
    ("jiaozi", Known(180)),
    ("stew", Known(120)),
    ("teriyaki grilled fish", Known(200)),
    ("fried fish", Known(220)),
    ("grilled salmon", Known(208)),
    ("salmon meuniere", Known(210)),
    ("sashimi", Known(143)),
    ("grilled pacific saury", Known(180)),
    ("sukiyaki", Known(130)),
    ("sweet and sour pork", Known(180)),
    ("lightly roasted fish", Known(140)),
    ("steamed egg hotchpotch", Known(90)),
    ("tempura", Known(300)),
    ("fried chicken", Known(297)),
    ("sirloin cutlet", Known(250)),
    ("nanbanzuke", Known(180)),
    ("boiled fish", Known(120)),
    ("seasoned beef with potatoes", Known(190)),
    ("hambarg steak", Known(280)),
    ("beef steak", Known(250)),
    ("dried fish", Known(350)),
    ("ginger pork saute", Known(200)),
    ("spicy chili-flavored tofu", Known(150)),
    ("yakitori", Known(180)),
    ("cabbage roll", Known(120)),
    ("rolled omelet", Known(150)),
    ("egg sunny‑side up", Known(155)),
    ("fermented soybeans", Known(200)),
    ("cold tofu", Known(70)),
    ("egg roll", Known(180)),
    ("chilled noodle", Known(120)),
    ("stir‑fried beef and peppers", Known(200)),
    ("simmered pork", Known(180)),
    ("boiled chicken and vegetables", Known(150)),
    ("sashimi bowl", Known(140)),
    ("sushi bowl", Known(150)),
    ("fish‑shaped pancake with bean jam", Known(220)),
    ("shrimp with chill source", Known(160)),
    ("roast chicken", Known(200)),
    ("steamed meat dumpling", Known(180)),
    ("omelet with fried rice", Known(220)),
    ("cutlet curry", Known(230)),
    ("spaghetti meat sauce", Known(200)),
    ("fried shrimp", Known(240)),
    ("potato salad", Known(200)),
    ("green salad", Known(40)),
    ("macaroni salad", Known(150)),
    ("Japanese tofu and vegetable chowder", Known(100)),
    ("pork miso soup", Known(80)),
    ("chinese soup", Known(90)),
    ("beef bowl", Known(180)),
    ("kinpira‑style sauteed burdock", Known(80)),
    ("rice ball", Known(170)),
    ("pizza toast", Known(260)),
    ("dipping noodles", Known(140)),
    ("hot dog", Known(280)),
    ("french fries", Known(312)),
    ("mixed rice", Known(160)),
    ("goya chanpuru", Known(200)),
];
