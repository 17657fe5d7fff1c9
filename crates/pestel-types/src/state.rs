//! The shared two-level world state: category, then factor, then value.
//!
//! A [`StructuredState`] always holds all six categories. Reading a factor
//! that was never written is not an error: it yields
//! [`FactorValue::Undefined`], which displays as `"Not defined"`.
//!
//! The same type serves as the global state and as every agent's private
//! local state. Values are owned; copying between states is always an
//! explicit clone.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::Category;

/// Text shown for a factor that has never been written.
pub const NOT_DEFINED: &str = "Not defined";

/// A single factor value: free-form text or a scalar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactorValue {
    /// The factor has never been written.
    #[default]
    Undefined,
    /// Numeric indicator (e.g. `world_peace_index = 0.7`).
    Number(f64),
    /// Descriptive text (e.g. `"GDP growth 3.1% annually"`).
    Text(String),
}

impl FactorValue {
    /// Build a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Return the scalar value, parsing text that holds a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(t) => t.trim().parse().ok(),
            Self::Undefined => None,
        }
    }

    /// Return `true` if the value has been written.
    pub const fn is_defined(&self) -> bool {
        !matches!(self, Self::Undefined)
    }

    /// Case-sensitive substring test against the displayed value.
    pub fn contains(&self, needle: &str) -> bool {
        match self {
            Self::Text(t) => t.contains(needle),
            Self::Number(_) | Self::Undefined => self.to_string().contains(needle),
        }
    }
}

impl core::fmt::Display for FactorValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Undefined => f.write_str(NOT_DEFINED),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(t) => f.write_str(t),
        }
    }
}

impl From<&str> for FactorValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FactorValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FactorValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Outcome of a conditional write via [`StructuredState::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum FactorUpdate {
    /// The value differed and was written; carries the previous value.
    Changed {
        /// The value before the write.
        old: FactorValue,
    },
    /// The proposed value equals the current one; nothing was written.
    Unchanged,
}

/// Factors of a single category, ordered by name.
pub type FactorMap = BTreeMap<String, FactorValue>;

static UNDEFINED: FactorValue = FactorValue::Undefined;

/// Two-level mapping: category to factor name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredState {
    political: FactorMap,
    economic: FactorMap,
    social: FactorMap,
    technological: FactorMap,
    environmental: FactorMap,
    legal: FactorMap,
}

impl StructuredState {
    /// Create a state with all six categories present and empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow all factors of a category.
    pub const fn category(&self, category: Category) -> &FactorMap {
        match category {
            Category::Political => &self.political,
            Category::Economic => &self.economic,
            Category::Social => &self.social,
            Category::Technological => &self.technological,
            Category::Environmental => &self.environmental,
            Category::Legal => &self.legal,
        }
    }

    const fn category_mut(&mut self, category: Category) -> &mut FactorMap {
        match category {
            Category::Political => &mut self.political,
            Category::Economic => &mut self.economic,
            Category::Social => &mut self.social,
            Category::Technological => &mut self.technological,
            Category::Environmental => &mut self.environmental,
            Category::Legal => &mut self.legal,
        }
    }

    /// Read a factor. Never fails: unwritten factors are
    /// [`FactorValue::Undefined`].
    pub fn get(&self, category: Category, factor: &str) -> &FactorValue {
        self.category(category).get(factor).unwrap_or(&UNDEFINED)
    }

    /// Read a factor as display text (`"Not defined"` when unwritten).
    pub fn text(&self, category: Category, factor: &str) -> String {
        self.get(category, factor).to_string()
    }

    /// Read a factor as a scalar, if it holds one.
    pub fn number(&self, category: Category, factor: &str) -> Option<f64> {
        self.get(category, factor).as_number()
    }

    /// Write a factor unconditionally and return the previous value.
    pub fn set(
        &mut self,
        category: Category,
        factor: impl Into<String>,
        value: impl Into<FactorValue>,
    ) -> FactorValue {
        self.category_mut(category)
            .insert(factor.into(), value.into())
            .unwrap_or_default()
    }

    /// Write a factor only if the value differs from the current one.
    pub fn update(
        &mut self,
        category: Category,
        factor: &str,
        value: impl Into<FactorValue>,
    ) -> FactorUpdate {
        let value = value.into();
        if *self.get(category, factor) == value {
            return FactorUpdate::Unchanged;
        }
        let old = self.set(category, factor, value);
        FactorUpdate::Changed { old }
    }

    /// Iterate the factors of one category in name order.
    pub fn factors(&self, category: Category) -> impl Iterator<Item = (&str, &FactorValue)> {
        self.category(category)
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Copy every factor of `other` into this state, overwriting matches.
    pub fn merge_from(&mut self, other: &Self) {
        for category in Category::ALL {
            let target = self.category_mut(category);
            for (name, value) in other.category(category) {
                target.insert(name.clone(), value.clone());
            }
        }
    }

    /// Total number of factors across all categories.
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.category(*c).len()).sum()
    }

    /// Return `true` if no factor has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl core::fmt::Display for StructuredState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for category in Category::ALL {
            writeln!(f, "{}:", category.as_str().to_uppercase())?;
            for (name, value) in self.factors(category) {
                writeln!(f, "  {name}: {value}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwritten_factor_reads_not_defined() {
        let state = StructuredState::new();
        assert_eq!(
            state.get(Category::Legal, "antitrust"),
            &FactorValue::Undefined
        );
        assert_eq!(state.text(Category::Legal, "antitrust"), NOT_DEFINED);
        assert!(state.is_empty());
    }

    #[test]
    fn set_returns_previous_value() {
        let mut state = StructuredState::new();
        let first = state.set(Category::Economic, "growth", "steady");
        assert_eq!(first, FactorValue::Undefined);
        let second = state.set(Category::Economic, "growth", "booming");
        assert_eq!(second, FactorValue::text("steady"));
    }

    #[test]
    fn update_suppresses_equal_values() {
        let mut state = StructuredState::new();
        let first = state.update(Category::Social, "lifestyle", "digital");
        assert_eq!(
            first,
            FactorUpdate::Changed {
                old: FactorValue::Undefined
            }
        );
        let second = state.update(Category::Social, "lifestyle", "digital");
        assert_eq!(second, FactorUpdate::Unchanged);
    }

    #[test]
    fn numbers_parse_from_text_and_scalars() {
        let mut state = StructuredState::new();
        state.set(Category::Political, "world_peace_index", 0.7);
        state.set(Category::Economic, "economic_growth_rate", "0.03");
        assert_eq!(
            state.number(Category::Political, "world_peace_index"),
            Some(0.7)
        );
        assert_eq!(
            state.number(Category::Economic, "economic_growth_rate"),
            Some(0.03)
        );
        assert_eq!(state.number(Category::Economic, "growth"), None);
    }

    #[test]
    fn clones_are_independent() {
        let mut global = StructuredState::new();
        global.set(Category::Technological, "innovation", "high");
        let mut local = global.clone();
        local.set(Category::Technological, "innovation", "low");
        assert_eq!(global.text(Category::Technological, "innovation"), "high");
    }

    #[test]
    fn merge_copies_all_categories() {
        let mut base = StructuredState::new();
        base.set(Category::Legal, "labour", "strict");
        let mut overlay = StructuredState::new();
        overlay.set(Category::Legal, "labour", "flexible");
        overlay.set(Category::Environmental, "recycling_disposal", "90%");
        base.merge_from(&overlay);
        assert_eq!(base.text(Category::Legal, "labour"), "flexible");
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn factors_iterate_in_name_order() {
        let mut state = StructuredState::new();
        state.set(Category::Economic, "inflation", "2.8%");
        state.set(Category::Economic, "employment", "5.8%");
        let names: Vec<&str> = state.factors(Category::Economic).map(|(n, _)| n).collect();
        assert_eq!(names, vec!["employment", "inflation"]);
    }
}
