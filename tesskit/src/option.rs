//! Recognition options and the engine variables behind them
//!
//! An [`EngineOption`] is identified by its [`OptionKind`], not by its payload:
//! `CharWhitelist("abc")` and `CharWhitelist("xyz")` are equal and hash the
//! same, because both name the variable `tessedit_char_whitelist`. An
//! [`OptionSet`] therefore holds at most one option per kind.

use crate::engine::EngineApi;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use tracing::{debug, warn};

/// Payload-free discriminant of an [`EngineOption`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionKind {
    CharWhitelist,
    CharBlacklist,
    PreserveInterwordSpaces,
    MinimumCharacterHeight,
}

impl OptionKind {
    /// Every option kind, in declaration order.
    pub const ALL: [OptionKind; 4] = [
        OptionKind::CharWhitelist,
        OptionKind::CharBlacklist,
        OptionKind::PreserveInterwordSpaces,
        OptionKind::MinimumCharacterHeight,
    ];

    /// Name of the engine variable this kind controls.
    pub const fn variable_name(self) -> &'static str {
        match self {
            OptionKind::CharWhitelist => "tessedit_char_whitelist",
            OptionKind::CharBlacklist => "tessedit_char_blacklist",
            OptionKind::PreserveInterwordSpaces => "preserve_interword_spaces",
            OptionKind::MinimumCharacterHeight => "textord_min_xheight",
        }
    }
}

/// A configurable recognition option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EngineOption {
    /// Characters that are the only ones recognized.
    ///
    /// **Only honored in [`EngineMode::TesseractOnly`](crate::EngineMode::TesseractOnly).**
    /// This does not filter output: characters outside the list get
    /// recognized as the closest listed character (a `1` may come back as `I`).
    /// Filter the recognized string instead if removal is wanted.
    /// An empty string clears the list.
    CharWhitelist(String),

    /// Characters that are never recognized.
    ///
    /// **Only honored in [`EngineMode::TesseractOnly`](crate::EngineMode::TesseractOnly).**
    /// Like the whitelist, listed characters are replaced by lookalikes rather
    /// than removed. An empty string clears the list.
    CharBlacklist(String),

    /// Keep runs of spaces between words instead of collapsing them.
    PreserveInterwordSpaces(bool),

    /// Ignore text whose x-height is below this many pixels.
    MinimumCharacterHeight(i32),
}

impl EngineOption {
    pub fn kind(&self) -> OptionKind {
        match self {
            EngineOption::CharWhitelist(_) => OptionKind::CharWhitelist,
            EngineOption::CharBlacklist(_) => OptionKind::CharBlacklist,
            EngineOption::PreserveInterwordSpaces(_) => OptionKind::PreserveInterwordSpaces,
            EngineOption::MinimumCharacterHeight(_) => OptionKind::MinimumCharacterHeight,
        }
    }

    pub fn variable_name(&self) -> &'static str {
        self.kind().variable_name()
    }

    /// The payload as the engine expects it.
    pub fn value(&self) -> String {
        match self {
            EngineOption::CharWhitelist(chars) | EngineOption::CharBlacklist(chars) => {
                chars.clone()
            }
            EngineOption::PreserveInterwordSpaces(preserve) => bool_value(*preserve).to_string(),
            EngineOption::MinimumCharacterHeight(height) => height.to_string(),
        }
    }

    /// Same kind *and* same payload (`==` only compares the kind).
    pub fn is_identical(&self, other: &EngineOption) -> bool {
        self.kind() == other.kind() && self.value() == other.value()
    }

    /// Write this option into the engine.
    ///
    /// The minimum character height is only read by the legacy x-height
    /// code path, so that switch is turned on again before every write.
    pub(crate) fn apply<E: EngineApi + ?Sized>(&self, engine: &mut E) {
        if self.kind() == OptionKind::MinimumCharacterHeight {
            LegacyVariable::OldXHeight(true).apply(engine);
        }
        set_variable(engine, self.variable_name(), &self.value());
    }
}

impl PartialEq for EngineOption {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl Eq for EngineOption {}

impl Hash for EngineOption {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.variable_name().hash(state);
    }
}

/// Internal engine variables that are not exposed as options.
///
/// The engine keeps some of these across handle lifetimes in one process,
/// so sessions reset them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LegacyVariable {
    /// `textord_old_xheight`: use the legacy x-height estimation.
    OldXHeight(bool),
}

impl LegacyVariable {
    pub(crate) fn variable_name(self) -> &'static str {
        match self {
            LegacyVariable::OldXHeight(_) => "textord_old_xheight",
        }
    }

    pub(crate) fn value(self) -> &'static str {
        match self {
            LegacyVariable::OldXHeight(enabled) => bool_value(enabled),
        }
    }

    pub(crate) fn apply<E: EngineApi + ?Sized>(self, engine: &mut E) {
        set_variable(engine, self.variable_name(), self.value());
    }
}

fn bool_value(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn set_variable<E: EngineApi + ?Sized>(engine: &mut E, name: &str, value: &str) {
    if engine.set_variable(name, value) {
        debug!(variable = name, value, "set engine variable");
    } else {
        warn!(variable = name, value, "engine rejected variable");
    }
}

/// A set of options keyed by [`OptionKind`].
///
/// Inserting an option replaces any option of the same kind. Iteration
/// follows first-insertion order, which is also the order options are
/// applied to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<EngineOption>", into = "Vec<EngineOption>")]
pub struct OptionSet {
    options: Vec<EngineOption>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the option of the same kind.
    ///
    /// Returns the option that was replaced, if any.
    pub fn insert(&mut self, option: EngineOption) -> Option<EngineOption> {
        match self.options.iter_mut().find(|existing| **existing == option) {
            Some(existing) => Some(std::mem::replace(existing, option)),
            None => {
                self.options.push(option);
                None
            }
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, option: EngineOption) -> Self {
        self.insert(option);
        self
    }

    pub fn remove(&mut self, kind: OptionKind) -> Option<EngineOption> {
        let index = self.options.iter().position(|o| o.kind() == kind)?;
        Some(self.options.remove(index))
    }

    pub fn get(&self, kind: OptionKind) -> Option<&EngineOption> {
        self.options.iter().find(|o| o.kind() == kind)
    }

    pub fn contains(&self, kind: OptionKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EngineOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Options in `self` that must be written to an engine currently
    /// configured with `previous`.
    ///
    /// An option is skipped only when `previous` holds the same kind with an
    /// identical payload. Options that exist only in `previous` are not
    /// reported: the engine has no way to unset a variable, so callers clear
    /// a list by setting it to an empty string.
    pub fn additions<'a>(
        &'a self,
        previous: &'a OptionSet,
    ) -> impl Iterator<Item = &'a EngineOption> + 'a {
        self.options.iter().filter(move |option| {
            previous
                .get(option.kind())
                .map_or(true, |old| !old.is_identical(option))
        })
    }
}

impl From<Vec<EngineOption>> for OptionSet {
    fn from(options: Vec<EngineOption>) -> Self {
        options.into_iter().collect()
    }
}

impl From<OptionSet> for Vec<EngineOption> {
    fn from(set: OptionSet) -> Self {
        set.options
    }
}

impl FromIterator<EngineOption> for OptionSet {
    fn from_iter<I: IntoIterator<Item = EngineOption>>(iter: I) -> Self {
        let mut set = OptionSet::new();
        for option in iter {
            set.insert(option);
        }
        set
    }
}

impl Extend<EngineOption> for OptionSet {
    fn extend<I: IntoIterator<Item = EngineOption>>(&mut self, iter: I) {
        for option in iter {
            self.insert(option);
        }
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a EngineOption;
    type IntoIter = std::slice::Iter<'a, EngineOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

impl IntoIterator for OptionSet {
    type Item = EngineOption;
    type IntoIter = std::vec::IntoIter<EngineOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.into_iter()
    }
}
