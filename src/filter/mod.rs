//! Filtering of the effective resort view.
//!
//! Provides:
//! - Case-insensitive free-text search across the textual fields
//! - Exact country / province selection
//! - Ski pass presence, lift count and flag predicates
//!
//! Every predicate is independent and inactive when unset; active ones are
//! combined with AND.

use crate::record::Resort;

/// Whether a resort has any ski passes attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PassFilter {
    #[default]
    Any,
    WithPasses,
    WithoutPasses,
}

/// Threshold on the total lift count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LiftFilter {
    #[default]
    Any,
    AtMostOne,
    MoreThanOne,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlagFilter {
    #[default]
    Any,
    Flagged,
    Unflagged,
}

impl PassFilter {
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Any => Self::WithPasses,
            Self::WithPasses => Self::WithoutPasses,
            Self::WithoutPasses => Self::Any,
        }
    }

    fn matches(self, resort: &Resort) -> bool {
        match self {
            Self::Any => true,
            Self::WithPasses => !resort.ski_passes.is_empty(),
            Self::WithoutPasses => resort.ski_passes.is_empty(),
        }
    }

    const fn label(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::WithPasses => Some("has passes"),
            Self::WithoutPasses => Some("no passes"),
        }
    }
}

impl LiftFilter {
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Any => Self::AtMostOne,
            Self::AtMostOne => Self::MoreThanOne,
            Self::MoreThanOne => Self::Any,
        }
    }

    const fn matches(self, resort: &Resort) -> bool {
        match self {
            Self::Any => true,
            Self::AtMostOne => resort.lifts.total <= 1,
            Self::MoreThanOne => resort.lifts.total > 1,
        }
    }

    const fn label(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::AtMostOne => Some("lifts <= 1"),
            Self::MoreThanOne => Some("lifts > 1"),
        }
    }
}

impl FlagFilter {
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Any => Self::Flagged,
            Self::Flagged => Self::Unflagged,
            Self::Unflagged => Self::Any,
        }
    }

    const fn matches(self, resort: &Resort) -> bool {
        match self {
            Self::Any => true,
            Self::Flagged => resort.flagged,
            Self::Unflagged => !resort.flagged,
        }
    }

    const fn label(self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::Flagged => Some("flagged"),
            Self::Unflagged => Some("unflagged"),
        }
    }
}

/// The set of active predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    /// Free-text query; blank means inactive
    pub search: String,
    pub country: Option<String>,
    pub province: Option<String>,
    pub passes: PassFilter,
    pub lifts: LiftFilter,
    pub flag: FlagFilter,
}

impl FilterSet {
    /// Whether `resort` satisfies every active predicate.
    pub fn matches(&self, resort: &Resort) -> bool {
        self.matches_search(resort)
            && self.country.as_ref().is_none_or(|c| resort.country.trim() == c)
            && self.province.as_ref().is_none_or(|p| resort.province.trim() == p)
            && self.passes.matches(resort)
            && self.lifts.matches(resort)
            && self.flag.matches(resort)
    }

    fn matches_search(&self, resort: &Resort) -> bool {
        let query = self.search.trim();
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        searchable_fields(resort)
            .iter()
            .any(|text| text.to_lowercase().contains(&query))
    }

    /// Indices into `records` of the entries that pass, in order.
    pub fn apply(&self, records: &[Resort]) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, resort)| self.matches(resort))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn is_active(&self) -> bool {
        self.active_count() > 0
    }

    pub fn active_count(&self) -> usize {
        usize::from(!self.search.trim().is_empty())
            + usize::from(self.country.is_some())
            + usize::from(self.province.is_some())
            + usize::from(self.passes != PassFilter::Any)
            + usize::from(self.lifts != LiftFilter::Any)
            + usize::from(self.flag != FlagFilter::Any)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Short labels for the active predicates, for the filter bar.
    pub fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        let query = self.search.trim();
        if !query.is_empty() {
            parts.push(format!("\"{query}\""));
        }
        if let Some(country) = &self.country {
            parts.push(format!("country={country}"));
        }
        if let Some(province) = &self.province {
            parts.push(format!("province={province}"));
        }
        parts.extend(
            [self.passes.label(), self.lifts.label(), self.flag.label()]
                .into_iter()
                .flatten()
                .map(str::to_string),
        );
        parts
    }
}

fn searchable_fields(resort: &Resort) -> [&str; 6] {
    [
        &resort.name,
        &resort.country,
        &resort.province,
        &resort.website,
        &resort.information,
        &resort.notes,
    ]
}

/// Sorted, de-duplicated non-empty values of one text field.
///
/// Values that differ only in case are kept apart, since selection is by
/// exact value; they sort next to each other.
pub fn distinct_values<'a>(
    records: &'a [Resort],
    field: impl Fn(&'a Resort) -> &'a str,
) -> Vec<String> {
    let mut values: Vec<String> = records
        .iter()
        .map(field)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    values.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    values.dedup();
    values
}

/// Step a categorical selection through `options`: unset, first, ..., last, unset.
///
/// A current value that is no longer among the options restarts the cycle.
pub fn cycle_option(options: &[String], current: Option<&str>) -> Option<String> {
    let next = match current {
        None => 0,
        Some(value) => match options.iter().position(|o| o == value) {
            Some(idx) => idx + 1,
            None => 0,
        },
    };
    options.get(next).cloned()
}
