use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::de;
use super::resort::RecordId;

/// Per-age pricing. Any tier may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(default, deserialize_with = "de::amount")]
    pub adult: Option<f64>,
    #[serde(default, deserialize_with = "de::amount")]
    pub child: Option<f64>,
    #[serde(default, deserialize_with = "de::amount")]
    pub senior: Option<f64>,
    #[serde(default, deserialize_with = "de::amount")]
    pub student: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restrictions {
    #[serde(default, deserialize_with = "de::text")]
    pub limited_days: String,
    #[serde(default, deserialize_with = "de::flag")]
    pub advance_reservation: bool,
    #[serde(default)]
    pub blackout_dates: Vec<String>,
}

/// A ski pass product that resorts reference by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkiPass {
    #[serde(rename = "_id", default, skip_serializing_if = "RecordId::is_empty")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::text")]
    pub description: String,
    #[serde(default, deserialize_with = "de::text")]
    pub website: String,
    #[serde(default, deserialize_with = "de::text")]
    pub season: String,
    #[serde(default, deserialize_with = "de::text")]
    pub pass_type: String,
    #[serde(default = "default_active", deserialize_with = "active")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "de::text")]
    pub logo: String,
    #[serde(default, deserialize_with = "de::text")]
    pub color: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub restrictions: Restrictions,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

const fn default_active() -> bool {
    true
}

// A present-but-null `isActive` means active, matching the missing case.
fn active<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

impl SkiPass {
    pub fn named(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            website: String::new(),
            season: String::new(),
            pass_type: String::new(),
            is_active: true,
            logo: String::new(),
            color: String::new(),
            price: Price::default(),
            restrictions: Restrictions::default(),
            benefits: Vec::new(),
            image_url: None,
        }
    }

    /// Adult price formatted like `$1,049`, or `N/A`.
    pub fn adult_price_label(&self) -> String {
        self.price.adult.map_or_else(|| "N/A".to_string(), format_price)
    }
}

/// Ski pass columns that can be edited from the passes table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassField {
    Name,
    PassType,
    Season,
    AdultPrice,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassInputError {
    #[error("{field}: cannot read {input:?} as {expected}")]
    Parse {
        field: PassField,
        input: String,
        expected: &'static str,
    },
    #[error("ski pass name is required")]
    MissingName,
}

impl PassField {
    /// In table column order.
    pub const ALL: [Self; 5] = [
        Self::Name,
        Self::PassType,
        Self::Season,
        Self::AdultPrice,
        Self::Active,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::PassType => "Type",
            Self::Season => "Season",
            Self::AdultPrice => "Adult price",
            Self::Active => "Active",
        }
    }

    /// Text the editor opens with.
    pub fn edit_text(self, pass: &SkiPass) -> String {
        match self {
            Self::Name => pass.name.clone(),
            Self::PassType => pass.pass_type.clone(),
            Self::Season => pass.season.clone(),
            Self::AdultPrice => pass.price.adult.map(|p| p.to_string()).unwrap_or_default(),
            Self::Active => if pass.is_active { "yes" } else { "no" }.to_string(),
        }
    }

    /// Parse `input` and write it into `pass`.
    ///
    /// # Errors
    ///
    /// Returns [`PassInputError`] when the input does not fit the column;
    /// `pass` is left untouched in that case.
    pub fn apply(self, pass: &mut SkiPass, input: &str) -> Result<(), PassInputError> {
        let trimmed = input.trim();
        let fail = |expected: &'static str| PassInputError::Parse {
            field: self,
            input: input.to_string(),
            expected,
        };
        match self {
            Self::Name => {
                if trimmed.is_empty() {
                    return Err(PassInputError::MissingName);
                }
                pass.name = trimmed.to_string();
            }
            Self::PassType => pass.pass_type = trimmed.to_string(),
            Self::Season => pass.season = trimmed.to_string(),
            Self::AdultPrice => {
                let cleaned: String = trimmed.chars().filter(|c| !matches!(c, '$' | ',')).collect();
                pass.price.adult = if cleaned.is_empty() {
                    None
                } else {
                    let amount = cleaned.parse::<f64>().map_err(|_| fail("a price"))?;
                    if !amount.is_finite() || amount < 0.0 {
                        return Err(fail("a price"));
                    }
                    Some(amount)
                };
            }
            Self::Active => {
                pass.is_active = match trimmed.to_ascii_lowercase().as_str() {
                    "y" | "yes" | "true" | "1" => true,
                    "n" | "no" | "false" | "0" => false,
                    _ => return Err(fail("yes or no")),
                };
            }
        }
        Ok(())
    }
}

impl fmt::Display for PassField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn format_price(amount: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    // Prices are far below i64 range.
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
