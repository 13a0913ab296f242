//! Recurring payment sources
//!
//! A recurring payment shown on the calendar comes either from the user's own
//! declarations or from the detector. Both are normalized into a `RecurringItem`
//! before the reconciler looks at them.

use std::collections::HashSet;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Currency, Frequency, RecurringPattern, RecurringPayment};

/// Minimum detector confidence for a pattern to be scheduled
pub const DEFAULT_MIN_PATTERN_CONFIDENCE: f64 = 0.5;

/// Where a recurring payment came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RecurringSource {
    Detected(RecurringPattern),
    Declared(RecurringPayment),
}

/// Normalized recurring payment, ready to be placed on the calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringItem {
    pub id: String,
    pub name: String,
    /// Day of month (not validated)
    pub day: u32,
    pub amount: f64,
    pub currency: Currency,
    pub detected: bool,
}

impl RecurringSource {
    /// Normalize using the default confidence threshold
    pub fn to_item(&self) -> Option<RecurringItem> {
        self.to_item_with_confidence(DEFAULT_MIN_PATTERN_CONFIDENCE)
    }

    /// Normalize into a schedulable item, or `None` if the source is inactive.
    ///
    /// Declared payments are active unless switched off. Detected patterns are
    /// scheduled only when monthly and at least `min_confidence` sure.
    pub fn to_item_with_confidence(&self, min_confidence: f64) -> Option<RecurringItem> {
        match self {
            Self::Declared(payment) => {
                if !payment.active {
                    return None;
                }
                Some(RecurringItem {
                    id: payment.id.clone(),
                    name: payment.name.clone(),
                    day: payment.day,
                    amount: payment.amount,
                    currency: payment.currency,
                    detected: false,
                })
            }
            Self::Detected(pattern) => {
                if pattern.frequency != Frequency::Monthly || pattern.confidence < min_confidence {
                    return None;
                }
                Some(RecurringItem {
                    id: detected_id(&pattern.description),
                    name: pattern.description.clone(),
                    day: pattern.last_seen.day(),
                    amount: pattern.amount,
                    currency: pattern.currency,
                    detected: true,
                })
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Detected(pattern) => &pattern.description,
            Self::Declared(payment) => &payment.name,
        }
    }
}

/// Combine declared payments with detected patterns.
///
/// Declared payments come first. A detected pattern whose description matches a
/// declared payment name (case-insensitive) is already covered and is dropped, as
/// is one whose generated id is already taken by an earlier source.
pub fn merge_sources(
    declared: &[RecurringPayment],
    detected: &[RecurringPattern],
) -> Vec<RecurringSource> {
    let declared_names: HashSet<String> = declared
        .iter()
        .map(|p| p.name.trim().to_lowercase())
        .collect();
    let mut taken_ids: HashSet<String> = declared.iter().map(|p| p.id.clone()).collect();

    let mut sources: Vec<RecurringSource> =
        declared.iter().cloned().map(RecurringSource::Declared).collect();

    for pattern in detected {
        if declared_names.contains(&pattern.description.trim().to_lowercase()) {
            continue;
        }
        let id = detected_id(&pattern.description);
        if !taken_ids.insert(id.clone()) {
            debug!("Detected pattern '{}' skipped: id {} already in use", pattern.description, id);
            continue;
        }
        sources.push(RecurringSource::Detected(pattern.clone()));
    }

    sources
}

/// Source id for a detected pattern: `auto-` plus the encoded description.
///
/// Distinct descriptions always get distinct ids. ASCII letters and digits are
/// kept, a space becomes `-`, and any other character is written as its hex
/// code point between underscores (`uber-eats` is `auto-uber_2d_eats`).
pub fn detected_id(description: &str) -> String {
    let mut id = String::with_capacity(description.len() + 5);
    id.push_str("auto-");

    for c in description.chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c);
        } else if c == ' ' {
            id.push('-');
        } else {
            id.push_str(&format!("_{:x}_", c as u32));
        }
    }

    id
}
