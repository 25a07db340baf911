//! Join-request verification by phone-number country code
//!
//! This module is the decision core of the bot and has zero teloxide
//! dependency. It provides:
//! - `JoinEvent`: a single join request or contact share, typed once at the boundary
//! - `Decision`: Approve / Block / Pending(reason)
//! - `classify`: the pure prefix check
//! - Phone number normalization and display helpers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Country-code prefix accepted by the bot (Philippines).
pub const ACCEPTED_PREFIX: &str = "+63";

/// Reason carried by `Decision::Pending` when no phone number is known yet.
pub const AWAITING_PHONE: &str = "awaiting phone number";

/// A single user's request to join a monitored chat, optionally carrying a
/// phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinEvent {
    pub requester_id: i64,
    pub chat_id: i64,
    pub phone_number: Option<String>,
}

impl JoinEvent {
    /// Builds an event, treating a blank phone string as absent.
    pub fn new(requester_id: i64, chat_id: i64, phone_number: Option<String>) -> Self {
        let phone_number = phone_number.filter(|p| !p.trim().is_empty());
        Self {
            requester_id,
            chat_id,
            phone_number,
        }
    }

    /// Event for a contact shared in a private chat (chat id == requester id).
    pub fn from_contact(requester_id: i64, phone_number: &str) -> Self {
        Self::new(requester_id, requester_id, Some(phone_number.to_string()))
    }
}

/// Outcome of classifying a `JoinEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Block,
    Pending(String),
}

impl Decision {
    pub fn awaiting_phone() -> Self {
        Decision::Pending(AWAITING_PHONE.to_string())
    }

    pub fn is_approve(&self) -> bool {
        matches!(self, Decision::Approve)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => write!(f, "approve"),
            Decision::Block => write!(f, "block"),
            Decision::Pending(reason) => write!(f, "pending ({})", reason),
        }
    }
}

/// Classifies a join event.
///
/// - No phone number → `Pending("awaiting phone number")`
/// - Normalized number starts with `+63` → `Approve`
/// - Anything else, including garbage input → `Block`
///
/// # Examples
/// ```
/// use pinoy_gate::core::verification::{classify, Decision, JoinEvent};
///
/// let event = JoinEvent::new(1, -100, Some("+639171234567".to_string()));
/// assert_eq!(classify(&event), Decision::Approve);
///
/// let event = JoinEvent::new(1, -100, Some("+14155552671".to_string()));
/// assert_eq!(classify(&event), Decision::Block);
///
/// let event = JoinEvent::new(1, -100, None);
/// assert_eq!(classify(&event), Decision::awaiting_phone());
/// ```
pub fn classify(event: &JoinEvent) -> Decision {
    match event.phone_number.as_deref() {
        None => Decision::awaiting_phone(),
        Some(raw) => {
            if normalize_phone(raw).starts_with(ACCEPTED_PREFIX) {
                Decision::Approve
            } else {
                Decision::Block
            }
        }
    }
}

/// Normalizes a user supplied phone number to `+<digits>` form.
///
/// Rules, applied in order:
/// 1. Separators (whitespace, `-`, `.`, `(`, `)`) are dropped
/// 2. A leading `00` international access code becomes `+`
/// 3. Without `+`, a leading `63` gets a `+` (Telegram contacts omit it)
/// 4. Without `+`, the national trunk `0` is replaced by `+63` for an
///    11-digit `09` mobile number or a 13-digit `063` number
/// 5. Without `+`, a bare 10-digit mobile number starting with `9` gets `+63`
/// 6. Anything else without `+` gets a `+` prepended
///
/// Input that is not a phone number at all is returned cleaned but otherwise
/// untouched, so it can never match the accepted prefix by accident.
pub fn normalize_phone(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')'))
        .collect();

    if cleaned.is_empty() || cleaned.starts_with('+') {
        return cleaned;
    }

    if let Some(rest) = cleaned.strip_prefix("00") {
        return format!("+{}", rest);
    }

    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return cleaned;
    }

    if cleaned.starts_with("63") {
        format!("+{}", cleaned)
    } else if is_national_trunk_number(&cleaned) {
        format!("{}{}", ACCEPTED_PREFIX, &cleaned[1..])
    } else if cleaned.len() == 10 && cleaned.starts_with('9') {
        format!("{}{}", ACCEPTED_PREFIX, cleaned)
    } else {
        format!("+{}", cleaned)
    }
}

/// `09171234567` or `0639171234567`. Other numbers starting with `0` are
/// not Philippine national numbers.
fn is_national_trunk_number(digits: &str) -> bool {
    (digits.len() == 11 && digits.starts_with("09")) || (digits.len() == 13 && digits.starts_with("063"))
}

/// Formats a number for display: `+63 917 123 4567` for Philippine mobiles,
/// the normalized form otherwise.
pub fn format_international(raw: &str) -> String {
    let normalized = normalize_phone(raw);
    match normalized.strip_prefix(ACCEPTED_PREFIX) {
        Some(national) if national.len() == 10 && national.chars().all(|c| c.is_ascii_digit()) => format!(
            "{} {} {} {}",
            ACCEPTED_PREFIX,
            &national[..3],
            &national[3..6],
            &national[6..]
        ),
        _ => normalized,
    }
}

/// Masks all but the country code and the last two digits, for logs.
pub fn mask_phone(raw: &str) -> String {
    let normalized = normalize_phone(raw);
    let count = normalized.chars().count();
    if count <= 5 {
        return "*".repeat(count);
    }
    normalized
        .chars()
        .enumerate()
        .map(|(i, c)| if i < 3 || i >= count - 2 { c } else { '*' })
        .collect()
}
