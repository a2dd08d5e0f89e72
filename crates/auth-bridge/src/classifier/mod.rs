//! Maps free-text client diagnostics onto the stable error taxonomy.
//!
//! Classification walks [`catalog::CATALOGUE`] in order and returns the first
//! category with a pattern contained in the lowercased text. Text that matches
//! nothing becomes an [`catalog::UNKNOWN_ERROR`] record with a keyword-picked
//! summary; empty text becomes [`catalog::NO_DIAGNOSTIC`].

pub mod catalog;

use tracing::{debug, warn};

use self::catalog::{CATALOGUE, ErrorCategory, FALLBACK_KEYWORDS, NO_DIAGNOSTIC, UNKNOWN_ERROR};
use crate::model::ErrorRecord;

/// Classifies a diagnostic into an [`ErrorRecord`].
///
/// The returned record keeps `diagnostic` verbatim as its original
/// diagnostic, except for whitespace-only input which counts as nothing
/// captured.
///
/// # Example
///
/// ```
/// use auth_bridge::classify;
/// use auth_bridge::catalog::ErrorType;
///
/// let record = classify("KeyAuth: Incorrect password for alice");
/// assert_eq!(record.code, 3);
/// assert_eq!(record.error_type, ErrorType::InvalidPassword);
///
/// assert_eq!(classify("").error_type, ErrorType::NoDiagnostic);
/// ```
#[must_use]
pub fn classify(diagnostic: &str) -> ErrorRecord {
    if diagnostic.trim().is_empty() {
        debug!("no diagnostic captured");
        return ErrorRecord::from_category(&NO_DIAGNOSTIC, String::new());
    }

    let lowered = diagnostic.to_lowercase();
    if let Some(category) = match_category(&lowered) {
        debug!(
            code = category.code,
            error_type = ?category.error_type,
            "diagnostic classified"
        );
        return ErrorRecord::from_category(category, diagnostic);
    }

    // Unmatched wording usually means the vendor changed its messages.
    warn!(diagnostic, "diagnostic matched no category");
    ErrorRecord {
        code: UNKNOWN_ERROR.code,
        error_type: UNKNOWN_ERROR.error_type,
        message: fallback_message(&lowered).to_owned(),
        original_diagnostic: diagnostic.to_owned(),
    }
}

/// Returns the first catalogue entry with a pattern contained in `lowered`.
///
/// `lowered` must already be lowercase.
#[must_use]
pub fn match_category(lowered: &str) -> Option<&'static ErrorCategory> {
    CATALOGUE.iter().find(|category| {
        category
            .patterns
            .iter()
            .any(|pattern| lowered.contains(*pattern))
    })
}

fn fallback_message(lowered: &str) -> &'static str {
    FALLBACK_KEYWORDS
        .iter()
        .find(|&&(keyword, _)| lowered.contains(keyword))
        .map_or(UNKNOWN_ERROR.message, |&(_, message)| message)
}
