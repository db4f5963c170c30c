//! Builds the text fed to the embedding model for one organization.

use crate::organization::{present, OrganizationRecord};

/// Separator placed between the labelled segments of an embedding text.
pub const SEGMENT_DELIMITER: &str = ". ";

/// Separator placed between industry descriptions inside the category segment.
pub const CATEGORY_DELIMITER: &str = ", ";

/// Composes the embedding input for `record`.
///
/// Segments are emitted in a fixed order (name, activity, purpose, category) and only when
/// their source field is non-empty. Returns an empty string when no segment applies.
pub fn compose_embedding_text(record: &OrganizationRecord) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(4);

    if let Some(navn) = present(&record.navn) {
        segments.push(format!("Organisasjon: {navn}"));
    }
    if let Some(aktivitet) = present(&record.aktivitet) {
        segments.push(format!("Hovedaktivitet: {aktivitet}"));
    }
    if let Some(formaal) = present(&record.vedtektsfestet_formaal) {
        segments.push(format!("Formål: {formaal}"));
    }

    let categories: Vec<&str> = record.industry_descriptions().collect();
    if !categories.is_empty() {
        segments.push(format!("Kategori: {}", categories.join(CATEGORY_DELIMITER)));
    }

    segments.join(SEGMENT_DELIMITER)
}

/// A record qualifies for embedding when it has an id and its text is not blank.
pub fn is_valid_for_embedding(record: &OrganizationRecord, text: &str) -> bool {
    !text.trim().is_empty() && record.id().is_some()
}
