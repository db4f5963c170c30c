//! Organization records as they arrive from the registry JSON shards.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One organization from the volunteer registry export.
///
/// Every field is optional: shards are produced by an external export and any column can be
/// missing, `null`, or numeric where a string is expected. Scalars are kept in their textual
/// form so downstream consumers never see `null` or `None` literals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    /// Registry identifier.
    #[serde(default, deserialize_with = "scalar_text")]
    pub id: Option<String>,
    /// Organization name.
    #[serde(default, deserialize_with = "scalar_text")]
    pub navn: Option<String>,
    /// Free-text activity description.
    #[serde(default, deserialize_with = "scalar_text")]
    pub aktivitet: Option<String>,
    /// Purpose stated in the organization's statutes.
    #[serde(default, deserialize_with = "scalar_text")]
    pub vedtektsfestet_formaal: Option<String>,
    /// Primary industry code description.
    #[serde(default, deserialize_with = "scalar_text")]
    pub naeringskode1_beskrivelse: Option<String>,
    /// Secondary industry code description.
    #[serde(default, deserialize_with = "scalar_text")]
    pub naeringskode2_beskrivelse: Option<String>,
    /// Tertiary industry code description.
    #[serde(default, deserialize_with = "scalar_text")]
    pub naeringskode3_beskrivelse: Option<String>,
    /// Municipality of the business address.
    #[serde(default, deserialize_with = "scalar_text")]
    pub forretningsadresse_kommune: Option<String>,
    /// Postal town of the business address.
    #[serde(default, deserialize_with = "scalar_text")]
    pub forretningsadresse_poststed: Option<String>,
    /// Postal code of the business address (often numeric in the export).
    #[serde(default, deserialize_with = "scalar_text")]
    pub forretningsadresse_postnummer: Option<String>,
    /// Website.
    #[serde(default, deserialize_with = "scalar_text")]
    pub hjemmeside: Option<String>,
    /// Phone number.
    #[serde(default, deserialize_with = "scalar_text")]
    pub telefon: Option<String>,
    /// Email address.
    #[serde(default, deserialize_with = "scalar_text")]
    pub epost: Option<String>,
    /// Legal form description.
    #[serde(default, deserialize_with = "scalar_text")]
    pub organisasjonsform_beskrivelse: Option<String>,
}

impl OrganizationRecord {
    /// Industry code descriptions in code order, skipping missing or empty ones.
    pub fn industry_descriptions(&self) -> impl Iterator<Item = &str> {
        [
            &self.naeringskode1_beskrivelse,
            &self.naeringskode2_beskrivelse,
            &self.naeringskode3_beskrivelse,
        ]
        .into_iter()
        .filter_map(present)
    }

    /// Returns the registry id when it is set and non-empty.
    pub fn id(&self) -> Option<&str> {
        present(&self.id)
    }
}

/// Borrows the value of an optional field only when it is non-empty.
///
/// Whitespace counts as content; values are never trimmed.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}

/// Borrows the value of an optional field, or `""` when it is absent.
pub fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        // Lowercase, as written in the JSON source.
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        // Nested values never carry a displayable scalar; treat them as missing.
        Some(Value::Array(_)) | Some(Value::Object(_)) | Some(Value::Null) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_null_fields_degrade_to_text_or_none() {
        let record: OrganizationRecord = serde_json::from_str(
            r#"{
                "id": 971234567,
                "navn": "Bygdelaget",
                "aktivitet": null,
                "forretningsadresse_postnummer": 5003,
                "antall_ansatte": 4
            }"#,
        )
        .expect("record parses");

        assert_eq!(record.id.as_deref(), Some("971234567"));
        assert_eq!(record.navn.as_deref(), Some("Bygdelaget"));
        assert_eq!(record.aktivitet, None);
        assert_eq!(record.forretningsadresse_postnummer.as_deref(), Some("5003"));
        assert_eq!(record.epost, None);
    }

    #[test]
    fn booleans_keep_their_json_spelling() {
        let record: OrganizationRecord =
            serde_json::from_str(r#"{"id": "7", "telefon": true, "epost": false}"#)
                .expect("record parses");

        assert_eq!(record.telefon.as_deref(), Some("true"));
        assert_eq!(record.epost.as_deref(), Some("false"));
    }

    #[test]
    fn industry_descriptions_skip_empty_codes_only() {
        let record = OrganizationRecord {
            naeringskode1_beskrivelse: Some("Idrett".into()),
            naeringskode2_beskrivelse: Some("".into()),
            naeringskode3_beskrivelse: Some("   ".into()),
            ..OrganizationRecord::default()
        };

        let codes: Vec<&str> = record.industry_descriptions().collect();
        assert_eq!(codes, vec!["Idrett", "   "]);
    }

    #[test]
    fn whitespace_id_is_present_but_empty_id_is_not() {
        let spaced = OrganizationRecord {
            id: Some(" ".into()),
            ..OrganizationRecord::default()
        };
        assert_eq!(spaced.id(), Some(" "));

        let empty = OrganizationRecord {
            id: Some("".into()),
            ..OrganizationRecord::default()
        };
        assert_eq!(empty.id(), None);
    }
}
