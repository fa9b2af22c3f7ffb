use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Metadata document describing one uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Upload timestamp in milliseconds, as a string
    #[schema(example = "1700000000000")]
    pub id: String,
    /// Object name in storage: `{timestampMillis}-{originalFileName}`
    #[schema(example = "1700000000000-report.pdf")]
    pub file_name: String,
    /// File name as supplied by the client
    #[schema(example = "report.pdf")]
    pub original_file_name: String,
    /// Size of the file in bytes
    pub file_size: i64,
    /// Free text supplied with the upload, empty when omitted
    pub description: String,
    /// Resolvable URL of the stored object
    pub blob_url: String,
    /// When the metadata was persisted
    #[serde(with = "iso_millis")]
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: String,
}

/// ISO 8601 in UTC with exactly three fractional digits (`2023-11-14T22:13:20.000Z`).
///
/// A fixed width keeps the serialized form lexicographically sortable.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
