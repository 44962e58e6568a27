//! Validated per-document metadata stored alongside each object.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::sanitize::sanitize_filename;
use crate::drive::DriveFile;

/// Reasons a drive file cannot be turned into [`FileMetadata`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetadataError {
    /// A required field is absent or empty.
    #[error("Missing required metadata field `{0}`")]
    MissingField(&'static str),
    /// A field is present but malformed.
    #[error("Invalid value for metadata field `{field}`: {value:?}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// The file reports no owners.
    #[error("File has no owner")]
    NoOwner,
}

/// Flat description of one ingested document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    /// Sanitized file name.
    pub file_name: String,
    /// Owner display name.
    pub author_name: String,
    /// Owner email.
    pub author_email: String,
    /// Owner photo URL.
    pub author_profile: String,
    /// Drive modification time, taken as the upload date.
    pub uploaded_date: String,
    /// Drive creation time.
    pub created_date: String,
    /// Size in bytes as a decimal string.
    pub size: String,
    /// MIME type.
    pub filetype: String,
    /// `<folder path>/<file_name>`; doubles as the object key.
    pub location: String,
    /// Last modifier display name.
    pub modified_by_name: String,
    /// Last modifier email.
    pub modified_by_email: String,
    /// Last modifier photo URL.
    pub modified_profile: String,
    /// Drive modification time, or empty.
    pub modified_time: String,
}

impl FileMetadata {
    /// Build and validate metadata for `file` found under `folder_path`.
    pub fn from_drive_file(file: &DriveFile, folder_path: &str) -> Result<Self, MetadataError> {
        let owner = file.owners.first().ok_or(MetadataError::NoOwner)?;
        let modifier = file.last_modifying_user.clone().unwrap_or_default();
        let file_name = sanitize_filename(&file.name);

        let metadata = Self {
            location: format!("{folder_path}/{file_name}"),
            file_name,
            author_name: user_field(&owner.display_name, "unknown"),
            author_email: user_field(&owner.email_address, "unknown"),
            author_profile: user_field(&owner.photo_link, ""),
            uploaded_date: file.modified_time.clone().unwrap_or_default(),
            created_date: file.created_time.clone().unwrap_or_default(),
            size: file.size.clone().unwrap_or_else(|| "0".to_string()),
            filetype: file.mime_type.clone().unwrap_or_default(),
            modified_by_name: user_field(&modifier.display_name, "Unknown"),
            modified_by_email: user_field(&modifier.email_address, "Unknown"),
            modified_profile: user_field(&modifier.photo_link, ""),
            modified_time: file.modified_time.clone().unwrap_or_default(),
        };
        metadata.validate()?;
        Ok(metadata)
    }

    /// Check required fields and value formats.
    pub fn validate(&self) -> Result<(), MetadataError> {
        require("file_name", &self.file_name)?;
        require("location", &self.location)?;
        require("filetype", &self.filetype)?;

        if self.size.parse::<u64>().is_err() {
            return Err(invalid("size", &self.size));
        }

        require("created_date", &self.created_date)?;
        timestamp("created_date", &self.created_date)?;
        require("uploaded_date", &self.uploaded_date)?;
        timestamp("uploaded_date", &self.uploaded_date)?;
        if !self.modified_time.is_empty() {
            timestamp("modified_time", &self.modified_time)?;
        }
        Ok(())
    }

    /// Key/value pairs stored as object metadata: every field except the name and location.
    pub fn object_metadata(&self) -> BTreeMap<String, String> {
        [
            ("author_name", &self.author_name),
            ("author_email", &self.author_email),
            ("author_profile", &self.author_profile),
            ("uploaded_date", &self.uploaded_date),
            ("created_date", &self.created_date),
            ("size", &self.size),
            ("filetype", &self.filetype),
            ("modified_by_name", &self.modified_by_name),
            ("modified_by_email", &self.modified_by_email),
            ("modified_profile", &self.modified_profile),
            ("modified_time", &self.modified_time),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
    }
}

fn user_field(value: &Option<String>, default: &str) -> String {
    value.clone().unwrap_or_else(|| default.to_string())
}

fn require(field: &'static str, value: &str) -> Result<(), MetadataError> {
    if value.trim().is_empty() {
        return Err(MetadataError::MissingField(field));
    }
    Ok(())
}

fn timestamp(field: &'static str, value: &str) -> Result<(), MetadataError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map(drop)
        .map_err(|_| invalid(field, value))
}

fn invalid(field: &'static str, value: &str) -> MetadataError {
    MetadataError::InvalidField {
        field,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::DriveUser;

    fn drive_file() -> DriveFile {
        DriveFile {
            id: "f1".into(),
            name: "Study Plan.pdf".into(),
            mime_type: Some("application/pdf".into()),
            created_time: Some("2024-01-02T03:04:05.000Z".into()),
            modified_time: Some("2024-02-03T04:05:06.000Z".into()),
            size: Some("1024".into()),
            owners: vec![DriveUser {
                display_name: Some("Jane".into()),
                email_address: Some("jane@example.com".into()),
                photo_link: Some("https://example.com/jane.png".into()),
            }],
            last_modifying_user: Some(DriveUser {
                display_name: Some("Joe".into()),
                email_address: None,
                photo_link: None,
            }),
        }
    }

    #[test]
    fn builds_location_from_folder_and_sanitized_name() {
        let metadata = FileMetadata::from_drive_file(&drive_file(), "Scope/Medicine").unwrap();
        assert_eq!(metadata.file_name, "StudyPlan.pdf");
        assert_eq!(metadata.location, "Scope/Medicine/StudyPlan.pdf");
        assert_eq!(metadata.author_name, "Jane");
        assert_eq!(metadata.uploaded_date, "2024-02-03T04:05:06.000Z");
        assert_eq!(metadata.created_date, "2024-01-02T03:04:05.000Z");
        assert_eq!(metadata.modified_by_name, "Joe");
        assert_eq!(metadata.modified_by_email, "Unknown");
        assert_eq!(metadata.modified_profile, "");
    }

    #[test]
    fn applies_defaults_for_missing_optional_attributes() {
        let mut file = drive_file();
        file.size = None;
        file.last_modifying_user = None;
        file.owners = vec![DriveUser::default()];

        let metadata = FileMetadata::from_drive_file(&file, "Scope").unwrap();
        assert_eq!(metadata.size, "0");
        assert_eq!(metadata.author_name, "unknown");
        assert_eq!(metadata.author_email, "unknown");
        assert_eq!(metadata.author_profile, "");
        assert_eq!(metadata.modified_by_name, "Unknown");
    }

    #[test]
    fn rejects_files_without_owner() {
        let mut file = drive_file();
        file.owners.clear();
        assert_eq!(
            FileMetadata::from_drive_file(&file, "Scope"),
            Err(MetadataError::NoOwner)
        );
    }

    #[test]
    fn rejects_missing_created_time() {
        let mut file = drive_file();
        file.created_time = None;
        assert_eq!(
            FileMetadata::from_drive_file(&file, "Scope"),
            Err(MetadataError::MissingField("created_date"))
        );
    }

    #[test]
    fn rejects_non_numeric_size() {
        let mut file = drive_file();
        file.size = Some("big".into());
        assert!(matches!(
            FileMetadata::from_drive_file(&file, "Scope"),
            Err(MetadataError::InvalidField { field: "size", .. })
        ));
    }

    #[test]
    fn rejects_malformed_timestamp() {
        let mut file = drive_file();
        file.modified_time = Some("yesterday".into());
        assert!(matches!(
            FileMetadata::from_drive_file(&file, "Scope"),
            Err(MetadataError::InvalidField {
                field: "uploaded_date",
                ..
            })
        ));
    }

    #[test]
    fn object_metadata_omits_name_and_location() {
        let metadata = FileMetadata::from_drive_file(&drive_file(), "Scope").unwrap();
        let pairs = metadata.object_metadata();
        assert_eq!(pairs.len(), 11);
        assert!(!pairs.contains_key("file_name"));
        assert!(!pairs.contains_key("location"));
        assert_eq!(pairs["filetype"], "application/pdf");
    }
}
