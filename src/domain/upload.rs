use serde::{Deserialize, Serialize};

/// File content posted by a client. Only text payloads are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub content: String,
    pub name: String,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl UploadedFile {
    /// CSV when the declared type says so or the name ends in `.csv`.
    pub fn is_csv(&self) -> bool {
        self.file_type
            .as_deref()
            .map(|kind| kind.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
            || self.name.to_lowercase().ends_with(".csv")
    }

    pub fn source_label(&self) -> String {
        format!("Uploaded from {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, file_type: Option<&str>) -> UploadedFile {
        UploadedFile {
            content: String::new(),
            name: name.to_string(),
            file_type: file_type.map(str::to_string),
        }
    }

    #[test]
    fn csv_detected_by_type_or_extension() {
        assert!(file("stories.CSV", None).is_csv());
        assert!(file("stories.txt", Some("csv")).is_csv());
        assert!(!file("stories.txt", Some("text")).is_csv());
    }
}
