use serde::{Deserialize, Serialize};

/// Outcome of one completion round-trip.
///
/// `success` is false only when the transport failed; in that case `error` is
/// the only other field set. A successful result always carries the raw text in
/// `content`, and the remaining fields are present only when their block was
/// found in that text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_project: Option<CodeProjectDirectives>,
}

impl ParsedResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Action {
    pub name: String,
    pub description: String,
}

/// Every project mutation requested by a single response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CodeProjectDirectives {
    pub id: String,
    pub files: Vec<FileWrite>,
    pub edits: Vec<FileEdit>,
    pub delete_files: Vec<String>,
    pub move_files: Vec<FileMove>,
}

impl CodeProjectDirectives {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
            && self.edits.is_empty()
            && self.delete_files.is_empty()
            && self.move_files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.edits.len() + self.delete_files.len() + self.move_files.len()
    }
}

/// Full replacement of a file's content.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileWrite {
    pub path: String,
    pub content: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// Free-text instructions for a partial change, passed through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileEdit {
    pub path: String,
    pub instructions: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FileMove {
    pub from: String,
    pub to: String,
}
