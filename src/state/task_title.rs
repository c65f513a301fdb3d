//! Editable title shown above the countdown

use std::fmt;

use serde::Serialize;

use crate::error::TitleError;

pub const DEFAULT_TASK_TITLE: &str = "放松身心，享受片刻宁静";

/// Counted in characters, not bytes
pub const MAX_TITLE_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Trim `input` and accept it if it is non-empty and short enough
    pub fn parse(input: &str) -> Result<Self, TitleError> {
        let title = input.trim();
        if title.is_empty() {
            return Err(TitleError::Empty);
        }

        let len = title.chars().count();
        if len > MAX_TITLE_CHARS {
            return Err(TitleError::TooLong { len, max: MAX_TITLE_CHARS });
        }
        Ok(Self(title.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskTitle {
    fn default() -> Self {
        Self(DEFAULT_TASK_TITLE.to_string())
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
