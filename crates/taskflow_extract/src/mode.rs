use serde::{Deserialize, Serialize};
use std::str::FromStr;

use taskflow_core::CoreError;

/// Extraction hint forwarded to the hosted extractor and used locally to
/// bias categorization. Email content skews heavily toward work tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    #[default]
    General,
    Email,
    Notes,
}

impl ExtractMode {
    pub fn all() -> [ExtractMode; 3] {
        [ExtractMode::General, ExtractMode::Email, ExtractMode::Notes]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractMode::General => "general",
            ExtractMode::Email => "email",
            ExtractMode::Notes => "notes",
        }
    }
}

impl std::fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExtractMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "general" => Ok(ExtractMode::General),
            "email" => Ok(ExtractMode::Email),
            "notes" => Ok(ExtractMode::Notes),
            _ => Err(CoreError::Parse(format!("unknown extract mode: {s}"))),
        }
    }
}
