use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::logger::error::LoggerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per event; suited to long runs whose logs are shipped.
    Json,
    Journald,
}

impl LoggerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        match norm.as_str() {
            "text" => Ok(LoggerFormat::Text),
            "json" => Ok(LoggerFormat::Json),
            "journald" | "journal" => {
                #[cfg(all(target_os = "linux", feature = "journald"))]
                {
                    Ok(LoggerFormat::Journald)
                }

                #[cfg(not(all(target_os = "linux", feature = "journald")))]
                {
                    Err(LoggerError::JournaldNotSupported)
                }
            }
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" JSON ".parse::<LoggerFormat>().unwrap(), LoggerFormat::Json);
        assert_eq!("text".parse::<LoggerFormat>().unwrap(), LoggerFormat::Text);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert_eq!(
            "xml".parse::<LoggerFormat>(),
            Err(LoggerError::InvalidFormat("xml".into()))
        );
    }

    #[cfg(not(all(target_os = "linux", feature = "journald")))]
    #[test]
    fn journald_needs_the_feature() {
        assert_eq!(
            "journald".parse::<LoggerFormat>(),
            Err(LoggerError::JournaldNotSupported)
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&LoggerFormat::Json).unwrap(), "\"json\"");
        let f: LoggerFormat = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(f, LoggerFormat::Text);
        assert_eq!(LoggerFormat::Journald.to_string(), "journald");
    }
}
