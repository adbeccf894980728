use std::fmt;

use serde::{Deserialize, Serialize};

/// Error code reported by the service in ticket or receipt details.
///
/// Unknown codes are kept verbatim in [`PushErrorCode::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PushErrorCode {
    /// The device can no longer receive notifications; stop sending to it.
    DeviceNotRegistered,
    MessageTooBig,
    MessageRateExceeded,
    MismatchSenderId,
    InvalidCredentials,
    InvalidProviderToken,
    ProviderError,
    ExpoError,
    Other(String),
}

impl PushErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::DeviceNotRegistered => "DeviceNotRegistered",
            Self::MessageTooBig => "MessageTooBig",
            Self::MessageRateExceeded => "MessageRateExceeded",
            Self::MismatchSenderId => "MismatchSenderId",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::InvalidProviderToken => "InvalidProviderToken",
            Self::ProviderError => "ProviderError",
            Self::ExpoError => "ExpoError",
            Self::Other(code) => code,
        }
    }
}

impl From<String> for PushErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "DeviceNotRegistered" => Self::DeviceNotRegistered,
            "MessageTooBig" => Self::MessageTooBig,
            "MessageRateExceeded" => Self::MessageRateExceeded,
            "MismatchSenderId" => Self::MismatchSenderId,
            "InvalidCredentials" => Self::InvalidCredentials,
            "InvalidProviderToken" => Self::InvalidProviderToken,
            "ProviderError" => Self::ProviderError,
            "ExpoError" => Self::ExpoError,
            _ => Self::Other(code),
        }
    }
}

impl From<PushErrorCode> for String {
    fn from(code: PushErrorCode) -> Self {
        match code {
            PushErrorCode::Other(code) => code,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PushErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_decode() {
        let code: PushErrorCode = serde_json::from_str(r#""DeviceNotRegistered""#).unwrap();
        assert_eq!(code, PushErrorCode::DeviceNotRegistered);
    }

    #[test]
    fn test_unknown_code_is_preserved() {
        let code: PushErrorCode = serde_json::from_str(r#""SomethingNew""#).unwrap();
        assert_eq!(code, PushErrorCode::Other("SomethingNew".to_string()));
        assert_eq!(serde_json::to_string(&code).unwrap(), r#""SomethingNew""#);
    }
}
