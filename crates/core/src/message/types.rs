use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Anything that can be submitted to the push service.
///
/// The service expands every item into one (message, recipient) pair per
/// recipient, so batching only ever looks at the recipient list.
pub trait PushItem {
    /// Recipient tokens in the order they are sent on the wire.
    fn recipients(&self) -> &[String];

    /// Number of tickets the service will emit for this item.
    fn recipient_count(&self) -> usize {
        self.recipients().len()
    }
}

/// The `to` field of a push message: a single token or a list of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PushRecipients {
    Single(String),
    Many(Vec<String>),
}

impl PushRecipients {
    /// View the recipients as a slice regardless of representation.
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(token) => std::slice::from_ref(token),
            Self::Many(tokens) => tokens,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl Default for PushRecipients {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl From<String> for PushRecipients {
    fn from(token: String) -> Self {
        Self::Single(token)
    }
}

impl From<&str> for PushRecipients {
    fn from(token: &str) -> Self {
        Self::Single(token.to_string())
    }
}

impl From<Vec<String>> for PushRecipients {
    fn from(tokens: Vec<String>) -> Self {
        Self::Many(tokens)
    }
}

/// Delivery priority understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushPriority {
    Default,
    Normal,
    High,
}

/// A push message as accepted by the send endpoint.
///
/// Everything except `to` is passed through to the service untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Recipient token(s). A message without recipients is accepted but
    /// never sent.
    #[serde(default)]
    pub to: PushRecipients,
    /// Custom JSON payload delivered to the app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// iOS only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// `"default"` to play the default sound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    /// Time to live in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Unix timestamp after which the message is discarded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<PushPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,
    /// Android notification channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutable_content: Option<bool>,
}

impl PushMessage {
    /// Create a message addressed to a single token.
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: PushRecipients::Single(to.into()),
            ..Default::default()
        }
    }

    /// Create a message addressed to a list of tokens.
    pub fn to_many<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            to: PushRecipients::Many(tokens.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    pub fn with_priority(mut self, priority: PushPriority) -> Self {
        self.priority = Some(priority);
        self
    }
}

impl PushItem for PushMessage {
    fn recipients(&self) -> &[String] {
        self.to.as_slice()
    }
}

impl<T: PushItem + ?Sized> PushItem for &T {
    fn recipients(&self) -> &[String] {
        (**self).recipients()
    }
}
