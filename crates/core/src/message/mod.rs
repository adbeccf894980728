//! Push messages and the recipient model used for batching.

mod types;

pub use types::{PushItem, PushMessage, PushPriority, PushRecipients};
