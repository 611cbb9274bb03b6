use serde::Deserialize;

/// Request payload for posting a chat message; the sender comes from the `User` header
#[derive(Debug, Default, Deserialize)]
pub struct PostMessageRequest {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Query string for listing messages
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<String>,
}

impl MessagesQuery {
    /// The requested window size; anything but a positive integer means no limit
    pub fn parsed_limit(&self) -> Option<usize> {
        self.limit
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|limit| *limit > 0)
    }
}
