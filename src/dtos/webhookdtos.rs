use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

impl WebhookAck {
    pub fn ok() -> Self {
        WebhookAck { received: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_serializes_to_received_true() {
        let body = serde_json::to_string(&WebhookAck::ok()).unwrap();
        assert_eq!(body, r#"{"received":true}"#);
    }
}
