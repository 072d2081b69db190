use async_trait::async_trait;
use credwatch::prelude::*;
use std::sync::{Arc, Mutex};

/// Mock DeliveryBackend recording every message it is asked to send
#[derive(Clone, Default)]
pub struct MockDeliveryBackend {
    pub sent: Arc<Mutex<Vec<EmailMessage>>>,
    pub should_fail: bool,
}

impl MockDeliveryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryBackend for MockDeliveryBackend {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.should_fail {
            return Err(AuditError::delivery("mock backend rejected the message").into());
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn test_connection(&self) -> bool {
        !self.should_fail
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}
