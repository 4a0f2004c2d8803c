use std::sync::{Arc, Mutex};

use crate::models::ChatExchange;

/// Append-only conversation transcript, in question-submission order.
///
/// Exchanges are appended only once resolved, so the transcript always
/// reflects what actually happened: answered turns, error-content turns,
/// and ingestion notices. Cancelled queries never appear.
#[derive(Clone, Default)]
pub struct Transcript {
    inner: Arc<Mutex<Vec<ChatExchange>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, exchange: ChatExchange) {
        self.inner.lock().unwrap().push(exchange);
    }

    pub fn get(&self, id: &str) -> Option<ChatExchange> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|exchange| exchange.id == id)
            .cloned()
    }

    pub fn list(&self) -> Vec<ChatExchange> {
        self.inner.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_preserve_order() {
        let transcript = Transcript::new();
        transcript.append(ChatExchange::notice("first".to_string()));
        transcript.append(ChatExchange::notice("second".to_string()));

        let listed = transcript.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].answer, "first");
        assert_eq!(listed[1].answer, "second");
    }

    #[test]
    fn test_get_finds_exchange_by_id() {
        let transcript = Transcript::new();
        let exchange = ChatExchange::notice("hello".to_string());
        let id = exchange.id.clone();
        transcript.append(exchange);

        assert_eq!(transcript.get(&id).unwrap().answer, "hello");
        assert!(transcript.get("missing").is_none());
    }

    #[test]
    fn test_empty_transcript() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
    }
}
