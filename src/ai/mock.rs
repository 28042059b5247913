use super::VisionService;
use crate::models::ImageInput;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub struct MockVisionClient {
    responses: Arc<Mutex<Vec<String>>>,
    error: Arc<Mutex<Option<(u16, String)>>>,
    requests: Arc<Mutex<Vec<ImageInput>>>,
}

impl MockVisionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            error: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Every call fails with an [`Error::Api`] carrying this status and message.
    pub fn with_api_error(self, status: u16, message: String) -> Self {
        *self.error.lock().unwrap() = Some((status, message));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ImageInput> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockVisionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionService for MockVisionClient {
    async fn describe_image(&self, input: &ImageInput) -> Result<String> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(input.clone());
            requests.len()
        };

        if let Some((status, message)) = self.error.lock().unwrap().clone() {
            return Err(Error::Api { status, message });
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(format!(
                "A {} image of {} bytes",
                input.mime_type,
                input.bytes.len()
            ))
        } else {
            let index = (count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}
