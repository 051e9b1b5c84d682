// ATS scoring and resume rewriting.
// All model calls go through llm_client::Generator; nothing here talks HTTP.

pub mod ats_scoring;
pub mod prompts;
pub mod rewriter;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::llm_client::normalize::normalize_json_reply;
use crate::llm_client::{GenerationError, Generator};

/// Failure of a scoring or rewrite call.
///
/// Generation failures and undecodable replies travel the same `Result` channel;
/// callers tell them apart by variant.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Model reply is not valid JSON for this schema: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Sends `prompt` through the generator, isolates the JSON object in the reply
/// and decodes it as `T`.
pub(crate) async fn generate_json<T: DeserializeOwned>(
    generator: &dyn Generator,
    prompt: &str,
    credential: &str,
    preferred_model: &str,
) -> Result<T, ServiceError> {
    let raw = generator
        .generate(prompt, credential, preferred_model)
        .await?;

    let json = normalize_json_reply(&raw);
    debug!(chars = json.len(), "Normalized model reply");

    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
pub(crate) mod stub {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{GenerationError, Generator};

    /// Replays canned replies in order and records the prompts it was given.
    pub struct StubGenerator {
        replies: Mutex<VecDeque<Result<String, GenerationError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        pub fn with_replies(replies: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::with_replies(vec![Ok(text.to_string())])
        }

        pub fn failing(error: GenerationError) -> Self {
            Self::with_replies(vec![Err(error)])
        }

        pub fn last_prompt(&self) -> String {
            self.prompts
                .lock()
                .unwrap()
                .last()
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Generator for StubGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _credential: &str,
            _preferred_model: &str,
        ) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("StubGenerator ran out of replies")
        }
    }
}
