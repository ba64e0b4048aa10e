/*!
 * One-shot transcript summarization.
 *
 * Pure pass-through to the text-generation service: the whole transcript
 * text goes out, a summary comes back. No state is kept between calls.
 */

use log::debug;

use crate::app_config::SummarizerConfig;
use crate::errors::ProviderError;
use crate::providers::openai::{ChatRequest, OpenAi};

/// Summarization facade over the generation provider
#[derive(Debug)]
pub struct SummaryService {
    client: OpenAi,
    model: String,
    system_prompt: String,
}

impl SummaryService {
    /// Build the service from configuration
    pub fn new(config: &SummarizerConfig) -> Self {
        SummaryService {
            client: OpenAi::new(config.api_key.clone(), config.endpoint.clone()),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
        }
    }

    /// Summarize a transcript's plain text
    pub async fn summarize(&self, transcript_text: &str) -> Result<String, ProviderError> {
        debug!(
            "Requesting summary of {} characters from {}",
            transcript_text.len(),
            self.model
        );

        let request = ChatRequest::new(&self.model)
            .add_message("system", &self.system_prompt)
            .add_message("user", transcript_text);

        let response = self.client.complete(request).await?;

        Ok(OpenAi::extract_text_from_response(&response))
    }
}
