//! Question answering over indexed chapters.
//!
//! Retrieves the top-k chapters for a question, assembles them into a
//! context prompt, and asks the chat model for a grounded answer.

use crate::config::QaSettings;
use crate::error::{KapitelError, Result};
use crate::openai::create_client;
use crate::retrieval::{RetrievedMatch, Retriever};
use crate::timestamp::format_seconds;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

const SYSTEM_PROMPT: &str = "You answer the user's questions based on the provided context.";

const BASE_PROMPT: &str = "The following is a set of chapters from transcribed podcasts. \
Answer the question that follows them using the information in the chapters. \
Provide detailed, factually accurate and thorough answers. \
Quote the speakers of the podcast liberally when it helps answer the question better. \
Refer to speakers in the podcast in the third person.";

/// Answer shown when nothing has been indexed yet.
const EMPTY_INDEX_ANSWER: &str =
    "No chapters have been indexed yet, so I have nothing to answer from. \
Run the chapterize and index commands first.";

/// QA engine for question answering with chapter sources.
pub struct QaEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    top_k: usize,
    retriever: Arc<Retriever>,
    conversation_history: Vec<ChatCompletionRequestMessage>,
}

impl QaEngine {
    /// Create a QA engine over a retriever.
    pub fn new(retriever: Arc<Retriever>, settings: &QaSettings) -> Self {
        Self {
            client: create_client(),
            model: settings.model.clone(),
            top_k: settings.top_k,
            retriever,
            conversation_history: Vec::new(),
        }
    }

    /// Ask a single question and get a grounded answer.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str) -> Result<QaResponse> {
        info!("Processing question");

        let sources = match self.retriever.search(question, self.top_k).await {
            Ok(matches) => matches,
            Err(KapitelError::EmptyIndex) => {
                return Ok(QaResponse {
                    answer: EMPTY_INDEX_ANSWER.to_string(),
                    sources: Vec::new(),
                });
            }
            Err(e) => return Err(e),
        };

        let user_prompt = build_prompt(question, &sources);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| KapitelError::Qa(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| KapitelError::Qa(e.to_string()))?
                .into(),
        ];

        let answer = self.complete(messages).await?;

        debug!("Generated answer with {} sources", sources.len());
        Ok(QaResponse { answer, sources })
    }

    /// Continue a chat session; each turn retrieves fresh context.
    #[instrument(skip(self), fields(message = %message))]
    pub async fn chat(&mut self, message: &str) -> Result<QaResponse> {
        let sources = match self.retriever.search(message, self.top_k).await {
            Ok(matches) => matches,
            Err(KapitelError::EmptyIndex) => Vec::new(),
            Err(e) => return Err(e),
        };

        let user_content = if sources.is_empty() {
            format!("Question: {}\n\n(No relevant chapters found)", message)
        } else {
            build_prompt(message, &sources)
        };

        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(user_content)
            .build()
            .map_err(|e| KapitelError::Qa(e.to_string()))?;
        self.conversation_history.push(user_message.into());

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| KapitelError::Qa(e.to_string()))?
                .into(),
        ];
        messages.extend(self.conversation_history.clone());

        let answer = self.complete(messages).await?;

        let assistant_message = ChatCompletionRequestAssistantMessageArgs::default()
            .content(answer.clone())
            .build()
            .map_err(|e| KapitelError::Qa(e.to_string()))?;
        self.conversation_history.push(assistant_message.into());

        // Keep the tail of long conversations
        if self.conversation_history.len() > 20 {
            self.conversation_history = self.conversation_history
                [self.conversation_history.len() - 20..]
                .to_vec();
        }

        Ok(QaResponse { answer, sources })
    }

    /// Clear conversation history.
    pub fn clear_history(&mut self) {
        self.conversation_history.clear();
    }

    async fn complete(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.0)
            .build()
            .map_err(|e| KapitelError::Qa(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| KapitelError::OpenAI(format!("Failed to generate answer: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .cloned()
            .ok_or_else(|| KapitelError::Qa("Empty response from LLM".to_string()))
    }
}

/// Assemble the user prompt: instructions, retrieved chapters, question.
fn build_prompt(question: &str, matches: &[RetrievedMatch]) -> String {
    let context = matches
        .iter()
        .map(|m| {
            format!(
                "Podcast Name: {}\nEpisode Title: {}\nChapter Title: {}\nTranscript:\n{}",
                m.payload.podcast_title,
                m.payload.episode_title,
                m.payload.chapter_title,
                m.payload.chapter_transcript
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{}\n\n{}\n\n{}", BASE_PROMPT, context, question)
}

/// A QA response with answer and chapter sources.
#[derive(Debug, Clone)]
pub struct QaResponse {
    /// The generated answer.
    pub answer: String,
    /// Chapters the answer was grounded on.
    pub sources: Vec<RetrievedMatch>,
}

impl QaResponse {
    /// Format the response for terminal display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for source in &self.sources {
                output.push_str(&format!(
                    "\n{} / {} / {} @ {} (score: {:.2})",
                    source.payload.podcast_title,
                    source.payload.episode_title,
                    source.payload.chapter_title,
                    format_seconds(source.payload.start_timestamp),
                    source.score
                ));
            }
        }

        output
    }
}
