//! Opponent that asks an LLM for its next move.

use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::games::rps::Move;
use crate::llm_client::LlmClient;
use crate::opponent::{MoveSuggester, MoveSuggestion, SuggestionError};

const SYSTEM_PROMPT: &str = "You are an expert Rock Paper Scissors player facing a human. \
Try to win while staying unpredictable. Study the human's past moves, guess their next one, \
and pick the move that beats it. Reply with a single JSON object and nothing else, for example: \
{\"aiMove\": \"Paper\", \"reasoning\": \"They opened with Rock twice.\"}";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Reply {
    ai_move: String,
    #[serde(default)]
    reasoning: String,
}

/// LLM-backed opponent.
#[derive(Debug, Clone)]
pub struct LlmSuggester {
    name: String,
    client: LlmClient,
}

impl LlmSuggester {
    /// Creates an opponent that asks `client` for moves.
    #[instrument(skip(client))]
    pub fn new(name: String, client: LlmClient) -> Self {
        info!(model = %client.config().model(), "Creating LLM opponent");
        Self { name, client }
    }

    /// Builds the user message describing the human's history.
    pub fn describe_history(history: &[Move]) -> String {
        if history.is_empty() {
            "The human has not played yet. Choose your opening move.".to_string()
        } else {
            let moves: Vec<String> = history.iter().map(Move::to_string).collect();
            format!(
                "Here are the moves the human has made so far, oldest first: [{}]. \
                 Which move do you play next?",
                moves.join(", ")
            )
        }
    }

    /// Extracts a suggestion from a model reply.
    ///
    /// Tolerates prose or code fences around the JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`SuggestionError`] if no JSON object with a valid move is found.
    #[instrument(skip(reply), fields(reply_len = reply.len()))]
    pub fn parse_reply(reply: &str) -> Result<MoveSuggestion, SuggestionError> {
        let start = reply
            .find('{')
            .ok_or_else(|| SuggestionError::new("No JSON object in reply"))?;
        let end = reply
            .rfind('}')
            .filter(|&end| end > start)
            .ok_or_else(|| SuggestionError::new("Unterminated JSON object in reply"))?;

        let parsed: Reply = serde_json::from_str(&reply[start..=end])
            .map_err(|e| SuggestionError::new(format!("Malformed reply: {}", e)))?;
        let mv = Move::from_str(parsed.ai_move.trim())
            .map_err(|_| SuggestionError::new(format!("Unknown move '{}'", parsed.ai_move)))?;

        debug!(%mv, "Parsed suggestion");
        Ok(MoveSuggestion::new(mv, parsed.reasoning))
    }
}

#[async_trait]
impl MoveSuggester for LlmSuggester {
    #[instrument(skip(self, history), fields(opponent = %self.name, history_len = history.len()))]
    async fn suggest(&self, history: &[Move]) -> Result<MoveSuggestion, SuggestionError> {
        let reply = self
            .client
            .generate(SYSTEM_PROMPT, &Self::describe_history(history))
            .await
            .map_err(|e| SuggestionError::new(e.message))?;
        Self::parse_reply(&reply)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
