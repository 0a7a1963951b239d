//! Conversational summary of a diagnosis from a hosted chat-completions model.
//!
//! Never fails the caller: transport or API problems are logged and replaced
//! with fixed advice to contact a veterinarian.

use metrics::counter;
use pawdx_schema::Prediction;
use serde::{Deserialize, Serialize};

use crate::config::ExplainerConfig;

const SUMMARY_MAX_TOKENS: u32 = 500;
const SUMMARY_TEMPERATURE: f32 = 0.7;
const FOLLOW_UP_MAX_TOKENS: u32 = 300;
const FOLLOW_UP_TEMPERATURE: f32 = 0.6;
const PROMPT_PREDICTIONS: usize = 3;

pub const SUMMARY_EMPTY: &str = "I apologize, but I'm unable to provide an assessment at this time. Please consult with your veterinarian directly.";
pub const SUMMARY_UNAVAILABLE: &str = "I'm experiencing technical difficulties right now. For your dog's safety, please contact your veterinarian directly to discuss these symptoms.";
pub const FOLLOW_UP_EMPTY: &str = "I recommend discussing this specific question with your veterinarian for the most accurate guidance.";
pub const FOLLOW_UP_UNAVAILABLE: &str = "I'm unable to answer that question right now. Please contact your veterinarian for specific guidance about your dog's condition.";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a compassionate veterinary AI assistant helping dog owners understand their pet's symptoms.
Your role is to translate technical medical predictions into friendly, empathetic language that regular dog owners can understand.

Guidelines:
- Be empathetic and understanding - pet owners are worried about their dogs
- Use plain English, avoid medical jargon
- Always emphasize that this is guidance only and veterinary care is essential
- For emergency conditions, stress urgency clearly but calmly
- Provide practical next steps
- Be reassuring when appropriate, but never downplay serious conditions

Respond in a warm, professional tone as if speaking directly to a concerned dog owner.";

#[derive(Debug, thiserror::Error)]
pub enum ExplainerError {
    #[error("explainer disabled: no API key configured")]
    Disabled,
    #[error("explainer request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("explainer returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Serialize)]
struct ChatMessage<'a> { role: &'a str, content: &'a str }

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    top_p: f32,
    top_k: u32,
    presence_penalty: f32,
    frequency_penalty: f32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse { #[serde(default)] choices: Vec<ChatChoice> }
#[derive(Deserialize)]
struct ChatChoice { message: ChatReply }
#[derive(Deserialize)]
struct ChatReply { content: Option<String> }

fn percent(confidence: f64) -> i64 { (confidence * 100.0).round() as i64 }

pub fn summary_prompt(symptoms: &[String], predictions: &[Prediction]) -> String {
    let ranked = predictions.iter().take(PROMPT_PREDICTIONS).enumerate()
        .map(|(i, p)| format!("{}. {} ({}% confidence)\n   - {}\n   - Recommended action: {}", i + 1, p.disease, percent(p.confidence), p.description, p.action))
        .collect::<Vec<_>>().join("\n");
    format!("The dog owner reported these symptoms: {}

Based on our analysis, here are the most likely conditions:
{ranked}

Please provide a compassionate, clear response that:
1. Acknowledges the owner's concern
2. Explains the most likely condition(s) in simple terms
3. Provides clear next steps
4. Includes any immediate care advice if appropriate
5. Emphasizes the importance of professional veterinary care

Keep the response concise but thorough (2-3 paragraphs).", symptoms.join(", "))
}

pub fn follow_up_system_prompt(symptoms: &[String], predictions: &[Prediction]) -> String {
    let likely = predictions.iter().take(PROMPT_PREDICTIONS).map(|p| format!("{} ({}%)", p.disease, percent(p.confidence))).collect::<Vec<_>>().join(", ");
    format!("You are a veterinary AI assistant answering follow-up questions about a dog's symptoms and diagnosis.

Context: The dog has these symptoms: {}
Most likely conditions: {likely}

Guidelines:
- Answer the specific question asked
- Stay within the context of the provided symptoms and diagnosis
- Be helpful but always defer to professional veterinary advice for medical decisions
- If asked about treatment, emphasize veterinary consultation
- If asked about emergency signs, be clear and specific
- Keep responses concise and actionable", symptoms.join(", "))
}

pub struct Explainer {
    cfg: ExplainerConfig,
    client: reqwest::Client,
}

impl Explainer {
    pub fn new(cfg: ExplainerConfig) -> Result<Self, ExplainerError> {
        let client = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        if cfg.api_key.is_none() { tracing::warn!("FIREWORKS_API_KEY not set, explanations will use canned text"); }
        Ok(Self { cfg, client })
    }

    pub fn enabled(&self) -> bool { self.cfg.api_key.is_some() }

    async fn call(&self, system: &str, user: &str, max_tokens: u32, temperature: f32) -> Result<Option<String>, ExplainerError> {
        let key = self.cfg.api_key.as_deref().ok_or(ExplainerError::Disabled)?;
        let body = ChatRequest {
            model: &self.cfg.model, max_tokens, top_p: 1.0, top_k: 40, presence_penalty: 0.0, frequency_penalty: 0.0, temperature,
            messages: vec![ChatMessage { role: "system", content: system }, ChatMessage { role: "user", content: user }],
        };
        let resp = self.client.post(&self.cfg.endpoint).bearer_auth(key).header("Accept", "application/json").json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExplainerError::Status { status: status.as_u16(), body });
        }
        let parsed: ChatResponse = resp.json().await?;
        Ok(parsed.choices.into_iter().next().and_then(|c| c.message.content).filter(|c| !c.trim().is_empty()))
    }

    /// Prose for a fresh diagnosis, or an answer to `follow_up` when given.
    pub async fn chat_response(&self, symptoms: &[String], predictions: &[Prediction], follow_up: Option<&str>) -> String {
        let (result, empty, unavailable) = match follow_up {
            Some(q) => (self.call(&follow_up_system_prompt(symptoms, predictions), q, FOLLOW_UP_MAX_TOKENS, FOLLOW_UP_TEMPERATURE).await, FOLLOW_UP_EMPTY, FOLLOW_UP_UNAVAILABLE),
            None => (self.call(SUMMARY_SYSTEM_PROMPT, &summary_prompt(symptoms, predictions), SUMMARY_MAX_TOKENS, SUMMARY_TEMPERATURE).await, SUMMARY_EMPTY, SUMMARY_UNAVAILABLE),
        };
        match result {
            Ok(Some(text)) => { counter!("explainer_calls_total", "outcome" => "ok").increment(1); text }
            Ok(None) => { counter!("explainer_calls_total", "outcome" => "empty").increment(1); empty.to_string() }
            Err(ExplainerError::Disabled) => { counter!("explainer_calls_total", "outcome" => "disabled").increment(1); unavailable.to_string() }
            Err(e) => {
                tracing::error!(error = %e, follow_up = follow_up.is_some(), "explainer call failed");
                counter!("explainer_calls_total", "outcome" => "error").increment(1);
                unavailable.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawdx_schema::Severity;
    use std::time::Duration;

    fn pred(disease: &str, confidence: f64) -> Prediction {
        Prediction { disease: disease.into(), confidence, description: format!("About {disease}."), action: "Veterinary consultation within 24 hours".into(), severity: Severity::Medium }
    }

    #[test]
    fn summary_prompt_lists_top_three() {
        let preds = vec![pred("Gastroenteritis", 0.7), pred("Parvovirus", 0.66), pred("Kennel Cough", 0.3), pred("Diabetes", 0.2)];
        let p = summary_prompt(&["Vomiting".into(), "Diarrhea".into()], &preds);
        assert!(p.starts_with("The dog owner reported these symptoms: Vomiting, Diarrhea"));
        assert!(p.contains("1. Gastroenteritis (70% confidence)"));
        assert!(p.contains("3. Kennel Cough (30% confidence)"));
        assert!(p.contains("   - About Parvovirus."));
        assert!(!p.contains("Diabetes"));
    }

    #[test]
    fn follow_up_prompt_embeds_context() {
        let p = follow_up_system_prompt(&["Coughing".into()], &[pred("Kennel Cough", 0.57)]);
        assert!(p.contains("The dog has these symptoms: Coughing"));
        assert!(p.contains("Most likely conditions: Kennel Cough (57%)"));
    }

    #[tokio::test]
    async fn disabled_explainer_returns_canned_text() {
        let ex = Explainer::new(ExplainerConfig::default()).unwrap();
        assert!(!ex.enabled());
        assert_eq!(ex.chat_response(&[], &[], None).await, SUMMARY_UNAVAILABLE);
        assert_eq!(ex.chat_response(&[], &[], Some("Is it contagious?")).await, FOLLOW_UP_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unreachable_endpoint_degrades() {
        let cfg = ExplainerConfig { api_key: Some("k".into()), endpoint: "http://127.0.0.1:9/v1/chat/completions".into(), timeout: Duration::from_secs(2), ..ExplainerConfig::default() };
        let ex = Explainer::new(cfg).unwrap();
        assert_eq!(ex.chat_response(&["Fever".into()], &[pred("Flu", 0.5)], None).await, SUMMARY_UNAVAILABLE);
    }
}
