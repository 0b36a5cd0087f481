// SPDX-FileCopyrightText: 2026 Cadent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request construction for the generation service: instruction assembly
//! and the temperature ramp that keeps repeat messages from sounding like
//! copies of each other.

use serde::Serialize;

use cadent_core::types::GenerationRequest;

/// Wire payload POSTed to the generation service.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationPayload {
    pub tone: String,
    pub client_context: String,
    pub business_context: String,
    /// Summaries of prior same-campaign messages, oldest first.
    pub prior_messages: Vec<String>,
    pub instructions: Vec<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Baseline temperature for the first message of a campaign; later
/// messages use the elevated value so phrasing drifts between sends.
pub fn temperature_for(prior_count: usize, base: f32, elevated: f32) -> f32 {
    if prior_count == 0 { base } else { elevated }
}

/// Build the upstream payload for one generation call.
pub fn build_payload(
    request: &GenerationRequest,
    temperature: f32,
    max_tokens: u32,
) -> GenerationPayload {
    let mut instructions = vec![
        format!(
            "Write a short follow-up email in a {} tone. \
             Return the subject line and body.",
            request.requested_tone
        ),
    ];

    if !request.prior_messages.is_empty() {
        instructions.push(
            "Earlier messages in this thread are listed in prior_messages. \
             Do not reuse their openings, structure, or phrasing; say something new."
                .to_string(),
        );
    }
    if request.attempt_index > 0 {
        instructions.push(format!(
            "This is follow-up number {} for this client.",
            request.attempt_index + 1
        ));
    }

    GenerationPayload {
        tone: request.requested_tone.clone(),
        client_context: request.client_context.clone(),
        business_context: request.business_context.clone(),
        prior_messages: request.prior_messages.clone(),
        instructions,
        temperature,
        max_tokens,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prior: Vec<String>) -> GenerationRequest {
        GenerationRequest {
            owner_id: "owner-1".into(),
            client_context: "Ada, invoice #42 outstanding".into(),
            business_context: "Freelance design studio".into(),
            attempt_index: prior.len() as u32,
            prior_messages: prior,
            requested_tone: "friendly".into(),
        }
    }

    #[test]
    fn first_message_uses_baseline_temperature() {
        assert_eq!(temperature_for(0, 0.7, 0.9), 0.7);
    }

    #[test]
    fn later_messages_use_elevated_temperature() {
        assert_eq!(temperature_for(1, 0.7, 0.9), 0.9);
        assert_eq!(temperature_for(4, 0.7, 0.9), 0.9);
    }

    #[test]
    fn variation_instruction_only_with_history() {
        let fresh = build_payload(&request(vec![]), 0.7, 1024);
        assert_eq!(fresh.instructions.len(), 1);

        let repeat = build_payload(
            &request(vec!["Sent a gentle nudge about invoice #42".into()]),
            0.9,
            1024,
        );
        assert!(repeat
            .instructions
            .iter()
            .any(|i| i.contains("Do not reuse")));
        assert_eq!(repeat.prior_messages.len(), 1);
    }

    #[test]
    fn payload_carries_tone_and_contexts() {
        let payload = build_payload(&request(vec![]), 0.7, 512);
        assert_eq!(payload.tone, "friendly");
        assert!(payload.client_context.contains("invoice #42"));
        assert_eq!(payload.temperature, 0.7);
        assert_eq!(payload.max_tokens, 512);
    }
}
