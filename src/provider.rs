//! Docstring providers that turn a code fragment into a docstring.
//!
//! The pipeline only sees [`DocstringProvider`]. Behind it, a
//! [`PromptedProvider`] trims the fragment with a [`Truncate`] strategy,
//! wraps it in a prompt, and hands it to a [`Completion`] backend: either a
//! live text-completion endpoint or a fixed mock reply.

use crate::config::Config;
use crate::trace::Trace;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Opening marker every docstring starts with.
pub const DOCSTRING_OPEN: &str = "\"\"\"";

/// Mock completion text, closed the way a live reply would be.
const MOCK_REPLY: &str =
    "\nTHIS IS A MOCK DOCSTRING. Set mock_calls to false to get real ones.\n\"\"\"";

/// Source of docstrings for the splice pipeline.
pub trait DocstringProvider {
    fn fetch_for_span(&mut self, text: &str) -> Result<String>;
    fn fetch_for_file(&mut self, text: &str) -> Result<String>;
}

// -- Truncation ---------------------------------------------------------------

/// Length-limiting strategy applied to code before it is sent out.
pub trait Truncate {
    fn truncate<'a>(&self, text: &'a str) -> &'a str;
}

/// Pass text through untouched.
pub struct Unlimited;

impl Truncate for Unlimited {
    fn truncate<'a>(&self, text: &'a str) -> &'a str {
        text
    }
}

/// Keep at most this many characters. Never splits a character.
pub struct CharBudget(pub usize);

impl Truncate for CharBudget {
    fn truncate<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.0) {
            Some((end, _)) => &text[..end],
            None => text,
        }
    }
}

/// Pick a strategy from the configured limit (0 means no limit).
pub fn truncation_for(max_chars: usize) -> Box<dyn Truncate> {
    if max_chars == 0 {
        Box::new(Unlimited)
    } else {
        Box::new(CharBudget(max_chars))
    }
}

// -- Completion backends ------------------------------------------------------

/// A text-completion service: prompt in, continuation out.
pub trait Completion {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Returns a fixed placeholder without any network traffic.
pub struct MockCompletion;

impl Completion for MockCompletion {
    fn complete(&self, _prompt: &str) -> Result<String> {
        Ok(MOCK_REPLY.to_string())
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    text: String,
}

impl CompletionReply {
    fn into_text(self) -> Result<String> {
        match self.choices.into_iter().next() {
            Some(choice) => Ok(choice.text),
            None => bail!("completion reply has no choices"),
        }
    }
}

/// Blocking client for an OpenAI-compatible `/completions` endpoint.
pub struct HttpCompletion {
    agent: ureq::Agent,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl HttpCompletion {
    pub fn new(config: &Config) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
            url: format!("{}/completions", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_reply_tokens,
        }
    }
}

impl Completion for HttpCompletion {
    fn complete(&self, prompt: &str) -> Result<String> {
        let body = CompletionRequest {
            model: &self.model,
            prompt,
            temperature: 0.0,
            max_tokens: self.max_tokens,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        };

        let response = match self
            .agent
            .post(&self.url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let detail = response.into_string().unwrap_or_default();
                bail!("{} returned status {}: {}", self.url, code, detail.trim());
            }
            Err(e) => return Err(e).with_context(|| format!("request to {} failed", self.url)),
        };

        let reply: CompletionReply = response
            .into_json()
            .with_context(|| format!("malformed reply from {}", self.url))?;
        reply.into_text()
    }
}

// -- Prompted provider --------------------------------------------------------

/// Build the docstring prompt for a code fragment.
pub fn docstring_prompt(code: &str) -> String {
    format!(
        "Write a docstring for the following code:\n\n{}\n\nDocstring:\n{}",
        code, DOCSTRING_OPEN
    )
}

/// Provider that prompts a completion backend for every request.
pub struct PromptedProvider<C: Completion> {
    completion: C,
    limit: Box<dyn Truncate>,
    trace: Trace,
}

impl<C: Completion> PromptedProvider<C> {
    pub fn new(completion: C, limit: Box<dyn Truncate>, trace: Trace) -> Self {
        Self {
            completion,
            limit,
            trace,
        }
    }

    fn request(&mut self, what: &str, code: &str) -> Result<String> {
        let trimmed = self.limit.truncate(code);
        if trimmed.len() < code.len() {
            eprintln!(
                "warning: {} truncated to {} characters before sending",
                what,
                trimmed.chars().count()
            );
        }

        let prompt = docstring_prompt(trimmed);
        self.trace.rule()?;
        self.trace.note(&format!("{} request. I will send over this prompt:\n", what))?;
        self.trace.note(&prompt)?;

        let reply = self
            .completion
            .complete(&prompt)
            .with_context(|| format!("failed to fetch docstring for {}", what))?;
        let docstring = format!("{}{}", DOCSTRING_OPEN, reply);

        self.trace.note("Got the docstring:\n")?;
        self.trace.note(&docstring)?;
        Ok(docstring)
    }
}

impl<C: Completion> DocstringProvider for PromptedProvider<C> {
    fn fetch_for_span(&mut self, text: &str) -> Result<String> {
        self.request("function", text)
    }

    fn fetch_for_file(&mut self, text: &str) -> Result<String> {
        self.request("file", text)
    }
}

/// Build the provider a configuration asks for.
pub fn from_config(config: &Config, trace: Trace) -> Box<dyn DocstringProvider> {
    let limit = truncation_for(config.max_input_chars);
    if config.mock_calls {
        Box::new(PromptedProvider::new(MockCompletion, limit, trace))
    } else {
        Box::new(PromptedProvider::new(HttpCompletion::new(config), limit, trace))
    }
}
