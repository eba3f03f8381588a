//! User interaction for dj-beat-drop.
//! Every question the pipeline asks goes through the [`Prompter`] trait so the
//! orchestrators can run unattended in tests.

use dialoguer::{Confirm, Input};

use crate::error::Result;

/// Trait for asking the user questions.
pub trait Prompter {
    /// Asks a yes/no question.
    ///
    /// # Arguments
    /// * `skip_prompt` - When true the question is not asked and `true` is returned
    /// * `prompt` - Question shown to the user
    /// * `default` - Answer selected when the user just presses enter
    fn confirm(&self, skip_prompt: bool, prompt: String, default: bool) -> Result<bool>;

    /// Asks for a line of free text.
    fn text(&self, prompt: String) -> Result<String>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn confirm(&self, skip_prompt: bool, prompt: String, default: bool) -> Result<bool> {
        if skip_prompt {
            return Ok(true);
        }
        Ok(Confirm::new().with_prompt(prompt).default(default).interact()?)
    }

    fn text(&self, prompt: String) -> Result<String> {
        Ok(Input::<String>::new().with_prompt(prompt).interact_text()?)
    }
}

/// Prompter with canned answers, for non-interactive runs.
pub struct StaticPrompter {
    confirm: bool,
    text: String,
}

impl StaticPrompter {
    pub fn new(confirm: bool, text: impl Into<String>) -> Self {
        Self { confirm, text: text.into() }
    }
}

impl Prompter for StaticPrompter {
    fn confirm(&self, skip_prompt: bool, _prompt: String, _default: bool) -> Result<bool> {
        Ok(skip_prompt || self.confirm)
    }

    fn text(&self, _prompt: String) -> Result<String> {
        Ok(self.text.clone())
    }
}
