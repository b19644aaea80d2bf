use std::fmt::Display;

use inquire::InquireError;
use inquire::error::InquireResult;
use inquire::ui::{Color, RenderConfig, Styled};

use super::TERMINAL_STDERR;

#[derive(Debug, Clone)]
pub struct Select<T> {
    pub options: Vec<T>,
}

#[derive(Debug, Clone, Default)]
pub struct Text {
    pub initial: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Dialog<'a, Type> {
    pub message: &'a str,
    pub help_message: Option<&'a str>,
    pub typed: Type,
}

/// Inquire prompts block the thread, run them off the async runtime.
async fn run_blocking<T: Send + 'static>(
    prompt: impl FnOnce() -> InquireResult<T> + Send + 'static,
) -> InquireResult<T> {
    tokio::task::spawn_blocking(move || {
        let _stderr_lock = TERMINAL_STDERR.lock();
        prompt()
    })
    .await
    .map_err(|err| InquireError::Custom(err.into()))?
}

struct Choice(usize, String);
impl Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.1.fmt(f)
    }
}

impl<T: Display> Dialog<'_, Select<T>> {
    pub async fn prompt(self) -> InquireResult<T> {
        let message = self.message.to_owned();
        let help_message = self.help_message.map(ToOwned::to_owned);
        let mut options = self.typed.options;

        let choices = options
            .iter()
            .map(ToString::to_string)
            .enumerate()
            .map(|(id, value)| Choice(id, value))
            .collect();

        let Choice(id, _) = run_blocking(move || {
            let mut dialog =
                inquire::Select::new(&message, choices).with_render_config(birdview_theme());

            if let Some(ref help_message) = help_message {
                dialog = dialog.with_help_message(help_message);
            }

            dialog.prompt()
        })
        .await?;

        Ok(options.remove(id))
    }
}

impl Dialog<'_, Text> {
    pub async fn prompt(self) -> InquireResult<String> {
        let message = self.message.to_owned();
        let help_message = self.help_message.map(ToOwned::to_owned);
        let initial = self.typed.initial;

        run_blocking(move || {
            let mut dialog = inquire::Text::new(&message).with_render_config(birdview_theme());

            if let Some(ref initial) = initial {
                dialog = dialog.with_initial_value(initial);
            }
            if let Some(ref help_message) = help_message {
                dialog = dialog.with_help_message(help_message);
            }

            dialog.prompt()
        })
        .await
    }
}

/// Whether the user backed out of a prompt with escape or ctrl-c.
pub fn is_cancelled(err: &InquireError) -> bool {
    matches!(
        err,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

pub fn birdview_theme() -> RenderConfig<'static> {
    RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("?").with_fg(Color::LightCyan))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(Color::LightGreen))
}
