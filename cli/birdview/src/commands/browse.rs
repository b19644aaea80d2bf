use std::fmt::Display;
use std::io::IsTerminal;

use anyhow::{Result, bail};
use birdview_sdk::controller::ViewController;
use birdview_sdk::state::AppState;
use bpaf::Bpaf;
use nuthatch_catalog::ClientTrait;
use tracing::{debug, instrument};

use crate::utils::dialog::{Dialog, Select, Text, is_cancelled};
use crate::utils::{message, render};

// Browse the catalog interactively
#[derive(Debug, Bpaf, Clone)]
pub struct Browse {
    /// Page to start on
    #[bpaf(long, short, argument("N"), fallback(1))]
    pub page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    NextPage,
    PrevPage,
    Filter,
    Search,
    ClearSearch,
    Home,
    Quit,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Action::NextPage => "Next page",
            Action::PrevPage => "Previous page",
            Action::Filter => "Filter by status",
            Action::Search => "Look up a bird by id",
            Action::ClearSearch => "Clear search",
            Action::Home => "Back to the first page",
            Action::Quit => "Quit",
        };
        f.write_str(label)
    }
}

/// Actions that change something in the given state.
fn available_actions(state: &AppState) -> Vec<Action> {
    let on_first_page = state.page.page_number.get() == 1;
    let has_search = state.selected_detail.is_some() || !state.search_input.is_empty();

    let mut actions = vec![Action::NextPage];
    if !on_first_page {
        actions.push(Action::PrevPage);
    }
    if !state.facets().is_empty() || state.filter.selected_status.is_some() {
        actions.push(Action::Filter);
    }
    actions.push(Action::Search);
    if has_search {
        actions.push(Action::ClearSearch);
    }
    if !on_first_page || has_search {
        actions.push(Action::Home);
    }
    actions.push(Action::Quit);
    actions
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FilterChoice {
    All,
    Status(String),
}

impl Display for FilterChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterChoice::All => f.write_str("All statuses"),
            FilterChoice::Status(status) => f.write_str(status),
        }
    }
}

fn filter_choices(state: &AppState) -> Vec<FilterChoice> {
    std::iter::once(FilterChoice::All)
        .chain(state.facets().into_iter().map(FilterChoice::Status))
        .collect()
}

impl Browse {
    #[instrument(name = "browse", skip_all)]
    pub async fn handle(self, controller: &ViewController<impl ClientTrait>) -> Result<()> {
        if !std::io::stdin().is_terminal() {
            bail!("'birdview browse' needs an interactive terminal, try 'birdview list' instead");
        }

        controller.request_page(self.page).await;

        loop {
            let state = controller.snapshot();
            println!("{}", render::page(&state));
            if let Some(detail) = &state.selected_detail {
                println!("\n{}", render::detail(detail));
            }
            if let Some(status) = render::status_line(&state) {
                message::warning(status);
            }

            let dialog = Dialog {
                message: "What next?",
                help_message: None,
                typed: Select {
                    options: available_actions(&state),
                },
            };
            let action = match dialog.prompt().await {
                Ok(action) => action,
                Err(err) if is_cancelled(&err) => break,
                Err(err) => Err(err)?,
            };
            debug!(%action, "selected action");

            match action {
                Action::NextPage => controller.next_page().await,
                Action::PrevPage => controller.prev_page().await,
                Action::Filter => {
                    let dialog = Dialog {
                        message: "Show birds with status",
                        help_message: None,
                        typed: Select {
                            options: filter_choices(&state),
                        },
                    };
                    match dialog.prompt().await {
                        Ok(FilterChoice::All) => controller.set_filter(None),
                        Ok(FilterChoice::Status(status)) => controller.set_filter(Some(&status)),
                        Err(err) if is_cancelled(&err) => {},
                        Err(err) => Err(err)?,
                    }
                },
                Action::Search => {
                    let dialog = Dialog {
                        message: "Bird id:",
                        help_message: Some("Leave empty to go back"),
                        typed: Text {
                            initial: Some(state.search_input.clone()).filter(|s| !s.is_empty()),
                        },
                    };
                    match dialog.prompt().await {
                        Ok(input) => {
                            controller.set_search_input(input);
                            controller.submit_search().await;
                        },
                        Err(err) if is_cancelled(&err) => {},
                        Err(err) => Err(err)?,
                    }
                },
                Action::ClearSearch => controller.clear_search(),
                Action::Home => controller.reset_to_home().await,
                Action::Quit => break,
            }
        }

        Ok(())
    }
}
