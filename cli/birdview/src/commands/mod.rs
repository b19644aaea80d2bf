mod browse;
mod list;
mod show;

use std::fmt;

use anyhow::Result;
use bpaf::Bpaf;
use indoc::indoc;
use tracing::debug;

use crate::config::Config;
use crate::utils::init::init_controller;

static BIRDVIEW_DESCRIPTION: &'_ str = indoc! {"
    Browse the Nuthatch bird catalog.\n\n

    List birds page by page, filter them by conservation status,
    and look up single birds by their catalog id."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, descr(BIRDVIEW_DESCRIPTION))]
pub struct BirdviewCli(#[bpaf(external(birdview_args))] pub BirdviewArgs);

/// Main birdview args parser
///
/// To parse the command line, use [`BirdviewCli`] instead using [`birdview_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)]
pub struct BirdviewArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands))]
    command: Commands,
}

impl BirdviewArgs {
    pub async fn handle(self, config: Config) -> Result<()> {
        debug!(?config, "starting birdview");
        let controller = init_controller(&config)?;

        match self.command {
            Commands::List(args) => args.handle(&controller).await,
            Commands::Show(args) => args.handle(&controller).await,
            Commands::Browse(args) => args.handle(&controller).await,
        }
    }
}

#[derive(Bpaf, Clone)]
enum Commands {
    /// List a page of birds
    #[bpaf(command, short('l'))]
    List(#[bpaf(external(list::list))] list::List),

    /// Show details about a single bird
    #[bpaf(command)]
    Show(#[bpaf(external(show::show))] show::Show),

    /// Browse the catalog interactively
    #[bpaf(command)]
    Browse(#[bpaf(external(browse::browse))] browse::Browse),
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command")
    }
}

#[cfg(test)]
mod tests {
    use bpaf::ParseFailure;
    use pretty_assertions::assert_eq;

    use super::*;

    fn try_parse(args: &[&str]) -> Result<BirdviewArgs, ParseFailure> {
        birdview_cli()
            .run_inner(args)
            .map(|BirdviewCli(args)| args)
    }

    fn parse(args: &[&str]) -> BirdviewArgs {
        try_parse(args).unwrap()
    }

    #[test]
    fn verbosity_flags() {
        assert_eq!(parse(&["list"]).verbosity, Verbosity::Verbose(0));
        assert_eq!(parse(&["-vv", "list"]).verbosity, Verbosity::Verbose(2));
        assert_eq!(parse(&["-q", "browse"]).verbosity, Verbosity::Quiet);
    }

    #[test]
    fn list_arguments() {
        let args = parse(&["list", "--page", "3", "--status", "LC", "--json"]);
        let Commands::List(list) = args.command else {
            panic!("expected list command");
        };
        assert_eq!(list.page, 3);
        assert_eq!(list.status.as_deref(), Some("LC"));
        assert!(list.json);
    }

    #[test]
    fn list_defaults_to_first_page() {
        let Commands::List(list) = parse(&["list"]).command else {
            panic!("expected list command");
        };
        assert_eq!(list.page, 1);
        assert_eq!(list.status, None);
        assert!(!list.json);
    }

    #[test]
    fn show_requires_an_id() {
        assert!(try_parse(&["show"]).is_err());

        let Commands::Show(show) = parse(&["show", "42"]).command else {
            panic!("expected show command");
        };
        assert_eq!(show.id, "42");
    }

    #[test]
    fn a_command_is_required() {
        assert!(try_parse(&[]).is_err());
    }
}
