use super::render::{self, DetailControls};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use popcorn_catalog::create_catalog;
use popcorn_config::Config;
use popcorn_core::{DetailState, SearchState, Session, SessionEvent, SessionOptions};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

const HELP: &str = "\
Commands:
  <text>            search for <text>
  /q <text>         search for <text> (use this when the text is also a command)
  /q                clear the search
  open <n|id>       open result number <n>, or a catalog id
  close             close the open movie
  rate <1-10>       rate the open movie
  add               add the open movie to your watched list
  remove <n|id>     remove watched entry number <n>, or a catalog id
  watched           show the watched list and its summary
  results           show the current search results again
  help              show this help
  quit              leave the session";

/// A result or watched-list entry, by 1-based position or by catalog id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Position(usize),
    Id(String),
}

impl Target {
    fn parse(arg: &str) -> Self {
        match arg.parse::<usize>() {
            Ok(position) => Target::Position(position),
            Err(_) => Target::Id(arg.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveCommand {
    Query(String),
    Open(Target),
    Close,
    Rate(u8),
    Add,
    Remove(Target),
    Watched,
    Results,
    Help,
    Quit,
}

impl InteractiveCommand {
    /// Parse one input line. `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        if let Some(rest) = line.strip_prefix("/q") {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Ok(Some(InteractiveCommand::Query(rest.trim().to_string())));
            }
        }

        let (word, arg) = match line.split_once(char::is_whitespace) {
            Some((word, arg)) => (word, arg.trim()),
            None => (line, ""),
        };

        let command = match (word, arg.is_empty()) {
            ("open", false) => InteractiveCommand::Open(Target::parse(arg)),
            ("open", true) => return Err("usage: open <n|id>".to_string()),
            ("close", true) => InteractiveCommand::Close,
            ("rate", false) => {
                let value = arg
                    .parse::<u8>()
                    .map_err(|_| format!("rating must be a number between 1 and 10, got {}", arg))?;
                InteractiveCommand::Rate(value)
            }
            ("rate", true) => return Err("usage: rate <1-10>".to_string()),
            ("add", true) => InteractiveCommand::Add,
            ("remove", false) => InteractiveCommand::Remove(Target::parse(arg)),
            ("remove", true) => return Err("usage: remove <n|id>".to_string()),
            ("watched", true) => InteractiveCommand::Watched,
            ("results", true) => InteractiveCommand::Results,
            ("help", true) => InteractiveCommand::Help,
            ("quit", true) | ("exit", true) => InteractiveCommand::Quit,
            _ => InteractiveCommand::Query(line.to_string()),
        };
        Ok(Some(command))
    }
}

enum Flow {
    Continue,
    Quit,
}

pub async fn run_interactive(query: Option<String>, config: &Config, output: &Output) -> Result<()> {
    let catalog = create_catalog(config).map_err(|e| eyre!("{}", e))?;

    let mut options = SessionOptions::from(config.session.clone());
    if let Some(query) = query {
        options.default_query = query;
    }

    let mut session = Session::new(catalog, options);
    if output.is_interactive_terminal() {
        session = session.with_title_observer(|title: &str| {
            // OSC 0 sets the terminal window title
            print!("\x1b]0;{}\x07", title);
            let _ = io::stdout().flush();
        });
    }

    output.info(format!("{} (type `help` for commands)", session.display_title().bright_cyan().bold()));
    render_search_state(&session, output);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        output.prompt("> ")?;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                if let Flow::Quit = handle_line(&line, &mut session, output) {
                    break;
                }
            }
            Some(event) = session.next_event() => {
                let is_search = matches!(event, SessionEvent::SearchFinished { .. });
                if !session.apply(event) {
                    continue;
                }
                if is_search {
                    render_search_state(&session, output);
                } else {
                    render_detail_state(&session, output);
                }
            }
        }
    }

    session.shutdown();
    info!(watched = session.watched().len(), "Interactive session ended");
    Ok(())
}

fn handle_line(line: &str, session: &mut Session, output: &Output) -> Flow {
    let command = match InteractiveCommand::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Flow::Continue,
        Err(message) => {
            output.warn(message);
            return Flow::Continue;
        }
    };

    match command {
        InteractiveCommand::Query(query) => {
            session.set_query(query);
            render_search_state(session, output);
        }
        InteractiveCommand::Open(target) => {
            let imdb_id = match target {
                Target::Id(id) => Some(id),
                Target::Position(position) => position
                    .checked_sub(1)
                    .and_then(|index| session.results().get(index))
                    .map(|result| result.imdb_id.clone()),
            };
            match imdb_id {
                Some(imdb_id) => {
                    session.select_movie(imdb_id);
                    render_detail_state(session, output);
                }
                None => output.warn(format!("There is no result with that number ({} shown)", session.result_count())),
            }
        }
        InteractiveCommand::Close => {
            session.close_movie();
            output.info("Closed");
        }
        InteractiveCommand::Rate(value) => match session.set_user_rating(value) {
            Ok(()) => render_detail_state(session, output),
            Err(e) => output.warn(e.to_string()),
        },
        InteractiveCommand::Add => {
            let title = match session.detail_state() {
                DetailState::Ready(detail) => detail.title.clone(),
                _ => String::new(),
            };
            match session.confirm_add_to_watched() {
                Ok(()) => {
                    output.success(format!("Added {} to your watched list", title));
                    render::render_watched(session.watched(), output);
                }
                Err(reason) => output.warn(format!("Cannot add: {}", reason)),
            }
        }
        InteractiveCommand::Remove(target) => {
            let imdb_id = match target {
                Target::Id(id) => id,
                Target::Position(position) => match position
                    .checked_sub(1)
                    .and_then(|index| session.watched().entries().get(index))
                {
                    Some(entry) => entry.imdb_id.clone(),
                    None => {
                        output.warn("There is no watched entry with that number");
                        return Flow::Continue;
                    }
                },
            };
            if session.remove_from_watched(&imdb_id) {
                render::render_watched(session.watched(), output);
            } else {
                output.warn(format!("{} is not in your watched list", imdb_id));
            }
        }
        InteractiveCommand::Watched => render::render_watched(session.watched(), output),
        InteractiveCommand::Results => render_search_state(session, output),
        InteractiveCommand::Help => output.info(HELP),
        InteractiveCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

fn render_search_state(session: &Session, output: &Output) {
    match session.search_state() {
        SearchState::Idle => output.info("Type a movie title to search"),
        SearchState::Loading => output.info(format!("Searching for \"{}\"...", session.query())),
        SearchState::Ready(results) => render::render_results(session.query(), results, output),
        SearchState::Failed(failure) => render::render_failure(failure, output),
    }
}

fn render_detail_state(session: &Session, output: &Output) {
    match session.detail_state() {
        DetailState::Closed => {}
        DetailState::Loading { imdb_id } => output.info(format!("Loading {}...", imdb_id)),
        DetailState::Ready(detail) => {
            let controls = DetailControls {
                user_rating: session.user_rating(),
                watched_rating: session.watched_user_rating(),
                add_unavailable: session.add_unavailable_reason(),
            };
            render::render_detail(detail, Some(&controls), output);
        }
        DetailState::Failed { failure, .. } => render::render_failure(failure, output),
    }
}
