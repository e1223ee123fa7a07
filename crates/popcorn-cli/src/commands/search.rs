use super::render;
use super::spinner::LoadingSpinner;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_catalog::create_catalog;
use popcorn_config::Config;
use popcorn_core::{SearchState, Session, SessionOptions};
use tracing::debug;

pub async fn run_search(query: String, config: &Config, output: &Output) -> Result<()> {
    if query.is_empty() {
        return Err(eyre!("Query must not be empty"));
    }

    let catalog = create_catalog(config).map_err(|e| eyre!("{}", e))?;
    let options = SessionOptions {
        default_query: query.clone(),
        ..SessionOptions::from(config.session.clone())
    };

    let spinner = LoadingSpinner::start(format!("Searching for \"{}\"...", query), output.is_interactive_terminal());
    let mut session = Session::new(catalog, options);
    session.settle().await;
    spinner.finish();

    debug!(query = %session.query(), count = session.result_count(), "Search settled");

    let result = match session.search_state() {
        SearchState::Ready(results) => {
            render::render_results(&query, results, output);
            Ok(())
        }
        // "Not found" is an answer; only transport failures fail the command
        SearchState::Failed(failure) if failure.is_retryable() => Err(eyre!("{}", failure.message())),
        SearchState::Failed(failure) => {
            render::render_failure(failure, output);
            Ok(())
        }
        SearchState::Idle | SearchState::Loading => Ok(()),
    };

    session.shutdown();
    result
}
