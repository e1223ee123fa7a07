use super::render;
use super::spinner::LoadingSpinner;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_catalog::create_catalog;
use popcorn_config::Config;
use popcorn_core::{DetailState, Session, SessionOptions};

pub async fn run_details(id: String, config: &Config, output: &Output) -> Result<()> {
    let catalog = create_catalog(config).map_err(|e| eyre!("{}", e))?;

    // No initial search, only the one lookup
    let options = SessionOptions {
        default_query: String::new(),
        ..SessionOptions::from(config.session.clone())
    };

    let spinner = LoadingSpinner::start(format!("Loading {}...", id), output.is_interactive_terminal());
    let mut session = Session::new(catalog, options);
    session.select_movie(id);
    session.settle().await;
    spinner.finish();

    let result = match session.detail_state() {
        DetailState::Ready(detail) => {
            render::render_detail(detail, None, output);
            Ok(())
        }
        // "Not found" is an answer; only transport failures fail the command
        DetailState::Failed { failure, .. } if failure.is_retryable() => Err(eyre!("{}", failure.message())),
        DetailState::Failed { failure, .. } => {
            render::render_failure(failure, output);
            Ok(())
        }
        DetailState::Closed | DetailState::Loading { .. } => Ok(()),
    };

    session.shutdown();
    result
}
