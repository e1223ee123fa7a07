use super::*;
use crate::failure::FetchFailure;
use crate::testing::{detail, search_results, GatedCatalog};
use popcorn_catalog::CatalogError;
use std::sync::Mutex;

fn options(default_query: &str) -> SessionOptions {
    SessionOptions {
        default_query: default_query.to_string(),
        app_title: "usePopcorn".to_string(),
    }
}

fn idle_session(catalog: &Arc<GatedCatalog>) -> Session {
    let catalog: Arc<dyn Catalog> = catalog.clone();
    Session::new(catalog, options(""))
}

/// Session with `imdb_id` open and its detail loaded.
async fn session_with_open_detail(catalog: &Arc<GatedCatalog>, imdb_id: &str, runtime: &str, rating: Option<f64>) -> Session {
    let mut session = idle_session(catalog);
    catalog
        .gate_detail(imdb_id)
        .send(Ok(detail(imdb_id, &format!("Title {}", imdb_id), runtime, rating)))
        .unwrap();
    session.select_movie(imdb_id);
    session.settle().await;
    session
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {}, got {}", expected, actual);
}

// Search session

#[tokio::test]
async fn test_default_query_reaches_ready() {
    let catalog = GatedCatalog::new();
    catalog
        .gate_search("Hannah Montana")
        .send(Ok(search_results("hm", 5)))
        .unwrap();

    let dyn_catalog: Arc<dyn Catalog> = catalog.clone();
    let mut session = Session::new(dyn_catalog, SessionOptions::default());
    assert_eq!(session.query(), "Hannah Montana");
    assert_eq!(session.search_state(), &SearchState::Loading);

    session.settle().await;
    match session.search_state() {
        SearchState::Ready(results) => assert_eq!(results.len(), 5),
        other => panic!("expected Ready, got {:?}", other),
    }
    assert_eq!(session.result_count(), 5);
    assert_eq!(catalog.search_calls(), 1);
}

#[tokio::test]
async fn test_empty_query_makes_no_request() {
    let catalog = GatedCatalog::new();
    let mut session = idle_session(&catalog);
    assert_eq!(session.search_state(), &SearchState::Idle);

    session.set_query("");
    tokio::task::yield_now().await;
    assert_eq!(session.search_state(), &SearchState::Idle);
    assert!(!session.is_busy());
    assert_eq!(catalog.search_calls(), 0);
}

#[tokio::test]
async fn test_clearing_query_cancels_pending_search() {
    let catalog = GatedCatalog::new();
    let _gate = catalog.gate_search("heat");
    let mut session = idle_session(&catalog);

    session.set_query("heat");
    assert_eq!(session.search_state(), &SearchState::Loading);
    tokio::task::yield_now().await;
    assert_eq!(catalog.search_calls(), 1);

    session.set_query("");
    assert_eq!(session.search_state(), &SearchState::Idle);
    assert!(session.results().is_empty());
    assert!(!session.is_busy());

    // The cancelled "heat" reply is stale and no new request was issued
    let cancelled = session.next_event().await.unwrap();
    assert!(!session.apply(cancelled));
    assert_eq!(session.search_state(), &SearchState::Idle);
    assert_eq!(catalog.search_calls(), 1);
}

#[tokio::test]
async fn test_success_without_results_is_failed() {
    let catalog = GatedCatalog::new();
    catalog.gate_search("heat").send(Ok(Vec::new())).unwrap();

    let mut session = idle_session(&catalog);
    session.set_query("heat");
    session.settle().await;

    assert_eq!(
        session.search_state().clone(),
        SearchState::Failed(FetchFailure::Transport {
            detail: "success without results".to_string()
        })
    );
    assert!(session.results().is_empty());
}

#[tokio::test]
async fn test_search_cancelled_by_catalog_is_not_left_loading() {
    let catalog = GatedCatalog::new();
    catalog.gate_search("heat").send(Err(CatalogError::Cancelled)).unwrap();

    let mut session = idle_session(&catalog);
    session.set_query("heat");
    session.settle().await;

    assert!(!session.is_busy());
    match session.search_state() {
        SearchState::Failed(failure) => assert_eq!(failure.message(), FetchFailure::GENERIC_MESSAGE),
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_detail_cancelled_by_catalog_is_not_left_loading() {
    let catalog = GatedCatalog::new();
    catalog.gate_detail("tt0100").send(Err(CatalogError::Cancelled)).unwrap();

    let mut session = idle_session(&catalog);
    session.select_movie("tt0100");
    session.settle().await;

    assert!(!session.is_busy());
    assert!(matches!(session.detail_state(), DetailState::Failed { imdb_id, .. } if imdb_id == "tt0100"));
    assert_eq!(session.display_title(), "usePopcorn");
}

#[tokio::test]
async fn test_not_found_is_failed_with_catalog_message() {
    let catalog = GatedCatalog::new();
    catalog
        .gate_search("zzzqqqnonexistent")
        .send(Err(CatalogError::NotFound("Movie not found!".to_string())))
        .unwrap();

    let mut session = idle_session(&catalog);
    session.set_query("zzzqqqnonexistent");
    session.settle().await;

    assert_eq!(
        session.search_state(),
        &SearchState::Failed(FetchFailure::NotFound("Movie not found!".to_string()))
    );
    assert!(session.results().is_empty());
}

#[tokio::test]
async fn test_transport_error_is_generic_failure() {
    let catalog = GatedCatalog::new();
    catalog
        .gate_search("heat")
        .send(Err(CatalogError::NetworkFailure("connection refused".to_string())))
        .unwrap();

    let mut session = idle_session(&catalog);
    session.set_query("heat");
    session.settle().await;

    match session.search_state() {
        SearchState::Failed(failure) => {
            assert_eq!(failure.message(), FetchFailure::GENERIC_MESSAGE);
            assert!(failure.is_retryable());
        }
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_new_query_clears_previous_failure() {
    let catalog = GatedCatalog::new();
    catalog
        .gate_search("zzz")
        .send(Err(CatalogError::NotFound("Movie not found!".to_string())))
        .unwrap();
    let heat = catalog.gate_search("heat");

    let mut session = idle_session(&catalog);
    session.set_query("zzz");
    session.settle().await;
    assert!(matches!(session.search_state(), SearchState::Failed(_)));

    session.set_query("heat");
    assert_eq!(session.search_state(), &SearchState::Loading);

    heat.send(Ok(search_results("heat", 2))).unwrap();
    session.settle().await;
    assert_eq!(session.result_count(), 2);
}

#[tokio::test]
async fn test_late_response_for_superseded_query_is_discarded() {
    // The catalog ignores cancellation, so the stale reply really arrives
    let catalog = GatedCatalog::ignoring_cancel();
    let first = catalog.gate_search("q1");
    let second = catalog.gate_search("q2");

    let mut session = idle_session(&catalog);
    session.set_query("q1");
    session.set_query("q2");

    second.send(Ok(search_results("q2", 3))).unwrap();
    session.settle().await;
    assert_eq!(session.results(), search_results("q2", 3).as_slice());

    first.send(Ok(search_results("q1", 7))).unwrap();
    let late = session.next_event().await.unwrap();
    assert!(!session.apply(late));
    assert_eq!(session.results(), search_results("q2", 3).as_slice());
}

#[tokio::test]
async fn test_late_error_for_superseded_query_is_discarded() {
    let catalog = GatedCatalog::ignoring_cancel();
    let first = catalog.gate_search("q1");
    let second = catalog.gate_search("q2");

    let mut session = idle_session(&catalog);
    session.set_query("q1");
    session.set_query("q2");

    second.send(Ok(search_results("q2", 1))).unwrap();
    first.send(Err(CatalogError::NotFound("Movie not found!".to_string()))).unwrap();

    // Drain both replies, in whatever order they arrive
    let mut applied = 0;
    for _ in 0..2 {
        let event = session.next_event().await.unwrap();
        if session.apply(event) {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);
    assert_eq!(session.result_count(), 1);
}

#[tokio::test]
async fn test_cancelled_search_does_not_transition() {
    let catalog = GatedCatalog::new();
    let _first = catalog.gate_search("q1");
    let second = catalog.gate_search("q2");

    let mut session = idle_session(&catalog);
    session.set_query("q1");
    session.set_query("q2");

    // q1 resolves as Cancelled; q2 is still pending, so the state must stay Loading
    let cancelled = session.next_event().await.unwrap();
    assert!(!session.apply(cancelled));
    assert_eq!(session.search_state(), &SearchState::Loading);

    second.send(Ok(search_results("q2", 2))).unwrap();
    session.settle().await;
    assert_eq!(session.result_count(), 2);
    assert_eq!(catalog.search_calls(), 2);
}

#[tokio::test]
async fn test_unchanged_query_does_not_refetch() {
    let catalog = GatedCatalog::new();
    catalog.gate_search("heat").send(Ok(search_results("heat", 1))).unwrap();

    let mut session = idle_session(&catalog);
    session.set_query("heat");
    session.settle().await;
    session.set_query("heat");

    assert!(!session.is_busy());
    assert_eq!(catalog.search_calls(), 1);
}

// Selection & detail

#[tokio::test]
async fn test_select_then_reselect_only_shows_latest_detail() {
    let catalog = GatedCatalog::ignoring_cancel();
    let first = catalog.gate_detail("tt0100");
    let second = catalog.gate_detail("tt0200");
    let titles = Arc::new(Mutex::new(Vec::new()));
    let seen = titles.clone();

    let dyn_catalog: Arc<dyn Catalog> = catalog.clone();
    let mut session = Session::new(dyn_catalog, options(""))
        .with_title_observer(move |title: &str| seen.lock().unwrap().push(title.to_string()));

    session.select_movie("tt0100");
    session.select_movie("tt0200");
    assert_eq!(session.selected_id(), Some("tt0200"));

    second.send(Ok(detail("tt0200", "Second", "100 min", Some(7.0)))).unwrap();
    session.settle().await;

    first.send(Ok(detail("tt0100", "First", "142 min", Some(8.2)))).unwrap();
    let late = session.next_event().await.unwrap();
    assert!(!session.apply(late));

    match session.detail_state() {
        DetailState::Ready(record) => assert_eq!(record.imdb_id, "tt0200"),
        other => panic!("expected Ready, got {:?}", other),
    }
    assert_eq!(*titles.lock().unwrap(), vec!["Movie | Second".to_string()]);
}

#[tokio::test]
async fn test_close_discards_pending_detail() {
    let catalog = GatedCatalog::ignoring_cancel();
    let gate = catalog.gate_detail("tt0100");

    let mut session = idle_session(&catalog);
    session.select_movie("tt0100");
    assert!(matches!(session.detail_state(), DetailState::Loading { .. }));

    session.close_movie();
    assert_eq!(session.detail_state(), &DetailState::Closed);
    assert_eq!(session.selected_id(), None);

    gate.send(Ok(detail("tt0100", "First", "142 min", Some(8.2)))).unwrap();
    let late = session.next_event().await.unwrap();
    assert!(!session.apply(late));
    assert_eq!(session.detail_state(), &DetailState::Closed);
    assert_eq!(session.display_title(), "usePopcorn");
}

#[tokio::test]
async fn test_display_title_follows_detail() {
    let catalog = GatedCatalog::new();
    let mut session = session_with_open_detail(&catalog, "tt0100", "142 min", Some(8.2)).await;
    assert_eq!(session.display_title(), "Movie | Title tt0100");

    session.close_movie();
    assert_eq!(session.display_title(), "usePopcorn");
}

#[tokio::test]
async fn test_untitled_detail_keeps_app_title() {
    let catalog = GatedCatalog::new();
    catalog
        .gate_detail("tt0300")
        .send(Ok(detail("tt0300", "", "90 min", Some(5.0))))
        .unwrap();

    let mut session = idle_session(&catalog);
    session.select_movie("tt0300");
    session.settle().await;

    assert!(matches!(session.detail_state(), DetailState::Ready(_)));
    assert_eq!(session.display_title(), "usePopcorn");
}

#[tokio::test]
async fn test_selecting_another_title_restores_app_title_while_loading() {
    let catalog = GatedCatalog::new();
    let mut session = session_with_open_detail(&catalog, "tt0100", "142 min", Some(8.2)).await;
    let _pending = catalog.gate_detail("tt0200");

    session.select_movie("tt0200");
    assert_eq!(session.display_title(), "usePopcorn");
    assert!(matches!(session.detail_state(), DetailState::Loading { imdb_id } if imdb_id == "tt0200"));
}

#[tokio::test]
async fn test_detail_not_found_is_failed_state() {
    let catalog = GatedCatalog::new();
    catalog
        .gate_detail("tt404")
        .send(Err(CatalogError::NotFound("Incorrect IMDb ID.".to_string())))
        .unwrap();

    let mut session = idle_session(&catalog);
    session.select_movie("tt404");
    session.settle().await;

    assert_eq!(
        session.detail_state(),
        &DetailState::Failed {
            imdb_id: "tt404".to_string(),
            failure: FetchFailure::NotFound("Incorrect IMDb ID.".to_string()),
        }
    );
    assert_eq!(session.selected_id(), Some("tt404"));
}

#[tokio::test]
async fn test_selecting_open_title_toggles_closed() {
    let catalog = GatedCatalog::new();
    let mut session = session_with_open_detail(&catalog, "tt0100", "142 min", Some(8.2)).await;

    session.select_movie("tt0100");
    assert_eq!(session.detail_state(), &DetailState::Closed);
    assert_eq!(catalog.detail_calls(), 1);
}

#[tokio::test]
async fn test_search_and_detail_slots_are_independent() {
    let catalog = GatedCatalog::new();
    let search = catalog.gate_search("heat");
    let detail_gate = catalog.gate_detail("tt0100");

    let mut session = idle_session(&catalog);
    session.set_query("heat");
    session.select_movie("tt0100");

    detail_gate.send(Ok(detail("tt0100", "Heat", "170 min", Some(8.3)))).unwrap();
    search.send(Ok(search_results("heat", 4))).unwrap();
    session.settle().await;

    assert_eq!(session.result_count(), 4);
    assert!(matches!(session.detail_state(), DetailState::Ready(_)));
}

// Rating and watched list

#[tokio::test]
async fn test_add_to_watched_flow() {
    let catalog = GatedCatalog::new();
    let mut session = session_with_open_detail(&catalog, "tt0100", "142 min", Some(8.2)).await;

    assert_eq!(session.add_unavailable_reason(), Some(AddUnavailable::NoUserRating));
    assert!(!session.can_add_to_watched());

    session.set_user_rating(9).unwrap();
    assert!(session.can_add_to_watched());
    session.confirm_add_to_watched().unwrap();

    // Adding closes the detail view
    assert_eq!(session.detail_state(), &DetailState::Closed);
    assert_eq!(session.watched().len(), 1);
    let entry = &session.watched().entries()[0];
    assert_eq!(entry.imdb_id, "tt0100");
    assert_eq!(entry.runtime, 142);
    assert_eq!(entry.user_rating.value(), 9);
}

#[tokio::test]
async fn test_add_unavailable_while_loading() {
    let catalog = GatedCatalog::new();
    let _pending = catalog.gate_detail("tt0100");
    let mut session = idle_session(&catalog);

    assert_eq!(session.confirm_add_to_watched(), Err(AddUnavailable::NoSelection));

    session.select_movie("tt0100");
    session.set_user_rating(8).unwrap();
    assert_eq!(session.confirm_add_to_watched(), Err(AddUnavailable::DetailNotLoaded));
    assert!(session.watched().is_empty());
}

#[tokio::test]
async fn test_add_unavailable_for_unparseable_runtime() {
    let catalog = GatedCatalog::new();
    let mut session = session_with_open_detail(&catalog, "tt0100", "N/A", Some(8.2)).await;

    session.set_user_rating(7).unwrap();
    assert_eq!(session.add_unavailable_reason(), Some(AddUnavailable::IncompleteDetail));
    assert_eq!(session.confirm_add_to_watched(), Err(AddUnavailable::IncompleteDetail));
    assert!(session.watched().is_empty());
}

#[tokio::test]
async fn test_title_without_imdb_rating_can_be_added() {
    let catalog = GatedCatalog::new();
    let mut session = session_with_open_detail(&catalog, "tt0100", "142 min", None).await;

    session.set_user_rating(7).unwrap();
    assert_eq!(session.add_unavailable_reason(), None);
    session.confirm_add_to_watched().unwrap();

    assert_eq!(session.watched().len(), 1);
    let entry = &session.watched().entries()[0];
    assert_eq!(entry.runtime, 142);
    assert_eq!(entry.imdb_rating, None);

    let stats = session.aggregates();
    assert_eq!(stats.mean_imdb_rating, 0.0);
    assert_close(stats.mean_runtime, 142.0);
    assert_close(stats.mean_user_rating, 7.0);
}

#[tokio::test]
async fn test_already_watched_title_cannot_be_rated_again() {
    let catalog = GatedCatalog::new();
    let mut session = session_with_open_detail(&catalog, "tt0100", "142 min", Some(8.2)).await;
    session.set_user_rating(9).unwrap();
    session.confirm_add_to_watched().unwrap();

    catalog
        .gate_detail("tt0100")
        .send(Ok(detail("tt0100", "Title tt0100", "142 min", Some(8.2))))
        .unwrap();
    session.select_movie("tt0100");
    session.settle().await;

    assert_eq!(session.watched_user_rating().map(UserRating::value), Some(9));
    assert_eq!(
        session.set_user_rating(4),
        Err(SessionError::AlreadyWatched("tt0100".to_string()))
    );
    assert_eq!(
        session.confirm_add_to_watched(),
        Err(AddUnavailable::AlreadyWatched("tt0100".to_string()))
    );
    assert_eq!(session.watched().len(), 1);
}

#[tokio::test]
async fn test_user_rating_validation_and_reset() {
    let catalog = GatedCatalog::new();
    let mut session = idle_session(&catalog);
    assert_eq!(session.set_user_rating(5), Err(SessionError::NothingSelected));

    let mut session = session_with_open_detail(&catalog, "tt0100", "142 min", Some(8.2)).await;
    assert_eq!(session.set_user_rating(0), Err(SessionError::InvalidUserRating(0)));
    assert_eq!(session.set_user_rating(11), Err(SessionError::InvalidUserRating(11)));

    session.set_user_rating(6).unwrap();
    assert_eq!(session.user_rating().map(UserRating::value), Some(6));

    // Changing the selection drops the pending rating
    let _pending = catalog.gate_detail("tt0200");
    session.select_movie("tt0200");
    assert_eq!(session.user_rating(), None);
}

#[tokio::test]
async fn test_watched_aggregates_through_session() {
    let catalog = GatedCatalog::new();
    let mut session = session_with_open_detail(&catalog, "tt0100", "142 min", Some(8.2)).await;
    session.set_user_rating(9).unwrap();
    session.confirm_add_to_watched().unwrap();

    catalog
        .gate_detail("tt0200")
        .send(Ok(detail("tt0200", "Other", "100 min", Some(7.0))))
        .unwrap();
    session.select_movie("tt0200");
    session.settle().await;
    session.set_user_rating(6).unwrap();
    session.confirm_add_to_watched().unwrap();

    let stats = session.aggregates();
    assert_eq!(stats.count, 2);
    assert_close(stats.mean_runtime, 121.0);
    assert_close(stats.mean_imdb_rating, 7.6);
    assert_close(stats.mean_user_rating, 7.5);

    assert!(session.remove_from_watched("tt0100"));
    assert!(!session.remove_from_watched("tt0100"));
    assert_eq!(session.aggregates().count, 1);
    assert_close(session.aggregates().mean_runtime, 100.0);
}

// Teardown

#[tokio::test]
async fn test_shutdown_stops_both_slots() {
    let catalog = GatedCatalog::ignoring_cancel();
    let _search = catalog.gate_search("heat");
    let _detail = catalog.gate_detail("tt0100");

    let mut session = idle_session(&catalog);
    session.set_query("heat");
    session.select_movie("tt0100");
    assert!(session.is_busy());

    session.shutdown();
    assert!(!session.is_busy());

    // settle returns immediately; nothing is left to apply
    session.settle().await;
    assert_eq!(session.search_state(), &SearchState::Loading);
    assert!(matches!(session.detail_state(), DetailState::Loading { .. }));
}
