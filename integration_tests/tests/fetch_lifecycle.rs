mod common;

use hydromap_core::schema::InfrastructureAsset;
use hydromap_core::{
    Dashboard, Dataset, EntityRef, FetchOutcome, FetchStatus, Fetched, PredictionRef, StateEvent,
    StoreError,
};

#[test]
fn late_response_from_an_older_request_is_discarded() -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new(common::test_config());
    let first = dashboard.begin_fetch(Dataset::Assets);
    let second = dashboard.begin_fetch(Dataset::Assets);

    let outcome = dashboard.complete_fetch::<String>(second, Ok(common::fetched_assets()?))?;
    assert_eq!(outcome, FetchOutcome::Applied { records: 8 });

    let outcome = dashboard.complete_fetch::<String>(first, Ok(Fetched::Assets(Vec::new())))?;
    assert_eq!(outcome, FetchOutcome::Stale);
    assert_eq!(dashboard.store().assets().len(), 8);
    assert_eq!(dashboard.store().status(Dataset::Assets), &FetchStatus::Ready);
    Ok(())
}

#[test]
fn stale_failure_does_not_mark_the_dataset_failed() -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new(common::test_config());
    let first = dashboard.begin_fetch(Dataset::Renewables);
    let second = dashboard.begin_fetch(Dataset::Renewables);

    let outcome = dashboard.complete_fetch(first, Err("connection reset"))?;
    assert_eq!(outcome, FetchOutcome::Stale);
    assert_eq!(
        dashboard.store().status(Dataset::Renewables),
        &FetchStatus::Loading
    );

    dashboard.complete_fetch::<String>(second, Ok(common::fetched_renewables()?))?;
    assert_eq!(dashboard.store().renewables().len(), 2);
    Ok(())
}

#[test]
fn one_failed_dataset_leaves_the_rest_alone() -> anyhow::Result<()> {
    let mut dashboard = common::loaded_dashboard()?;
    let before = dashboard.view();

    let ticket = dashboard.begin_fetch(Dataset::Renewables);
    assert!(dashboard.view().is_loading());
    let outcome = dashboard.complete_fetch(ticket, Err("503 Service Unavailable"))?;
    assert_eq!(outcome, FetchOutcome::Failed);

    let view = dashboard.view();
    assert_eq!(
        view.status(Dataset::Renewables),
        FetchStatus::Failed("503 Service Unavailable".into())
    );
    for dataset in [
        Dataset::Assets,
        Dataset::HydrogenPlants,
        Dataset::DemandCenters,
        Dataset::Recommendations,
    ] {
        assert_eq!(view.status(dataset), FetchStatus::Ready, "{dataset}");
    }
    // The last good payload keeps rendering.
    assert_eq!(view.points, before.points);
    assert_eq!(view.analytics, before.analytics);
    Ok(())
}

#[test]
fn mismatched_payload_is_rejected() {
    let mut dashboard = Dashboard::new(common::test_config());
    let ticket = dashboard.begin_fetch(Dataset::Assets);
    let err = dashboard
        .complete_fetch::<String>(ticket, Ok(Fetched::Renewables(Vec::new())))
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::DatasetMismatch {
            expected: Dataset::Assets,
            actual: Dataset::Renewables,
        }
    );
    assert!(dashboard.store().assets().is_empty());
    assert!(matches!(
        dashboard.store().status(Dataset::Assets),
        FetchStatus::Failed(_)
    ));
}

#[test]
fn duplicate_ids_keep_the_first_record() -> anyhow::Result<()> {
    let mut dashboard = Dashboard::new(common::test_config());
    let mut assets: Vec<InfrastructureAsset> = common::fixture("assets.json")?;
    let mut duplicate = assets[0].clone();
    duplicate.name = "Imposter".into();
    assets.push(duplicate);

    let outcome = dashboard.load(Fetched::Assets(assets));
    assert_eq!(outcome, FetchOutcome::Applied { records: 8 });
    let kept = dashboard
        .store()
        .assets()
        .get(&"tx-permian".to_string())
        .map(|asset| asset.name.clone());
    assert_eq!(kept.as_deref(), Some("Permian Basin Electrolyzer"));
    Ok(())
}

#[test]
fn refetch_drops_selections_whose_records_vanished() -> anyhow::Result<()> {
    let mut dashboard = common::loaded_dashboard()?;
    let events = dashboard.subscribe();
    dashboard.select_entity(EntityRef::Recommendation("rec-corpus".into()));
    dashboard.select_prediction(PredictionRef("rec-corpus".into()));

    let mut sites: Vec<hydromap_core::schema::Recommendation> =
        common::fixture("recommendations.json")?;
    sites.retain(|site| site.id != "rec-corpus");
    dashboard.load(Fetched::Recommendations(sites));

    assert!(dashboard.state().selected_entity().is_none());
    assert!(dashboard.state().selected_prediction().is_none());

    let received: Vec<StateEvent> = events.try_iter().collect();
    assert!(received.contains(&StateEvent::SelectionChanged(None)));
    assert!(received.contains(&StateEvent::PredictionChanged(None)));
    assert_eq!(
        received.last(),
        Some(&StateEvent::DatasetUpdated(Dataset::Recommendations))
    );
    Ok(())
}

#[test]
fn refetch_of_another_dataset_keeps_the_selection() -> anyhow::Result<()> {
    let mut dashboard = common::loaded_dashboard()?;
    dashboard.select_entity(EntityRef::Asset("ny-hudson".into()));
    dashboard.load(Fetched::Recommendations(Vec::new()));
    dashboard.load(common::fetched_assets()?);
    assert_eq!(
        dashboard.state().selected_entity(),
        Some(&EntityRef::Asset("ny-hudson".into()))
    );
    Ok(())
}
