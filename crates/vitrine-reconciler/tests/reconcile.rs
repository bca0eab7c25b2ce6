//! Reconciler behaviour against an in-process asset host.

mod common;

use std::sync::Arc;

use common::{hosted, hosted_legacy, url_for, Call, FakeHost, ENDPOINT};
use vitrine_assets::HostMatcher;
use vitrine_core::{AssetReference, PhotoSet};
use vitrine_reconciler::{ItemOutcome, Reconciler, DEFAULT_LIST_LIMIT};

fn reconciler(host: &Arc<FakeHost>, endpoint: Option<&str>) -> Reconciler {
    Reconciler::new(
        Arc::clone(host) as Arc<dyn vitrine_assets::AssetHost>,
        HostMatcher::new(endpoint),
        DEFAULT_LIST_LIMIT,
    )
}

#[tokio::test]
async fn dropping_one_of_two_photos_deletes_exactly_that_one() {
    let host = Arc::new(
        FakeHost::new()
            .with_file("id-a", "/products/1/p1.jpg")
            .with_file("id-b", "/products/1/p2.jpg"),
    );
    let a = hosted_legacy("/products/1/p1.jpg");
    let b = hosted_legacy("/products/1/p2.jpg");

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(
            &PhotoSet::new(vec![a.clone(), b]),
            &PhotoSet::new(vec![a]),
        )
        .await;

    assert_eq!(host.deletes(), vec!["id-b".to_string()]);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(host.file_ids(), vec!["id-a".to_string()]);
}

#[tokio::test]
async fn stored_remote_id_skips_resolution() {
    let host = Arc::new(FakeHost::new().with_file("id-b", "/products/1/p2.jpg"));
    let current = PhotoSet::new(vec![hosted("id-b", "/products/1/p2.jpg")]);

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(&current, &PhotoSet::default())
        .await;

    assert_eq!(report.deleted, 1);
    assert_eq!(host.calls(), vec![Call::Delete("id-b".to_string())]);
}

#[tokio::test]
async fn kept_photos_are_never_deleted() {
    let host = Arc::new(
        FakeHost::new()
            .with_file("id-a", "/products/1/p1.jpg")
            .with_file("id-b", "/products/1/p2.jpg"),
    );
    let set = PhotoSet::new(vec![
        hosted("id-a", "/products/1/p1.jpg"),
        hosted_legacy("/products/1/p2.jpg"),
    ]);

    let report = reconciler(&host, Some(ENDPOINT)).reconcile(&set, &set).await;

    assert!(host.calls().is_empty());
    assert_eq!(report.considered(), 0);
}

#[tokio::test]
async fn foreign_urls_are_never_deleted() {
    let host = Arc::new(FakeHost::new().with_file("id-x", "/x.jpg"));
    let current = PhotoSet::new(vec![AssetReference::new(
        "https://cdn.shopify.com/files/x.jpg",
        Some("id-x".to_string()),
        "/x.jpg",
    )]);

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(&current, &PhotoSet::default())
        .await;

    assert_eq!(report.skipped_not_hosted, 1);
    assert!(host.deletes().is_empty());
}

#[tokio::test]
async fn without_an_endpoint_nothing_is_hosted() {
    let host = Arc::new(FakeHost::new().with_file("id-a", "/products/1/p1.jpg"));
    let current = PhotoSet::new(vec![hosted("id-a", "/products/1/p1.jpg")]);

    let report = reconciler(&host, None)
        .reconcile(&current, &PhotoSet::default())
        .await;

    assert_eq!(report.skipped_not_hosted, 1);
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn delete_failure_does_not_stop_the_batch() {
    let host = Arc::new(
        FakeHost::new()
            .with_file("id-1", "/products/1/a.jpg")
            .with_file("id-2", "/products/1/b.jpg")
            .with_file("id-3", "/products/1/c.jpg")
            .fail_delete_of("id-1"),
    );
    let current = PhotoSet::new(vec![
        hosted("id-1", "/products/1/a.jpg"),
        hosted("id-2", "/products/1/b.jpg"),
        hosted("id-3", "/products/1/c.jpg"),
    ]);

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(&current, &PhotoSet::default())
        .await;

    assert_eq!(
        host.deletes(),
        vec!["id-1".to_string(), "id-2".to_string(), "id-3".to_string()]
    );
    assert_eq!(report.failed, 1);
    assert_eq!(report.deleted, 2);
    assert!(matches!(
        &report.items[0].outcome,
        ItemOutcome::Failed { remote_id, .. } if remote_id == "id-1"
    ));
}

#[tokio::test]
async fn unresolvable_legacy_reference_is_skipped() {
    let host = Arc::new(FakeHost::new().with_file("id-a", "/products/1/p1.jpg"));
    let current = PhotoSet::new(vec![
        hosted_legacy("/products/1/gone.jpg"),
        hosted("id-a", "/products/1/p1.jpg"),
    ]);

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(&current, &PhotoSet::default())
        .await;

    assert_eq!(report.skipped_unresolved, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(host.deletes(), vec!["id-a".to_string()]);
}

#[tokio::test]
async fn identifier_shared_with_desired_set_is_kept() {
    let host = Arc::new(FakeHost::new().with_file("id-a", "/products/1/p1.jpg"));
    let old_url = hosted("id-a", "/products/1/p1.jpg");
    let mut new_url = hosted("id-a", "/products/1/p1.jpg");
    new_url.url = format!("{}?tr=w-400", url_for("/products/1/p1.jpg"));

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(&PhotoSet::new(vec![old_url]), &PhotoSet::new(vec![new_url]))
        .await;

    assert_eq!(report.skipped_still_referenced, 1);
    assert!(host.deletes().is_empty());
}

#[tokio::test]
async fn duplicate_urls_are_deleted_once() {
    let host = Arc::new(FakeHost::new().with_file("id-a", "/products/1/p1.jpg"));
    let a = hosted("id-a", "/products/1/p1.jpg");

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(&PhotoSet::new(vec![a.clone(), a]), &PhotoSet::default())
        .await;

    assert_eq!(report.considered(), 1);
    assert_eq!(host.deletes(), vec!["id-a".to_string()]);
}

#[tokio::test]
async fn host_outage_degrades_to_skips_and_failures() {
    let host = Arc::new(
        FakeHost::new()
            .with_file("id-b", "/products/1/p2.jpg")
            .fail_listing()
            .fail_delete_of("id-b"),
    );
    let current = PhotoSet::new(vec![
        hosted_legacy("/products/1/p1.jpg"),
        hosted("id-b", "/products/1/p2.jpg"),
    ]);

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(&current, &PhotoSet::default())
        .await;

    assert_eq!(report.skipped_unresolved, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.deleted, 0);
}

#[tokio::test]
async fn one_file_behind_two_urls_is_deleted_once() {
    let host = Arc::new(FakeHost::new().with_file("id-a", "/products/1/p1.jpg"));
    let plain = hosted("id-a", "/products/1/p1.jpg");
    let mut thumb = plain.clone();
    thumb.url = format!("{}?tr=w-300", url_for("/products/1/p1.jpg"));

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(&PhotoSet::new(vec![plain, thumb]), &PhotoSet::default())
        .await;

    assert_eq!(host.deletes(), vec!["id-a".to_string()]);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped_duplicate, 1);
    assert_eq!(report.considered(), 2);
    assert!(matches!(
        &report.items[1].outcome,
        ItemOutcome::SkippedDuplicate { remote_id } if remote_id == "id-a"
    ));
}

#[tokio::test]
async fn legacy_desired_reference_protects_the_file_it_resolves_to() {
    let host = Arc::new(FakeHost::new().with_file("id-a", "/products/1/p1.jpg"));
    let current = PhotoSet::new(vec![hosted("id-a", "/products/1/p1.jpg")]);
    let desired = PhotoSet::new(vec![AssetReference::legacy(format!(
        "{}?tr=w-300",
        url_for("/products/1/p1.jpg")
    ))]);

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(&current, &desired)
        .await;

    assert!(host.deletes().is_empty());
    assert_eq!(report.skipped_still_referenced, 1);
    assert_eq!(host.file_ids(), vec!["id-a".to_string()]);
}

#[tokio::test]
async fn legacy_desired_references_are_only_resolved_when_needed() {
    let host = Arc::new(FakeHost::new().with_file("id-a", "/products/1/p1.jpg"));
    let set = PhotoSet::new(vec![hosted_legacy("/products/1/p1.jpg")]);
    let foreign = PhotoSet::new(vec![AssetReference::legacy(
        "https://cdn.shopify.com/files/x.jpg",
    )]);

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(&foreign, &set)
        .await;

    assert_eq!(report.skipped_not_hosted, 1);
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn unrelated_legacy_desired_reference_does_not_block_deletes() {
    let host = Arc::new(
        FakeHost::new()
            .with_file("id-a", "/products/1/p1.jpg")
            .with_file("id-b", "/products/1/p2.jpg"),
    );
    let current = PhotoSet::new(vec![
        hosted_legacy("/products/1/p1.jpg"),
        hosted("id-b", "/products/1/p2.jpg"),
    ]);
    let desired = PhotoSet::new(vec![hosted_legacy("/products/1/p1.jpg")]);

    let report = reconciler(&host, Some(ENDPOINT))
        .reconcile(&current, &desired)
        .await;

    assert_eq!(host.deletes(), vec!["id-b".to_string()]);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.skipped_still_referenced, 0);
}
