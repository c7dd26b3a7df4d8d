//! Reproduction lifecycle tests against Postgres

use chrono::Utc;
use delivery::{
    config::ReproductionsConfig,
    models::{
        holding::CreateHolding, Holding, HoldingStatus, NewHoldingReproduction, NewReproduction,
        ReproductionStatus,
    },
    repository::Repository,
    services::Services,
    AppError,
};
use sqlx::postgres::PgPoolOptions;

async fn setup() -> (Repository, Services) {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let repository = Repository::new(pool);
    let services = Services::new(repository.clone(), ReproductionsConfig::default());
    (repository, services)
}

async fn new_holding(services: &Services) -> Holding {
    let signature = format!("T-{}", Utc::now().timestamp_nanos_opt().unwrap());
    services
        .holdings
        .create(&CreateHolding {
            record_id: 1,
            signature,
            usage_restriction: None,
        })
        .await
        .expect("Failed to create holding")
}

fn custom_request(holding_ids: &[i32]) -> NewReproduction {
    NewReproduction {
        customer_name: "Test Patron".to_string(),
        customer_email: "patron@example.org".to_string(),
        discount_percentage: None,
        comment: None,
        holdings: holding_ids
            .iter()
            .map(|&holding_id| NewHoldingReproduction {
                holding_id,
                standard_option_id: None,
                custom_reproduction_customer: Some("Scan the cover".to_string()),
                price: None,
                number_of_pages: Some(2),
                delivery_time: None,
                btw_percentage: None,
                comment: None,
            })
            .collect(),
    }
}

#[tokio::test]
#[ignore]
async fn test_completed_then_pending_reproduction() {
    let (_, services) = setup().await;
    let holding = new_holding(&services).await;
    let id = holding.id.unwrap();

    assert!(!services.lifecycle.has_reproductions(&holding).await.unwrap());
    assert_eq!(services.lifecycle.get_active_for(&holding).await.unwrap(), None);

    let r1 = services.reproductions.create(custom_request(&[id])).await.unwrap();
    services
        .reproductions
        .advance_status(r1.id, ReproductionStatus::Completed)
        .await
        .unwrap();

    assert_eq!(services.lifecycle.get_active_for(&holding).await.unwrap(), None);
    assert!(services.lifecycle.has_reproductions(&holding).await.unwrap());

    let r2 = services.reproductions.create(custom_request(&[id])).await.unwrap();
    assert_eq!(r2.status, ReproductionStatus::WaitingForOrderDetails);

    let active = services.lifecycle.get_active_for(&holding).await.unwrap();
    assert_eq!(active.map(|r| r.id), Some(r2.id));
    assert!(services.lifecycle.has_reproductions(&holding).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn test_second_active_reproduction_is_refused() {
    let (_, services) = setup().await;
    let holding = new_holding(&services).await;
    let id = holding.id.unwrap();

    services.reproductions.create(custom_request(&[id])).await.unwrap();
    let reserved = services.holdings.get_by_id(id).await.unwrap();
    assert_eq!(reserved.status, HoldingStatus::Reserved);

    let err = services.reproductions.create(custom_request(&[id])).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
#[ignore]
async fn test_injected_double_active_is_reported() {
    let (repository, services) = setup().await;
    let holding = new_holding(&services).await;
    let id = holding.id.unwrap();

    // Bypass the guard to violate the invariant on purpose
    for _ in 0..2 {
        repository
            .reproductions
            .add(&custom_request(&[id]), ReproductionStatus::Confirmed, 21)
            .await
            .unwrap();
    }

    let err = services.lifecycle.get_active_for(&holding).await.unwrap_err();
    assert!(matches!(err, AppError::ConsistencyViolation(_)));

    let conflicts = services.audit.active_reproduction_conflicts().await.unwrap();
    assert!(conflicts.iter().any(|c| c.holding_id == id && c.reproduction_ids.len() == 2));
}

#[tokio::test]
#[ignore]
async fn test_holding_with_history_cannot_be_deleted() {
    let (_, services) = setup().await;
    let holding = new_holding(&services).await;
    let id = holding.id.unwrap();

    let r = services.reproductions.create(custom_request(&[id])).await.unwrap();
    services
        .reproductions
        .advance_status(r.id, ReproductionStatus::Cancelled)
        .await
        .unwrap();

    let err = services.holdings.delete(id).await.unwrap_err();
    assert!(matches!(err, AppError::BusinessRule(_)));

    let summary = services.holdings.reproduction_summary(&holding).await.unwrap();
    assert_eq!(summary.active_reproduction_id, None);
    assert!(summary.previously_reproduced);
}

#[tokio::test]
#[ignore]
async fn test_remove_releases_reserved_holdings() {
    let (_, services) = setup().await;
    let holding = new_holding(&services).await;
    let id = holding.id.unwrap();

    let r = services.reproductions.create(custom_request(&[id])).await.unwrap();
    services.reproductions.remove(r.id).await.unwrap();

    let released = services.holdings.get_by_id(id).await.unwrap();
    assert_eq!(released.status, HoldingStatus::Available);
    assert!(!services.lifecycle.has_reproductions(&holding).await.unwrap());

    // Removing again is a no-op
    services.reproductions.remove(r.id).await.unwrap();
    services.holdings.delete(id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_backward_status_change_is_ignored() {
    let (_, services) = setup().await;
    let holding = new_holding(&services).await;
    let id = holding.id.unwrap();

    let r = services.reproductions.create(custom_request(&[id])).await.unwrap();
    let active = services
        .reproductions
        .advance_status(r.id, ReproductionStatus::Active)
        .await
        .unwrap();
    assert!(active.date_payment_accepted.is_some());

    let unchanged = services
        .reproductions
        .advance_status(r.id, ReproductionStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(unchanged.status, ReproductionStatus::Active);
}

#[tokio::test]
#[ignore]
async fn test_save_does_not_reopen_a_cancelled_reproduction() {
    let (_, services) = setup().await;
    let holding = new_holding(&services).await;
    let id = holding.id.unwrap();

    let mut r1 = services.reproductions.create(custom_request(&[id])).await.unwrap();
    r1 = services
        .reproductions
        .advance_status(r1.id, ReproductionStatus::Cancelled)
        .await
        .unwrap();
    let r2 = services.reproductions.create(custom_request(&[id])).await.unwrap();

    r1.status = ReproductionStatus::WaitingForOrderDetails;
    r1.comment = Some("Patron called back".to_string());
    let saved = services.reproductions.save(&r1).await.unwrap();
    assert_eq!(saved.status, ReproductionStatus::Cancelled);
    assert_eq!(saved.comment.as_deref(), Some("Patron called back"));

    let active = services.lifecycle.get_active_for(&holding).await.unwrap();
    assert_eq!(active.map(|r| r.id), Some(r2.id));
}

#[tokio::test]
#[ignore]
async fn test_marking_all_items_completes_the_reproduction() {
    let (_, services) = setup().await;
    let first = new_holding(&services).await.id.unwrap();
    let second = new_holding(&services).await.id.unwrap();

    let r = services
        .reproductions
        .create(custom_request(&[first, second]))
        .await
        .unwrap();

    let mut last = None;
    for expected in [HoldingStatus::InUse, HoldingStatus::Returned, HoldingStatus::Available] {
        let (holding, reproduction) = services.reproductions.mark_item(first).await.unwrap();
        assert_eq!(holding.status, expected);
        last = reproduction;
    }
    // The second holding is still out
    assert_eq!(last.as_ref().map(|r| r.status), Some(ReproductionStatus::WaitingForOrderDetails));

    let lines = services.reproductions.holding_reproductions(r.id).await.unwrap();
    let done: Vec<bool> = lines.iter().map(|hr| hr.completed).collect();
    assert_eq!(done.iter().filter(|c| **c).count(), 1);

    for _ in 0..3 {
        last = services.reproductions.mark_item(second).await.unwrap().1;
    }
    assert_eq!(last.map(|r| r.status), Some(ReproductionStatus::Completed));

    let lines = services.reproductions.holding_reproductions(r.id).await.unwrap();
    assert!(lines.iter().all(|hr| hr.completed));
    let holding = services.holdings.get_by_id(first).await.unwrap();
    assert_eq!(services.lifecycle.get_active_for(&holding).await.unwrap(), None);

    // Without an active reproduction the holding is still bumped
    let (holding, reproduction) = services.reproductions.mark_item(first).await.unwrap();
    assert_eq!(holding.status, HoldingStatus::Available);
    assert_eq!(reproduction, None);
}

#[tokio::test]
#[ignore]
async fn test_delete_rejects_non_positive_id() {
    let (_, services) = setup().await;
    let holding = new_holding(&services).await;

    for id in [0, -1] {
        let err = services.holdings.delete(id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }
    // Nothing was deleted along the way
    services.holdings.get_by_id(holding.id.unwrap()).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_terminal_status_completes_line_items() {
    let (_, services) = setup().await;
    let id = new_holding(&services).await.id.unwrap();

    let r = services.reproductions.create(custom_request(&[id])).await.unwrap();
    let lines = services.reproductions.holding_reproductions(r.id).await.unwrap();
    assert!(lines.iter().all(|hr| !hr.completed));

    services
        .reproductions
        .advance_status(r.id, ReproductionStatus::Delivered)
        .await
        .unwrap();

    let lines = services.reproductions.holding_reproductions(r.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines.iter().all(|hr| hr.completed));
    let holding = services.holdings.get_by_id(id).await.unwrap();
    assert_eq!(holding.status, HoldingStatus::Available);
}

#[tokio::test]
#[ignore]
async fn test_create_with_missing_holding_is_not_found() {
    let (_, services) = setup().await;
    let existing = new_holding(&services).await.id.unwrap();
    let gone = new_holding(&services).await.id.unwrap();
    services.holdings.delete(gone).await.unwrap();

    let err = services
        .reproductions
        .create(custom_request(&[existing, gone]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // The transaction rolled back: the existing holding is untouched
    let holding = services.holdings.get_by_id(existing).await.unwrap();
    assert_eq!(holding.status, HoldingStatus::Available);
    assert!(!services.lifecycle.has_reproductions(&holding).await.unwrap());
}
