// Batch submission against an in-memory backend: outcome
// classification, idempotent retry, partial failure, conflict handling.

#[path = "../helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crediglass::modules::allocation::services::AllocationEngine;
use crediglass::modules::instruments::models::{InstrumentKind, PaymentInstrument};
use crediglass::modules::settlements::models::{BatchMode, SettlementMetadata, SettlementOutcome};
use crediglass::modules::settlements::services::BatchSubmitter;

use helpers::{default_settings, obligation, MockObligationRepository};

fn metadata() -> SettlementMetadata {
    SettlementMetadata {
        settlement_date: chrono::NaiveDate::from_ymd_opt(2026, 8, 15).unwrap(),
        reference: "abono quincena".to_string(),
        branch_id: 1,
        client_id: 7,
    }
}

fn instruments() -> Vec<PaymentInstrument> {
    vec![
        PaymentInstrument::new(InstrumentKind::Cash, dec!(60000)),
        PaymentInstrument::transfer(dec!(40000), "Bancolombia"),
    ]
}

#[tokio::test]
async fn test_batch_creates_one_settlement_per_obligation() {
    let obligations = vec![
        obligation(1, (2026, 1, 10), dec!(60000)),
        obligation(2, (2026, 2, 10), dec!(40000)),
    ];
    let repo = Arc::new(MockObligationRepository::default());
    let submitter = BatchSubmitter::new(repo.clone());

    let allocation =
        AllocationEngine::allocate(dec!(100000), &obligations, &default_settings()).unwrap();
    let summary = submitter
        .submit_batch(
            BatchMode::Settlements,
            &allocation,
            &instruments(),
            &metadata(),
        )
        .await
        .unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 0);
    assert!(summary.failed.is_empty());

    let requests = repo.settlement_requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    for request in requests.iter() {
        // Shares of each request sum to exactly its applied amount.
        let share_total: Decimal = request.instrument_shares.iter().map(|s| s.amount).sum();
        assert_eq!(share_total, request.applied_amount);
        assert!(request.closes_obligation);
    }
}

#[tokio::test]
async fn test_resubmitting_batch_skips_everything() {
    let obligations = vec![
        obligation(1, (2026, 1, 10), dec!(60000)),
        obligation(2, (2026, 2, 10), dec!(40000)),
    ];
    let repo = Arc::new(MockObligationRepository::default());
    let submitter = BatchSubmitter::new(repo.clone());

    let allocation =
        AllocationEngine::allocate(dec!(100000), &obligations, &default_settings()).unwrap();

    let first = submitter
        .submit_batch(
            BatchMode::Settlements,
            &allocation,
            &instruments(),
            &metadata(),
        )
        .await
        .unwrap();
    assert_eq!(first.created, 2);

    // Same batch again: every obligation already settled, nothing is
    // duplicated.
    let second = submitter
        .submit_batch(
            BatchMode::Settlements,
            &allocation,
            &instruments(),
            &metadata(),
        )
        .await
        .unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 2);
    assert!(second.failed.is_empty());
    assert_eq!(repo.settlement_requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_partial_failure_does_not_block_siblings() {
    let obligations = vec![
        obligation(1, (2026, 1, 10), dec!(30000)),
        obligation(2, (2026, 2, 10), dec!(30000)),
        obligation(3, (2026, 3, 10), dec!(40000)),
    ];
    let repo = Arc::new(MockObligationRepository::default());
    repo.fail_obligation(2, "caja cerrada para la sucursal");
    let submitter = BatchSubmitter::new(repo.clone());

    let allocation =
        AllocationEngine::allocate(dec!(100000), &obligations, &default_settings()).unwrap();
    let summary = submitter
        .submit_batch(
            BatchMode::Settlements,
            &allocation,
            &[PaymentInstrument::new(InstrumentKind::Cash, dec!(100000))],
            &metadata(),
        )
        .await
        .unwrap();

    assert_eq!(summary.created, 2);
    assert_eq!(summary.skipped, 0);
    // Backend message survives verbatim.
    assert_eq!(
        summary.failed,
        vec![(2, "caja cerrada para la sucursal".to_string())]
    );
}

#[tokio::test]
async fn test_balance_conflict_is_a_failure_not_a_skip() {
    let obligations = vec![obligation(1, (2026, 1, 10), dec!(50000))];
    let repo = Arc::new(MockObligationRepository::default());
    repo.conflict_obligation(1);
    let submitter = BatchSubmitter::new(repo.clone());

    let allocation =
        AllocationEngine::allocate(dec!(50000), &obligations, &default_settings()).unwrap();
    let summary = submitter
        .submit_batch(
            BatchMode::Settlements,
            &allocation,
            &[PaymentInstrument::new(InstrumentKind::Cash, dec!(50000))],
            &metadata(),
        )
        .await
        .unwrap();

    assert_eq!(summary.created, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed.len(), 1);
    assert!(summary.failed[0].1.contains("cambio"));
    assert!(summary.all_failed());
}

#[tokio::test]
async fn test_withholding_written_back_only_on_closing_lines() {
    let mut first = obligation(1, (2026, 1, 10), dec!(1428000));
    first.has_withholding = true;
    let mut second = obligation(2, (2026, 2, 10), dec!(1428000));
    second.has_withholding = true;

    let repo = Arc::new(MockObligationRepository::default());
    let submitter = BatchSubmitter::new(repo.clone());

    // Payment closes the first obligation, partially pays the second.
    let allocation = AllocationEngine::allocate(
        dec!(2000000),
        &[first, second],
        &default_settings(),
    )
    .unwrap();
    let summary = submitter
        .submit_batch(
            BatchMode::Settlements,
            &allocation,
            &[PaymentInstrument::new(InstrumentKind::Cash, dec!(2000000))],
            &metadata(),
        )
        .await
        .unwrap();

    assert_eq!(summary.created, 2);
    let updates = repo.withholding_updates.lock().unwrap();
    assert_eq!(updates.as_slice(), &[(1, dec!(30000.00))]);

    let requests = repo.settlement_requests.lock().unwrap();
    let closing = requests.iter().find(|r| r.obligation_id == 1).unwrap();
    assert_eq!(closing.withholding_amount, dec!(30000.00));
    let partial = requests.iter().find(|r| r.obligation_id == 2).unwrap();
    assert_eq!(partial.withholding_amount, dec!(0));
}

#[tokio::test]
async fn test_invoice_mode_creates_and_pays() {
    let obligations = vec![
        obligation(1, (2026, 1, 10), dec!(60000)),
        obligation(2, (2026, 2, 10), dec!(40000)),
    ];
    let repo = Arc::new(MockObligationRepository::default());
    let submitter = BatchSubmitter::new(repo.clone());

    let allocation =
        AllocationEngine::allocate(dec!(100000), &obligations, &default_settings()).unwrap();
    let summary = submitter
        .submit_batch(
            BatchMode::Invoices,
            &allocation,
            &[PaymentInstrument::new(InstrumentKind::Cash, dec!(100000))],
            &metadata(),
        )
        .await
        .unwrap();

    assert_eq!(summary.created, 2);
    let created = repo.invoices_created.lock().unwrap();
    let paid = repo.invoices_paid.lock().unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(paid.len(), 2);

    for outcome in &summary.outcomes {
        match outcome {
            SettlementOutcome::Created { external_id, .. } => {
                assert!(external_id.starts_with("F-"));
            }
            other => panic!("expected created outcome, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_invoice_mode_retry_skips_already_invoiced() {
    let obligations = vec![obligation(1, (2026, 1, 10), dec!(60000))];
    let repo = Arc::new(MockObligationRepository::default());
    let submitter = BatchSubmitter::new(repo.clone());

    let allocation =
        AllocationEngine::allocate(dec!(60000), &obligations, &default_settings()).unwrap();
    let cash = [PaymentInstrument::new(InstrumentKind::Cash, dec!(60000))];

    let first = submitter
        .submit_batch(BatchMode::Invoices, &allocation, &cash, &metadata())
        .await
        .unwrap();
    assert_eq!(first.created, 1);

    let second = submitter
        .submit_batch(BatchMode::Invoices, &allocation, &cash, &metadata())
        .await
        .unwrap();
    assert_eq!(second.skipped, 1);
    assert_eq!(repo.invoices_created.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_zero_applied_lines_are_not_submitted() {
    let obligations = vec![
        obligation(1, (2026, 1, 10), dec!(100000)),
        obligation(2, (2026, 2, 10), dec!(100000)),
    ];
    let repo = Arc::new(MockObligationRepository::default());
    let submitter = BatchSubmitter::new(repo.clone());

    // Payment only covers the older obligation.
    let allocation =
        AllocationEngine::allocate(dec!(100000), &obligations, &default_settings()).unwrap();
    assert_eq!(allocation.lines[1].applied_amount, dec!(0));

    let summary = submitter
        .submit_batch(
            BatchMode::Settlements,
            &allocation,
            &[PaymentInstrument::new(InstrumentKind::Cash, dec!(100000))],
            &metadata(),
        )
        .await
        .unwrap();

    assert_eq!(summary.total(), 1);
    assert_eq!(repo.settlement_requests.lock().unwrap().len(), 1);
}
