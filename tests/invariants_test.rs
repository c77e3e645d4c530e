//! Property tests for the lifecycle invariants.
//!
//! Any interleaving of start/finish/failure operations must preserve:
//! - at most one open activity record per supervision,
//! - strictly increasing sequence numbers in creation order,
//! - a closed failure window never reopens.

mod common;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use uuid::Uuid;

use common::setup;
use shiftwatch::domain::ports::ActivityStatisticsRepository;
use shiftwatch::DomainError;

#[derive(Debug, Clone, Copy)]
enum Op {
    StartActivity(usize),
    FinishOpenActivity,
    StartFailure,
    FinishFailure,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4).prop_map(Op::StartActivity),
        Just(Op::FinishOpenActivity),
        Just(Op::StartFailure),
        Just(Op::FinishFailure),
    ]
}

fn expected_domain_error(err: &DomainError) -> bool {
    matches!(
        err,
        DomainError::ActivityAlreadyActivated
            | DomainError::ActivityFailure { .. }
            | DomainError::FailureAlreadyStarted
            | DomainError::FailureNotStarted
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: no operation order can produce two simultaneously-open
    /// records or break sequence monotonicity.
    #[test]
    fn prop_open_record_unique_and_sequences_monotonic(ops in prop::collection::vec(op_strategy(), 1..25)) {
        let runtime = tokio::runtime::Runtime::new().expect("failed to build runtime");
        runtime.block_on(async {
            let ctx = setup().await;
            let supervision = ctx.new_supervision().await;
            let actor = supervision.supervisor_id;
            let catalog: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

            for op in &ops {
                let result = match op {
                    Op::StartActivity(slot) => ctx
                        .activities
                        .start_activity(supervision.id, catalog[*slot], actor, None)
                        .await
                        .map(|_| ()),
                    Op::FinishOpenActivity => {
                        match ctx.statistics_repo.find_open(supervision.id).await.unwrap() {
                            Some(open) => ctx.activities.finish_activity(open.id).await,
                            None => Ok(()),
                        }
                    }
                    Op::StartFailure => {
                        match ctx.statistics_repo.find_open(supervision.id).await.unwrap() {
                            Some(open) => ctx
                                .failures
                                .start_failure(supervision.id, open.activity_id)
                                .await
                                .map(|_| ()),
                            None => Ok(()),
                        }
                    }
                    Op::FinishFailure => {
                        match ctx.statistics_repo.find_open(supervision.id).await.unwrap() {
                            Some(open) => ctx
                                .failures
                                .finish_failure(supervision.id, open.activity_id)
                                .await
                                .map(|_| ()),
                            None => Ok(()),
                        }
                    }
                };

                if let Err(err) = result {
                    prop_assert!(expected_domain_error(&err), "unexpected error: {err}");
                }

                ctx.clock.advance(chrono::Duration::minutes(1));

                let records = ctx.activities.list(supervision.id).await.unwrap();
                let open_count = records.iter().filter(|r| r.is_open()).count();
                prop_assert!(open_count <= 1, "{open_count} open records");

                for pair in records.windows(2) {
                    prop_assert!(pair[0].sequence < pair[1].sequence);
                }
            }

            // Finishing the session closes everything that is left.
            ctx.supervisions.finish(supervision.id).await.unwrap();
            let records = ctx.activities.list(supervision.id).await.unwrap();
            prop_assert!(records.iter().all(|r| !r.is_open()));

            Ok::<(), TestCaseError>(())
        })?;
    }
}
