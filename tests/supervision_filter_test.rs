//! Date filtering of the supervision journal, against the real store.
//!
//! Five sessions spread over early January 2024:
//!   s1: Jan 1 - Jan 5
//!   s2: Jan 3 (same-day)
//!   s3: Jan 6 - Jan 10
//!   s4: Jan 2 - ongoing
//!   s5: Dec 30 - Jan 2

mod common;

use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use common::setup;
use shiftwatch::domain::ports::SupervisionRepository;
use shiftwatch::{Supervision, SupervisionFilter};

async fn seed(ctx: &common::TestContext) -> Vec<Supervision> {
    let at = |y: i32, m: u32, d: u32, h: u32| Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
    let spans = [
        (at(2024, 1, 1, 10), Some(at(2024, 1, 5, 15))),
        (at(2024, 1, 3, 9), Some(at(2024, 1, 3, 17))),
        (at(2024, 1, 6, 8), Some(at(2024, 1, 10, 16))),
        (at(2024, 1, 2, 12), None),
        (at(2023, 12, 30, 10), Some(at(2024, 1, 2, 14))),
    ];

    let mut sessions = Vec::new();
    for (start, end) in spans {
        let mut supervision =
            Supervision::new(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), start);
        supervision.end_date = end;
        ctx.supervision_repo.create(&supervision).await.unwrap();
        sessions.push(supervision);
    }
    sessions
}

fn day(d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(2024, 1, d)
}

#[tokio::test]
async fn no_date_bounds_returns_everything() {
    let ctx = setup().await;
    seed(&ctx).await;

    let all = ctx
        .supervision_repo
        .list(SupervisionFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn same_day_returns_sessions_active_that_day() {
    let ctx = setup().await;
    let sessions = seed(&ctx).await;

    // Jan 3: s1 spans it, s2 runs inside it, s4 is ongoing since Jan 2.
    let jan3 = ctx
        .supervision_repo
        .list(SupervisionFilter {
            start_date: day(3),
            end_date: day(3),
            ..Default::default()
        })
        .await
        .unwrap();

    let ids: Vec<Uuid> = jan3.iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&sessions[0].id));
    assert!(ids.contains(&sessions[1].id));
    assert!(ids.contains(&sessions[3].id));
}

#[tokio::test]
async fn same_day_includes_sessions_ending_that_day() {
    let ctx = setup().await;
    let sessions = seed(&ctx).await;

    // Jan 2: s1 spans it, s4 starts on it, s5 ends on it.
    let jan2 = ctx
        .supervision_repo
        .list(SupervisionFilter {
            start_date: day(2),
            end_date: day(2),
            ..Default::default()
        })
        .await
        .unwrap();

    let ids: Vec<Uuid> = jan2.iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&sessions[0].id));
    assert!(ids.contains(&sessions[3].id));
    assert!(ids.contains(&sessions[4].id));
}

#[tokio::test]
async fn single_bound_behaves_as_same_day() {
    let ctx = setup().await;
    let sessions = seed(&ctx).await;

    let start_only = ctx
        .supervision_repo
        .list(SupervisionFilter {
            start_date: day(3),
            ..Default::default()
        })
        .await
        .unwrap();
    let end_only = ctx
        .supervision_repo
        .list(SupervisionFilter {
            end_date: day(3),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(start_only.len(), 3);
    assert_eq!(end_only.len(), 3);
    assert!(start_only.iter().any(|s| s.id == sessions[1].id));
}

#[tokio::test]
async fn range_returns_contained_sessions() {
    let ctx = setup().await;
    let sessions = seed(&ctx).await;

    // Jan 1-5: s1 and s2 are contained, s4 is ongoing and started inside;
    // s5 started before the range, s3 after it.
    let range = ctx
        .supervision_repo
        .list(SupervisionFilter {
            start_date: day(1),
            end_date: day(5),
            ..Default::default()
        })
        .await
        .unwrap();

    let ids: Vec<Uuid> = range.iter().map(|s| s.id).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&sessions[0].id));
    assert!(ids.contains(&sessions[1].id));
    assert!(ids.contains(&sessions[3].id));
}

#[tokio::test]
async fn range_matching_exactly_one_session() {
    let ctx = setup().await;
    let sessions = seed(&ctx).await;

    let range = ctx
        .supervision_repo
        .list(SupervisionFilter {
            start_date: day(6),
            end_date: day(10),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(range.len(), 1);
    assert_eq!(range[0].id, sessions[2].id);
}

#[tokio::test]
async fn date_bounds_combine_with_actor_filters() {
    let ctx = setup().await;
    let sessions = seed(&ctx).await;

    let filtered = ctx
        .supervision_repo
        .list(SupervisionFilter {
            supervisor_id: Some(sessions[0].supervisor_id),
            start_date: day(3),
            end_date: day(3),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, sessions[0].id);
}
