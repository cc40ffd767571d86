//! Convergence of concurrent lock requests on one block.
//!
//! Validates:
//! - Exactly one requester wins and exactly one event is published
//! - Every caller observes the same final owner and lock instant
//! - Two coordinators sharing one store (separate processes) still agree

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

mod common;

use std::{collections::HashSet, sync::Arc};

use blocklock_core::{Error, LockCoordinator, LockView, Result, RoomHub};
use common::{block, release, t0, user, Fixture};
use tokio::task::JoinSet;

async fn race(coordinators: &[Arc<LockCoordinator>], requesters: usize) -> Result<Vec<LockView>> {
    let mut set = JoinSet::new();
    for n in 0..requesters {
        let coordinator = Arc::clone(&coordinators[n % coordinators.len()]);
        set.spawn(async move {
            coordinator
                .lock(&block("block-1")?, &user(&format!("user-{n}"))?, false)
                .await
        });
    }

    let mut views = Vec::with_capacity(requesters);
    while let Some(joined) = set.join_next().await {
        let view = joined.map_err(|e| Error::IoError(format!("task failed: {e}")))??;
        views.push(view);
    }
    Ok(views)
}

fn assert_same_instant(views: &[LockView]) {
    let Some(first) = views.first() else {
        return;
    };
    assert!(
        views
            .iter()
            .all(|v| v.locked == first.locked && v.locked_until == first.locked_until),
        "all callers see one lock instant"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_locks_converge() -> Result<()> {
    let mut fx = Fixture::new().await?;
    let views = race(&[Arc::clone(&fx.coordinator)], 16).await?;

    let owners: HashSet<&str> = views.iter().map(|v| v.locked_by.email.as_str()).collect();
    assert_eq!(owners.len(), 1, "all callers see one owner: {owners:?}");
    assert_same_instant(&views);
    assert!(views.iter().all(|v| v.locked == t0()));
    assert_eq!(fx.drain_events().len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_separate_coordinators_agree_through_store() -> Result<()> {
    let store = common::seeded_store().await?;
    let hub = Arc::new(RoomHub::default());
    let mut room = hub.join(&release("release-1")?);
    let clock = Arc::new(blocklock_core::ManualClock::new(t0()));

    let coordinators: Vec<Arc<LockCoordinator>> = (0..2)
        .map(|_| {
            Arc::new(
                LockCoordinator::new(
                    Arc::new(store.clone()),
                    Arc::new(store.clone()),
                    hub.clone(),
                )
                .with_clock(clock.clone()),
            )
        })
        .collect();

    let views = race(&coordinators, 16).await?;

    let owners: HashSet<&str> = views.iter().map(|v| v.locked_by.email.as_str()).collect();
    assert_eq!(owners.len(), 1, "all callers see one owner: {owners:?}");
    assert_same_instant(&views);

    let events = std::iter::from_fn(|| room.try_recv()).count();
    assert_eq!(events, 1);
    Ok(())
}
