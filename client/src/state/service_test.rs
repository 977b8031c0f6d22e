use super::*;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use canvas::grid::GridSize;
use tokio::sync::mpsc::UnboundedSender;

use crate::net::types::{CellRecord, LeaderboardEntry, PaintPayload};
use crate::util::prefs::MemoryPrefs;

const REFRESH: Duration = Duration::from_secs(3600);

fn session() -> PaintSession {
    PaintSession::new(
        GridSize::new(100, 100),
        Duration::from_millis(15_000),
        Box::new(MemoryPrefs::new()),
    )
}

/// Scripted store: configurable failures, recorded submissions, and a
/// captured feed sender for injecting remote updates.
#[derive(Default)]
struct MockStore {
    fail_snapshot: bool,
    fail_submission: bool,
    fail_subscribe: bool,
    snapshot: Vec<CellRecord>,
    submitted: Mutex<Vec<PaintPayload>>,
    leaderboard_fetches: AtomicUsize,
    feed: Mutex<Option<UnboundedSender<CellRecord>>>,
    feed_closed: Arc<AtomicBool>,
}

impl MockStore {
    fn submitted(&self) -> Vec<PaintPayload> {
        self.submitted.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn push_remote(&self, record: CellRecord) {
        let feed = self.feed.lock().unwrap_or_else(PoisonError::into_inner);
        feed.as_ref().expect("feed not subscribed").send(record).expect("feed closed");
    }
}

#[async_trait::async_trait]
impl CanvasStore for MockStore {
    async fn fetch_canvas(&self) -> Result<Vec<CellRecord>, StoreError> {
        if self.fail_snapshot {
            Err(StoreError::Snapshot("scripted failure".into()))
        } else {
            Ok(self.snapshot.clone())
        }
    }

    async fn submit_paint(&self, payload: PaintPayload) -> Result<(), StoreError> {
        self.submitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload);
        if self.fail_submission {
            Err(StoreError::Submission("scripted failure".into()))
        } else {
            Ok(())
        }
    }

    async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.leaderboard_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(vec![LeaderboardEntry { team: canvas::grid::Team::Blue, count: 1 }])
    }

    async fn subscribe(
        &self,
        updates: mpsc::UnboundedSender<CellRecord>,
    ) -> Result<Subscription, StoreError> {
        if self.fail_subscribe {
            return Err(StoreError::Subscription("scripted failure".into()));
        }
        *self.feed.lock().unwrap_or_else(PoisonError::into_inner) = Some(updates);
        let closed = Arc::clone(&self.feed_closed);
        Ok(Subscription::new(move || closed.store(true, Ordering::SeqCst)))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

// --- Initialization ---

#[tokio::test]
async fn initialize_loads_snapshot_and_wires_the_feed() {
    let store = Arc::new(MockStore {
        snapshot: vec![
            CellRecord::new(1, 1, Team::Blue, 10),
            CellRecord::new(2, 2, Team::Pink, 20),
        ],
        ..MockStore::default()
    });
    let mut service = SessionService::new(session(), Arc::clone(&store) as Arc<dyn CanvasStore>);

    service.initialize(REFRESH).await.expect("initialize");

    let session = service.session();
    assert_eq!(session.lock().expect("lock").grid().len(), 2);
    // The first leaderboard came with initialization.
    assert!(store.leaderboard_fetches.load(Ordering::SeqCst) >= 1);
    assert_eq!(session.lock().expect("lock").leaderboard().len(), 1);

    // Remote updates pushed through the feed land in the grid in order.
    store.push_remote(CellRecord::new(3, 3, Team::Green, 30));
    wait_until(|| session.lock().expect("lock").grid().len() == 3).await;
}

#[tokio::test]
async fn snapshot_failure_is_reported_but_session_runs_empty() {
    init_tracing();
    let store = Arc::new(MockStore { fail_snapshot: true, ..MockStore::default() });
    let mut service = SessionService::new(session(), Arc::clone(&store) as Arc<dyn CanvasStore>);

    let err = service.initialize(REFRESH).await.expect_err("should surface");
    assert!(matches!(err, StoreError::Snapshot(_)));

    // Empty grid, but the feed still works.
    let session = service.session();
    assert!(session.lock().expect("lock").grid().is_empty());
    store.push_remote(CellRecord::new(0, 0, Team::Orange, 1));
    wait_until(|| session.lock().expect("lock").grid().len() == 1).await;
}

#[tokio::test]
async fn subscription_failure_is_reported_but_snapshot_still_loads() {
    let store = Arc::new(MockStore {
        fail_subscribe: true,
        snapshot: vec![CellRecord::new(1, 1, Team::Blue, 10)],
        ..MockStore::default()
    });
    let mut service = SessionService::new(session(), Arc::clone(&store) as Arc<dyn CanvasStore>);

    let err = service.initialize(REFRESH).await.expect_err("should surface");
    assert!(matches!(err, StoreError::Subscription(_)));
    assert_eq!(service.session().lock().expect("lock").grid().len(), 1);
}

// --- Painting through the service ---

#[tokio::test]
async fn confirm_commits_locally_and_submits_in_the_background() {
    let store = Arc::new(MockStore::default());
    let mut service = SessionService::new(session(), Arc::clone(&store) as Arc<dyn CanvasStore>);
    service.initialize(REFRESH).await.expect("initialize");
    let fetches_after_init = store.leaderboard_fetches.load(Ordering::SeqCst);

    service.select_team(Team::Blue);
    service.request_paint(CellCoord::new(5, 5)).expect("request");
    service.confirm_paint(CellCoord::new(5, 5)).expect("confirm");

    // Local state is already committed when confirm returns.
    assert!(!service.can_paint_now());
    assert!(service.time_until_next_paint() > Duration::ZERO);
    {
        let session = service.session();
        let session = session.lock().expect("lock");
        assert_eq!(session.grid().get(CellCoord::new(5, 5)).map(|c| c.team), Some(Team::Blue));
    }

    wait_until(|| store.submitted().len() == 1).await;
    assert_eq!(store.submitted()[0], PaintPayload { x: 5, y: 5, team: Team::Blue });
    // Submission completion triggers a leaderboard refresh.
    wait_until(|| store.leaderboard_fetches.load(Ordering::SeqCst) > fetches_after_init).await;
}

#[tokio::test]
async fn failed_submission_keeps_the_optimistic_state() {
    init_tracing();
    let store = Arc::new(MockStore { fail_submission: true, ..MockStore::default() });
    let mut service = SessionService::new(session(), Arc::clone(&store) as Arc<dyn CanvasStore>);
    service.initialize(REFRESH).await.expect("initialize");
    let fetches_after_init = store.leaderboard_fetches.load(Ordering::SeqCst);

    service.select_team(Team::Purple);
    service.request_paint(CellCoord::new(7, 7)).expect("request");
    service.confirm_paint(CellCoord::new(7, 7)).expect("confirm");

    wait_until(|| store.submitted().len() == 1).await;
    // No rollback: the cell stays ours and the cooldown stays consumed.
    let session = service.session();
    assert_eq!(
        session.lock().expect("lock").grid().get(CellCoord::new(7, 7)).map(|c| c.team),
        Some(Team::Purple)
    );
    assert!(!service.can_paint_now());
    // The refresh still runs after a failed submission.
    wait_until(|| store.leaderboard_fetches.load(Ordering::SeqCst) > fetches_after_init).await;
}

#[tokio::test]
async fn cooldown_blocks_a_second_paint() {
    let store = Arc::new(MockStore::default());
    let mut service = SessionService::new(session(), Arc::clone(&store) as Arc<dyn CanvasStore>);
    service.initialize(REFRESH).await.expect("initialize");

    service.select_team(Team::Green);
    service.request_paint(CellCoord::new(1, 1)).expect("request");
    service.confirm_paint(CellCoord::new(1, 1)).expect("confirm");

    assert!(matches!(
        service.request_paint(CellCoord::new(2, 2)),
        Err(PaintError::CooldownActive { .. })
    ));
}

#[tokio::test]
async fn paint_without_team_is_rejected() {
    let store = Arc::new(MockStore::default());
    let mut service = SessionService::new(session(), Arc::clone(&store) as Arc<dyn CanvasStore>);
    service.initialize(REFRESH).await.expect("initialize");

    assert_eq!(service.request_paint(CellCoord::new(1, 1)), Err(PaintError::TeamNotSelected));
    assert!(store.submitted().is_empty());
}

// --- Background refresh ---

#[tokio::test]
async fn leaderboard_refreshes_periodically() {
    let store = Arc::new(MockStore::default());
    let mut service = SessionService::new(session(), Arc::clone(&store) as Arc<dyn CanvasStore>);
    service.initialize(Duration::from_millis(20)).await.expect("initialize");

    wait_until(|| store.leaderboard_fetches.load(Ordering::SeqCst) >= 3).await;
    service.shutdown();
}

// --- Teardown ---

#[tokio::test]
async fn shutdown_releases_the_subscription() {
    let store = Arc::new(MockStore::default());
    let mut service = SessionService::new(session(), Arc::clone(&store) as Arc<dyn CanvasStore>);
    service.initialize(REFRESH).await.expect("initialize");
    assert!(!store.feed_closed.load(Ordering::SeqCst));

    service.shutdown();
    assert!(store.feed_closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn dropping_the_service_also_tears_down() {
    let store = Arc::new(MockStore::default());
    {
        let mut service = SessionService::new(session(), Arc::clone(&store) as Arc<dyn CanvasStore>);
        service.initialize(REFRESH).await.expect("initialize");
    }
    assert!(store.feed_closed.load(Ordering::SeqCst));
}
