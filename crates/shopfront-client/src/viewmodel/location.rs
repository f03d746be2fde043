//! Device geolocation state.
//!
//! One-shot fetches walk Idle -> Loading -> Success | Error; continuous
//! tracking walks Idle -> Tracking and back on an explicit stop.  Starting a
//! new tracking session while one is active replaces the previous session.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use shopfront_shared::{LocationError, LocationFix, LocationProvider, PermissionGate};

/// Geolocation flow states.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum LocationState {
    Idle,
    Loading,
    Tracking,
    Success(LocationFix),
    Error(String),
}

pub struct LocationViewModel {
    gate: Arc<dyn PermissionGate>,
    provider: Arc<dyn LocationProvider>,
    state: Arc<watch::Sender<LocationState>>,
    current_fix: Arc<watch::Sender<Option<LocationFix>>>,
    tracking_task: Mutex<Option<JoinHandle<()>>>,
}

impl LocationViewModel {
    pub fn new(gate: Arc<dyn PermissionGate>, provider: Arc<dyn LocationProvider>) -> Self {
        Self {
            gate,
            provider,
            state: Arc::new(watch::Sender::new(LocationState::Idle)),
            current_fix: Arc::new(watch::Sender::new(None)),
            tracking_task: Mutex::new(None),
        }
    }

    pub fn state(&self) -> watch::Receiver<LocationState> {
        self.state.subscribe()
    }

    pub fn current_fix(&self) -> watch::Receiver<Option<LocationFix>> {
        self.current_fix.subscribe()
    }

    pub fn has_permission(&self) -> bool {
        self.gate.location_granted()
    }

    /// Fetch the device's last cached fix.
    pub async fn last_known_location(&self) {
        if !self.has_permission() {
            self.fail(LocationError::PermissionDenied);
            return;
        }

        self.state.send_replace(LocationState::Loading);
        match self.provider.last_known().await {
            Ok(fix) => self.succeed(fix),
            Err(e) => self.fail(e),
        }
    }

    /// Fetch a fresh high-accuracy fix.
    pub async fn current_location(&self) {
        if !self.has_permission() {
            self.fail(LocationError::PermissionDenied);
            return;
        }

        self.state.send_replace(LocationState::Loading);
        match self.provider.current_fix().await {
            Ok(fix) => self.succeed(fix),
            Err(e) => self.fail(e),
        }
    }

    /// Begin continuous updates at roughly `interval`.
    ///
    /// A session already in flight is stopped first, so at most one update
    /// stream is ever live.
    pub fn start_tracking(&self, interval: Duration) {
        if !self.has_permission() {
            self.fail(LocationError::PermissionDenied);
            return;
        }

        if self.abort_tracking_task() {
            self.provider.stop_updates();
        }

        let mut updates = match self.provider.start_updates(interval) {
            Ok(updates) => updates,
            Err(e) => {
                self.fail(e);
                return;
            }
        };

        self.state.send_replace(LocationState::Tracking);

        let state = self.state.clone();
        let current_fix = self.current_fix.clone();
        let task = tokio::spawn(async move {
            while let Some(update) = updates.recv().await {
                match update {
                    Ok(fix) => {
                        current_fix.send_replace(Some(fix.clone()));
                        state.send_replace(LocationState::Success(fix));
                    }
                    // Keep the stream; the provider may recover.
                    Err(e) => {
                        state.send_replace(LocationState::Error(e.to_string()));
                    }
                }
            }
        });

        *self.lock_tracking_task() = Some(task);
    }

    /// Stop the update stream, if one is live.
    pub fn stop_tracking(&self) {
        if self.abort_tracking_task() {
            self.provider.stop_updates();
            self.state.send_replace(LocationState::Idle);
        }
    }

    /// Clear a displayed error; the flow falls back to Idle.
    pub fn clear_error(&self) {
        if matches!(*self.state.borrow(), LocationState::Error(_)) {
            self.state.send_replace(LocationState::Idle);
        }
    }

    fn succeed(&self, fix: LocationFix) {
        self.current_fix.send_replace(Some(fix.clone()));
        self.state.send_replace(LocationState::Success(fix));
    }

    fn fail(&self, error: LocationError) {
        self.state.send_replace(LocationState::Error(error.to_string()));
    }

    fn abort_tracking_task(&self) -> bool {
        match self.lock_tracking_task().take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    fn lock_tracking_task(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.tracking_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LocationViewModel {
    fn drop(&mut self) {
        if self.abort_tracking_task() {
            self.provider.stop_updates();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    fn fix(latitude: f64) -> LocationFix {
        LocationFix {
            latitude,
            longitude: 2.294481,
            accuracy: 5.0,
            altitude: None,
            speed: None,
            bearing: None,
            provider: Some("fused".into()),
            timestamp: Utc::now(),
        }
    }

    struct FixedGate(bool);

    impl PermissionGate for FixedGate {
        fn location_granted(&self) -> bool {
            self.0
        }
    }

    /// Provider whose streams are fed by the test.
    struct FakeProvider {
        one_shot: Result<LocationFix, LocationError>,
        update_txs: Mutex<Vec<mpsc::Sender<Result<LocationFix, LocationError>>>>,
        stops: AtomicUsize,
    }

    impl FakeProvider {
        fn new(one_shot: Result<LocationFix, LocationError>) -> Arc<Self> {
            Arc::new(Self {
                one_shot,
                update_txs: Mutex::new(Vec::new()),
                stops: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LocationProvider for FakeProvider {
        async fn last_known(&self) -> Result<LocationFix, LocationError> {
            self.one_shot.clone()
        }

        async fn current_fix(&self) -> Result<LocationFix, LocationError> {
            self.one_shot.clone()
        }

        fn start_updates(
            &self,
            _interval: Duration,
        ) -> Result<mpsc::Receiver<Result<LocationFix, LocationError>>, LocationError> {
            let (tx, rx) = mpsc::channel(8);
            self.update_txs.lock().unwrap().push(tx);
            Ok(rx)
        }

        fn stop_updates(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn vm_with(
        granted: bool,
        provider: Arc<FakeProvider>,
    ) -> LocationViewModel {
        LocationViewModel::new(Arc::new(FixedGate(granted)), provider)
    }

    #[tokio::test]
    async fn one_shot_fetch_reaches_success() {
        let provider = FakeProvider::new(Ok(fix(48.8)));
        let vm = vm_with(true, provider);

        vm.current_location().await;

        assert!(matches!(*vm.state().borrow(), LocationState::Success(_)));
        let current = vm.current_fix().borrow().clone().unwrap();
        assert_eq!(current.latitude, 48.8);
    }

    #[tokio::test]
    async fn denied_permission_is_an_error_state() {
        let provider = FakeProvider::new(Ok(fix(48.8)));
        let vm = vm_with(false, provider);

        vm.last_known_location().await;

        assert_eq!(
            *vm.state().borrow(),
            LocationState::Error("Location permission not granted".to_string())
        );

        vm.clear_error();
        assert_eq!(*vm.state().borrow(), LocationState::Idle);
    }

    #[tokio::test]
    async fn provider_failure_surfaces_as_message() {
        let provider = FakeProvider::new(Err(LocationError::NoFix));
        let vm = vm_with(true, provider);

        vm.current_location().await;

        assert_eq!(
            *vm.state().borrow(),
            LocationState::Error("No location fix available".to_string())
        );
    }

    #[tokio::test]
    async fn tracking_publishes_each_fix_until_stopped() {
        let provider = FakeProvider::new(Ok(fix(0.0)));
        let vm = vm_with(true, provider.clone());
        let mut state = vm.state();

        vm.start_tracking(Duration::from_millis(10));
        assert_eq!(*state.borrow_and_update(), LocationState::Tracking);

        let tx = provider.update_txs.lock().unwrap()[0].clone();
        tx.send(Ok(fix(1.0))).await.unwrap();

        timeout(WAIT, async {
            loop {
                state.changed().await.unwrap();
                if matches!(*state.borrow_and_update(), LocationState::Success(_)) {
                    break;
                }
            }
        })
        .await
        .expect("fix should reach the state cell");

        vm.stop_tracking();
        assert_eq!(*vm.state().borrow(), LocationState::Idle);
        assert_eq!(provider.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn starting_again_replaces_the_previous_session() {
        let provider = FakeProvider::new(Ok(fix(0.0)));
        let vm = vm_with(true, provider.clone());

        vm.start_tracking(Duration::from_millis(10));
        vm.start_tracking(Duration::from_millis(10));

        // The first session was stopped when the second one started.
        assert_eq!(provider.stops.load(Ordering::SeqCst), 1);
        assert_eq!(provider.update_txs.lock().unwrap().len(), 2);
        assert_eq!(*vm.state().borrow(), LocationState::Tracking);
    }

    #[tokio::test]
    async fn mid_stream_fault_becomes_an_error_without_ending_tracking() {
        let provider = FakeProvider::new(Ok(fix(0.0)));
        let vm = vm_with(true, provider.clone());
        let mut state = vm.state();

        vm.start_tracking(Duration::from_millis(10));
        state.borrow_and_update();

        let tx = provider.update_txs.lock().unwrap()[0].clone();
        tx.send(Err(LocationError::Unavailable)).await.unwrap();

        timeout(WAIT, async {
            loop {
                state.changed().await.unwrap();
                if matches!(*state.borrow_and_update(), LocationState::Error(_)) {
                    break;
                }
            }
        })
        .await
        .expect("fault should reach the state cell");

        // The stream is still live: a later fix recovers to Success.
        tx.send(Ok(fix(2.0))).await.unwrap();
        timeout(WAIT, async {
            loop {
                state.changed().await.unwrap();
                if matches!(*state.borrow_and_update(), LocationState::Success(_)) {
                    break;
                }
            }
        })
        .await
        .expect("recovery should reach the state cell");
    }
}
