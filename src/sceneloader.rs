//! Background scene loading.
//!
//! The loader builds the next scene on a worker thread while the live one
//! keeps running. The worker owns the staged [`Scene`] until it is sent
//! back through a one-slot channel; the only shared state is the status
//! flag and the success flag, both atomics written by the worker and read
//! by the main thread when it polls once per frame.
//!
//! ```text
//! Idle --start--> Loading --worker ok--> Ready --mark_swapped--> Swapped
//!                    \--worker err--> Failed
//! ```
//!
//! A new load may start from `Idle`, `Swapped` or `Failed`.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, TryRecvError, bounded};
use log::{error, info, warn};

use crate::error::SceneLoadError;
use crate::game::Game;
use crate::resources::collisiontable::CollisionTable;
use crate::scene::Scene;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderStatus {
    Idle = 0,
    Loading = 1,
    Ready = 2,
    Swapped = 3,
    Failed = 4,
}

impl LoaderStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => LoaderStatus::Loading,
            2 => LoaderStatus::Ready,
            3 => LoaderStatus::Swapped,
            4 => LoaderStatus::Failed,
            _ => LoaderStatus::Idle,
        }
    }

    fn accepts_new_load(self) -> bool {
        matches!(
            self,
            LoaderStatus::Idle | LoaderStatus::Swapped | LoaderStatus::Failed
        )
    }
}

/// What [`SceneLoader::poll`] saw this frame.
#[derive(Debug)]
pub enum LoadPoll {
    /// No load was started, or the last one was already consumed.
    Idle,
    Pending,
    /// The staged scene is ready to become live.
    Ready(Box<Scene>),
    Failed(SceneLoadError),
}

struct InFlight {
    index: usize,
    rx: Receiver<Result<Scene, SceneLoadError>>,
    handle: JoinHandle<()>,
}

pub struct SceneLoader {
    status: Arc<AtomicU8>,
    succeeded: Arc<AtomicBool>,
    in_flight: Option<InFlight>,
    last_failure: Option<usize>,
}

impl Default for SceneLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneLoader {
    pub fn new() -> Self {
        Self {
            status: Arc::new(AtomicU8::new(LoaderStatus::Idle as u8)),
            succeeded: Arc::new(AtomicBool::new(false)),
            in_flight: None,
            last_failure: None,
        }
    }

    pub fn status(&self) -> LoaderStatus {
        LoaderStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// Whether the last finished load succeeded.
    pub fn last_load_succeeded(&self) -> bool {
        self.succeeded.load(Ordering::Acquire)
    }

    /// Index of the most recent load that failed, cleared by a successful one.
    pub fn last_failure(&self) -> Option<usize> {
        self.last_failure
    }

    pub fn is_busy(&self) -> bool {
        !self.status().accepts_new_load()
    }

    /// Index of the scene being loaded or waiting to be swapped in.
    pub fn loading_index(&self) -> Option<usize> {
        self.in_flight.as_ref().map(|f| f.index)
    }

    /// Start building scene `index` in the background.
    ///
    /// Returns `false` (and does nothing) while a previous load is still
    /// loading or waiting to be swapped in.
    pub fn start(&mut self, game: Arc<dyn Game>, table: &CollisionTable, index: usize) -> bool {
        if self.is_busy() {
            warn!("scene load {} refused: loader is {:?}", index, self.status());
            return false;
        }
        if self.in_flight.is_some() {
            // Finished but never polled: join the worker and report its outcome.
            let _ = self.poll();
        }
        info!("loading scene {} in the background", index);
        self.status.store(LoaderStatus::Loading as u8, Ordering::Release);
        self.succeeded.store(false, Ordering::Release);

        let (tx, rx) = bounded(1);
        let status = Arc::clone(&self.status);
        let succeeded = Arc::clone(&self.succeeded);
        let table = table.clone();
        let handle = std::thread::spawn(move || {
            let result = build_scene(game.as_ref(), &table, index);
            let ok = result.is_ok();
            let _ = tx.send(result);
            succeeded.store(ok, Ordering::Release);
            let done = if ok {
                LoaderStatus::Ready
            } else {
                LoaderStatus::Failed
            };
            status.store(done as u8, Ordering::Release);
        });
        self.in_flight = Some(InFlight { index, rx, handle });
        true
    }

    /// Check on the running load without blocking.
    ///
    /// A finished load is handed over exactly once: `Ready` carries the
    /// staged scene, after which the caller swaps it in and calls
    /// [`mark_swapped`](Self::mark_swapped).
    pub fn poll(&mut self) -> LoadPoll {
        let Some(flight) = self.in_flight.as_ref() else {
            return LoadPoll::Idle;
        };
        let outcome = match flight.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return LoadPoll::Pending,
            Err(TryRecvError::Disconnected) => Err(SceneLoadError::Disconnected),
        };
        let Some(flight) = self.in_flight.take() else {
            return LoadPoll::Idle;
        };
        let index = flight.index;
        // The worker stores the final status before exiting.
        let panicked = flight.handle.join().is_err();
        let outcome = match outcome {
            Err(SceneLoadError::Disconnected) if panicked => Err(SceneLoadError::WorkerPanicked),
            other => other,
        };

        match outcome {
            Ok(scene) => {
                info!("scene {} ('{}') is ready", index, scene.name);
                self.last_failure = None;
                LoadPoll::Ready(Box::new(scene))
            }
            Err(err) => {
                error!("scene {} failed to load: {}", index, err);
                self.last_failure = Some(index);
                self.status.store(LoaderStatus::Failed as u8, Ordering::Release);
                self.succeeded.store(false, Ordering::Release);
                LoadPoll::Failed(err)
            }
        }
    }

    /// Record that the ready scene went live.
    pub fn mark_swapped(&mut self) {
        if self.status() == LoaderStatus::Ready {
            self.status.store(LoaderStatus::Swapped as u8, Ordering::Release);
        }
    }
}

/// Build, validate and prepare scene `index` for going live.
pub fn build_scene(game: &dyn Game, table: &CollisionTable, index: usize) -> Result<Scene, SceneLoadError> {
    let mut scene = game.load_scene_by_index(index)?;
    scene.prepare(table)?;
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::collider::Collider;
    use crate::entity::Entity;
    use glam::Vec3;
    use std::time::{Duration, Instant};

    struct TwoScenes;

    impl Game for TwoScenes {
        fn layer_count(&self) -> usize {
            2
        }

        fn scene_names(&self) -> Vec<String> {
            vec!["one".into(), "two".into()]
        }

        fn load_scene_by_index(&self, index: usize) -> Result<Scene, SceneLoadError> {
            match index {
                0 | 1 => {
                    let mut scene = Scene::new(index, self.scene_names()[index].clone());
                    scene.spawn(Entity::custom("w", Vec3::ZERO, Collider::rectangle(1, 1.0, 1.0), Still));
                    Ok(scene)
                }
                7 => {
                    let mut scene = Scene::new(index, "bad layers");
                    scene.spawn(Entity::custom("w", Vec3::ZERO, Collider::rectangle(5, 1.0, 1.0), Still));
                    Ok(scene)
                }
                _ => Err(SceneLoadError::UnknownScene(index)),
            }
        }
    }

    struct Still;
    impl crate::actors::Behavior for Still {}

    fn wait(loader: &mut SceneLoader) -> LoadPoll {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match loader.poll() {
                LoadPoll::Pending if Instant::now() < deadline => std::thread::sleep(Duration::from_millis(1)),
                other => return other,
            }
        }
    }

    #[test]
    fn test_load_and_swap_cycle() {
        let game: Arc<dyn Game> = Arc::new(TwoScenes);
        let table = CollisionTable::new(2).unwrap();
        let mut loader = SceneLoader::new();
        assert_eq!(loader.status(), LoaderStatus::Idle);
        assert!(matches!(loader.poll(), LoadPoll::Idle));

        assert!(loader.start(game.clone(), &table, 1));
        assert!(loader.is_busy());
        let LoadPoll::Ready(scene) = wait(&mut loader) else {
            panic!("expected a ready scene");
        };
        assert_eq!(scene.name, "two");
        assert_eq!(loader.status(), LoaderStatus::Ready);
        assert!(loader.last_load_succeeded());
        // Ready but not yet swapped: no new load.
        assert!(!loader.start(game.clone(), &table, 0));

        loader.mark_swapped();
        assert_eq!(loader.status(), LoaderStatus::Swapped);
        assert!(loader.start(game, &table, 0));
        assert!(matches!(wait(&mut loader), LoadPoll::Ready(_)));
    }

    #[test]
    fn test_failures_leave_loader_reusable() {
        let game: Arc<dyn Game> = Arc::new(TwoScenes);
        let table = CollisionTable::new(2).unwrap();
        let mut loader = SceneLoader::new();

        assert!(loader.start(game.clone(), &table, 3));
        assert!(matches!(
            wait(&mut loader),
            LoadPoll::Failed(SceneLoadError::UnknownScene(3))
        ));
        assert_eq!(loader.status(), LoaderStatus::Failed);
        assert!(!loader.last_load_succeeded());

        assert!(loader.start(game, &table, 7));
        assert!(matches!(
            wait(&mut loader),
            LoadPoll::Failed(SceneLoadError::InvalidLayer { layer: 5, .. })
        ));
        assert_eq!(loader.last_failure(), Some(7));
    }

    #[test]
    fn test_unpolled_failure_is_reported_before_restart() {
        let game: Arc<dyn Game> = Arc::new(TwoScenes);
        let table = CollisionTable::new(2).unwrap();
        let mut loader = SceneLoader::new();

        assert!(loader.start(game.clone(), &table, 3));
        let deadline = Instant::now() + Duration::from_secs(5);
        while loader.status() != LoaderStatus::Failed {
            assert!(Instant::now() < deadline, "load never failed");
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(loader.last_failure(), None);

        assert!(loader.start(game, &table, 0));
        assert_eq!(loader.last_failure(), Some(3));
        assert_eq!(loader.loading_index(), Some(0));
        assert!(matches!(wait(&mut loader), LoadPoll::Ready(_)));
        assert_eq!(loader.last_failure(), None);
    }
}
