//! Scene transitions through a loading scene
//!
//! [`SceneTransitionSequencer`] moves the game from the active scene to a
//! target scene while a lightweight transition scene (a loading screen) is
//! shown:
//!
//! 1. Load the transition scene additively and wait for it (progress 0.1)
//! 2. Load the target additively with activation deferred; load progress
//!    `[0, 1]` maps onto `[0.1, 0.9]`
//! 3. Allow activation and wait for it (progress 0.9)
//! 4. Unload the transition scene, make the target active
//! 5. Unload the scene that was active when the request was made, unless it
//!    is the transition scene or the target (progress 1.0)
//!
//! Every wait is a state; [`tick`](SceneTransitionSequencer::tick) advances
//! at most one state per frame.

use log::{debug, info, warn};

use crate::scene::SceneError;
use crate::scene_loader::{SceneBackend, SceneOpKey};

/// Progress once the transition scene is up
pub const PROGRESS_TRANSITION_LOADED: f32 = 0.1;
/// Progress once the target scene is activated
pub const PROGRESS_TARGET_ACTIVATED: f32 = 0.9;

/// Where the sequencer is in a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionState {
    Idle,
    LoadingTransition,
    LoadingTarget,
    Activating,
    UnloadingTransition,
    UnloadingPrevious,
    Done,
}

/// Errors from transition requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// A transition is already running
    Busy,
    /// The target cannot be used (it is the transition scene itself)
    InvalidTarget(String),
    /// The transition has passed the point where it can be cancelled
    NotCancellable,
    /// The scene collaborator refused an operation
    Scene(SceneError),
}

impl From<SceneError> for TransitionError {
    fn from(e: SceneError) -> Self {
        TransitionError::Scene(e)
    }
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionError::Busy => write!(f, "A scene transition is already in progress"),
            TransitionError::InvalidTarget(name) => write!(f, "Invalid transition target: {}", name),
            TransitionError::NotCancellable => write!(f, "Transition can no longer be cancelled"),
            TransitionError::Scene(e) => write!(f, "Scene error: {}", e),
        }
    }
}

impl std::error::Error for TransitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransitionError::Scene(e) => Some(e),
            _ => None,
        }
    }
}

/// One in-flight transition
#[derive(Clone, Debug)]
pub struct SceneLoadJob {
    /// Scene being loaded
    pub target: String,
    /// Loading-screen scene shown meanwhile
    pub transition: String,
    /// Scene that was active when the job was accepted
    pub previous: Option<String>,
    /// Progress in [0, 1], never decreasing
    pub progress: f32,
    /// Set once the target is active and every cleanup unload finished
    pub complete: bool,
    /// Operation currently awaited
    op: Option<SceneOpKey>,
}

impl SceneLoadJob {
    fn advance_progress(&mut self, value: f32) {
        self.progress = self.progress.max(value.clamp(0.0, 1.0));
    }
}

/// Drives scene transitions frame by frame
pub struct SceneTransitionSequencer {
    transition_scene: String,
    state: TransitionState,
    job: Option<SceneLoadJob>,
    /// Most recently completed job
    last_job: Option<SceneLoadJob>,
    /// Progress of the current or most recent job
    progress: f32,
}

impl SceneTransitionSequencer {
    /// Create a sequencer using `transition_scene` as the loading screen
    pub fn new(transition_scene: impl Into<String>) -> Self {
        Self {
            transition_scene: transition_scene.into(),
            state: TransitionState::Idle,
            job: None,
            last_job: None,
            progress: 0.0,
        }
    }

    pub fn transition_scene(&self) -> &str {
        &self.transition_scene
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// The in-flight job, if any
    pub fn job(&self) -> Option<&SceneLoadJob> {
        self.job.as_ref()
    }

    /// The job that finished last, kept until the next one completes
    pub fn last_job(&self) -> Option<&SceneLoadJob> {
        self.last_job.as_ref()
    }

    /// Whether a job is running
    pub fn is_busy(&self) -> bool {
        !matches!(self.state, TransitionState::Idle | TransitionState::Done)
    }

    /// Progress in [0, 1]; stays at 1.0 after a completed job
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Start a transition to `scene`
    ///
    /// Rejects the request while another transition runs. The transition
    /// scene load is issued immediately; everything else happens in
    /// [`tick`](Self::tick).
    pub fn request_load<B: SceneBackend>(&mut self, backend: &mut B, scene: &str) -> Result<(), TransitionError> {
        if self.is_busy() {
            warn!("Rejected load of '{}': transition to '{}' in progress",
                scene,
                self.job.as_ref().map(|j| j.target.as_str()).unwrap_or("?"));
            return Err(TransitionError::Busy);
        }
        if scene == self.transition_scene {
            return Err(TransitionError::InvalidTarget(scene.to_string()));
        }
        if !backend.has_scene(scene) {
            return Err(SceneError::NotRegistered(scene.to_string()).into());
        }
        if backend.is_loaded(scene) {
            return Err(SceneError::AlreadyLoaded(scene.to_string()).into());
        }

        let op = backend.load_scene_additive(&self.transition_scene, true)?;
        info!("Transition to '{}' started", scene);

        self.progress = 0.0;
        self.job = Some(SceneLoadJob {
            target: scene.to_string(),
            transition: self.transition_scene.clone(),
            previous: backend.active_scene_name().map(str::to_string),
            progress: 0.0,
            complete: false,
            op: Some(op),
        });
        self.set_state(TransitionState::LoadingTransition);
        Ok(())
    }

    /// Advance the running transition by one frame
    ///
    /// On a collaborator error the job is abandoned the same way
    /// [`cancel`](Self::cancel) abandons it, and the error returned.
    pub fn tick<B: SceneBackend>(&mut self, backend: &mut B) -> Result<(), TransitionError> {
        match self.step(backend) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Scene transition aborted: {}", e);
                self.abandon(backend);
                Err(e)
            }
        }
    }

    fn step<B: SceneBackend>(&mut self, backend: &mut B) -> Result<(), TransitionError> {
        let Some(job) = self.job.as_mut() else {
            return Ok(());
        };
        let Some(op) = job.op else {
            return Ok(());
        };

        let next = match self.state {
            TransitionState::Idle | TransitionState::Done => None,

            TransitionState::LoadingTransition => {
                if !backend.is_done(op)? {
                    return Ok(());
                }
                backend.release(op);
                job.advance_progress(PROGRESS_TRANSITION_LOADED);
                job.op = Some(backend.load_scene_additive(&job.target, false)?);
                Some(TransitionState::LoadingTarget)
            }

            TransitionState::LoadingTarget => {
                let loaded = backend.progress(op)?;
                let mapped = PROGRESS_TRANSITION_LOADED
                    + loaded * (PROGRESS_TARGET_ACTIVATED - PROGRESS_TRANSITION_LOADED);
                job.advance_progress(mapped.min(PROGRESS_TARGET_ACTIVATED));
                if loaded < 1.0 {
                    None
                } else {
                    backend.allow_activation(op)?;
                    Some(TransitionState::Activating)
                }
            }

            TransitionState::Activating => {
                if !backend.is_done(op)? {
                    return Ok(());
                }
                backend.release(op);
                job.advance_progress(PROGRESS_TARGET_ACTIVATED);
                job.op = Some(backend.unload_scene(&job.transition)?);
                Some(TransitionState::UnloadingTransition)
            }

            TransitionState::UnloadingTransition => {
                if !backend.is_done(op)? {
                    return Ok(());
                }
                backend.release(op);
                job.op = None;
                backend.set_active_scene(&job.target)?;

                let previous = job
                    .previous
                    .clone()
                    .filter(|p| *p != job.transition && *p != job.target)
                    .filter(|p| backend.is_loaded(p));
                match previous {
                    Some(previous) => {
                        job.op = Some(backend.unload_scene(&previous)?);
                        Some(TransitionState::UnloadingPrevious)
                    }
                    None => Some(TransitionState::Done),
                }
            }

            TransitionState::UnloadingPrevious => {
                if !backend.is_done(op)? {
                    return Ok(());
                }
                backend.release(op);
                job.op = None;
                Some(TransitionState::Done)
            }
        };

        self.progress = job.progress;
        if let Some(next) = next {
            if next == TransitionState::Done {
                self.finish();
            } else {
                self.set_state(next);
            }
        }
        Ok(())
    }

    fn finish(&mut self) {
        if let Some(mut job) = self.job.take() {
            job.advance_progress(1.0);
            job.complete = true;
            info!("Transition to '{}' complete", job.target);
            self.last_job = Some(job);
        }
        self.progress = 1.0;
        self.set_state(TransitionState::Done);
    }

    /// Abandon the running transition before the target is activated
    ///
    /// The target load is dropped and the transition scene unloaded in the
    /// background. Progress is left where it was.
    pub fn cancel<B: SceneBackend>(&mut self, backend: &mut B) -> Result<(), TransitionError> {
        match self.state {
            TransitionState::LoadingTransition | TransitionState::LoadingTarget => {}
            _ => return Err(TransitionError::NotCancellable),
        }

        if let Some(job) = self.abandon(backend) {
            info!("Transition to '{}' cancelled", job.target);
        }
        Ok(())
    }

    /// Drop the running job and undo what it left behind
    ///
    /// The awaited operation is aborted and the transition scene is
    /// unloaded in the background. Scenes the job already activated stay.
    fn abandon<B: SceneBackend>(&mut self, backend: &mut B) -> Option<SceneLoadJob> {
        let job = self.job.take();
        if let Some(job) = &job {
            if let Some(op) = job.op {
                // Fails when the op was already released and pruned
                if let Err(e) = backend.abort(op) {
                    debug!("Nothing to abort: {}", e);
                }
            }
            if backend.is_loaded(&job.transition) {
                match backend.unload_scene(&job.transition) {
                    Ok(unload) => backend.release(unload),
                    Err(e) => warn!("Failed to unload '{}': {}", job.transition, e),
                }
            }
        }
        self.set_state(TransitionState::Idle);
        job
    }

    fn set_state(&mut self, state: TransitionState) {
        debug!("Transition state {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use crate::SceneManager;

    fn backend() -> SceneManager {
        let mut manager = SceneManager::new();
        manager.register_template(Scene::new("MainMenu"));
        manager.register_template(Scene::new("Loading").with_load_steps(2));
        manager.register_template(Scene::new("Level1").with_load_steps(5));
        manager.load_immediate("MainMenu").unwrap();
        manager.take_loaded_events();
        manager
    }

    /// Run one frame: the sequencer polls, then the backend advances
    fn frame(sequencer: &mut SceneTransitionSequencer, backend: &mut SceneManager) {
        sequencer.tick(backend).unwrap();
        backend.advance_operations();
    }

    fn run_to_completion(sequencer: &mut SceneTransitionSequencer, backend: &mut SceneManager) -> Vec<f32> {
        let mut samples = vec![sequencer.progress()];
        for _ in 0..100 {
            frame(sequencer, backend);
            samples.push(sequencer.progress());
            if sequencer.state() == TransitionState::Done {
                break;
            }
        }
        samples
    }

    #[test]
    fn test_new_is_idle() {
        let sequencer = SceneTransitionSequencer::new("Loading");
        assert_eq!(sequencer.state(), TransitionState::Idle);
        assert_eq!(sequencer.progress(), 0.0);
        assert!(!sequencer.is_busy());
        assert!(sequencer.job().is_none());
    }

    #[test]
    fn test_main_menu_to_level() {
        let mut backend = backend();
        let mut sequencer = SceneTransitionSequencer::new("Loading");

        sequencer.request_load(&mut backend, "Level1").unwrap();
        assert_eq!(sequencer.state(), TransitionState::LoadingTransition);
        assert_eq!(sequencer.job().unwrap().previous.as_deref(), Some("MainMenu"));

        let samples = run_to_completion(&mut sequencer, &mut backend);

        assert_eq!(sequencer.state(), TransitionState::Done);
        assert_eq!(backend.active_scene_name(), Some("Level1"));
        assert!(!backend.is_loaded("MainMenu"));
        assert!(!backend.is_loaded("Loading"));
        assert_eq!(backend.loaded_scenes(), &["Level1".to_string()]);
        assert_eq!(backend.pending_operations(), 0);

        // 0.0, 0.1, rising toward 0.9, 0.9, 1.0
        assert_eq!(samples[0], 0.0);
        assert!(samples.contains(&PROGRESS_TRANSITION_LOADED));
        assert!(samples.contains(&PROGRESS_TARGET_ACTIVATED));
        assert!(samples
            .iter()
            .any(|p| *p > PROGRESS_TRANSITION_LOADED && *p < PROGRESS_TARGET_ACTIVATED));
        assert_eq!(*samples.last().unwrap(), 1.0);
        assert!(samples.windows(2).all(|w| w[0] <= w[1]), "progress decreased: {:?}", samples);

        assert!(sequencer.job().is_none());
        let job = sequencer.last_job().unwrap();
        assert!(job.complete);
        assert_eq!(job.target, "Level1");
        assert_eq!(job.progress, 1.0);
    }

    #[test]
    fn test_concurrent_request_rejected() {
        let mut backend = backend();
        let mut sequencer = SceneTransitionSequencer::new("Loading");
        sequencer.request_load(&mut backend, "Level1").unwrap();
        frame(&mut sequencer, &mut backend);

        assert_eq!(sequencer.request_load(&mut backend, "Level1"), Err(TransitionError::Busy));

        // The running job is untouched
        run_to_completion(&mut sequencer, &mut backend);
        assert_eq!(backend.active_scene_name(), Some("Level1"));
    }

    #[test]
    fn test_new_request_after_done_resets_progress() {
        let mut backend = backend();
        backend.register_template(Scene::new("Level2").with_load_steps(1));
        let mut sequencer = SceneTransitionSequencer::new("Loading");

        sequencer.request_load(&mut backend, "Level1").unwrap();
        run_to_completion(&mut sequencer, &mut backend);
        assert_eq!(sequencer.progress(), 1.0);

        sequencer.request_load(&mut backend, "Level2").unwrap();
        assert_eq!(sequencer.progress(), 0.0);
        run_to_completion(&mut sequencer, &mut backend);
        assert_eq!(backend.active_scene_name(), Some("Level2"));
        assert!(!backend.is_loaded("Level1"));
    }

    #[test]
    fn test_unknown_scene_rejected() {
        let mut backend = backend();
        let mut sequencer = SceneTransitionSequencer::new("Loading");
        assert_eq!(
            sequencer.request_load(&mut backend, "Nowhere"),
            Err(TransitionError::Scene(SceneError::NotRegistered("Nowhere".to_string())))
        );
        assert_eq!(sequencer.state(), TransitionState::Idle);
        assert!(!backend.is_loaded("Loading"));
    }

    #[test]
    fn test_loaded_scene_rejected() {
        let mut backend = backend();
        let mut sequencer = SceneTransitionSequencer::new("Loading");
        assert_eq!(
            sequencer.request_load(&mut backend, "MainMenu"),
            Err(TransitionError::Scene(SceneError::AlreadyLoaded("MainMenu".to_string())))
        );
    }

    #[test]
    fn test_transition_scene_as_target_rejected() {
        let mut backend = backend();
        let mut sequencer = SceneTransitionSequencer::new("Loading");
        assert_eq!(
            sequencer.request_load(&mut backend, "Loading"),
            Err(TransitionError::InvalidTarget("Loading".to_string()))
        );
    }

    #[test]
    fn test_without_previous_scene() {
        let mut backend = SceneManager::new();
        backend.register_template(Scene::new("Loading"));
        backend.register_template(Scene::new("Level1"));
        let mut sequencer = SceneTransitionSequencer::new("Loading");

        sequencer.request_load(&mut backend, "Level1").unwrap();
        run_to_completion(&mut sequencer, &mut backend);
        assert_eq!(sequencer.progress(), 1.0);
        assert_eq!(backend.loaded_scenes(), &["Level1".to_string()]);
    }

    #[test]
    fn test_cancel_while_loading_target() {
        let mut backend = backend();
        let mut sequencer = SceneTransitionSequencer::new("Loading");
        sequencer.request_load(&mut backend, "Level1").unwrap();
        while sequencer.state() != TransitionState::LoadingTarget {
            frame(&mut sequencer, &mut backend);
        }

        sequencer.cancel(&mut backend).unwrap();
        assert_eq!(sequencer.state(), TransitionState::Idle);
        for _ in 0..10 {
            backend.advance_operations();
        }
        assert_eq!(backend.loaded_scenes(), &["MainMenu".to_string()]);
        assert_eq!(backend.active_scene_name(), Some("MainMenu"));
        assert!(sequencer.progress() < 1.0);
    }

    #[test]
    fn test_cancel_after_activation_rejected() {
        let mut backend = backend();
        let mut sequencer = SceneTransitionSequencer::new("Loading");
        sequencer.request_load(&mut backend, "Level1").unwrap();
        while sequencer.state() != TransitionState::Activating {
            frame(&mut sequencer, &mut backend);
        }
        assert_eq!(sequencer.cancel(&mut backend), Err(TransitionError::NotCancellable));
        assert!(sequencer.is_busy());
    }

    #[test]
    fn test_cancel_when_idle_rejected() {
        let mut backend = backend();
        let mut sequencer = SceneTransitionSequencer::new("Loading");
        assert_eq!(sequencer.cancel(&mut backend), Err(TransitionError::NotCancellable));
    }

    #[test]
    fn test_failed_tick_cleans_up_and_accepts_new_request() {
        let mut backend = backend();
        backend.register_template(Scene::new("Level2").with_load_steps(1));
        let mut sequencer = SceneTransitionSequencer::new("Loading");
        sequencer.request_load(&mut backend, "Level1").unwrap();

        // Someone else starts loading the target before the sequencer does
        backend.load_scene_additive("Level1", true).unwrap();
        backend.advance_operations();
        backend.advance_operations();

        let mut result = Ok(());
        for _ in 0..10 {
            result = sequencer.tick(&mut backend);
            if result.is_err() {
                break;
            }
            backend.advance_operations();
        }
        assert_eq!(
            result,
            Err(TransitionError::Scene(SceneError::AlreadyLoaded("Level1".to_string())))
        );
        assert_eq!(sequencer.state(), TransitionState::Idle);
        assert!(sequencer.job().is_none());

        backend.advance_operations();
        assert!(!backend.is_loaded("Loading"));

        sequencer.request_load(&mut backend, "Level2").unwrap();
        run_to_completion(&mut sequencer, &mut backend);
        assert_eq!(backend.active_scene_name(), Some("Level2"));
        assert!(!backend.is_loaded("Loading"));
    }

    #[test]
    fn test_transition_error_display() {
        assert_eq!(
            format!("{}", TransitionError::Busy),
            "A scene transition is already in progress"
        );
        let err: TransitionError = SceneError::NotLoaded("Level1".to_string()).into();
        assert_eq!(format!("{}", err), "Scene error: Scene not loaded: Level1");
    }
}
