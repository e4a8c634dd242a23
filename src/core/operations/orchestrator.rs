use crate::core::errors::{SDError, SDResult};
use crate::core::models::challenge::{ConfirmationChallenge, DestructionRequest};
use crate::core::models::prompt::PromptView;
use crate::core::models::target::TargetPaths;
use crate::core::operations::deleter::{RecursiveDeleter, TreeDeleter};
use crate::core::operations::gate::{ConfirmationGate, ExactMatchGate};
use crate::core::operations::generator::{CodeGenerator, DEFAULT_CODE_LENGTH, RandomCodeGenerator};
use crate::store::{DefaultStoreDestroyer, StoreDestroyer};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    Idle,
    AwaitingConfirmation,
    Destroyed,
    Rejected,
    Failed,
}

impl OrchestratorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Destroyed => "destroyed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestructionReport {
    pub site: String,
    pub store: String,
    pub root_path: PathBuf,
    pub entries_removed: usize,
}

pub struct Collaborators {
    pub generator: Box<dyn CodeGenerator>,
    pub gate: Box<dyn ConfirmationGate>,
    pub deleter: Box<dyn TreeDeleter>,
    pub destroyer: Box<dyn StoreDestroyer>,
}

impl Collaborators {
    pub fn production(mysqladmin: impl Into<PathBuf>) -> Self {
        Self {
            generator: Box::new(RandomCodeGenerator),
            gate: Box::new(ExactMatchGate),
            deleter: Box::new(RecursiveDeleter::new()),
            destroyer: Box::new(DefaultStoreDestroyer::new(mysqladmin)),
        }
    }
}

struct Session {
    state: OrchestratorState,
    challenge: Option<ConfirmationChallenge>,
}

/// Sequences the confirmation gate, the store drop and the tree deletion.
///
/// Both entry points share one instance. `in_flight` is held for the whole
/// destructive sequence so concurrent attempts fail fast instead of racing.
pub struct ActionOrchestrator {
    site: String,
    targets: TargetPaths,
    code_length: usize,
    generator: Box<dyn CodeGenerator>,
    gate: Box<dyn ConfirmationGate>,
    deleter: Box<dyn TreeDeleter>,
    destroyer: Box<dyn StoreDestroyer>,
    session: Mutex<Session>,
    in_flight: Mutex<()>,
}

impl ActionOrchestrator {
    pub fn new(site: impl Into<String>, targets: TargetPaths, collaborators: Collaborators) -> Self {
        Self {
            site: site.into(),
            targets,
            code_length: DEFAULT_CODE_LENGTH,
            generator: collaborators.generator,
            gate: collaborators.gate,
            deleter: collaborators.deleter,
            destroyer: collaborators.destroyer,
            session: Mutex::new(Session {
                state: OrchestratorState::Idle,
                challenge: None,
            }),
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_code_length(mut self, code_length: usize) -> Self {
        self.code_length = code_length;
        self
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn state(&self) -> OrchestratorState {
        self.lock_session().state
    }

    pub fn planned_operations(&self) -> Vec<String> {
        vec![
            self.destroyer.describe(&self.targets.store),
            self.deleter.describe(&self.targets.root_path),
        ]
    }

    /// Prompt without a code, for showing what would happen.
    pub fn plan(&self) -> PromptView {
        PromptView::new(&self.site, self.planned_operations(), None)
    }

    /// Issues a fresh challenge, invalidating any earlier one.
    pub fn request_challenge(&self) -> SDResult<ConfirmationChallenge> {
        let mut session = self.lock_session();
        if session.state == OrchestratorState::Destroyed {
            return Err(SDError::AlreadyDestroyed);
        }

        let challenge = ConfirmationChallenge::new(self.generator.generate(self.code_length));
        session.challenge = Some(challenge.clone());
        session.state = OrchestratorState::AwaitingConfirmation;
        tracing::debug!(site = %self.site, "Issued confirmation challenge");

        Ok(challenge)
    }

    pub fn render_prompt(&self) -> SDResult<PromptView> {
        let challenge = self.request_challenge()?;
        Ok(PromptView::new(&self.site, self.planned_operations(), Some(&challenge)))
    }

    /// The view for the outstanding challenge, without issuing a new one.
    pub fn outstanding_prompt(&self) -> Option<PromptView> {
        let challenge = self.lock_session().challenge.clone()?;
        Some(PromptView::new(&self.site, self.planned_operations(), Some(&challenge)))
    }

    /// Destroys the site if the submission matches the outstanding challenge.
    /// The challenge is consumed whatever the outcome.
    pub fn attempt_destruction(&self, request: &DestructionRequest) -> SDResult<DestructionReport> {
        let _guard = self.acquire_in_flight()?;

        {
            let mut session = self.lock_session();
            if session.state == OrchestratorState::Destroyed {
                return Err(SDError::AlreadyDestroyed);
            }

            let issued = session
                .challenge
                .take()
                .is_some_and(|c| self.gate.validate(&request.generated_code, &c.generated_code));
            let confirmed = self
                .gate
                .validate(&request.submitted_code, &request.generated_code);

            if !(issued && confirmed) {
                session.state = OrchestratorState::Rejected;
                tracing::warn!(site = %self.site, "Rejected destruction: confirmation code mismatch");
                return Err(SDError::ChallengeMismatch);
            }
        }

        self.execute()
    }

    /// Destroys the site without a code. Callers are expected to have
    /// confirmed intent some other way.
    pub fn attempt_destruction_unconditional(&self) -> SDResult<DestructionReport> {
        let _guard = self.acquire_in_flight()?;

        {
            let mut session = self.lock_session();
            if session.state == OrchestratorState::Destroyed {
                return Err(SDError::AlreadyDestroyed);
            }
            session.challenge = None;
        }

        self.execute()
    }

    fn execute(&self) -> SDResult<DestructionReport> {
        tracing::warn!(site = %self.site, "Destroying site");

        // Files are left alone when the store survives.
        if let Err(e) = self.destroyer.destroy_store(&self.targets.store) {
            tracing::error!(site = %self.site, "Store destruction failed: {e}");
            self.set_state(OrchestratorState::Failed);
            return Err(e);
        }

        // The store is gone from here on; nothing below is rolled back.
        let entries_removed = match self.deleter.delete_tree(&self.targets.root_path) {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(site = %self.site, "File deletion failed after store drop: {e}");
                self.set_state(OrchestratorState::Failed);
                return Err(e);
            }
        };

        self.set_state(OrchestratorState::Destroyed);
        tracing::info!(site = %self.site, entries = entries_removed, "Site destroyed");

        Ok(DestructionReport {
            site: self.site.clone(),
            store: self.targets.store.identifier(),
            root_path: self.targets.root_path.clone(),
            entries_removed,
        })
    }

    fn acquire_in_flight(&self) -> SDResult<MutexGuard<'_, ()>> {
        match self.in_flight.try_lock() {
            Ok(guard) => Ok(guard),
            Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => Err(SDError::DestructionInProgress),
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: OrchestratorState) {
        self.lock_session().state = state;
    }
}
