//! Conflict Resolution Flow
//!
//! A pure step function drives an import from a reconciled plan to the batch
//! that will be committed:
//!
//! ```text
//! AwaitingInput --Submit(plan)--> Finalizing            (no conflicts)
//!                             \-> Confirming            (conflicts)
//! Confirming --SkipConflicts--> Finalizing(pure_new)
//!            --AcceptAll------> Finalizing(pure_new + every incoming conflict)
//!            --ResolveOneByOne-> Resolving(0)
//! Resolving(i) --KeepOld|UseNew--> Resolving(i + 1) ... Finalizing
//! any non-final state --Cancel--> AwaitingInput
//! ```
//!
//! Nothing is written while the flow runs; the service commits the
//! `Finalizing` batch in chunks afterwards.

use crate::models::Locality;
use crate::services::error::LocalityServiceError;
use crate::services::import::{Conflict, ImportPlan};

/// Position in the resolution flow
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResolutionState {
    /// Waiting for a reconciled plan
    #[default]
    AwaitingInput,

    /// Conflicts found; waiting for a bulk decision
    Confirming { plan: ImportPlan },

    /// Walking conflicts one at a time
    Resolving {
        plan: ImportPlan,
        position: usize,
        accepted: Vec<Locality>,
    },

    /// Batch decided and ready to commit
    Finalizing { batch: Vec<Locality> },
}

/// User decision fed into [`next_state`]
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Submit(ImportPlan),
    SkipConflicts,
    AcceptAll,
    ResolveOneByOne,
    KeepOld,
    UseNew,
    Cancel,
}

impl ResolutionState {
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionState::AwaitingInput => "awaiting input",
            ResolutionState::Confirming { .. } => "confirming",
            ResolutionState::Resolving { .. } => "resolving",
            ResolutionState::Finalizing { .. } => "finalizing",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ResolutionState::Finalizing { .. })
    }

    /// Conflict awaiting a per-record decision, with its position
    pub fn current_conflict(&self) -> Option<(usize, &Conflict)> {
        match self {
            ResolutionState::Resolving { plan, position, .. } => {
                plan.conflicts.get(*position).map(|c| (*position, c))
            }
            _ => None,
        }
    }

    /// The committed batch, once the flow has finished
    pub fn batch(&self) -> Option<&[Locality]> {
        match self {
            ResolutionState::Finalizing { batch } => Some(batch),
            _ => None,
        }
    }
}

impl Decision {
    pub fn name(&self) -> &'static str {
        match self {
            Decision::Submit(_) => "submit",
            Decision::SkipConflicts => "skip conflicts",
            Decision::AcceptAll => "accept all",
            Decision::ResolveOneByOne => "resolve one by one",
            Decision::KeepOld => "keep old",
            Decision::UseNew => "use new",
            Decision::Cancel => "cancel",
        }
    }
}

/// Compute the state that follows `state` under `decision`.
///
/// Pure: the caller's state is only borrowed, so a rejected decision leaves
/// it as it was.
pub fn next_state(
    state: &ResolutionState,
    decision: Decision,
) -> Result<ResolutionState, LocalityServiceError> {
    let next = match (state, decision) {
        (ResolutionState::Finalizing { .. }, decision) => {
            return Err(LocalityServiceError::invalid_transition(
                state.name(),
                decision.name(),
            ))
        }
        (_, Decision::Cancel) => ResolutionState::AwaitingInput,

        (ResolutionState::AwaitingInput, Decision::Submit(plan)) => {
            if plan.has_conflicts() {
                ResolutionState::Confirming { plan }
            } else {
                ResolutionState::Finalizing {
                    batch: plan.pure_new,
                }
            }
        }

        (ResolutionState::Confirming { plan }, Decision::SkipConflicts) => {
            ResolutionState::Finalizing {
                batch: plan.pure_new.clone(),
            }
        }
        (ResolutionState::Confirming { plan }, Decision::AcceptAll) => {
            ResolutionState::Finalizing {
                batch: plan.accept_all(),
            }
        }
        (ResolutionState::Confirming { plan }, Decision::ResolveOneByOne) => {
            ResolutionState::Resolving {
                plan: plan.clone(),
                position: 0,
                accepted: Vec::new(),
            }
        }

        (
            ResolutionState::Resolving {
                plan,
                position,
                accepted,
            },
            decision @ (Decision::KeepOld | Decision::UseNew),
        ) => {
            let mut accepted = accepted.clone();
            if decision == Decision::UseNew {
                if let Some(conflict) = plan.conflicts.get(*position) {
                    accepted.push(conflict.incoming.clone());
                }
            }

            let position = position + 1;
            if position >= plan.conflicts.len() {
                let mut batch = plan.pure_new.clone();
                batch.extend(accepted);
                ResolutionState::Finalizing { batch }
            } else {
                ResolutionState::Resolving {
                    plan: plan.clone(),
                    position,
                    accepted,
                }
            }
        }

        (state, decision) => {
            return Err(LocalityServiceError::invalid_transition(
                state.name(),
                decision.name(),
            ))
        }
    };

    Ok(next)
}

/// Owns the current state of one import flow
#[derive(Debug, Clone, Default)]
pub struct ImportSession {
    state: ResolutionState,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ResolutionState {
        &self.state
    }

    /// Apply a decision, keeping the current state when it is rejected
    pub fn apply(&mut self, decision: Decision) -> Result<&ResolutionState, LocalityServiceError> {
        self.state = next_state(&self.state, decision)?;
        Ok(&self.state)
    }

    /// Take the finalized batch, leaving the session awaiting input again
    pub fn take_batch(&mut self) -> Result<Vec<Locality>, LocalityServiceError> {
        match std::mem::take(&mut self.state) {
            ResolutionState::Finalizing { batch } => Ok(batch),
            other => {
                let name = other.name();
                self.state = other;
                Err(LocalityServiceError::invalid_transition(name, "commit"))
            }
        }
    }
}
