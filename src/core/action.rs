//! # Actions
//!
//! Every command becomes an `Action`. `push` with a view is
//! `Action::Push(..)`, tearing everything down is `Action::Reset { .. }`.
//!
//! `update()` takes the state and an action and either commits the whole
//! change or none of it:
//!
//! ```text
//! State + Action  →  update()  →  Transition { outcome, effects }
//!                        │
//!                        └─ on error: state untouched, no effects
//! ```
//!
//! The effects are the render instructions the change produced, in order.
//! Nothing here performs them; that is the renderer's job.

use log::debug;
use serde::Serialize;

use crate::core::error::NavigationError;
use crate::core::registry::ComponentSnapshot;
use crate::core::state::NavigationState;
use crate::core::types::{
    ComponentId, CreateOptions, DismissOptions, ModalPresentationStyle, PopOptions, PopResult,
    PresentOptions, PushOptions, PushResult, SetActiveTabOptions, SetComponentOptions,
    SetRootOptions,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Create(CreateOptions),
    Push(PushOptions),
    Pop(PopOptions),
    SetRoot(SetRootOptions),
    SetActiveTab(SetActiveTabOptions),
    SetOptions(SetComponentOptions),
    Present(PresentOptions),
    Dismiss(DismissOptions),
    Destroy(ComponentId),
    Retain(ComponentId),
    Release(ComponentId),
    Reset { animated: bool },
}

impl Action {
    /// Command name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Create(_) => "create",
            Action::Push(_) => "push",
            Action::Pop(_) => "pop",
            Action::SetRoot(_) => "setRoot",
            Action::SetActiveTab(_) => "setActiveTab",
            Action::SetOptions(_) => "setOptions",
            Action::Present(_) => "present",
            Action::Dismiss(_) => "dismiss",
            Action::Destroy(_) => "destroy",
            Action::Retain(_) => "retain",
            Action::Release(_) => "release",
            Action::Reset { .. } => "reset",
        }
    }
}

/// What a successful action returns to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created { id: ComponentId },
    Pushed(PushResult),
    Popped(PopResult),
    RootSet { id: ComponentId },
    Presented { id: ComponentId },
    Dismissed { id: ComponentId },
    Done,
}

/// A render instruction. Emitted only for committed changes, in the order
/// the change made them.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Effect {
    /// A new component exists and should be built off-screen.
    Mount { component: ComponentSnapshot },
    /// A component's children, active tab, or options changed.
    Update {
        component: ComponentSnapshot,
        animated: bool,
    },
    /// The application root changed; `None` clears the screen.
    SetRoot {
        id: Option<ComponentId>,
        animated: bool,
    },
    Present {
        id: ComponentId,
        style: ModalPresentationStyle,
        animated: bool,
    },
    Dismiss { id: ComponentId, animated: bool },
    /// Parked off-screen, still addressable.
    Retain { id: ComponentId },
    Destroy { id: ComponentId },
}

impl Effect {
    pub fn component_id(&self) -> Option<&str> {
        match self {
            Effect::Mount { component } | Effect::Update { component, .. } => {
                Some(component.id.as_str())
            }
            Effect::SetRoot { id, .. } => id.as_deref(),
            Effect::Present { id, .. }
            | Effect::Dismiss { id, .. }
            | Effect::Retain { id }
            | Effect::Destroy { id } => Some(id.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub outcome: Outcome,
    pub effects: Vec<Effect>,
}

/// Applies `action` to `state` atomically.
pub fn update(
    state: &mut NavigationState,
    action: Action,
) -> Result<Transition, NavigationError> {
    let name = action.name();
    let mut scratch = state.clone();
    let outcome = apply(&mut scratch, action)?;
    let effects = scratch.take_effects();
    *state = scratch;

    debug!("Committed {name}: {} effect(s)", effects.len());
    Ok(Transition { outcome, effects })
}

fn apply(state: &mut NavigationState, action: Action) -> Result<Outcome, NavigationError> {
    Ok(match action {
        Action::Create(options) => Outcome::Created {
            id: state.instantiate(options)?,
        },
        Action::Push(options) => Outcome::Pushed(state.push(options)?),
        Action::Pop(options) => Outcome::Popped(state.pop(options)?),
        Action::SetRoot(options) => Outcome::RootSet {
            id: state.set_root(options)?,
        },
        Action::SetActiveTab(options) => {
            state.set_active_tab(options)?;
            Outcome::Done
        }
        Action::SetOptions(options) => {
            state.set_options(options)?;
            Outcome::Done
        }
        Action::Present(options) => Outcome::Presented {
            id: state.present(options)?,
        },
        Action::Dismiss(options) => Outcome::Dismissed {
            id: state.dismiss(options)?,
        },
        Action::Destroy(id) => {
            state.destroy(&id)?;
            Outcome::Done
        }
        Action::Retain(id) => {
            state.retain(&id)?;
            Outcome::Done
        }
        Action::Release(id) => {
            state.release(&id)?;
            Outcome::Done
        }
        Action::Reset { animated } => {
            state.reset(animated);
            Outcome::Done
        }
    })
}
