//! # Command Dispatcher
//!
//! `Navigator` is the single owner of the navigation state. Callers hand it
//! a command name and an untyped payload; it validates, applies, and turns
//! the outcome into a wire result.
//!
//! Mutations take the write lock, so commands never interleave. Effects are
//! queued on the render channel before the lock is released, which keeps
//! them in commit order; the render worker performs them later, outside
//! the lock.

use log::{debug, error, info, warn};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::bridge::wire::{CommandResult, ErrorPayload};
use crate::core::action::{Action, Effect, Outcome, Transition, update};
use crate::core::error::NavigationError;
use crate::core::registry::ComponentSnapshot;
use crate::core::schema;
use crate::core::state::NavigationState;
use crate::core::types::ComponentId;

/// Every command name `handle` accepts.
pub const COMMANDS: &[&str] = &[
    "create",
    "push",
    "pop",
    "setOptions",
    "setRoot",
    "setActiveTab",
    "present",
    "dismiss",
    "get",
    "destroy",
    "retain",
    "release",
    "reset",
];

/// A validated command.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Mutate(Action),
    Get(Option<ComponentId>),
}

/// Routes a command name to its validator.
pub fn parse_request(command: &str, payload: &Value) -> Result<Request, NavigationError> {
    let action = match command {
        "get" => return Ok(Request::Get(schema::parse_optional_target(payload)?)),
        "create" => Action::Create(schema::parse_create(payload)?),
        "push" => Action::Push(schema::parse_push(payload)?),
        "pop" => Action::Pop(schema::parse_pop(payload)?),
        "setOptions" => Action::SetOptions(schema::parse_set_options(payload)?),
        "setRoot" => Action::SetRoot(schema::parse_set_root(payload)?),
        "setActiveTab" => Action::SetActiveTab(schema::parse_set_active_tab(payload)?),
        "present" => Action::Present(schema::parse_present(payload)?),
        "dismiss" => Action::Dismiss(schema::parse_dismiss(payload)?),
        "destroy" => Action::Destroy(schema::parse_target(payload)?),
        "retain" => Action::Retain(schema::parse_target(payload)?),
        "release" => Action::Release(schema::parse_target(payload)?),
        "reset" => Action::Reset {
            animated: schema::parse_reset(payload)?,
        },
        other => return Err(NavigationError::invalid("command", other)),
    };
    Ok(Request::Mutate(action))
}

/// State and the render channel live under one lock so effects are queued
/// in the same critical section that commits them.
struct Shared {
    state: NavigationState,
    /// `None` once the navigator is closed.
    effects: Option<UnboundedSender<Effect>>,
}

pub struct Navigator {
    shared: RwLock<Shared>,
}

impl Navigator {
    /// Wraps `state`. The receiver yields every committed effect; hand it to
    /// `render::spawn_render_worker`.
    pub fn new(state: NavigationState) -> (Self, UnboundedReceiver<Effect>) {
        let (effects, receiver) = mpsc::unbounded_channel();
        let navigator = Self {
            shared: RwLock::new(Shared {
                state,
                effects: Some(effects),
            }),
        };
        (navigator, receiver)
    }

    /// Applies one action under the write lock.
    pub fn execute(&self, action: Action) -> Result<Outcome, NavigationError> {
        let mut shared = self.shared.write();
        let Transition { outcome, effects } = update(&mut shared.state, action)?;

        if let Some(sender) = &shared.effects {
            for effect in effects {
                if sender.send(effect).is_err() {
                    debug!("No render worker listening, dropping effects");
                    break;
                }
            }
        }
        Ok(outcome)
    }

    /// Snapshot of `id`, or of the top-most root. Takes the read lock only.
    pub fn get(&self, id: Option<&str>) -> Result<ComponentSnapshot, NavigationError> {
        self.shared.read().state.get(id)
    }

    /// Closes the render channel. Effects already queued are still
    /// delivered, after which the render worker finishes. Commands keep
    /// working but their effects go nowhere.
    pub fn close(&self) {
        if self.shared.write().effects.take().is_some() {
            info!("Render channel closed");
        }
    }

    /// Validates and runs one command. A `null` payload counts as `{}`.
    pub fn handle(&self, command: &str, payload: &Value) -> Result<CommandResult, ErrorPayload> {
        debug!("Handling {command}");
        let empty = Value::Object(Map::new());
        let payload = if payload.is_null() { &empty } else { payload };

        let result = parse_request(command, payload).and_then(|request| match request {
            Request::Mutate(action) => self.execute(action).map(CommandResult::from),
            Request::Get(id) => self.get(id.as_deref()).map(CommandResult::Snapshot),
        });

        result.map_err(|e| {
            if e.is_internal() {
                error!("{command} hit an internal error: {e}");
            } else {
                warn!("{command} rejected: {e}");
            }
            ErrorPayload::from(&e)
        })
    }
}
