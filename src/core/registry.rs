//! # Component Registry
//!
//! Owns every live component, keyed by id. Container structure (a stack's
//! ordered items, a tab set's children and active tab) lives on the
//! components themselves, so the registry is the only place that rewires
//! parent/child links.
//!
//! ```text
//! Registry
//! ├── components: HashMap<ComponentId, Component>
//! │   └── Component
//! │       ├── kind: Stack { children } | Tabs { children, active } | View { path, state }
//! │       ├── options: ComponentOptions
//! │       ├── parent: Option<ComponentId>   // owning container, None = detached
//! │       ├── retain: bool
//! │       └── liveness: Active | Retained
//! └── ids: IdGenerator                      // counter or uuid
//! ```
//!
//! Destroyed components are removed outright; a lookup of a destroyed id is
//! `NotFound`.

use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::IdStrategy;
use crate::core::error::NavigationError;
use crate::core::types::{ComponentId, ComponentOptions, ComponentType, ViewState};

type Result<T> = std::result::Result<T, NavigationError>;

pub const DEFAULT_ID_PREFIX: &str = "_component";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    /// Attached to the hierarchy, or created and waiting to be attached.
    Active,
    /// Removed from the hierarchy but kept alive because of `retain`.
    Retained,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Stack {
        children: Vec<ComponentId>,
    },
    Tabs {
        children: Vec<ComponentId>,
        active: ComponentId,
    },
    View {
        path: String,
        state: Option<ViewState>,
    },
}

impl ComponentKind {
    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentKind::Stack { .. } => ComponentType::Stack,
            ComponentKind::Tabs { .. } => ComponentType::Tabs,
            ComponentKind::View { .. } => ComponentType::View,
        }
    }

    pub fn children(&self) -> &[ComponentId] {
        match self {
            ComponentKind::Stack { children } | ComponentKind::Tabs { children, .. } => children,
            ComponentKind::View { .. } => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Component {
    pub id: ComponentId,
    pub kind: ComponentKind,
    pub options: ComponentOptions,
    pub parent: Option<ComponentId>,
    pub retain: bool,
    pub liveness: Liveness,
}

impl Component {
    pub fn component_type(&self) -> ComponentType {
        self.kind.component_type()
    }

    /// The visible item of a stack.
    pub fn top(&self) -> Option<&ComponentId> {
        match &self.kind {
            ComponentKind::Stack { children } => children.last(),
            _ => None,
        }
    }
}

/// Read-only view of a component, handed to callers (`get`) and renderers.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSnapshot {
    pub id: ComponentId,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub options: ComponentOptions,
    pub retain: bool,
    pub liveness: Liveness,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ComponentId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComponentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ComponentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ViewState>,
}

impl From<&Component> for ComponentSnapshot {
    fn from(component: &Component) -> Self {
        let (active, path, state) = match &component.kind {
            ComponentKind::Tabs { active, .. } => (Some(active.clone()), None, None),
            ComponentKind::View { path, state } => (None, Some(path.clone()), state.clone()),
            ComponentKind::Stack { .. } => (None, None, None),
        };
        Self {
            id: component.id.clone(),
            component_type: component.component_type(),
            options: component.options.clone(),
            retain: component.retain,
            liveness: component.liveness,
            parent: component.parent.clone(),
            children: component.kind.children().to_vec(),
            active,
            path,
            state,
        }
    }
}

/// The fate of one component taken out of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removed {
    /// Freed.
    Destroyed(ComponentId),
    /// Kept alive off-screen.
    Retained(ComponentId),
}

/// Everything one removal did, in the order it happened: children are
/// settled before their container.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Removal {
    pub entries: Vec<Removed>,
}

impl Removal {
    pub fn destroyed(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Removed::Destroyed(id) => Some(id.as_str()),
                Removed::Retained(_) => None,
            })
            .collect()
    }

    pub fn retained(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Removed::Retained(id) => Some(id.as_str()),
                Removed::Destroyed(_) => None,
            })
            .collect()
    }
}

// ============================================================================
// Id Generation
// ============================================================================

#[derive(Debug, Clone)]
struct IdGenerator {
    strategy: IdStrategy,
    prefix: String,
    counter: u64,
}

impl IdGenerator {
    /// Produces an id for which `is_taken` is false. The counter never
    /// goes backwards, so a counter id is never handed out twice.
    fn next(&mut self, is_taken: impl Fn(&str) -> bool) -> ComponentId {
        loop {
            let candidate = match self.strategy {
                IdStrategy::Counter => {
                    self.counter += 1;
                    format!("{}{}", self.prefix, self.counter)
                }
                IdStrategy::Uuid => uuid::Uuid::new_v4().to_string(),
            };
            if !is_taken(&candidate) {
                return candidate;
            }
            debug!("Generated id {candidate} is already in use, skipping");
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone)]
pub struct Registry {
    components: HashMap<ComponentId, Component>,
    ids: IdGenerator,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(IdStrategy::default(), DEFAULT_ID_PREFIX)
    }
}

impl Registry {
    pub fn new(strategy: IdStrategy, prefix: impl Into<String>) -> Self {
        Self {
            components: HashMap::new(),
            ids: IdGenerator {
                strategy,
                prefix: prefix.into(),
                counter: 0,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Result<&Component> {
        self.components
            .get(id)
            .ok_or_else(|| NavigationError::not_found(id))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Component> {
        self.components
            .get_mut(id)
            .ok_or_else(|| NavigationError::not_found(id))
    }

    pub fn snapshot(&self, id: &str) -> Result<ComponentSnapshot> {
        self.get(id).map(ComponentSnapshot::from)
    }

    /// Registers a new component and adopts the (already registered,
    /// detached) children named by `kind`.
    ///
    /// A requested id that is already live is `InvalidParameter("id")`.
    pub fn create(
        &mut self,
        kind: ComponentKind,
        options: ComponentOptions,
        retain: bool,
        requested: Option<ComponentId>,
    ) -> Result<ComponentId> {
        let id = match requested {
            Some(id) if self.contains(&id) => return Err(NavigationError::invalid("id", id)),
            Some(id) => id,
            None => {
                let components = &self.components;
                self.ids.next(|candidate| components.contains_key(candidate))
            }
        };

        for child in kind.children() {
            let child = self.get_mut(child)?;
            if let Some(parent) = &child.parent {
                return Err(NavigationError::internal(format!(
                    "{} already belongs to {parent}",
                    child.id
                )));
            }
            child.parent = Some(id.clone());
            child.liveness = Liveness::Active;
        }

        debug!("Registered {} {id}", kind.component_type());
        self.components.insert(
            id.clone(),
            Component {
                id: id.clone(),
                kind,
                options,
                parent: None,
                retain,
                liveness: Liveness::Active,
            },
        );
        Ok(id)
    }

    pub fn set_options(&mut self, id: &str, options: ComponentOptions) -> Result<()> {
        self.get_mut(id)?.options = options;
        Ok(())
    }

    /// Sets the retain policy. Turning it off does not destroy anything by
    /// itself; the state machine decides what happens to a parked component.
    pub fn set_retain(&mut self, id: &str, retain: bool) -> Result<()> {
        self.get_mut(id)?.retain = retain;
        Ok(())
    }

    /// Marks a component as shown again, e.g. when a parked one becomes
    /// the root or a modal without gaining a parent.
    pub fn activate(&mut self, id: &str) -> Result<()> {
        self.get_mut(id)?.liveness = Liveness::Active;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------------

    fn stack_children_mut(&mut self, stack: &str) -> Result<&mut Vec<ComponentId>> {
        match &mut self.get_mut(stack)?.kind {
            ComponentKind::Stack { children } => Ok(children),
            other => Err(NavigationError::invalid_state(format!(
                "{stack} is a {}, not a stack",
                other.component_type()
            ))),
        }
    }

    fn adopt(&mut self, parent: &str, child: &str) -> Result<()> {
        let child = self.get_mut(child)?;
        if let Some(existing) = &child.parent {
            return Err(NavigationError::invalid_state(format!(
                "{} already belongs to {existing}",
                child.id
            )));
        }
        child.parent = Some(parent.to_string());
        child.liveness = Liveness::Active;
        Ok(())
    }

    fn orphan(&mut self, child: &str) {
        if let Some(component) = self.components.get_mut(child) {
            component.parent = None;
        }
    }

    /// Appends a detached component to a stack; it becomes the top.
    pub fn append_child(&mut self, stack: &str, child: &str) -> Result<()> {
        self.stack_children_mut(stack)?;
        self.adopt(stack, child)?;
        self.stack_children_mut(stack)?.push(child.to_string());
        Ok(())
    }

    /// Takes the top item off a stack, leaving it detached.
    pub fn take_last_child(&mut self, stack: &str) -> Result<Option<ComponentId>> {
        let popped = self.stack_children_mut(stack)?.pop();
        if let Some(child) = &popped {
            self.orphan(child);
        }
        Ok(popped)
    }

    /// Replaces a stack's items wholesale, returning the old items (detached).
    pub fn replace_children(&mut self, stack: &str, items: Vec<ComponentId>) -> Result<Vec<ComponentId>> {
        let previous = std::mem::take(self.stack_children_mut(stack)?);
        for child in &previous {
            self.orphan(child);
        }
        for child in &items {
            self.adopt(stack, child)?;
        }
        *self.stack_children_mut(stack)? = items;
        Ok(previous)
    }

    pub fn set_active(&mut self, tabs: &str, child: &str) -> Result<()> {
        match &mut self.get_mut(tabs)?.kind {
            ComponentKind::Tabs { children, active } => {
                if !children.iter().any(|c| c == child) {
                    return Err(NavigationError::invalid_state(format!(
                        "{child} is not a tab of {tabs}"
                    )));
                }
                *active = child.to_string();
                Ok(())
            }
            other => Err(NavigationError::invalid_state(format!(
                "{tabs} is a {}, not tabs",
                other.component_type()
            ))),
        }
    }

    /// Unlinks a component from its container. Containers never end up
    /// empty this way: a stack keeps its root item and tabs keep one tab.
    ///
    /// Returns the former parent, if there was one.
    pub fn detach(&mut self, id: &str) -> Result<Option<ComponentId>> {
        let Some(parent) = self.get(id)?.parent.clone() else {
            return Ok(None);
        };
        match &mut self.get_mut(&parent)?.kind {
            ComponentKind::Stack { children } | ComponentKind::Tabs { children, .. }
                if children.len() <= 1 =>
            {
                return Err(NavigationError::invalid_state(format!(
                    "{id} is the only item of {parent}"
                )));
            }
            ComponentKind::Stack { children } => children.retain(|c| c != id),
            ComponentKind::Tabs { children, active } => {
                children.retain(|c| c != id);
                if active == id {
                    *active = children[0].clone();
                }
            }
            ComponentKind::View { .. } => {
                return Err(NavigationError::internal(format!(
                    "{id} has view {parent} as its parent"
                )));
            }
        }
        self.orphan(id);
        Ok(Some(parent))
    }

    /// Applies the removal policy to a detached component: retained
    /// components are parked, everything else is freed along with any
    /// non-retained descendants.
    pub fn discard(&mut self, id: &str, removal: &mut Removal) -> Result<()> {
        let component = self.get_mut(id)?;
        if component.parent.is_some() {
            return Err(NavigationError::internal(format!(
                "{id} discarded while still attached"
            )));
        }
        if component.retain {
            component.liveness = Liveness::Retained;
            removal.entries.push(Removed::Retained(id.to_string()));
            return Ok(());
        }
        self.free(id, removal)
    }

    /// Frees a component regardless of its retain flag, detaching it first.
    /// Descendants follow the usual removal policy.
    pub fn destroy(&mut self, id: &str, removal: &mut Removal) -> Result<Option<ComponentId>> {
        let parent = self.detach(id)?;
        self.free(id, removal)?;
        Ok(parent)
    }

    fn free(&mut self, id: &str, removal: &mut Removal) -> Result<()> {
        let component = self
            .components
            .remove(id)
            .ok_or_else(|| NavigationError::not_found(id))?;
        for child in component.kind.children() {
            self.orphan(child);
            self.discard(child, removal)?;
        }
        debug!("Destroyed {} {id}", component.component_type());
        removal.entries.push(Removed::Destroyed(component.id));
        Ok(())
    }

    /// Frees everything, retained components included. Returns the ids
    /// children first, walking each parentless tree in id order.
    pub fn clear(&mut self) -> Vec<ComponentId> {
        let mut tops: Vec<&ComponentId> = self
            .components
            .values()
            .filter(|component| component.parent.is_none())
            .map(|component| &component.id)
            .collect();
        tops.sort();

        let mut order = Vec::with_capacity(self.components.len());
        for top in tops {
            self.collect_post_order(top, &mut order);
        }
        self.components.clear();
        order
    }

    fn collect_post_order(&self, id: &str, order: &mut Vec<ComponentId>) {
        if let Some(component) = self.components.get(id) {
            for child in component.kind.children() {
                self.collect_post_order(child, order);
            }
            order.push(component.id.clone());
        }
    }
}
