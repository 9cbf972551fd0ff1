//! # Navigation State
//!
//! The navigation hierarchy: the registry plus the two things that sit
//! outside any container, the application root and the modal stack.
//!
//! ```text
//! NavigationState
//! ├── registry: Registry            // every live component
//! ├── root: Option<ComponentId>     // base of the hierarchy
//! ├── modals: Vec<PresentedModal>   // presented above the root, bottom → top
//! └── effects: Vec<Effect>          // render instructions, drained per command
//! ```
//!
//! The methods here mutate freely and may fail halfway through. Callers go
//! through `action::update`, which runs them on a scratch copy and only
//! keeps the result when the whole command succeeded.

use serde::Serialize;

use crate::IdStrategy;
use crate::core::action::Effect;
use crate::core::error::NavigationError;
use crate::core::registry::{
    ComponentKind, ComponentSnapshot, Liveness, Registry, Removal, Removed,
};
use crate::core::types::{
    ComponentId, ComponentRef, ComponentSpec, ComponentType, CreateOptions, DismissOptions,
    ModalPresentationStyle, PopOptions, PopResult, PresentOptions, PushMode, PushOptions,
    PushResult, SetActiveTabOptions, SetComponentOptions, SetRootOptions, StackSpec, TabsSpec,
    ViewOptions,
};

type Result<T> = std::result::Result<T, NavigationError>;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PresentedModal {
    pub id: ComponentId,
    pub style: ModalPresentationStyle,
}

#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    pub registry: Registry,
    pub root: Option<ComponentId>,
    pub modals: Vec<PresentedModal>,
    effects: Vec<Effect>,
}

impl NavigationState {
    pub fn new(strategy: IdStrategy, id_prefix: &str) -> Self {
        Self {
            registry: Registry::new(strategy, id_prefix),
            ..Default::default()
        }
    }

    pub(crate) fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The top-most root: the top modal if any, else the application root.
    pub fn top_root(&self) -> Option<&ComponentId> {
        self.modals.last().map(|m| &m.id).or(self.root.as_ref())
    }

    pub fn is_presented(&self, id: &str) -> bool {
        self.modals.iter().any(|m| m.id == id)
    }

    /// Not inside a container, not the root, not presented.
    pub fn is_detached(&self, id: &str) -> Result<bool> {
        let component = self.registry.get(id)?;
        Ok(component.parent.is_none()
            && self.root.as_deref() != Some(id)
            && !self.is_presented(id))
    }

    /// Snapshot of `id`, or of the top-most root when no id is given.
    pub fn get(&self, id: Option<&str>) -> Result<ComponentSnapshot> {
        match id.or(self.top_root().map(String::as_str)) {
            Some(id) => self.registry.snapshot(id),
            None => Err(NavigationError::not_found("root")),
        }
    }

    /// The stack reached from the top-most root by following active tabs.
    pub fn current_stack(&self) -> Result<ComponentId> {
        let mut current = self
            .top_root()
            .cloned()
            .ok_or_else(|| NavigationError::invalid_state("no current stack: nothing is shown"))?;
        loop {
            let component = self.registry.get(&current)?;
            match &component.kind {
                ComponentKind::Stack { .. } => return Ok(current),
                ComponentKind::Tabs { active, .. } => current = active.clone(),
                ComponentKind::View { .. } => {
                    return Err(NavigationError::invalid_state(format!(
                        "current component {current} is not a stack"
                    )));
                }
            }
        }
    }

    fn resolve_stack(&self, requested: Option<ComponentId>) -> Result<ComponentId> {
        let Some(id) = requested else {
            return self.current_stack();
        };
        match self.registry.get(&id)?.component_type() {
            ComponentType::Stack => Ok(id),
            other => Err(NavigationError::invalid_state(format!(
                "{id} is a {other}, not a stack"
            ))),
        }
    }

    // ========================================================================
    // Creation and removal
    // ========================================================================

    /// Builds a component tree bottom-up and returns the id of its top.
    pub fn instantiate(&mut self, options: CreateOptions) -> Result<ComponentId> {
        let CreateOptions {
            spec,
            id,
            options,
            retain,
        } = options;

        let kind = match spec {
            ComponentSpec::Stack(StackSpec { stack }) => ComponentKind::Stack {
                children: self.instantiate_all(stack)?,
            },
            ComponentSpec::Tabs(TabsSpec { tabs }) => {
                let children = self.instantiate_all(tabs)?;
                let active = children
                    .first()
                    .cloned()
                    .ok_or_else(|| NavigationError::invalid("tabs", "[]"))?;
                ComponentKind::Tabs { children, active }
            }
            ComponentSpec::View(ViewOptions { path, state }) => ComponentKind::View { path, state },
        };

        let id = self
            .registry
            .create(kind, options.unwrap_or_default(), retain, id)?;
        self.effects.push(Effect::Mount {
            component: self.registry.snapshot(&id)?,
        });
        Ok(id)
    }

    fn instantiate_all(&mut self, items: Vec<CreateOptions>) -> Result<Vec<ComponentId>> {
        items.into_iter().map(|item| self.instantiate(item)).collect()
    }

    /// Turns a reference into a detached component id, creating it if new.
    /// A parked component is active again from here on.
    fn resolve(&mut self, component: ComponentRef) -> Result<ComponentId> {
        match component {
            ComponentRef::New(options) => self.instantiate(*options),
            ComponentRef::Existing(id) => {
                if !self.is_detached(&id)? {
                    return Err(NavigationError::invalid_state(format!(
                        "{id} is already part of the hierarchy"
                    )));
                }
                self.registry.activate(&id)?;
                Ok(id)
            }
        }
    }

    fn require_stack_item(&self, id: &str) -> Result<()> {
        match self.registry.get(id)?.component_type() {
            ComponentType::View => Ok(()),
            other => Err(NavigationError::invalid_state(format!(
                "{id} is a {other}; stacks only hold views"
            ))),
        }
    }

    /// Applies the removal policy to a detached component and records the
    /// render effects.
    fn remove(&mut self, id: &str) -> Result<()> {
        let mut removal = Removal::default();
        self.registry.discard(id, &mut removal)?;
        self.record_removal(removal);
        Ok(())
    }

    fn record_removal(&mut self, removal: Removal) {
        self.effects
            .extend(removal.entries.into_iter().map(|entry| match entry {
                Removed::Retained(id) => Effect::Retain { id },
                Removed::Destroyed(id) => Effect::Destroy { id },
            }));
    }

    fn record_update(&mut self, id: &str, animated: bool) -> Result<()> {
        let component = self.registry.snapshot(id)?;
        self.effects.push(Effect::Update {
            component,
            animated,
        });
        Ok(())
    }

    // ========================================================================
    // Stacks
    // ========================================================================

    pub fn push(&mut self, options: PushOptions) -> Result<PushResult> {
        let stack = self.resolve_stack(options.stack)?;

        if options.mode == PushMode::Root {
            let id = self.set_stack_root(&stack, options.component, options.animated)?;
            return Ok(PushResult { id, stack });
        }

        let id = self.resolve(options.component)?;
        self.require_stack_item(&id)?;

        let replaced = match options.mode {
            PushMode::Replace => self.registry.take_last_child(&stack)?,
            PushMode::Push | PushMode::Root => None,
        };
        self.registry.append_child(&stack, &id)?;
        self.record_update(&stack, options.animated)?;
        if let Some(old) = replaced {
            self.remove(&old)?;
        }

        Ok(PushResult { id, stack })
    }

    /// Pops up to `count` items, never the stack's root item.
    pub fn pop(&mut self, options: PopOptions) -> Result<PopResult> {
        let stack = self.resolve_stack(options.stack)?;
        let len = self.registry.get(&stack)?.kind.children().len();

        if len == 0 || options.count == 0 {
            return Ok(PopResult {
                stack,
                id: None,
                count: 0,
            });
        }
        if len == 1 {
            return Err(NavigationError::invalid_state(format!(
                "cannot pop the root item of stack {stack}"
            )));
        }

        let mut popped = Vec::new();
        for _ in 0..options.count.min(len - 1) {
            let id = self
                .registry
                .take_last_child(&stack)?
                .ok_or_else(|| NavigationError::internal(format!("stack {stack} ran out of items")))?;
            popped.push(id);
        }
        self.record_update(&stack, options.animated)?;
        for id in &popped {
            self.remove(id)?;
        }

        Ok(PopResult {
            stack,
            count: popped.len(),
            id: popped.pop(),
        })
    }

    fn set_stack_root(
        &mut self,
        stack: &str,
        component: ComponentRef,
        animated: bool,
    ) -> Result<ComponentId> {
        let id = self.resolve(component)?;
        self.require_stack_item(&id)?;
        let previous = self.registry.replace_children(stack, vec![id.clone()])?;
        self.record_update(stack, animated)?;
        for old in previous.iter().rev() {
            self.remove(old)?;
        }
        Ok(id)
    }

    /// Replaces a stack's items, or the application root when no stack is
    /// named. A new application root dismisses every modal.
    pub fn set_root(&mut self, options: SetRootOptions) -> Result<ComponentId> {
        if let Some(stack) = options.stack {
            let stack = self.resolve_stack(Some(stack))?;
            return self.set_stack_root(&stack, options.component, options.animated);
        }

        let id = self.resolve(options.component)?;
        self.dismiss_all(options.animated)?;
        let previous = self.root.replace(id.clone());
        self.effects.push(Effect::SetRoot {
            id: Some(id.clone()),
            animated: options.animated,
        });
        if let Some(old) = previous {
            self.remove(&old)?;
        }
        Ok(id)
    }

    // ========================================================================
    // Tabs and options
    // ========================================================================

    pub fn set_active_tab(&mut self, options: SetActiveTabOptions) -> Result<()> {
        self.registry.set_active(&options.tabs, &options.id)?;
        self.record_update(&options.tabs, false)
    }

    /// Replaces a component's options. Sub-options must make sense for the
    /// component: bar items for things shown in a stack (views), tab
    /// options for things shown as a tab (stacks and views).
    pub fn set_options(&mut self, options: SetComponentOptions) -> Result<()> {
        let component_type = self.registry.get(&options.id)?.component_type();
        if options.options.stack.is_some() && component_type != ComponentType::View {
            return Err(NavigationError::invalid("options.stack", component_type));
        }
        if options.options.tab.is_some() && component_type == ComponentType::Tabs {
            return Err(NavigationError::invalid("options.tab", component_type));
        }
        self.registry.set_options(&options.id, options.options)?;
        self.record_update(&options.id, options.animated)
    }

    // ========================================================================
    // Modals
    // ========================================================================

    pub fn present(&mut self, options: PresentOptions) -> Result<ComponentId> {
        let id = self.resolve(options.component)?;
        let style = options
            .style
            .or(self.registry.get(&id)?.options.modal_presentation_style)
            .unwrap_or_default();
        self.modals.push(PresentedModal {
            id: id.clone(),
            style,
        });
        self.effects.push(Effect::Present {
            id: id.clone(),
            style,
            animated: options.animated,
        });
        Ok(id)
    }

    /// Dismisses the top modal; a named modal must be the top one.
    pub fn dismiss(&mut self, options: DismissOptions) -> Result<ComponentId> {
        let top = self
            .modals
            .last()
            .map(|m| m.id.clone())
            .ok_or_else(|| NavigationError::invalid_state("no modal is presented"))?;
        if let Some(id) = &options.id
            && *id != top
        {
            self.registry.get(id)?;
            return Err(NavigationError::invalid_state(format!(
                "{id} is not the top-most modal ({top} is)"
            )));
        }
        self.modals.pop();
        self.effects.push(Effect::Dismiss {
            id: top.clone(),
            animated: options.animated,
        });
        self.remove(&top)?;
        Ok(top)
    }

    fn dismiss_all(&mut self, animated: bool) -> Result<()> {
        while let Some(modal) = self.modals.pop() {
            self.effects.push(Effect::Dismiss {
                id: modal.id.clone(),
                animated,
            });
            self.remove(&modal.id)?;
        }
        Ok(())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Frees a component whatever its retain flag, taking it out of the
    /// hierarchy first. Presented components must be the top modal.
    pub fn destroy(&mut self, id: &str) -> Result<()> {
        self.registry.get(id)?;

        if self.is_presented(id) {
            if self.modals.last().map(|m| m.id.as_str()) != Some(id) {
                return Err(NavigationError::invalid_state(format!(
                    "{id} has modals presented above it"
                )));
            }
            self.modals.pop();
            self.effects.push(Effect::Dismiss {
                id: id.to_string(),
                animated: false,
            });
        }
        if self.root.as_deref() == Some(id) {
            self.root = None;
            self.effects.push(Effect::SetRoot {
                id: None,
                animated: false,
            });
        }

        let mut removal = Removal::default();
        if let Some(parent) = self.registry.destroy(id, &mut removal)? {
            self.record_update(&parent, false)?;
        }
        self.record_removal(removal);
        Ok(())
    }

    pub fn retain(&mut self, id: &str) -> Result<()> {
        self.registry.set_retain(id, true)
    }

    /// Drops the retain policy. A component parked off-screen has nothing
    /// else keeping it alive, so it is destroyed. One that is shown stays.
    pub fn release(&mut self, id: &str) -> Result<()> {
        self.registry.set_retain(id, false)?;
        let parked = self.registry.get(id)?.liveness == Liveness::Retained;
        if parked && self.is_detached(id)? {
            self.remove(id)?;
        }
        Ok(())
    }

    /// Tears the whole hierarchy down, retained components included.
    pub fn reset(&mut self, animated: bool) {
        while let Some(modal) = self.modals.pop() {
            self.effects.push(Effect::Dismiss {
                id: modal.id,
                animated,
            });
        }
        if self.root.take().is_some() {
            self.effects.push(Effect::SetRoot { id: None, animated });
        }
        let destroyed = self.registry.clear();
        self.effects
            .extend(destroyed.into_iter().map(|id| Effect::Destroy { id }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ComponentOptions;

    fn state_with_stack(items: &[&str]) -> NavigationState {
        let mut state = NavigationState::default();
        let stack = CreateOptions::stack(
            items
                .iter()
                .map(|i| CreateOptions::view(format!("/{i}")).with_id(*i))
                .collect(),
        )
        .with_id("main");
        state
            .set_root(SetRootOptions {
                stack: None,
                component: ComponentRef::New(Box::new(stack)),
                animated: false,
            })
            .unwrap();
        state.take_effects();
        state
    }

    fn push(state: &mut NavigationState, stack: Option<&str>, item: CreateOptions) -> Result<PushResult> {
        state.push(PushOptions {
            stack: stack.map(String::from),
            component: ComponentRef::New(Box::new(item)),
            mode: PushMode::Push,
            animated: true,
        })
    }

    fn pop(state: &mut NavigationState, stack: Option<&str>, count: usize) -> Result<PopResult> {
        state.pop(PopOptions {
            stack: stack.map(String::from),
            count,
            animated: true,
        })
    }

    fn children(state: &NavigationState, id: &str) -> Vec<String> {
        state.registry.get(id).unwrap().kind.children().to_vec()
    }

    #[test]
    fn test_instantiate_emits_mount_children_first() {
        let mut state = NavigationState::default();
        let id = state
            .instantiate(CreateOptions::stack(vec![CreateOptions::view("/a")]))
            .unwrap();
        let effects = state.take_effects();
        assert_eq!(effects.len(), 2);
        assert!(matches!(&effects[0], Effect::Mount { component } if component.path.as_deref() == Some("/a")));
        assert!(matches!(&effects[1], Effect::Mount { component } if component.id == id));
    }

    #[test]
    fn test_push_appends_and_becomes_top() {
        let mut state = state_with_stack(&["home"]);
        let result = push(&mut state, Some("main"), CreateOptions::view("/detail")).unwrap();
        assert_eq!(result.stack, "main");
        assert_eq!(state.registry.get("main").unwrap().top(), Some(&result.id));
    }

    #[test]
    fn test_push_unknown_stack() {
        let mut state = state_with_stack(&["home"]);
        let err = push(&mut state, Some("nope"), CreateOptions::view("/x")).unwrap_err();
        assert_eq!(err, NavigationError::not_found("nope"));
    }

    #[test]
    fn test_push_onto_view_is_invalid_state() {
        let mut state = state_with_stack(&["home"]);
        let err = push(&mut state, Some("home"), CreateOptions::view("/x")).unwrap_err();
        assert!(matches!(err, NavigationError::InvalidState { .. }));
    }

    #[test]
    fn test_push_resolves_current_stack_through_tabs() {
        let mut state = NavigationState::default();
        let tabs = CreateOptions::tabs(vec![
            CreateOptions::stack(vec![CreateOptions::view("/a")]).with_id("first"),
            CreateOptions::stack(vec![CreateOptions::view("/b")]).with_id("second"),
        ]);
        state
            .set_root(SetRootOptions {
                stack: None,
                component: ComponentRef::New(Box::new(tabs)),
                animated: false,
            })
            .unwrap();
        let result = push(&mut state, None, CreateOptions::view("/c")).unwrap();
        assert_eq!(result.stack, "first");
    }

    #[test]
    fn test_current_stack_requires_something_shown() {
        let mut state = NavigationState::default();
        let err = push(&mut state, None, CreateOptions::view("/c")).unwrap_err();
        assert!(matches!(err, NavigationError::InvalidState { .. }));
    }

    #[test]
    fn test_push_replace_swaps_top() {
        let mut state = state_with_stack(&["home", "old"]);
        let result = state
            .push(PushOptions {
                stack: Some("main".into()),
                component: ComponentRef::New(Box::new(CreateOptions::view("/new"))),
                mode: PushMode::Replace,
                animated: false,
            })
            .unwrap();
        assert_eq!(children(&state, "main"), vec!["home".to_string(), result.id]);
        assert!(!state.registry.contains("old"));
    }

    #[test]
    fn test_push_existing_retained_component() {
        let mut state = state_with_stack(&["home"]);
        let kept = push(&mut state, Some("main"), CreateOptions::view("/kept").retained())
            .unwrap()
            .id;
        pop(&mut state, Some("main"), 1).unwrap();
        assert_eq!(state.registry.get(&kept).unwrap().liveness, Liveness::Retained);

        state
            .push(PushOptions {
                stack: Some("main".into()),
                component: ComponentRef::Existing(kept.clone()),
                mode: PushMode::Push,
                animated: true,
            })
            .unwrap();
        let component = state.registry.get(&kept).unwrap();
        assert_eq!(component.liveness, Liveness::Active);
        assert_eq!(component.parent.as_deref(), Some("main"));
    }

    #[test]
    fn test_push_existing_attached_component_rejected() {
        let mut state = state_with_stack(&["home", "other"]);
        let err = state
            .push(PushOptions {
                stack: Some("main".into()),
                component: ComponentRef::Existing("home".into()),
                mode: PushMode::Push,
                animated: true,
            })
            .unwrap_err();
        assert!(matches!(err, NavigationError::InvalidState { .. }));
    }

    #[test]
    fn test_pop_root_item_rejected() {
        let mut state = state_with_stack(&["home"]);
        let err = pop(&mut state, Some("main"), 1).unwrap_err();
        assert!(matches!(err, NavigationError::InvalidState { .. }));
        assert_eq!(children(&state, "main"), vec!["home".to_string()]);
    }

    #[test]
    fn test_pop_empty_stack_returns_no_id() {
        let mut state = NavigationState::default();
        let stack = state.instantiate(CreateOptions::stack(vec![])).unwrap();
        let result = pop(&mut state, Some(stack.as_str()), 1).unwrap();
        assert_eq!(result, PopResult { stack, id: None, count: 0 });
    }

    #[test]
    fn test_push_push_pop() {
        let mut state = state_with_stack(&["home"]);
        let x = push(&mut state, Some("main"), CreateOptions::view("/x")).unwrap().id;
        let y = push(&mut state, Some("main"), CreateOptions::view("/y")).unwrap().id;
        let result = pop(&mut state, Some("main"), 1).unwrap();
        assert_eq!(result.id, Some(y));
        assert_eq!(result.stack, "main");
        assert_eq!(state.registry.get("main").unwrap().top(), Some(&x));
    }

    #[test]
    fn test_pop_count_stops_at_root() {
        let mut state = state_with_stack(&["a", "b", "c", "d"]);
        let result = pop(&mut state, Some("main"), 10).unwrap();
        assert_eq!(result.count, 3);
        assert_eq!(result.id.as_deref(), Some("b"));
        assert_eq!(children(&state, "main"), vec!["a".to_string()]);
    }

    #[test]
    fn test_pop_emits_update_before_destroy() {
        let mut state = state_with_stack(&["a", "b"]);
        pop(&mut state, Some("main"), 1).unwrap();
        let effects = state.take_effects();
        assert!(matches!(&effects[0], Effect::Update { component, .. } if component.id == "main"));
        assert_eq!(effects[1], Effect::Destroy { id: "b".into() });
    }

    #[test]
    fn test_set_stack_root_destroys_and_retains() {
        let mut state = state_with_stack(&["a"]);
        let kept = push(&mut state, Some("main"), CreateOptions::view("/kept").retained())
            .unwrap()
            .id;
        let id = state
            .set_root(SetRootOptions {
                stack: Some("main".into()),
                component: ComponentRef::New(Box::new(CreateOptions::view("/fresh"))),
                animated: false,
            })
            .unwrap();
        assert_eq!(children(&state, "main"), vec![id]);
        assert!(!state.registry.contains("a"));
        assert_eq!(state.registry.get(&kept).unwrap().liveness, Liveness::Retained);
    }

    #[test]
    fn test_set_app_root_dismisses_modals_and_replaces_root() {
        let mut state = state_with_stack(&["a"]);
        state
            .present(PresentOptions {
                component: ComponentRef::New(Box::new(CreateOptions::view("/modal"))),
                style: None,
                animated: true,
            })
            .unwrap();
        let new_root = state
            .set_root(SetRootOptions {
                stack: None,
                component: ComponentRef::New(Box::new(CreateOptions::view("/solo"))),
                animated: false,
            })
            .unwrap();
        assert!(state.modals.is_empty());
        assert_eq!(state.root.as_ref(), Some(&new_root));
        assert!(!state.registry.contains("main"));
        assert!(!state.registry.contains("a"));
    }

    #[test]
    fn test_set_active_tab_non_member_leaves_active() {
        let mut state = NavigationState::default();
        let tabs = state
            .instantiate(CreateOptions::tabs(vec![
                CreateOptions::view("/a").with_id("a"),
                CreateOptions::view("/b").with_id("b"),
            ]))
            .unwrap();
        state.instantiate(CreateOptions::view("/c").with_id("c")).unwrap();

        let err = state
            .set_active_tab(SetActiveTabOptions { tabs: tabs.clone(), id: "c".into() })
            .unwrap_err();
        assert!(matches!(err, NavigationError::InvalidState { .. }));
        assert_eq!(state.get(Some(tabs.as_str())).unwrap().active.as_deref(), Some("a"));

        state
            .set_active_tab(SetActiveTabOptions { tabs: tabs.clone(), id: "b".into() })
            .unwrap();
        assert_eq!(state.get(Some(tabs.as_str())).unwrap().active.as_deref(), Some("b"));
    }

    #[test]
    fn test_set_options_replaces_in_place() {
        let mut state = state_with_stack(&["a"]);
        state
            .set_options(SetComponentOptions {
                id: "a".into(),
                animated: true,
                options: ComponentOptions::titled("Renamed"),
            })
            .unwrap();
        let snapshot = state.get(Some("a")).unwrap();
        assert_eq!(snapshot.options.title.as_deref(), Some("Renamed"));
        assert_eq!(snapshot.path.as_deref(), Some("/a"));
    }

    #[test]
    fn test_set_options_mismatched_sub_options() {
        let mut state = state_with_stack(&["a"]);
        let err = state
            .set_options(SetComponentOptions {
                id: "main".into(),
                animated: false,
                options: ComponentOptions {
                    stack: Some(Default::default()),
                    ..Default::default()
                },
            })
            .unwrap_err();
        assert_eq!(err, NavigationError::invalid("options.stack", "stack"));
    }

    #[test]
    fn test_present_and_dismiss_order() {
        let mut state = state_with_stack(&["a"]);
        let first = state
            .present(PresentOptions {
                component: ComponentRef::New(Box::new(CreateOptions::view("/one"))),
                style: Some(ModalPresentationStyle::PageSheet),
                animated: true,
            })
            .unwrap();
        let second = state
            .present(PresentOptions {
                component: ComponentRef::New(Box::new(CreateOptions::view("/two"))),
                style: None,
                animated: true,
            })
            .unwrap();
        assert_eq!(state.modals[0].style, ModalPresentationStyle::PageSheet);
        assert_eq!(state.modals[1].style, ModalPresentationStyle::FullScreen);

        let err = state
            .dismiss(DismissOptions { id: Some(first.clone()), animated: true })
            .unwrap_err();
        assert!(matches!(err, NavigationError::InvalidState { .. }));

        let dismissed = state.dismiss(DismissOptions { id: None, animated: true }).unwrap();
        assert_eq!(dismissed, second);
        assert!(!state.registry.contains(&second));
        assert_eq!(state.top_root(), Some(&first));
    }

    #[test]
    fn test_present_uses_component_style() {
        let mut state = NavigationState::default();
        let options = ComponentOptions {
            modal_presentation_style: Some(ModalPresentationStyle::FormSheet),
            ..Default::default()
        };
        state
            .present(PresentOptions {
                component: ComponentRef::New(Box::new(CreateOptions::view("/m").with_options(options))),
                style: None,
                animated: false,
            })
            .unwrap();
        assert_eq!(state.modals[0].style, ModalPresentationStyle::FormSheet);
    }

    #[test]
    fn test_present_twice_rejected() {
        let mut state = NavigationState::default();
        let id = state.instantiate(CreateOptions::view("/m")).unwrap();
        let present = PresentOptions {
            component: ComponentRef::Existing(id),
            style: None,
            animated: false,
        };
        state.present(present.clone()).unwrap();
        assert!(matches!(
            state.present(present).unwrap_err(),
            NavigationError::InvalidState { .. }
        ));
    }

    #[test]
    fn test_dismiss_without_modals() {
        let mut state = NavigationState::default();
        let err = state.dismiss(DismissOptions { id: None, animated: true }).unwrap_err();
        assert!(matches!(err, NavigationError::InvalidState { .. }));
    }

    #[test]
    fn test_destroy_root_clears_it() {
        let mut state = state_with_stack(&["a"]);
        state.destroy("main").unwrap();
        assert!(state.root.is_none());
        assert!(state.registry.is_empty());
    }

    #[test]
    fn test_release_parked_component_destroys_it() {
        let mut state = state_with_stack(&["a"]);
        let kept = push(&mut state, Some("main"), CreateOptions::view("/k").retained())
            .unwrap()
            .id;
        pop(&mut state, Some("main"), 1).unwrap();
        state.release(&kept).unwrap();
        assert!(!state.registry.contains(&kept));
    }

    #[test]
    fn test_retain_then_pop_keeps_component() {
        let mut state = state_with_stack(&["a", "b"]);
        state.retain("b").unwrap();
        pop(&mut state, Some("main"), 1).unwrap();
        assert_eq!(state.registry.get("b").unwrap().liveness, Liveness::Retained);
    }

    #[test]
    fn test_reset_frees_everything() {
        let mut state = state_with_stack(&["a"]);
        state.instantiate(CreateOptions::view("/parked").retained()).unwrap();
        state.reset(false);
        assert!(state.registry.is_empty());
        assert!(state.root.is_none());
        assert!(state.get(None).is_err());
    }

    #[test]
    fn test_retained_component_reused_as_root_survives_release() {
        let mut state = NavigationState::default();
        let parked = state
            .instantiate(CreateOptions::view("/parked").retained().with_id("parked"))
            .unwrap();
        let set_root = |state: &mut NavigationState, component: ComponentRef| {
            state.set_root(SetRootOptions {
                stack: None,
                component,
                animated: false,
            })
        };

        set_root(&mut state, ComponentRef::Existing(parked.clone())).unwrap();
        set_root(&mut state, ComponentRef::New(Box::new(CreateOptions::view("/other")))).unwrap();
        assert_eq!(state.registry.get(&parked).unwrap().liveness, Liveness::Retained);

        set_root(&mut state, ComponentRef::Existing(parked.clone())).unwrap();
        assert_eq!(state.registry.get(&parked).unwrap().liveness, Liveness::Active);

        state.take_effects();
        state.release(&parked).unwrap();
        assert!(state.take_effects().is_empty());
        assert_eq!(state.root.as_ref(), Some(&parked));
        assert_eq!(state.get(None).unwrap().id, parked);
        assert!(!state.registry.get(&parked).unwrap().retain);
    }

    #[test]
    fn test_retained_modal_presented_again_survives_release() {
        let mut state = state_with_stack(&["a"]);
        let present = |state: &mut NavigationState, component: ComponentRef| {
            state.present(PresentOptions {
                component,
                style: None,
                animated: false,
            })
        };
        let sheet = present(
            &mut state,
            ComponentRef::New(Box::new(CreateOptions::view("/sheet").retained())),
        )
        .unwrap();
        state
            .dismiss(DismissOptions {
                id: None,
                animated: false,
            })
            .unwrap();
        assert_eq!(state.registry.get(&sheet).unwrap().liveness, Liveness::Retained);

        present(&mut state, ComponentRef::Existing(sheet.clone())).unwrap();
        assert_eq!(state.registry.get(&sheet).unwrap().liveness, Liveness::Active);

        state.release(&sheet).unwrap();
        assert!(state.is_presented(&sheet));
        assert_eq!(state.get(None).unwrap().id, sheet);
    }

    #[test]
    fn test_removal_effects_follow_tree_order() {
        let mut state = state_with_stack(&["a"]);
        state
            .set_root(SetRootOptions {
                stack: Some("main".into()),
                component: ComponentRef::New(Box::new(
                    CreateOptions::view("/kept").retained().with_id("kept"),
                )),
                animated: false,
            })
            .unwrap();
        push(&mut state, Some("main"), CreateOptions::view("/gone").with_id("gone")).unwrap();
        state.take_effects();

        // main now holds [kept, gone]; replacing the root frees it.
        state
            .set_root(SetRootOptions {
                stack: None,
                component: ComponentRef::New(Box::new(CreateOptions::view("/next"))),
                animated: false,
            })
            .unwrap();
        let removals: Vec<Effect> = state
            .take_effects()
            .into_iter()
            .filter(|e| matches!(e, Effect::Retain { .. } | Effect::Destroy { .. }))
            .collect();
        assert_eq!(
            removals,
            vec![
                Effect::Retain { id: "kept".into() },
                Effect::Destroy { id: "gone".into() },
                Effect::Destroy { id: "main".into() },
            ]
        );
    }
}
