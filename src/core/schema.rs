//! # Option Schema & Validator
//!
//! Converts untyped JSON payloads from the scripting side into the typed
//! commands in `types.rs`, or a `NavigationError` naming the exact field
//! that was wrong (`tabs[1].options.stack.leftItems[0].title`).
//!
//! Validation is pure: it never looks at the registry. Whether an id exists
//! or a stack may be popped is the state machine's business.
//!
//! Fields belonging to another component type are ignored rather than
//! rejected, so newer callers can send extra data to older hosts.

use schemars::schema::RootSchema;
use serde_json::{Map, Value};

use crate::core::error::NavigationError;
use crate::core::types::{
    ComponentId, ComponentOptions, ComponentRef, ComponentSpec, ComponentType, CreateOptions,
    DismissOptions, ImageSpec, ModalPresentationStyle, PopOptions, PresentOptions, PushMode,
    PushOptions, SetActiveTabOptions, SetComponentOptions, SetRootOptions, StackItem,
    StackOptions, StackSpec, TabOptions, TabsSpec, ViewOptions,
};

type Payload = Map<String, Value>;
type Result<T> = std::result::Result<T, NavigationError>;

// ============================================================================
// Field Helpers
// ============================================================================

fn path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn indexed(prefix: &str, key: &str, index: usize) -> String {
    format!("{}[{index}]", path(prefix, key))
}

/// Looks a field up, treating JSON `null` the same as absent.
fn field<'a>(obj: &'a Payload, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn as_object<'a>(value: &'a Value, field: &str) -> Result<&'a Payload> {
    value
        .as_object()
        .ok_or_else(|| NavigationError::invalid(field, value))
}

fn optional_str(obj: &Payload, prefix: &str, key: &str) -> Result<Option<String>> {
    match field(obj, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(NavigationError::invalid(path(prefix, key), other)),
    }
}

fn required_str(obj: &Payload, prefix: &str, key: &str) -> Result<String> {
    optional_str(obj, prefix, key)?.ok_or_else(|| NavigationError::missing(path(prefix, key)))
}

/// Like `optional_str`, but an empty string is rejected.
fn optional_id(obj: &Payload, prefix: &str, key: &str) -> Result<Option<ComponentId>> {
    match optional_str(obj, prefix, key)? {
        Some(id) if id.is_empty() => Err(NavigationError::invalid(path(prefix, key), "\"\"")),
        other => Ok(other),
    }
}

fn required_id(obj: &Payload, prefix: &str, key: &str) -> Result<ComponentId> {
    optional_id(obj, prefix, key)?.ok_or_else(|| NavigationError::missing(path(prefix, key)))
}

fn optional_bool(obj: &Payload, prefix: &str, key: &str) -> Result<Option<bool>> {
    match field(obj, key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(NavigationError::invalid(path(prefix, key), other)),
    }
}

fn optional_object<'a>(obj: &'a Payload, prefix: &str, key: &str) -> Result<Option<&'a Payload>> {
    field(obj, key)
        .map(|value| as_object(value, &path(prefix, key)))
        .transpose()
}

fn optional_array<'a>(obj: &'a Payload, prefix: &str, key: &str) -> Result<Option<&'a Vec<Value>>> {
    match field(obj, key) {
        None => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(NavigationError::invalid(path(prefix, key), other)),
    }
}

fn optional_token<T>(
    obj: &Payload,
    prefix: &str,
    key: &str,
    from_token: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    match optional_str(obj, prefix, key)? {
        None => Ok(None),
        Some(token) => from_token(&token)
            .map(Some)
            .ok_or_else(|| NavigationError::invalid(path(prefix, key), token)),
    }
}

fn root_object(payload: &Value) -> Result<&Payload> {
    as_object(payload, "payload")
}

// ============================================================================
// Component Options
// ============================================================================

fn parse_image(value: &Value, field: &str) -> Result<ImageSpec> {
    match value {
        Value::String(uri) => Ok(ImageSpec::Uri(uri.clone())),
        Value::Object(obj) => {
            let uri = required_str(obj, field, "uri")?;
            let scale = match self::field(obj, "scale") {
                None => None,
                Some(v) => Some(
                    v.as_f64()
                        .ok_or_else(|| NavigationError::invalid(path(field, "scale"), v))?,
                ),
            };
            Ok(ImageSpec::Object { uri, scale })
        }
        other => Err(NavigationError::invalid(field, other)),
    }
}

fn optional_image(obj: &Payload, prefix: &str, key: &str) -> Result<Option<ImageSpec>> {
    field(obj, key)
        .map(|value| parse_image(value, &path(prefix, key)))
        .transpose()
}

fn parse_stack_item(value: &Value, field: &str) -> Result<StackItem> {
    let obj = as_object(value, field)?;
    Ok(StackItem {
        id: required_str(obj, field, "id")?,
        title: required_str(obj, field, "title")?,
        image: optional_image(obj, field, "image")?,
    })
}

fn stack_items(obj: &Payload, prefix: &str, key: &str) -> Result<Option<Vec<StackItem>>> {
    let Some(items) = optional_array(obj, prefix, key)? else {
        return Ok(None);
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_stack_item(item, &indexed(prefix, key, i)))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn parse_stack_options(obj: &Payload, prefix: &str) -> Result<StackOptions> {
    Ok(StackOptions {
        back_item: field(obj, "backItem")
            .map(|v| parse_stack_item(v, &path(prefix, "backItem")))
            .transpose()?,
        left_items: stack_items(obj, prefix, "leftItems")?,
        right_items: stack_items(obj, prefix, "rightItems")?,
    })
}

fn parse_tab_options(obj: &Payload, prefix: &str) -> Result<TabOptions> {
    Ok(TabOptions {
        image: optional_image(obj, prefix, "image")?,
        badge_value: optional_str(obj, prefix, "badgeValue")?,
    })
}

/// Parses a `ComponentOptions` object located at `prefix`.
pub fn parse_component_options(obj: &Payload, prefix: &str) -> Result<ComponentOptions> {
    let stack = optional_object(obj, prefix, "stack")?
        .map(|o| parse_stack_options(o, &path(prefix, "stack")))
        .transpose()?;
    let tab = optional_object(obj, prefix, "tab")?
        .map(|o| parse_tab_options(o, &path(prefix, "tab")))
        .transpose()?;

    Ok(ComponentOptions {
        title: optional_str(obj, prefix, "title")?,
        modal_presentation_style: optional_token(
            obj,
            prefix,
            "modalPresentationStyle",
            ModalPresentationStyle::from_token,
        )?,
        stack,
        tab,
    })
}

// ============================================================================
// Creation
// ============================================================================

fn parse_type(obj: &Payload, prefix: &str) -> Result<ComponentType> {
    let field = path(prefix, "type");
    match self::field(obj, "type") {
        None => Err(NavigationError::missing(field)),
        Some(Value::String(token)) => {
            ComponentType::from_token(token).ok_or_else(|| NavigationError::invalid(field, token))
        }
        Some(other) => Err(NavigationError::invalid(field, other)),
    }
}

/// Parses the children of a container, checking each child's type.
fn parse_children(
    obj: &Payload,
    prefix: &str,
    key: &str,
    allowed: &[ComponentType],
) -> Result<Option<Vec<CreateOptions>>> {
    let Some(items) = optional_array(obj, prefix, key)? else {
        return Ok(None);
    };
    let mut children = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let child_prefix = indexed(prefix, key, i);
        let child = parse_create_at(as_object(item, &child_prefix)?, &child_prefix)?;
        if !allowed.contains(&child.component_type()) {
            return Err(NavigationError::invalid(
                path(&child_prefix, "type"),
                child.component_type(),
            ));
        }
        children.push(child);
    }
    Ok(Some(children))
}

fn parse_create_at(obj: &Payload, prefix: &str) -> Result<CreateOptions> {
    let component_type = parse_type(obj, prefix)?;
    let id = optional_id(obj, prefix, "id")?;
    let retain = optional_bool(obj, prefix, "retain")?.unwrap_or(false);
    let options = optional_object(obj, prefix, "options")?
        .map(|o| parse_component_options(o, &path(prefix, "options")))
        .transpose()?;

    let spec = match component_type {
        ComponentType::Stack => ComponentSpec::Stack(StackSpec {
            stack: parse_children(obj, prefix, "stack", &[ComponentType::View])?
                .unwrap_or_default(),
        }),
        ComponentType::Tabs => {
            let tabs = parse_children(
                obj,
                prefix,
                "tabs",
                &[ComponentType::Stack, ComponentType::View],
            )?
            .ok_or_else(|| NavigationError::missing(path(prefix, "tabs")))?;
            if tabs.is_empty() {
                return Err(NavigationError::invalid(path(prefix, "tabs"), "[]"));
            }
            ComponentSpec::Tabs(TabsSpec { tabs })
        }
        ComponentType::View => {
            let view_path = required_str(obj, prefix, "path")?;
            if view_path.is_empty() {
                return Err(NavigationError::invalid(path(prefix, "path"), "\"\""));
            }
            let state = optional_object(obj, prefix, "state")?.cloned();
            ComponentSpec::View(ViewOptions {
                path: view_path,
                state,
            })
        }
    };

    Ok(CreateOptions {
        spec,
        id,
        options,
        retain,
    })
}

/// Validates a `create` payload.
pub fn parse_create(payload: &Value) -> Result<CreateOptions> {
    parse_create_at(root_object(payload)?, "")
}

/// Reads `component` (a new spec) or `id` (an existing component).
///
/// `allowed` restricts the type of a freshly specified component; existing
/// components are type-checked by the state machine.
fn parse_component_ref(obj: &Payload, allowed: &[ComponentType]) -> Result<ComponentRef> {
    match (field(obj, "component"), optional_id(obj, "", "id")?) {
        (Some(_), Some(id)) => Err(NavigationError::invalid(
            "id",
            format!("{id} (give either component or id, not both)"),
        )),
        (Some(value), None) => {
            let spec = parse_create_at(as_object(value, "component")?, "component")?;
            if !allowed.contains(&spec.component_type()) {
                return Err(NavigationError::invalid("component.type", spec.component_type()));
            }
            Ok(ComponentRef::New(Box::new(spec)))
        }
        (None, Some(id)) => Ok(ComponentRef::Existing(id)),
        (None, None) => Err(NavigationError::missing("component")),
    }
}

const ANY_TYPE: &[ComponentType] = &[
    ComponentType::Stack,
    ComponentType::Tabs,
    ComponentType::View,
];
const STACK_ITEM: &[ComponentType] = &[ComponentType::View];

// ============================================================================
// Commands
// ============================================================================

/// Validates a `setOptions` payload.
///
/// A view's `path` and `state` are fixed at creation; sending either here is
/// rejected rather than silently dropped.
pub fn parse_set_options(payload: &Value) -> Result<SetComponentOptions> {
    let obj = root_object(payload)?;
    let id = required_id(obj, "", "id")?;
    let animated = optional_bool(obj, "", "animated")?.unwrap_or(false);
    let options_obj =
        optional_object(obj, "", "options")?.ok_or_else(|| NavigationError::missing("options"))?;

    for (scope, prefix) in [(obj, ""), (options_obj, "options")] {
        for key in ["path", "state"] {
            if let Some(value) = field(scope, key) {
                return Err(NavigationError::invalid(path(prefix, key), value));
            }
        }
    }

    Ok(SetComponentOptions {
        id,
        animated,
        options: parse_component_options(options_obj, "options")?,
    })
}

pub fn parse_push(payload: &Value) -> Result<PushOptions> {
    let obj = root_object(payload)?;
    Ok(PushOptions {
        stack: optional_id(obj, "", "stack")?,
        component: parse_component_ref(obj, STACK_ITEM)?,
        mode: optional_token(obj, "", "mode", PushMode::from_token)?.unwrap_or_default(),
        animated: optional_bool(obj, "", "animated")?.unwrap_or(true),
    })
}

pub fn parse_pop(payload: &Value) -> Result<PopOptions> {
    let obj = root_object(payload)?;
    let count = match field(obj, "count") {
        None => 1,
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| NavigationError::invalid("count", value))?,
    };
    Ok(PopOptions {
        stack: optional_id(obj, "", "stack")?,
        count,
        animated: optional_bool(obj, "", "animated")?.unwrap_or(true),
    })
}

pub fn parse_set_root(payload: &Value) -> Result<SetRootOptions> {
    let obj = root_object(payload)?;
    let stack = optional_id(obj, "", "stack")?;
    let allowed = if stack.is_some() { STACK_ITEM } else { ANY_TYPE };
    Ok(SetRootOptions {
        stack,
        component: parse_component_ref(obj, allowed)?,
        animated: optional_bool(obj, "", "animated")?.unwrap_or(false),
    })
}

pub fn parse_set_active_tab(payload: &Value) -> Result<SetActiveTabOptions> {
    let obj = root_object(payload)?;
    Ok(SetActiveTabOptions {
        tabs: required_id(obj, "", "tabs")?,
        id: required_id(obj, "", "id")?,
    })
}

pub fn parse_present(payload: &Value) -> Result<PresentOptions> {
    let obj = root_object(payload)?;
    Ok(PresentOptions {
        component: parse_component_ref(obj, ANY_TYPE)?,
        style: optional_token(obj, "", "style", ModalPresentationStyle::from_token)?,
        animated: optional_bool(obj, "", "animated")?.unwrap_or(true),
    })
}

pub fn parse_dismiss(payload: &Value) -> Result<DismissOptions> {
    let obj = root_object(payload)?;
    Ok(DismissOptions {
        id: optional_id(obj, "", "id")?,
        animated: optional_bool(obj, "", "animated")?.unwrap_or(true),
    })
}

/// Commands that name an optional component (`get`).
pub fn parse_optional_target(payload: &Value) -> Result<Option<ComponentId>> {
    optional_id(root_object(payload)?, "", "id")
}

/// Commands that name exactly one component (`destroy`, `retain`, `release`).
pub fn parse_target(payload: &Value) -> Result<ComponentId> {
    required_id(root_object(payload)?, "", "id")
}

/// `reset` only carries the animation flag.
pub fn parse_reset(payload: &Value) -> Result<bool> {
    Ok(optional_bool(root_object(payload)?, "", "animated")?.unwrap_or(false))
}

/// JSON Schema for the `create` payload, derived from the typed model.
pub fn create_options_schema() -> RootSchema {
    schemars::schema_for!(CreateOptions)
}
