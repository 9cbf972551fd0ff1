//! # Component Model Types
//!
//! Typed shapes for everything that crosses the scripting/native boundary.
//! Values of these types are only ever produced by the validator in
//! `schema.rs` (or built directly in Rust), so holding one means the payload
//! was well-formed.
//!
//! ```text
//! CreateOptions
//! ├── spec: ComponentSpec        // type + type-specific payload
//! │   ├── Stack(StackSpec)       //   initial items, bottom → top
//! │   ├── Tabs(TabsSpec)         //   tab children (non-empty)
//! │   └── View(ViewOptions)      //   path + opaque state
//! ├── id: Option<ComponentId>    // None = registry picks one
//! ├── options: Option<ComponentOptions>
//! └── retain: bool               // survive removal from the hierarchy
//! ```
//!
//! Everything serializes back to the same camelCase payload the validator
//! accepts, so `parse_create(options.to_payload()) == options`.

use std::fmt;

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::error::NavigationError;

pub type ComponentId = String;

/// Opaque key/value data handed to a view's content. Never interpreted here.
pub type ViewState = Map<String, Value>;

// ============================================================================
// Enumerations
// ============================================================================

#[derive(Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Stack,
    Tabs,
    View,
}

impl ComponentType {
    /// Exact, case-sensitive match against the wire token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "stack" => Some(ComponentType::Stack),
            "tabs" => Some(ComponentType::Tabs),
            "view" => Some(ComponentType::View),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Stack => "stack",
            ComponentType::Tabs => "tabs",
            ComponentType::View => "view",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, JsonSchema, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ModalPresentationStyle {
    #[default]
    FullScreen,
    PageSheet,
    FormSheet,
}

impl ModalPresentationStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "fullScreen" => Some(ModalPresentationStyle::FullScreen),
            "pageSheet" => Some(ModalPresentationStyle::PageSheet),
            "formSheet" => Some(ModalPresentationStyle::FormSheet),
            _ => None,
        }
    }
}

/// How `push` places the new component.
#[derive(Serialize, JsonSchema, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PushMode {
    /// Append; the new component becomes the top.
    #[default]
    Push,
    /// Swap out the current top.
    Replace,
    /// Reset the stack to just the new component.
    Root,
}

impl PushMode {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "push" => Some(PushMode::Push),
            "replace" => Some(PushMode::Replace),
            "root" => Some(PushMode::Root),
            _ => None,
        }
    }
}

// ============================================================================
// Display Options
// ============================================================================

/// An image reference: either a bare URI or a URI with an explicit scale.
#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ImageSpec {
    Uri(String),
    Object {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        scale: Option<f64>,
    },
}

/// A bar button shown when the component sits in a stack.
#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct StackItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSpec>,
}

impl StackItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image: None,
        }
    }
}

/// Options that apply while the component is shown inside a stack.
#[derive(Serialize, JsonSchema, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StackOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_item: Option<StackItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_items: Option<Vec<StackItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_items: Option<Vec<StackItem>>,
}

/// Options that apply while the component is shown as a tab.
#[derive(Serialize, JsonSchema, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_value: Option<String>,
}

#[derive(Serialize, JsonSchema, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modal_presentation_style: Option<ModalPresentationStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<StackOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab: Option<TabOptions>,
}

impl ComponentOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

// ============================================================================
// Creation
// ============================================================================

#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct ViewOptions {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ViewState>,
}

#[derive(Serialize, JsonSchema, Debug, Clone, Default, PartialEq)]
pub struct StackSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack: Vec<CreateOptions>,
}

#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct TabsSpec {
    pub tabs: Vec<CreateOptions>,
}

/// The component type together with the payload only that type carries.
#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentSpec {
    Stack(StackSpec),
    Tabs(TabsSpec),
    View(ViewOptions),
}

impl ComponentSpec {
    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentSpec::Stack(_) => ComponentType::Stack,
            ComponentSpec::Tabs(_) => ComponentType::Tabs,
            ComponentSpec::View(_) => ComponentType::View,
        }
    }
}

#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct CreateOptions {
    #[serde(flatten)]
    pub spec: ComponentSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ComponentOptions>,
    pub retain: bool,
}

impl CreateOptions {
    fn from_spec(spec: ComponentSpec) -> Self {
        Self {
            spec,
            id: None,
            options: None,
            retain: false,
        }
    }

    pub fn view(path: impl Into<String>) -> Self {
        Self::from_spec(ComponentSpec::View(ViewOptions {
            path: path.into(),
            state: None,
        }))
    }

    pub fn stack(items: Vec<CreateOptions>) -> Self {
        Self::from_spec(ComponentSpec::Stack(StackSpec { stack: items }))
    }

    pub fn tabs(tabs: Vec<CreateOptions>) -> Self {
        Self::from_spec(ComponentSpec::Tabs(TabsSpec { tabs }))
    }

    pub fn with_id(mut self, id: impl Into<ComponentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_options(mut self, options: ComponentOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn retained(mut self) -> Self {
        self.retain = true;
        self
    }

    pub fn component_type(&self) -> ComponentType {
        self.spec.component_type()
    }

    /// Serializes back to the untyped payload shape the validator accepts.
    pub fn to_payload(&self) -> Result<Value, NavigationError> {
        serde_json::to_value(self)
            .map_err(|e| NavigationError::internal(format!("cannot serialize create options: {e}")))
    }
}

/// A component named by a command: either built fresh or already in the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentRef {
    New(Box<CreateOptions>),
    Existing(ComponentId),
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SetComponentOptions {
    pub id: ComponentId,
    pub animated: bool,
    pub options: ComponentOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushOptions {
    /// None = the current stack.
    pub stack: Option<ComponentId>,
    pub component: ComponentRef,
    pub mode: PushMode,
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopOptions {
    /// None = the current stack.
    pub stack: Option<ComponentId>,
    pub count: usize,
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetRootOptions {
    /// None = the application root.
    pub stack: Option<ComponentId>,
    pub component: ComponentRef,
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetActiveTabOptions {
    pub tabs: ComponentId,
    pub id: ComponentId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresentOptions {
    pub component: ComponentRef,
    pub style: Option<ModalPresentationStyle>,
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DismissOptions {
    /// None = whatever modal is on top.
    pub id: Option<ComponentId>,
    pub animated: bool,
}

// ============================================================================
// Results
// ============================================================================

#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct PushResult {
    pub id: ComponentId,
    pub stack: ComponentId,
}

#[derive(Serialize, JsonSchema, Debug, Clone, PartialEq, Eq)]
pub struct PopResult {
    pub stack: ComponentId,
    /// The last component removed, or None when nothing was popped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ComponentId>,
    pub count: usize,
}
