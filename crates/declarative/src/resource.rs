//! Resource trait for declarative state management
//!
//! A Resource is one named value that can be read and, when it differs
//! from what is wanted, written.

use crate::context::ApplyContext;
use crate::types::ResourceState;
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// The executor drives every resource the same way: read the current
/// value, compare it with the desired value as text, and call
/// [`Resource::apply_desired`] only on a mismatch.
///
/// # Example
///
/// ```ignore
/// use declarative::{ApplyContext, Resource};
///
/// #[derive(Debug)]
/// struct EnvVar {
///     name: String,
///     value: String,
/// }
///
/// impl Resource for EnvVar {
///     fn id(&self) -> String {
///         self.name.clone()
///     }
///
///     fn description(&self) -> String {
///         format!("Set ${} = {}", self.name, self.value)
///     }
///
///     fn resource_type(&self) -> &'static str {
///         "env_var"
///     }
///
///     fn desired_value(&self) -> &str {
///         &self.value
///     }
///
///     fn current_value(&self) -> anyhow::Result<Option<String>> {
///         Ok(std::env::var(&self.name).ok())
///     }
///
///     fn apply_desired(&self, _ctx: &ApplyContext) -> anyhow::Result<()> {
///         unsafe { std::env::set_var(&self.name, &self.value) };
///         Ok(())
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Unique identifier for this resource
    ///
    /// For a Likewise setting this is the setting name, e.g.
    /// "AssumeDefaultDomain".
    fn id(&self) -> String;

    /// Human-readable description of what this resource does
    fn description(&self) -> String;

    /// Resource type category, used for grouping and filtering
    fn resource_type(&self) -> &'static str;

    /// The value this resource should hold
    fn desired_value(&self) -> &str;

    /// Read the current value; `None` when it is not set at all
    fn current_value(&self) -> Result<Option<String>>;

    /// Write the desired value
    ///
    /// Called at most once per batch, and only after
    /// [`Resource::current_value`] reported a different value. It must not
    /// rely on any cached view of the current state.
    fn apply_desired(&self, ctx: &ApplyContext) -> Result<()>;

    /// Detect the current state of this resource
    fn current_state(&self) -> Result<ResourceState> {
        Ok(ResourceState::from_value(self.current_value()?))
    }
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;
