//! Polymorphic extension contracts consumed by the pipeline.
//!
//! Each stage works with a capability set, not inheritance: a matcher is
//! anything that can stream matches for a query, a sorter anything that can
//! order a slice in place. The engine stores strategies as `Rc<dyn …>` and
//! switches between them at runtime through an item belt.

pub mod builtin;
mod curator;

pub use curator::{Curator, CuratorInput, decompose};

use std::rc::Rc;

use anyhow::Result;

use crate::cancel::Signal;
use crate::host::{Host, ScreenSize, WindowRect};
use crate::stream::PollStream;
use crate::types::{DisplayItem, Item, PreviewPayload};

/// Arguments handed to a source when collection starts.
#[derive(Debug, Clone, Default)]
pub struct SourceParams {
    pub args: Vec<String>,
}

/// Cancellable producer of items. May be infinite; the collect stage caps
/// ingestion at its threshold.
pub trait Source {
    fn name(&self) -> &str;

    fn collect(
        &self,
        params: &SourceParams,
        signal: &Signal,
    ) -> Box<dyn PollStream<Item = Item>>;
}

/// Input to one matcher run.
#[derive(Debug, Clone)]
pub struct MatchInput {
    pub items: Vec<Rc<Item>>,
    pub query: String,
}

/// Filters collected items by the current query.
///
/// Tie order is the matcher's responsibility; the engine only requires the
/// output to be drawn from the input items.
pub trait Matcher {
    fn name(&self) -> &str;

    /// Whether chunk flushes should publish the growing list live.
    fn incremental(&self) -> bool {
        false
    }

    fn match_items(
        &self,
        input: MatchInput,
        signal: &Signal,
    ) -> Box<dyn PollStream<Item = Rc<Item>>>;
}

/// Orders the matched items in place.
pub trait Sorter {
    fn name(&self) -> &str;

    fn sort(&self, items: &mut [Rc<Item>], signal: &Signal) -> Result<()>;
}

/// Decorates the visible window: sets labels and decoration spans on each
/// display item in place.
pub trait Renderer {
    fn name(&self) -> &str;

    fn render(&self, items: &mut [DisplayItem], signal: &Signal) -> Result<()>;
}

/// Produces preview content for the item under the cursor.
pub trait Previewer {
    fn name(&self) -> &str;

    fn preview(&self, item: &Item, signal: &Signal) -> Result<Option<PreviewPayload>>;
}

/// Parameters an action can use to spawn a nested picker over the outer
/// picker's items.
#[derive(Debug, Clone, Default)]
pub struct SubmatchParams {
    pub name: String,
    pub args: Vec<String>,
}

/// Everything an action sees when invoked.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// Item under the cursor, if any.
    pub item: Option<Rc<Item>>,
    /// Selected items in collect order; falls back to the cursor item when
    /// the selection is empty.
    pub selected_items: Vec<Rc<Item>>,
    /// Currently filtered (matched, sorted) items.
    pub filtered_items: Vec<Rc<Item>>,
    pub query: String,
    pub submatch: SubmatchParams,
}

/// Whether the picker keeps running after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFlow {
    /// Loop for another selection round.
    Continue,
    /// Close the picker.
    Quit,
}

/// Terminal operation applied to the picked items.
pub trait Action {
    fn name(&self) -> &str;

    fn invoke(
        &self,
        host: &mut dyn Host,
        context: &ActionContext,
        signal: &Signal,
    ) -> Result<ActionFlow>;
}

/// Opaque style inputs passed through to the coordinator. The engine only
/// ever reads the fields the host cares about; an empty theme is valid.
#[derive(Debug, Clone, Default)]
pub struct Theme {
    pub border: Vec<String>,
    pub divider: Vec<String>,
    pub spinner: Vec<String>,
}

/// Style resolved by the coordinator from a theme; handed back to the host
/// unchanged when windows are opened.
#[derive(Debug, Clone, Default)]
pub struct Style {
    pub border: Vec<String>,
    pub divider: Vec<String>,
}

/// Component placement produced by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub input: WindowRect,
    pub list: WindowRect,
    pub preview: Option<WindowRect>,
    pub help: WindowRect,
}

/// Produces the component placement and style for a picker surface.
pub trait Coordinator {
    fn style(&self, theme: &Theme) -> Style;
    fn layout(&self, screen: ScreenSize) -> Layout;
}
