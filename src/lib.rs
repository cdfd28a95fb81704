//! weir: a pipelined, cancellable fuzzy-picker engine.
//!
//! A picker filters items from a streaming source through a staged
//! pipeline (Source → Matcher → Sorter → Renderer → Previewer), re-filters
//! incrementally on every keystroke with cancellation of stale work, and
//! culminates in an action invocation. The engine is single-threaded and
//! cooperative: a scheduler tick drains a typed event queue, runs reserved
//! work, and advances each pipeline stage one chunk at a time. Sessions
//! capture a resumable snapshot and live in a bounded in-memory ring.
//!
//! Pipeline stages and UI placement are swappable extensions (see
//! [`extensions`]); the editor surface is abstracted behind [`host::Host`],
//! with [`host::MemoryHost`] available for tests and headless embedding.

pub mod cancel;
pub mod collections;
pub mod components;
pub mod debounce;
pub mod error;
pub mod events;
pub mod extensions;
pub mod host;
pub mod input;
pub mod picker;
pub mod processors;
pub mod scheduler;
pub mod session;
pub mod stream;
pub mod types;

pub use cancel::{Cancelled, Signal, StageError};
pub use error::EngineError;
pub use events::{Event, EventQueue, IndexTarget, SelectMethod, Stage};
pub use extensions::{
    Action, ActionContext, ActionFlow, Coordinator, Curator, Matcher, Previewer, Renderer,
    Sorter, Source, Theme,
};
pub use host::{Host, MemoryHost};
pub use picker::{
    ActionRegistry, PREVIEW_DEBOUNCE_DELAY, Picker, PickerOptions, PickerParams,
    SELECT_ACTION,
};
pub use session::{Session, SessionQuery, SessionStore};
pub use types::{Decoration, DisplayItem, Item, PickerContext, PickerOutcome, PreviewPayload};
