//! UI-facing component state.
//!
//! Components own what their window shows and nothing else: they buffer
//! the latest state the pipeline published, track a dirty flag, and write
//! plain lines and decorations through the [`Host`](crate::host::Host)
//! when rendered. A component with no window attached renders to nothing.

mod help;
mod input;
mod list;
mod preview;

pub use help::HelpComponent;
pub use input::InputComponent;
pub use list::ListComponent;
pub use preview::PreviewComponent;
