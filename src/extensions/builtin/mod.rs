//! Builtin strategies: enough to run a picker without writing extensions.

mod action;
mod coordinator;
mod matcher;
mod previewer;
mod renderer;
mod sorter;
mod source;

pub use action::EchoAction;
pub use coordinator::SplitCoordinator;
pub use matcher::SubstringMatcher;
pub use previewer::TextPreviewer;
pub use renderer::LabelRenderer;
pub use sorter::{AlphabeticalSorter, ScoreSorter};
pub use source::StaticSource;
