//! Small containers backing the pipeline stages.

mod belt;
mod chunker;
mod unique;

pub use belt::ItemBelt;
pub use chunker::Chunker;
pub use unique::UniqueOrderedBuffer;
