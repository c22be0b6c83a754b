//! LaTeX document layer: the single macro library, the single escape, the
//! deterministic builder and the free-form recovery pipeline.

pub mod builder;
pub mod escape;
pub mod orphans;
pub mod recovery;
pub mod template;

pub use builder::build;
pub use recovery::recover;
pub use template::{fallback_document, template};
