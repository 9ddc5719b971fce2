//! intake-domain
//!
//! Pure data carried by the lab intake wizard (field values, pages, drafts,
//! submission documents). No I/O, no prompts, no storage.

pub mod draft;
pub mod page;
pub mod submission;
pub mod value;

pub use draft::*;
pub use page::*;
pub use submission::*;
pub use value::*;
