//! Key-path codec and entry file formats for the content engine
//!
//! Entry content travels through the engine as a flat map from key paths
//! (`title`, `tags.0`, `items.2.name`) to leaf values. This crate owns that
//! representation and the conversions to and from the nested trees produced
//! by the entry file parsers.

pub mod error;
pub mod format;
pub mod handlers;
pub mod path;

pub use error::{Error, Result};
pub use format::{EntryParser, Format, FormatHandler, FormatParser, render_entry};
pub use handlers::front_matter::BODY_KEY;
pub use path::{
    FlattenedContent, KeyPath, PathSegment, flatten, flatten_into, merge_sublist, select_sublist,
    unflatten,
};
