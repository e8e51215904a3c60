//! Rendering helpers for prompt- and document-facing text.
//!
//! Provides markdown link formatting with URI normalisation, capped link
//! lists, whitespace-collapsing previews, and the `Datatable` shape consumed
//! by the document renderer.

mod links;
mod table;
mod text;

pub use links::{
    LinkCollector, is_web_url, limit_list, make_markdown_link, make_prompt_link, more_marker,
    to_uri,
};
pub use table::{Datatable, DatatableColumn};
pub use text::{collapse_whitespace, decode_dropping_invalid, shorten};
