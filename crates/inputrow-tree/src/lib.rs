//! InputRow Field Tree
//!
//! Form trees addressed by relative dependency paths.
//!
//! # Core Concepts
//!
//! - [`FieldNode`]: Name, parent back-reference and ordered children of a tree node
//! - [`NumericInput`] / [`CollectionInput`]: Capabilities other fields may depend on
//! - [`FieldPath`]: `/`-delimited relative address with `..` parent steps
//! - [`resolve`]: Path resolution returning the node or a [`NotFound`] outcome
//! - [`ReadySignal`]: One-shot "tree ready" event carried by the root
//!
//! # Example
//!
//! ```rust,ignore
//! use inputrow_tree::{resolve, FieldPath};
//!
//! let path: FieldPath = "behaviour/numCardsToUse".parse()?;
//! match resolve(&path, &root) {
//!     Ok(field) => println!("found {}", field.name()),
//!     Err(missing) => tracing::warn!(%missing, "optional dependency absent"),
//! }
//! ```

#![warn(unreachable_pub)]

mod node;
mod path;
mod ready;
mod resolve;

// Re-exports
pub use node::{matches_segment, top_field, CollectionInput, FieldNode, Listener, NumericInput};
pub use path::{FieldPath, PathError, PARENT_SEGMENT, SEPARATOR};
pub use ready::{ReadyCallback, ReadySignal};
pub use resolve::{resolve, NotFound, NotFoundReason};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
