//! Content loader for tabula documentation sites.
//!
//! Reads markdown pages (with YAML frontmatter and `:::` containers) and
//! structured YAML page descriptors, producing immutable [`PageDescriptor`]s.

pub mod container;
pub mod descriptor;
pub mod error;
pub mod frontmatter;
pub mod loader;
pub mod markdown;
pub mod slug;
pub mod structured;

pub use descriptor::{
    inline_text, Alignment, CodeBlock, Container, ContainerKind, ContentBlock, Heading, Inline,
    Link, List, PageDescriptor, Table, TableRow,
};
pub use error::{BlockPath, ContentError};
pub use frontmatter::{Frontmatter, FrontmatterError};
pub use loader::{load_page, ContentLoader, SourceFormat};
pub use slug::{slugify, AnchorRegistry};
