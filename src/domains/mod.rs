//! Per-host header spoofing: template store, matcher and header synthesis.

pub mod headers;
pub mod source;
pub mod store;
pub mod template;

pub use headers::{apply_header_blob, synthesize};
pub use source::{FileTemplateSource, InlineTemplateSource, TemplateSource};
pub use store::TemplateStore;
pub use template::{DomainTemplate, TemplateConfig};
