// Annotation grammar: `[platform]/[size]item*qty,item*qty` with `,[` opening a new segment
pub mod composer;
pub mod parser;
pub mod prepare;

pub use composer::{compose, item_key, tidy};
pub use parser::{parse, AnnotationEntry, PackagingCounts, ParsedAnnotation};
pub use prepare::{prepare_label, ShippingMethod};
