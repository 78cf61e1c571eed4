use thiserror::Error;

use cprs_opc::PackageError;

#[derive(Debug, Error)]
pub enum PptxError {
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
    #[error("missing slide relationships part: {0}")]
    MissingRels(String),
    #[error("slide {slide}: image reference {rel_id} has no usable relationship target")]
    UnresolvedEmbed { slide: u32, rel_id: String },
    #[error("slide {slide}: relationship {rel_id} resolves outside ppt/media/: {target}")]
    NonMediaTarget {
        slide: u32,
        rel_id: String,
        target: String,
    },
    #[error("presentation has no slide {0}")]
    SlideNotFound(u32),
    #[error("slide {slide} has {available} picture target(s); cannot use picture index {index}")]
    PictureIndexOutOfRange {
        slide: u32,
        available: usize,
        index: usize,
    },
    #[error("no picture replacements were given")]
    NoReplacements,
    #[error("multiple replacements resolve to the same media part: {0}")]
    DuplicateTarget(String),
    #[error("resolved media part is missing from the package: {0}")]
    MissingTarget(String),
}
