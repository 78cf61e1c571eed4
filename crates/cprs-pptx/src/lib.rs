//! Slide picture surgery for `.pptx` packages.
//!
//! Two operations: [`slide_picture_targets`] maps every slide to the media
//! parts its embedded pictures resolve to, and [`replace_pictures`] writes a
//! copy of a deck with selected pictures' bytes swapped out. The copy goes
//! through [`cprs_opc::Package::write_filtered`], so every part that is not
//! a replacement target stays byte-identical to the source. Nothing in the
//! slide XML is rewritten; only media part contents change.

mod error;
pub mod pictures;
pub mod replace;

pub use error::PptxError;
pub use pictures::{slide_number, slide_picture_targets};
pub use replace::{replace_pictures, PictureReplacement, ReplacementOutcome};
