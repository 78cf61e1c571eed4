//! Picture replacement: swap the bytes behind selected slide pictures and
//! repack everything else untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use cprs_opc::Package;

use crate::pictures::slide_picture_targets;
use crate::PptxError;

/// One replacement directive: the picture at `picture_index` (document
/// order, zero-based) on `slide` gets `bytes` as its new content.
#[derive(Debug, Clone)]
pub struct PictureReplacement {
    pub slide: u32,
    pub picture_index: usize,
    pub bytes: Vec<u8>,
}

impl PictureReplacement {
    /// Directive for the first picture on a slide.
    pub fn new(slide: u32, bytes: Vec<u8>) -> Self {
        Self {
            slide,
            picture_index: 0,
            bytes,
        }
    }

    pub fn with_picture_index(mut self, picture_index: usize) -> Self {
        self.picture_index = picture_index;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementOutcome {
    pub output_path: PathBuf,
    /// Replaced media part names, sorted.
    pub replaced_parts: Vec<String>,
}

/// Copy the package at `source` to `output` with the directed pictures
/// replaced.
///
/// Every directive must resolve: an unknown slide, a picture index past the
/// slide's picture count, and a resolved media part absent from the package
/// are all hard errors, as are two directives landing on the same media
/// part. Untouched parts are carried over byte for byte with their original
/// compression method.
pub fn replace_pictures(
    source: impl AsRef<Path>,
    output: impl AsRef<Path>,
    replacements: Vec<PictureReplacement>,
) -> Result<ReplacementOutcome, PptxError> {
    if replacements.is_empty() {
        return Err(PptxError::NoReplacements);
    }
    let package = Package::open(source)?;
    let targets = slide_picture_targets(&package)?;

    let mut overrides: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    for replacement in replacements {
        let pictures = targets
            .get(&replacement.slide)
            .ok_or(PptxError::SlideNotFound(replacement.slide))?;
        let target = pictures.get(replacement.picture_index).ok_or(
            PptxError::PictureIndexOutOfRange {
                slide: replacement.slide,
                available: pictures.len(),
                index: replacement.picture_index,
            },
        )?;
        if !package.has_part(target) {
            return Err(PptxError::MissingTarget(target.clone()));
        }
        if overrides.insert(target.clone(), replacement.bytes).is_some() {
            return Err(PptxError::DuplicateTarget(target.clone()));
        }
    }

    let output = output.as_ref();
    package.write_filtered(output, &overrides)?;
    let replaced_parts: Vec<String> = overrides.into_keys().collect();
    log::debug!(
        "replaced {} media part(s) in {}",
        replaced_parts.len(),
        output.display()
    );
    Ok(ReplacementOutcome {
        output_path: output.to_path_buf(),
        replaced_parts,
    })
}
