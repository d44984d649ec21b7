//! 🫁欢迎光临🫁
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{AnnotatedVolume, AugmentError, AugmentResult};

pub use crate::block::{extract_block, BlockWindow, JitterOutcome};
pub use crate::rotate::{point_after_2d_rotation, point_after_3d_rotation, Orientation};
pub use crate::scale::zoom_nearest;
pub use crate::{AugmentSpec, Augmented, Augmenter};

pub use crate::segment::{apply_mask, apply_mask_in_place, mask_volume_slices, SliceSegmenter};

#[cfg(feature = "rayon")]
pub use crate::segment::par_mask_volume_slices;

pub use crate::consts::{DEFAULT_BLOCK_SIZE, DEFAULT_MARGIN, DEFAULT_PAD_VALUE};
