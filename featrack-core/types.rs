use image::GrayImage;

/// A detected salient image location with subpixel precision.
///
/// `orientation` is only set by detectors that compute one (currently ORB);
/// every other detector leaves it unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Diameter of the meaningful neighborhood, in pixels.
    pub size: f32,
    /// Detector response strength. Scale is detector-specific.
    pub response: f32,
    /// Dominant patch orientation in radians, if the detector computes one.
    pub orientation: Option<f32>,
}

/// 256-bit binary descriptor = 32 bytes
pub const BINARY_DESCRIPTOR_BYTES: usize = 32;
pub type BinaryDescriptor = [u8; BINARY_DESCRIPTOR_BYTES];

/// 128-dimensional floating-point descriptor
pub const FLOAT_DESCRIPTOR_LEN: usize = 128;
pub type FloatDescriptor = [f32; FLOAT_DESCRIPTOR_LEN];

/// Distance geometry implied by a descriptor's element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorClass {
    /// Bit-packed bytes; compared with Hamming distance.
    Binary,
    /// Floating-point vectors; compared with Euclidean distance.
    Float,
}

/// An ordered sequence of descriptors, index-aligned 1:1 with the keypoint
/// sequence it was extracted from. The variant fixes the distance norm, so a
/// matching call can never apply the wrong one.
#[derive(Debug, Clone)]
pub enum DescriptorSet {
    Binary(Vec<BinaryDescriptor>),
    Float(Vec<FloatDescriptor>),
}

impl DescriptorSet {
    pub fn len(&self) -> usize {
        match self {
            DescriptorSet::Binary(v) => v.len(),
            DescriptorSet::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn class(&self) -> DescriptorClass {
        match self {
            DescriptorSet::Binary(_) => DescriptorClass::Binary,
            DescriptorSet::Float(_) => DescriptorClass::Float,
        }
    }
}

/// A correspondence between one source descriptor and one reference
/// descriptor, with the distance in the geometry of the descriptor class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    /// Index into the source (earlier frame) keypoint/descriptor sequence.
    pub source_idx: usize,
    /// Index into the reference (later frame) keypoint/descriptor sequence.
    pub reference_idx: usize,
    pub distance: f32,
}

/// One buffered frame: the image, its ROI-filtered keypoints, their
/// descriptors, and the matches against the immediately preceding frame
/// (empty for the first frame of a run).
#[derive(Debug)]
pub struct Frame {
    pub image: GrayImage,
    pub keypoints: Vec<Keypoint>,
    pub descriptors: DescriptorSet,
    pub matches: Vec<Match>,
}
