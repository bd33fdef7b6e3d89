use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::types::DescriptorClass;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseKindError {
    #[error("unknown detector type '{0}'")]
    Detector(String),
    #[error("unknown descriptor type '{0}'")]
    Descriptor(String),
    #[error("unknown matcher type '{0}'")]
    Matcher(String),
    #[error("unknown selector type '{0}'")]
    Selector(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    ShiTomasi,
    Harris,
    Fast,
    Orb,
}

impl DetectorKind {
    pub fn all() -> &'static [DetectorKind] {
        &[
            DetectorKind::ShiTomasi,
            DetectorKind::Harris,
            DetectorKind::Fast,
            DetectorKind::Orb,
        ]
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DetectorKind::ShiTomasi => "SHITOMASI",
            DetectorKind::Harris => "HARRIS",
            DetectorKind::Fast => "FAST",
            DetectorKind::Orb => "ORB",
        };
        f.write_str(name)
    }
}

impl FromStr for DetectorKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SHITOMASI" => Ok(DetectorKind::ShiTomasi),
            "HARRIS" => Ok(DetectorKind::Harris),
            "FAST" => Ok(DetectorKind::Fast),
            "ORB" => Ok(DetectorKind::Orb),
            _ => Err(ParseKindError::Detector(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Brief,
    Orb,
    Sift,
}

impl DescriptorKind {
    pub fn all() -> &'static [DescriptorKind] {
        &[DescriptorKind::Brief, DescriptorKind::Orb, DescriptorKind::Sift]
    }

    /// Descriptor element type, which fixes the matching norm. Total over
    /// every supported kind; adding a kind without extending this is a
    /// compile error.
    pub fn class(&self) -> DescriptorClass {
        match self {
            DescriptorKind::Brief | DescriptorKind::Orb => DescriptorClass::Binary,
            DescriptorKind::Sift => DescriptorClass::Float,
        }
    }

    /// The single detector this descriptor is restricted to, if any.
    ///
    /// The ORB descriptor steers its sampling pattern by the orientation the
    /// ORB detector computed, so it is meaningless with any other detector.
    pub fn required_detector(&self) -> Option<DetectorKind> {
        match self {
            DescriptorKind::Orb => Some(DetectorKind::Orb),
            DescriptorKind::Brief | DescriptorKind::Sift => None,
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DescriptorKind::Brief => "BRIEF",
            DescriptorKind::Orb => "ORB",
            DescriptorKind::Sift => "SIFT",
        };
        f.write_str(name)
    }
}

impl FromStr for DescriptorKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BRIEF" => Ok(DescriptorKind::Brief),
            "ORB" => Ok(DescriptorKind::Orb),
            "SIFT" => Ok(DescriptorKind::Sift),
            _ => Err(ParseKindError::Descriptor(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherKind {
    BruteForce,
    ApproxIndex,
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatcherKind::BruteForce => "BRUTE_FORCE",
            MatcherKind::ApproxIndex => "APPROX_INDEX",
        };
        f.write_str(name)
    }
}

impl FromStr for MatcherKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BRUTE_FORCE" => Ok(MatcherKind::BruteForce),
            "APPROX_INDEX" => Ok(MatcherKind::ApproxIndex),
            _ => Err(ParseKindError::Matcher(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    /// Single globally-nearest neighbor per source descriptor.
    Nearest,
    /// Two nearest neighbors, accepted only when unambiguously separated.
    RatioTest,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectorKind::Nearest => "NEAREST",
            SelectorKind::RatioTest => "RATIO_TEST",
        };
        f.write_str(name)
    }
}

impl FromStr for SelectorKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NEAREST" => Ok(SelectorKind::Nearest),
            "RATIO_TEST" => Ok(SelectorKind::RatioTest),
            _ => Err(ParseKindError::Selector(s.to_string())),
        }
    }
}
