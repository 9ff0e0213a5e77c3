//! ISI ground truth for tracked point annotations.
//!
//! Converts control-point tracks to and from the OpenCV-matrix YAML layout
//! used as SLAM ground truth, packaged as a format plugin for an annotation
//! dataset manager.

pub mod format;
pub mod model;
