//! Stream tags and their classification.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Role of an image source on an RGB-D device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StreamType {
    #[serde(rename = "color")]
    Color = 0,
    #[serde(rename = "depth")]
    Depth,
    #[serde(rename = "infrared")]
    InfraredLeft,
    #[serde(rename = "infrared_stereo")]
    InfraredRight,
    #[serde(rename = "rect_color")]
    RectifiedColor,
    /// Depth resampled into the rectified color camera.
    #[serde(rename = "rect_color_aligned_depth")]
    RectifiedColorAlignedDepth,
    /// Color resampled into the depth camera.
    #[serde(rename = "depth_aligned_rgb")]
    DepthAlignedColor,
}

struct StreamTraits {
    name: &'static str,
    frame_name: &'static str,
    color: bool,
    depth: bool,
    infrared: bool,
}

// Indexed by discriminant; order must follow the enum.
const TRAITS: [StreamTraits; 7] = [
    StreamTraits {
        name: "RGB",
        frame_name: "color",
        color: true,
        depth: false,
        infrared: false,
    },
    StreamTraits {
        name: "DEPTH",
        frame_name: "depth",
        color: false,
        depth: true,
        infrared: false,
    },
    StreamTraits {
        name: "INFRARED",
        frame_name: "infrared",
        color: false,
        depth: false,
        infrared: true,
    },
    StreamTraits {
        name: "INFRARED_STEREO",
        frame_name: "infrared_stereo",
        color: false,
        depth: false,
        infrared: true,
    },
    StreamTraits {
        name: "RECTIFIED_RGB",
        frame_name: "rect_color",
        color: true,
        depth: false,
        infrared: false,
    },
    StreamTraits {
        name: "DEPTH_ALIGNED_TO_RECTIFIED_RGB",
        frame_name: "rect_color_aligned_depth",
        color: false,
        depth: true,
        infrared: false,
    },
    StreamTraits {
        name: "RGB_ALIGNED_TO_DEPTH",
        frame_name: "depth_aligned_rgb",
        color: true,
        depth: false,
        infrared: false,
    },
];

static BY_FRAME_NAME: Lazy<HashMap<&'static str, StreamType>> = Lazy::new(|| {
    StreamType::ALL
        .iter()
        .map(|stream| (stream.frame_name(), *stream))
        .collect()
});

impl StreamType {
    pub const ALL: [StreamType; 7] = [
        StreamType::Color,
        StreamType::Depth,
        StreamType::InfraredLeft,
        StreamType::InfraredRight,
        StreamType::RectifiedColor,
        StreamType::RectifiedColorAlignedDepth,
        StreamType::DepthAlignedColor,
    ];

    fn traits(self) -> &'static StreamTraits {
        &TRAITS[self as usize]
    }

    pub fn is_color(self) -> bool {
        self.traits().color
    }

    pub fn is_depth(self) -> bool {
        self.traits().depth
    }

    pub fn is_infrared(self) -> bool {
        self.traits().infrared
    }

    /// Upper-case label used in logs.
    pub fn name(self) -> &'static str {
        self.traits().name
    }

    /// Coordinate frame name used by publishers, e.g. `"rect_color"`.
    pub fn frame_name(self) -> &'static str {
        self.traits().frame_name
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StreamType {
    type Err = Error;

    /// Parses a frame name (`"color"`, `"depth"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BY_FRAME_NAME
            .get(s)
            .copied()
            .ok_or_else(|| Error::Configuration(format!("unrecognized stream frame name: {s}")))
    }
}
