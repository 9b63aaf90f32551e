//! Static per-segment attributes supplied by the host.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::occupancy::SegmentId;

/// Host-side attributes of one track segment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SegmentAttributes {
    /// Segment length in metres.
    pub length_m: f32,
    /// Speed limit in metres per second.
    pub speed_limit_mps: f32,
    /// Lifetime number of visits counted by the host.
    pub usage_count: u32,
}

/// Attribute lookup for every segment the host has described.
#[derive(Resource, Debug, Clone, Default)]
pub struct SegmentAttributeTable {
    attributes: HashMap<SegmentId, SegmentAttributes>,
}

impl SegmentAttributeTable {
    pub fn insert(&mut self, segment: SegmentId, attributes: SegmentAttributes) {
        self.attributes.insert(segment, attributes);
    }

    pub fn get(&self, segment: &SegmentId) -> Option<&SegmentAttributes> {
        self.attributes.get(segment)
    }

    /// Attributes for `segment`, all zero when the host never described it.
    pub fn get_or_default(&self, segment: &SegmentId) -> SegmentAttributes {
        self.attributes.get(segment).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SegmentId, &SegmentAttributes)> {
        self.attributes.iter()
    }
}
