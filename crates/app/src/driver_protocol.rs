//! Command/response types for the `--driver` headless mode.
//!
//! A driver (script, test harness, or a host simulation running out of
//! process) feeds occupancy reports and queries colors over newline-delimited
//! JSON on stdin/stdout. The I/O loop and dispatch live in [`crate::driver`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Commands (stdin -> heatmap)
// ---------------------------------------------------------------------------

/// One line of stdin. The `cmd` field is the discriminator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd")]
pub enum DriverCommand {
    /// Describe a segment's static attributes.
    #[serde(rename = "segment")]
    Segment {
        id: String,
        #[serde(default)]
        length_m: f32,
        #[serde(default)]
        speed_limit_mps: f32,
        #[serde(default)]
        usage_count: u32,
    },

    /// An occupant moved onto `segment` (payload is its length in metres).
    #[serde(rename = "enter")]
    Enter {
        segment: String,
        #[serde(default)]
        payload: f32,
    },

    #[serde(rename = "exit")]
    Exit {
        segment: String,
        #[serde(default)]
        occupants_remaining: u32,
    },

    /// Segments currently occupied, after loading or enabling mid-run.
    #[serde(rename = "recover")]
    Recover { occupied: Vec<(String, f32)> },

    /// Move the simulation clock forward.
    #[serde(rename = "advance")]
    Advance { minutes: f64 },

    #[serde(rename = "set_mode")]
    SetMode { mode: String },

    #[serde(rename = "set_gradient")]
    SetGradient { name: String },

    #[serde(rename = "set_bounds")]
    SetBounds {
        mode: String,
        #[serde(default)]
        minimum: Option<f32>,
        #[serde(default)]
        maximum: Option<f32>,
    },

    #[serde(rename = "set_window")]
    SetWindow {
        #[serde(default)]
        measuring_minutes: Option<u32>,
        #[serde(default)]
        retention_minutes: Option<u32>,
    },

    /// Add or replace an editable gradient, keyed by percent.
    #[serde(rename = "create_gradient")]
    CreateGradient {
        name: String,
        colors: BTreeMap<String, String>,
    },

    /// Sample the given segments, or every known segment when empty.
    #[serde(rename = "query")]
    Query {
        #[serde(default)]
        segments: Vec<String>,
    },

    #[serde(rename = "save")]
    Save { name: String },

    #[serde(rename = "load")]
    Load { name: String },

    /// Write settings and custom gradients.
    #[serde(rename = "save_config")]
    SaveConfig,

    /// End the session: all recorded occupancy is dropped.
    #[serde(rename = "reset")]
    Reset,

    #[serde(rename = "quit")]
    Quit,
}

// ---------------------------------------------------------------------------
// Responses (heatmap -> stdout)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DriverResponse {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

/// Metric, busyness and color of one segment in the active mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleReport {
    pub value: f64,
    pub fraction: f32,
    /// `#RRGGBB` or `#RRGGBBAA`.
    pub color: String,
    pub tooltip: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ResponsePayload {
    #[serde(rename = "ready")]
    Ready,

    #[serde(rename = "ok")]
    Ok,

    #[serde(rename = "samples")]
    Samples {
        now_minutes: f64,
        mode: String,
        samples: BTreeMap<String, SampleReport>,
    },

    #[serde(rename = "error")]
    Error { message: String },

    #[serde(rename = "goodbye")]
    Goodbye,
}

pub fn make_response(payload: ResponsePayload) -> DriverResponse {
    DriverResponse {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}
