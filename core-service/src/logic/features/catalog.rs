//! Signal Catalogue - AGV v1 (FH.6000 PLC)
//!
//! Raw PLC column names are long and verbose; telemetry travels with short
//! canonical names to save payload size. This table is authoritative for:
//! - the replay column projection (source column → canonical name)
//! - the per-signal caster (float / integer / boolean token)
//! - the feature order of the power-consumption model
//!
//! Order matters: the power model was trained on exactly this ordering.

use super::layout::{FeatureSchema, FeatureSpec, SchemaError};
use super::value::FeatureKind;

/// Source column carrying the ISO-8601 sample timestamp
pub const SOURCE_TIMESTAMP_COLUMN: &str = "isoTimestamp";

/// Canonical name of the timestamp field
pub const TIMESTAMP_FIELD: &str = "ts";

/// Layout version of the v1 catalogue
pub const V1_LAYOUT_VERSION: u8 = 1;

/// One PLC signal: where it comes from, what it is called, how to cast it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub source: &'static str,
    pub name: &'static str,
    pub kind: FeatureKind,
}

impl Signal {
    pub const fn new(source: &'static str, name: &'static str, kind: FeatureKind) -> Self {
        Self { source, name, kind }
    }
}

/// All v1 signals except the timestamp, in model order
pub const V1_SIGNALS: &[Signal] = &[
    Signal::new(
        "FH.6000.[ENS] - Energy Signals.Momentary power consumption",
        "momentary_power_consumption",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[ENS] - Energy Signals.Battery cell voltage",
        "battery_cell_voltage",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[G1LDS] GROUP 1 - LEFT DRIVE SIGNALS.Left drive activate - safety interlock",
        "left_safety_interlock",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G1LDS] GROUP 1 - LEFT DRIVE SIGNALS.Left drive activate - automatic permission",
        "left_auto_permission",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G1LDS] GROUP 1 - LEFT DRIVE SIGNALS.Left drive activate - manual permission",
        "left_manual_permission",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G1LDS] GROUP 1 - LEFT DRIVE SIGNALS.Left drive activate - command on",
        "left_command_on",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G1LDS] GROUP 1 - LEFT DRIVE SIGNALS.Left drive activate - executed",
        "left_executed",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G1LDS] GROUP 1 - LEFT DRIVE SIGNALS.Left drive activate - in progress",
        "left_in_progress",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G1LDS] GROUP 1 - LEFT DRIVE SIGNALS.ActualSpeed_L",
        "left_actual_speed",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[G2PAS] GROUP 2 - PIN ACTUATOR SIGNALS.Pin Up - safety interlock",
        "pin_up_safety_interlock",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G2PAS] GROUP 2 - PIN ACTUATOR SIGNALS.Pin Up - automatic permission",
        "pin_up_auto_permission",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G2RDS] GROUP 2 - RIGHT DRIVE SIGNALS.Right drive activate - safety interlock",
        "right_safety_interlock",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G2RDS] GROUP 2 - RIGHT DRIVE SIGNALS.Right drive activate - automatic permission",
        "right_auto_permission",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G2RDS] GROUP 2 - RIGHT DRIVE SIGNALS.Right drive activate - manual permission",
        "right_manual_permission",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G2RDS] GROUP 2 - RIGHT DRIVE SIGNALS.Right drive activate - command on",
        "right_command_on",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[G2RDS] GROUP 2 - RIGHT DRIVE SIGNALS.ActualSpeed_R",
        "right_actual_speed",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[GS] GENERAL SIGNALS.Manual Mode active",
        "manual_mode_active",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[GS] GENERAL SIGNALS.Automatic Mode active",
        "auto_mode_active",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[GS] GENERAL SIGNALS.PLC fault active",
        "plc_fault_active",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[GS] GENERAL SIGNALS.PLC warning Active",
        "plc_warning_active",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[LED] LED STATUS.LED RGB Strip 1 left - R",
        "led_rgb_strip_1_left_r",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[LED] LED STATUS.LED RGB Strip 2 right - R",
        "led_rgb_strip_2_right_r",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[LED] LED STATUS.LED RGB Strip 1 left - G",
        "led_rgb_strip_1_left_g",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[LED] LED STATUS.LED RGB Strip 2 right - G",
        "led_rgb_strip_2_right_g",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[LED] LED STATUS.LED RGB Strip 1 left - B",
        "led_rgb_strip_1_left_b",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[LED] LED STATUS.LED RGB Strip 2 right - B",
        "led_rgb_strip_2_right_b",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[LED] LED STATUS.LED status - active mode",
        "led_status_active_mode",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[NNCF]3105 - Go to destination result.Destination ID",
        "go_to_destination_id",
        FeatureKind::Integer,
    ),
    Signal::new(
        "FH.6000.[NNCF]3105 - Go to destination result.Go to result",
        "go_to_result",
        FeatureKind::Integer,
    ),
    Signal::new(
        "FH.6000.[NNCF]3106 - Pause drive result.Pause result",
        "pause_result",
        FeatureKind::Integer,
    ),
    Signal::new(
        "FH.6000.[NNCF]3107 - Resume drive result.Destination ID",
        "resume_destination_id",
        FeatureKind::Integer,
    ),
    Signal::new(
        "FH.6000.[NNCF]3107 - Resume drive result.Resume result",
        "resume_result",
        FeatureKind::Integer,
    ),
    Signal::new(
        "FH.6000.[NNCF]3108 - Abort drive result.Abort result",
        "abort_result",
        FeatureKind::Integer,
    ),
    Signal::new(
        "FH.6000.[NNS] - Natural Navigation Signals.Natural Navigation status",
        "natural_navigation_status",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[NNS] - Natural Navigation Signals.Error status",
        "error_status",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[NNS] - Natural Navigation Signals.Natural Navigation state",
        "natural_navigation_state",
        FeatureKind::Integer,
    ),
    Signal::new(
        "FH.6000.[NNS] - Natural Navigation Signals.X-coordinate",
        "nn_x_coordinate",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[NNS] - Natural Navigation Signals.Y-coordinate",
        "nn_y_coordinate",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[NNS] - Natural Navigation Signals.Heading",
        "nn_heading",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[NNS] - Natural Navigation Signals.Position confidence",
        "nn_position_confidence",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[NNS] - Natural Navigation Signals.Speed",
        "nn_speed",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[NNS] - Natural Navigation Signals.Going to ID",
        "nn_going_to_id",
        FeatureKind::Integer,
    ),
    Signal::new(
        "FH.6000.[NNS] - Natural Navigation Signals.Target reached",
        "nn_target_reached",
        FeatureKind::Integer,
    ),
    Signal::new(
        "FH.6000.[NNS] - Natural Navigation Signals.Current segment",
        "nn_current_segment",
        FeatureKind::Integer,
    ),
    Signal::new(
        "FH.6000.[ODS] - Odometry Signals.Momentary frequency of left encoder pulses",
        "momentary_freq_left_encoder",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[ODS] - Odometry Signals.Momentary frequency of right encoder pulses",
        "momentary_freq_right_encoder",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[ODS] - Odometry Signals.Cumulative distance left",
        "cumulative_distance_left",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[ODS] - Odometry Signals.Cumulative distance right",
        "cumulative_distance_right",
        FeatureKind::Float,
    ),
    Signal::new(
        "FH.6000.[SS] SAFETY SIGNALS.Safety circuit closed",
        "safety_circuit_closed",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[SS] SAFETY SIGNALS.Scanners muted",
        "scanners_muted",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[SS] SAFETY SIGNALS.Front bumper triggered",
        "front_bumper_triggered",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[SS] SAFETY SIGNALS.Front scanner safety zone violated",
        "front_scanner_safety_zone_violated",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[SS] SAFETY SIGNALS.Rear scanner safety zone violated",
        "rear_scanner_safety_zone_violated",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[SS] SAFETY SIGNALS.Front scanner warning zone violated",
        "front_scanner_warning_zone_violated",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[SS] SAFETY SIGNALS.Rear scanner warning zone violated",
        "rear_scanner_warning_zone_violated",
        FeatureKind::Boolean,
    ),
    Signal::new(
        "FH.6000.[SS] SAFETY SIGNALS.Scanners active zones",
        "scanners_active_zones",
        FeatureKind::Float,
    ),
];

/// Derived navigation signals consumed by the wheel-problem classifier
pub const WHEEL_SIGNALS: &[(&str, FeatureKind)] = &[
    ("nn_diff_heading_avg_correction", FeatureKind::Float),
    ("nn_distance_avg_correction", FeatureKind::Float),
];

/// 56-feature schema of the power-consumption (overload) model
pub fn v1_power_schema() -> Result<FeatureSchema, SchemaError> {
    FeatureSchema::new(
        V1_LAYOUT_VERSION,
        V1_SIGNALS
            .iter()
            .map(|s| FeatureSpec::new(s.name, s.kind))
            .collect(),
    )
}

/// 2-feature schema of the wheel-problem classifier
pub fn wheel_schema() -> Result<FeatureSchema, SchemaError> {
    FeatureSchema::new(
        V1_LAYOUT_VERSION,
        WHEEL_SIGNALS
            .iter()
            .map(|(name, kind)| FeatureSpec::new(*name, *kind))
            .collect(),
    )
}

/// Look up a signal by canonical name
pub fn signal(name: &str) -> Option<&'static Signal> {
    V1_SIGNALS.iter().find(|s| s.name == name)
}
