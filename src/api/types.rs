//! Typed result structs for fan commands.
//!
//! Field names mirror the controller's wire keys on deserialization
//! (`SerialNum`, `GetTemp_H`, `Temp_Sample`, ...) and serialize under
//! their Rust names for display.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// FanInfo
// ============================================================================

/// Identity of the connected fan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanInfo {
    /// Advertised fan name.
    #[serde(rename(deserialize = "Name"))]
    pub name: String,
    /// Model designation.
    #[serde(rename(deserialize = "Model"))]
    pub model: String,
    /// Serial number.
    #[serde(rename(deserialize = "SerialNum"))]
    pub serial_num: String,
}

// ============================================================================
// VersionInfo
// ============================================================================

/// Firmware and hardware version details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Firmware version string.
    #[serde(rename(deserialize = "Version"))]
    pub version: String,
    /// Thermal-protection cutoff temperature.
    #[serde(rename(deserialize = "ProtectTemp"))]
    pub protect_temp: i64,
    /// Firmware build date.
    #[serde(rename(deserialize = "Create_Date"))]
    pub create_date: String,
    /// Firmware build mode.
    #[serde(rename(deserialize = "Create_Mode"))]
    pub create_mode: String,
    /// Hardware revision.
    #[serde(rename(deserialize = "HW_Version"))]
    pub hw_version: String,
}

// ============================================================================
// Parameters
// ============================================================================

/// The fan's configured operating parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    /// Operating mode.
    #[serde(rename(deserialize = "Mode"))]
    pub mode: String,
    /// Fan type designation.
    #[serde(rename(deserialize = "FanType"))]
    pub fan_type: String,
    /// High-speed temperature threshold.
    #[serde(rename(deserialize = "GetTemp_H"))]
    pub temp_high: i64,
    /// Medium-speed temperature threshold.
    #[serde(rename(deserialize = "GetTemp_M"))]
    pub temp_medium: i64,
    /// Low-speed temperature threshold.
    #[serde(rename(deserialize = "GetTemp_L"))]
    pub temp_low: i64,
    /// Humidity-on threshold.
    #[serde(rename(deserialize = "GetHum_H"))]
    pub humidity_high: i64,
    /// Humidity-off threshold.
    #[serde(rename(deserialize = "GetHum_L"))]
    pub humidity_low: i64,
    /// Humidity control range.
    #[serde(rename(deserialize = "GetHum_Range"))]
    pub humidity_range: String,
    /// Timer hours.
    #[serde(rename(deserialize = "GetHour"))]
    pub hour: i64,
    /// Timer minutes.
    #[serde(rename(deserialize = "GetMinute"))]
    pub minute: i64,
    /// Timer control range.
    #[serde(rename(deserialize = "GetTime_Range"))]
    pub time_range: String,
}

// ============================================================================
// Preset
// ============================================================================

/// One stored preset.
///
/// On the wire a preset is a 7-element array, not an object:
///
/// ```json
/// ["Summer", 35, 30, 25, 60, 80, "High"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preset {
    /// Preset name.
    pub name: String,
    /// High-speed temperature threshold.
    pub temp_high: i64,
    /// Medium-speed temperature threshold.
    pub temp_med: i64,
    /// Low-speed temperature threshold.
    pub temp_low: i64,
    /// Humidity-off threshold.
    pub humidity_off: i64,
    /// Humidity-on threshold.
    pub humidity_on: i64,
    /// Fan speed while humidity-triggered.
    pub humidity_speed: String,
}

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (name, temp_high, temp_med, temp_low, humidity_off, humidity_on, humidity_speed) =
            <(String, i64, i64, i64, i64, i64, String)>::deserialize(deserializer)?;
        Ok(Self {
            name,
            temp_high,
            temp_med,
            temp_low,
            humidity_off,
            humidity_on,
            humidity_speed,
        })
    }
}

// ============================================================================
// RemainTime
// ============================================================================

/// Time remaining on the countdown timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemainTime {
    /// Hours remaining.
    #[serde(rename(deserialize = "RemainHour"))]
    pub hours: i64,
    /// Minutes remaining.
    #[serde(rename(deserialize = "RemainMinute"))]
    pub minutes: i64,
    /// Seconds remaining.
    #[serde(rename(deserialize = "RemainSecond"))]
    pub seconds: i64,
}

// ============================================================================
// UpgradeState
// ============================================================================

/// Firmware upgrade status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeState {
    /// Upgrade state string.
    #[serde(rename(deserialize = "State"))]
    pub state: String,
}

// ============================================================================
// WorkState
// ============================================================================

/// Current operating state and sensor readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkState {
    /// Operating mode.
    #[serde(rename(deserialize = "Mode"))]
    pub mode: String,
    /// Active control range.
    #[serde(rename(deserialize = "Range"))]
    pub range: String,
    /// Sensor health.
    #[serde(rename(deserialize = "SensorState"))]
    pub sensor_state: String,
    /// Measured temperature in degrees; the wire carries tenths.
    #[serde(
        rename(deserialize = "Temp_Sample"),
        deserialize_with = "tenths_to_degrees"
    )]
    pub temperature: f32,
    /// Measured relative humidity in percent.
    #[serde(rename(deserialize = "Humidity_Sample"))]
    pub humidity: i64,
}

/// The sensor reports temperature in tenths of a degree.
fn tenths_to_degrees<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let tenths = i64::deserialize(deserializer)?;
    Ok(tenths as f32 / 10.0)
}

// ============================================================================
// Tests
// ============================================================================
