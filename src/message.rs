//! Typed robot configuration produced at the end of the pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::node::GenericNode;

/// Planar pose; angles are in radians
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

/// Robot outline, either a circle or a polygon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point2D>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicModel {
    pub model: Option<String>,
    /// Remaining scalar settings of the model, keyed by tag
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
}

/// Measurement range of a sensor
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorMessage {
    /// `laser`, `sonar`, ... or the `type` attribute of a generic `sensor`
    pub kind: String,
    pub name: Option<String>,
    pub frame_id: Option<String>,
    pub pose: Option<Pose2D>,
    pub range: Option<Range>,
    pub frequency: Option<f64>,
    /// Any other scalar the sensor carries
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotMessage {
    pub name: Option<String>,
    pub initial_pose: Option<Pose2D>,
    pub footprint: Option<Footprint>,
    pub kinematic: Option<KinematicModel>,
    #[serde(default)]
    pub sensors: Vec<SensorMessage>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    /// Allowed children of the robot that have no typed field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<GenericNode>,
}

impl RobotMessage {
    pub fn sensors_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a SensorMessage> {
        self.sensors.iter().filter(move |sensor| sensor.kind == kind)
    }
}
