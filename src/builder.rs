//! Projection of a canonical tree into a [`RobotMessage`].
//!
//! Scalars are looked up as a child leaf first, then as an attribute of the
//! same name, then as the default the specification declares for that tag.

use std::collections::BTreeMap;

use crate::error::{LoaderError, Result};
use crate::message::{
    Footprint, KinematicModel, Point2D, Pose2D, Range, RobotMessage, SensorMessage,
};
use crate::node::GenericNode;
use crate::schema::Schema;

/// Tags projected into [`SensorMessage`]s
pub const SENSOR_TAGS: [&str; 7] = [
    "sensor",
    "laser",
    "sonar",
    "rfid_reader",
    "co2_sensor",
    "thermal_sensor",
    "sound_sensor",
];

const SENSOR_FIELDS: [&str; 9] = [
    "type",
    "name",
    "frame_id",
    "pose",
    "range",
    "min_range",
    "max_range",
    "frequency",
    "noise",
];

pub struct MessageBuilder<'a> {
    schema: &'a Schema,
}

impl<'a> MessageBuilder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    pub fn build(&self, tree: &GenericNode) -> Result<RobotMessage> {
        let robot = specifications_of(tree);
        let mut message = RobotMessage {
            name: self
                .scalar(robot, "name")
                .or_else(|| tree.attribute("name").map(str::to_string)),
            ..RobotMessage::default()
        };

        for child in &robot.children {
            match child.tag.as_str() {
                "name" => {}
                "initial_pose" => message.initial_pose = Some(self.pose(child)?),
                "footprint" => message.footprint = Some(self.footprint(child)?),
                "kinematic" => message.kinematic = Some(self.kinematic(child)),
                "parameter" => {
                    let (name, value) = self.parameter(child)?;
                    message.parameters.entry(name).or_insert(value);
                }
                tag if SENSOR_TAGS.contains(&tag) => message.sensors.push(self.sensor(child)?),
                _ => message.extensions.push(child.clone()),
            }
        }

        Ok(message)
    }

    fn pose(&self, node: &GenericNode) -> Result<Pose2D> {
        Ok(Pose2D {
            x: self.number(node, "x")?.unwrap_or_default(),
            y: self.number(node, "y")?.unwrap_or_default(),
            theta: self.number(node, "theta")?.unwrap_or_default(),
        })
    }

    fn footprint(&self, node: &GenericNode) -> Result<Footprint> {
        let node = specifications_of(node);
        let mut points = Vec::new();
        let containers = node.children_named("points").chain(std::iter::once(node));
        for container in containers {
            for point in container.children_named("point") {
                points.push(Point2D {
                    x: self.number(point, "x")?.unwrap_or_default(),
                    y: self.number(point, "y")?.unwrap_or_default(),
                });
            }
        }

        Ok(Footprint {
            radius: self.number(node, "radius")?,
            points,
        })
    }

    fn kinematic(&self, node: &GenericNode) -> KinematicModel {
        let node = specifications_of(node);
        let mut parameters: BTreeMap<String, String> = scalar_children(node)
            .filter(|(tag, _)| *tag != "model")
            .map(|(tag, value)| (tag.to_string(), value.to_string()))
            .collect();
        for (key, value) in &node.attributes {
            if key != "model" {
                parameters
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        KinematicModel {
            model: self.scalar(node, "model"),
            parameters,
        }
    }

    fn sensor(&self, node: &GenericNode) -> Result<SensorMessage> {
        let spec = specifications_of(node);
        let kind = if node.tag == "sensor" {
            self.scalar(spec, "type")
                .or_else(|| node.attribute("type").map(str::to_string))
                .unwrap_or_else(|| node.tag.clone())
        } else {
            node.tag.clone()
        };

        let range = match spec.child("range") {
            Some(range) if range.is_leaf() && range.text().is_some() => Some(Range {
                min: self.number(range, "min")?,
                max: parse_number("range", range.text())?,
            }),
            Some(range) => Some(Range {
                min: self.number(range, "min")?,
                max: self.number(range, "max")?,
            }),
            None => {
                let min = self.number(spec, "min_range")?;
                let max = self.number(spec, "max_range")?;
                (min.is_some() || max.is_some()).then_some(Range { min, max })
            }
        };

        let properties = scalar_children(spec)
            .filter(|(tag, _)| !SENSOR_FIELDS.contains(tag))
            .map(|(tag, value)| (tag.to_string(), value.to_string()))
            .collect();

        Ok(SensorMessage {
            kind,
            name: self.scalar(spec, "name"),
            frame_id: self.scalar(spec, "frame_id"),
            pose: spec.child("pose").map(|pose| self.pose(pose)).transpose()?,
            range,
            frequency: self.number(spec, "frequency")?,
            properties,
        })
    }

    fn parameter(&self, node: &GenericNode) -> Result<(String, String)> {
        let name = node
            .attribute("name")
            .map(str::to_string)
            .or_else(|| node.child("name").and_then(GenericNode::text).map(str::to_string))
            .ok_or_else(|| LoaderError::InvalidValue {
                tag: node.tag.clone(),
                value: node.text().unwrap_or_default().to_string(),
                reason: "parameter has no name".to_string(),
            })?;
        let value = node
            .text()
            .map(str::to_string)
            .or_else(|| self.scalar(node, "value"))
            .unwrap_or_default();
        Ok((name, value))
    }

    fn scalar(&self, node: &GenericNode, field: &str) -> Option<String> {
        node.scalar(field)
            .or_else(|| self.schema.default_value(field))
            .map(str::to_string)
    }

    fn number(&self, node: &GenericNode, field: &str) -> Result<Option<f64>> {
        parse_number(field, self.scalar(node, field).as_deref())
    }
}

/// The `<tag>_specifications` child of a node that wraps nothing else, or the node itself
fn specifications_of(node: &GenericNode) -> &GenericNode {
    match node.children.as_slice() {
        [inner] if inner.tag == format!("{}_specifications", node.tag) => inner,
        _ => node,
    }
}

fn scalar_children(node: &GenericNode) -> impl Iterator<Item = (&str, &str)> {
    node.children
        .iter()
        .filter(|child| child.is_leaf())
        .filter_map(|child| child.text().map(|text| (child.tag.as_str(), text)))
}

fn parse_number(tag: &str, value: Option<&str>) -> Result<Option<f64>> {
    value
        .map(|value| {
            value.trim().parse::<f64>().map_err(|_| LoaderError::InvalidValue {
                tag: tag.to_string(),
                value: value.to_string(),
                reason: "expected a number".to_string(),
            })
        })
        .transpose()
}
