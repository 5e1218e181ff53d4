use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::CameraSettings;
use crate::input::{InputAction, KeyBindings, KeyCode};
use crate::projection::Projection;
use crate::transform::Transform;

/// Errors raised while reading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("root element must be <config>, found <{0}>")]
    UnexpectedRoot(String),
    #[error("<{tag}> is not a number: {value:?}")]
    InvalidNumber { tag: String, value: String },
    #[error("<{tag}> needs three components")]
    MissingComponents { tag: String },
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
    #[error("unknown action name {0:?}")]
    UnknownAction(String),
    #[error("<bind> needs both a key and an action attribute")]
    IncompleteBinding,
    #[error("window size must be non-zero, got {width}x{height}")]
    ZeroWindowSize { width: u32, height: u32 },
    #[error("projection planes must satisfy 0 < near < far, got near={near} far={far}")]
    InvalidProjection { near: f32, far: f32 },
}

/// Everything the program reads at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub projection: Projection,
    /// Linear RGB in `[0, 1]`.
    pub clear_color: Vec3,
    pub cube: CubeConfig,
    #[serde(skip)]
    pub bindings: KeyBindings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            projection: Projection::default(),
            clear_color: Vec3::splat(0.1),
            cube: CubeConfig::default(),
            bindings: KeyBindings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            title: "flycam".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    #[serde(flatten)]
    pub settings: CameraSettings,
    /// Look delta injected per frame while an arrow-key look action is held.
    pub key_look_delta: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90.0,
            pitch: 0.0,
            settings: CameraSettings::default(),
            key_look_delta: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    pub transform: Transform,
    /// Radians per second about each axis.
    pub spin: Vec3,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            spin: Vec3::new(0.5, 1.0, 0.0),
        }
    }
}

impl Config {
    /// Pretty JSON dump of the effective settings. Key bindings are left out.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a `<config>` document. Missing elements keep their defaults.
    pub fn from_xml(xml: &str) -> Result<Self, ConfigError> {
        let document = Document::parse(xml)?;
        let root = document.root_element();
        if !root.has_tag_name("config") {
            return Err(ConfigError::UnexpectedRoot(
                root.tag_name().name().to_string(),
            ));
        }

        let mut config = Config::default();

        if let Some(window) = child(&root, "window") {
            config.window.width = parse_u32(&window, "width", config.window.width)?;
            config.window.height = parse_u32(&window, "height", config.window.height)?;
            if let Some(title) = optional_text(&window, "title") {
                config.window.title = title;
            }
        }

        if let Some(camera) = child(&root, "camera") {
            let target = &mut config.camera;
            target.position = parse_vec3(&camera, "position", target.position)?;
            target.yaw = parse_f32(&camera, "yaw", target.yaw)?;
            target.pitch = parse_f32(&camera, "pitch", target.pitch)?;
            target.settings.move_speed =
                parse_f32(&camera, "move_speed", target.settings.move_speed)?;
            target.settings.horizontal_sensitivity = parse_f32(
                &camera,
                "horizontal_sensitivity",
                target.settings.horizontal_sensitivity,
            )?;
            target.settings.vertical_sensitivity = parse_f32(
                &camera,
                "vertical_sensitivity",
                target.settings.vertical_sensitivity,
            )?;
            target.key_look_delta = parse_f32(&camera, "key_look_delta", target.key_look_delta)?;
        }

        if let Some(projection) = child(&root, "projection") {
            let target = &mut config.projection;
            target.fov_y_degrees = parse_f32(&projection, "fov", target.fov_y_degrees)?;
            target.near = parse_f32(&projection, "near", target.near)?;
            target.far = parse_f32(&projection, "far", target.far)?;
        }

        config.clear_color = parse_color(&root, "clear_color", config.clear_color)?;

        if let Some(cube) = child(&root, "cube") {
            let transform = &mut config.cube.transform;
            transform.position = parse_vec3(&cube, "position", transform.position)?;
            transform.rotation = parse_vec3(&cube, "rotation", transform.rotation)?;
            transform.scale = parse_vec3(&cube, "scale", transform.scale)?;
            config.cube.spin = parse_vec3(&cube, "spin", config.cube.spin)?;
        }

        if let Some(bindings) = child(&root, "bindings") {
            if bindings.attribute("replace") == Some("true") {
                config.bindings = KeyBindings::empty();
            }
            for bind in bindings.children().filter(|n| n.has_tag_name("bind")) {
                let (Some(key), Some(action)) = (bind.attribute("key"), bind.attribute("action"))
                else {
                    return Err(ConfigError::IncompleteBinding);
                };
                let key =
                    KeyCode::from_name(key).ok_or_else(|| ConfigError::UnknownKey(key.into()))?;
                let action = InputAction::from_name(action)
                    .ok_or_else(|| ConfigError::UnknownAction(action.into()))?;
                config.bindings.bind(key, action);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the values that would break window creation or projection.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let WindowConfig { width, height, .. } = self.window;
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroWindowSize { width, height });
        }
        let Projection { near, far, .. } = self.projection;
        if !(near > 0.0 && far > near) {
            return Err(ConfigError::InvalidProjection { near, far });
        }
        Ok(())
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_number<T: std::str::FromStr>(tag: &str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidNumber {
        tag: tag.to_string(),
        value: value.to_string(),
    })
}

/// Like [`parse_number`], but `NaN` and the infinities are rejected too.
fn parse_finite(tag: &str, value: &str) -> Result<f32, ConfigError> {
    let number: f32 = parse_number(tag, value)?;
    if !number.is_finite() {
        return Err(ConfigError::InvalidNumber {
            tag: tag.to_string(),
            value: value.to_string(),
        });
    }
    Ok(number)
}

fn parse_f32(node: &Node<'_, '_>, tag: &str, default: f32) -> Result<f32, ConfigError> {
    match optional_text(node, tag) {
        Some(value) => parse_finite(tag, &value),
        None => Ok(default),
    }
}

fn parse_u32(node: &Node<'_, '_>, tag: &str, default: u32) -> Result<u32, ConfigError> {
    match optional_text(node, tag) {
        Some(value) => parse_number(tag, &value),
        None => Ok(default),
    }
}

fn parse_vec3(node: &Node<'_, '_>, tag: &str, default: Vec3) -> Result<Vec3, ConfigError> {
    let Some(value) = optional_text(node, tag) else {
        return Ok(default);
    };
    let components = value
        .split_whitespace()
        .map(|component| parse_finite(tag, component))
        .collect::<Result<Vec<_>, _>>()?;
    match components.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(ConfigError::MissingComponents {
            tag: tag.to_string(),
        }),
    }
}

/// Colours are written as 0-255 components.
fn parse_color(node: &Node<'_, '_>, tag: &str, default: Vec3) -> Result<Vec3, ConfigError> {
    if optional_text(node, tag).is_none() {
        return Ok(default);
    }
    Ok(parse_vec3(node, tag, default)? / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::NamedKey;

    const SAMPLE: &str = r#"
    <config>
        <window>
            <width>1280</width>
            <height>720</height>
            <title>Hangar</title>
        </window>
        <camera>
            <position>1 2 3</position>
            <yaw>0</yaw>
            <move_speed>10</move_speed>
        </camera>
        <projection>
            <fov>60</fov>
        </projection>
        <clear_color>255 0 51</clear_color>
        <cube>
            <scale>2 2 2</scale>
            <spin>0 0 0</spin>
        </cube>
        <bindings>
            <bind key="Up" action="move_forward"/>
            <bind key="q" action="quit"/>
        </bindings>
    </config>
    "#;

    #[test]
    fn parse_config_overrides_defaults() {
        let config = Config::from_xml(SAMPLE).unwrap();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.window.title, "Hangar");
        assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.camera.yaw, 0.0);
        assert_eq!(config.camera.pitch, 0.0);
        assert_eq!(config.camera.settings.move_speed, 10.0);
        assert_eq!(config.projection.fov_y_degrees, 60.0);
        assert_eq!(config.projection.near, 0.1);
        assert_eq!(config.clear_color, Vec3::new(1.0, 0.0, 0.2));
        assert_eq!(config.cube.transform.scale, Vec3::splat(2.0));
        assert_eq!(config.cube.spin, Vec3::ZERO);
    }

    #[test]
    fn bindings_extend_defaults() {
        let config = Config::from_xml(SAMPLE).unwrap();
        let bindings = &config.bindings;
        assert_eq!(
            bindings.action_for(KeyCode::Named(NamedKey::Up)),
            Some(InputAction::MoveForward)
        );
        assert_eq!(
            bindings.action_for(KeyCode::Character('Q')),
            Some(InputAction::Quit)
        );
        assert_eq!(
            bindings.action_for(KeyCode::Character('W')),
            Some(InputAction::MoveForward)
        );
    }

    #[test]
    fn replace_attribute_drops_default_bindings() {
        let xml = r#"<config><bindings replace="true">
            <bind key="I" action="move_forward"/>
        </bindings></config>"#;
        let config = Config::from_xml(xml).unwrap();
        assert_eq!(config.bindings.len(), 1);
        assert_eq!(config.bindings.action_for(KeyCode::Character('W')), None);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_xml("<config/>").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn bad_number_is_an_error() {
        let err = Config::from_xml("<config><camera><yaw>left</yaw></camera></config>")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { ref tag, .. } if tag == "yaw"));
    }

    #[test]
    fn short_vector_is_an_error() {
        let err = Config::from_xml("<config><cube><spin>1 2</spin></cube></config>").unwrap_err();
        assert!(matches!(err, ConfigError::MissingComponents { .. }));
    }

    #[test]
    fn unknown_binding_names_are_errors() {
        let key = r#"<config><bindings><bind key="Hyper" action="quit"/></bindings></config>"#;
        assert!(matches!(
            Config::from_xml(key).unwrap_err(),
            ConfigError::UnknownKey(_)
        ));
        let action = r#"<config><bindings><bind key="J" action="jump"/></bindings></config>"#;
        assert!(matches!(
            Config::from_xml(action).unwrap_err(),
            ConfigError::UnknownAction(_)
        ));
    }

    #[test]
    fn invalid_projection_is_rejected() {
        let xml = "<config><projection><near>5</near><far>1</far></projection></config>";
        assert!(matches!(
            Config::from_xml(xml).unwrap_err(),
            ConfigError::InvalidProjection { .. }
        ));
    }

    #[test]
    fn wrong_root_is_rejected() {
        assert!(matches!(
            Config::from_xml("<scene/>").unwrap_err(),
            ConfigError::UnexpectedRoot(_)
        ));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let pitch = Config::from_xml("<config><camera><pitch>NaN</pitch></camera></config>");
        assert!(matches!(
            pitch.unwrap_err(),
            ConfigError::InvalidNumber { ref tag, .. } if tag == "pitch"
        ));
        let position = Config::from_xml("<config><cube><position>0 inf 0</position></cube></config>");
        assert!(matches!(
            position.unwrap_err(),
            ConfigError::InvalidNumber { ref tag, .. } if tag == "position"
        ));
    }

    #[test]
    fn json_dump_reads_back_without_bindings() {
        let config = Config::from_xml(SAMPLE).unwrap();
        let json = config.to_json().unwrap();
        let restored: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.camera, config.camera);
        assert_eq!(restored.cube, config.cube);
        assert_eq!(restored.window, config.window);
        assert_eq!(restored.bindings, KeyBindings::default());
        assert!(!json.contains("bindings"));
    }

    #[test]
    fn json_camera_settings_sit_beside_the_pose() {
        let json = Config::default().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["camera"]["move_speed"], 2.5);
        assert!(value["camera"].get("settings").is_none());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{
            "camera": { "yaw": 10.0, "move_speed": 4.0 },
            "cube": { "transform": { "position": [1.0, 2.0, 3.0] } }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.camera.yaw, 10.0);
        assert_eq!(config.camera.settings.move_speed, 4.0);
        assert_eq!(config.camera.settings.horizontal_sensitivity, 6.0);
        assert_eq!(config.camera.pitch, 0.0);
        assert_eq!(config.cube.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.cube.transform.scale, Vec3::ONE);
        assert_eq!(config.cube.spin, CubeConfig::default().spin);
        assert_eq!(config.projection, Projection::default());
    }
}
