// Integration tests for configuration loading

use std::io::Write;

use rgbd::{CameraModel, Config, DistortionModel, StreamType};

const SAMPLE: &str = r#"
[sensor]
streams = ["color", "depth", "infrared"]
depth_units = 0.0001
hardware_depth_registration = false
software_depth_registration = true

[calibration.intrinsics.color]
width = 640
height = 480
fx = 615.0
fy = 615.5
ppx = 320.0
ppy = 240.0
model = "modified_brown_conrady"
coeffs = [0.1, 0.0, 0.0, 0.0, 0.0]

[calibration.intrinsics.depth]
width = 640
height = 480
fx = 385.0
fy = 385.0
ppx = 319.5
ppy = 239.5

[[calibration.extrinsics]]
from = "depth"
to = "color"
rotation = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
translation = [0.015, 0.0, 0.0]

[align]
depth_path = "in/depth.png"
color_path = "in/color.png"
output_path = "out/aligned.png"
"#;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.sensor.streams, vec![StreamType::Color, StreamType::Depth]);
    assert_eq!(config.sensor.depth_units, 0.001);
    assert_eq!(config.sensor.depth_stream(), StreamType::Depth);
    assert!(config.calibration.intrinsics.is_empty());
    assert!(config.calibration.extrinsics.is_empty());
    assert_eq!(config.align.output_path.to_str(), Some("aligned_depth.png"));
}

#[test]
fn test_parse_full_config() {
    let config = Config::from_toml(SAMPLE).unwrap();

    assert_eq!(
        config.sensor.streams,
        vec![StreamType::Color, StreamType::Depth, StreamType::InfraredLeft]
    );
    assert_eq!(config.sensor.depth_units, 0.0001);

    let color = config.calibration.intrinsics[&StreamType::Color];
    assert_eq!(color.width(), 640);
    assert_eq!(color.distortion_model(), DistortionModel::ModifiedBrownConrady);
    assert_eq!(color.distortion_coeffs()[0], 0.1);

    assert_eq!(
        config.calibration.intrinsics[&StreamType::Depth],
        CameraModel::new(640, 480, 385.0, 385.0, 319.5, 239.5)
    );

    let extrinsics = &config.calibration.extrinsics[0];
    assert_eq!(extrinsics.from, StreamType::Depth);
    assert_eq!(extrinsics.to, StreamType::Color);
    assert_eq!(extrinsics.translation, [0.015, 0.0, 0.0]);

    assert_eq!(config.align.depth_path.to_str(), Some("in/depth.png"));
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = Config::from_toml("[sensor]\ndepth_units = 0.00025\n").unwrap();
    assert_eq!(config.sensor.depth_units, 0.00025);
    assert_eq!(config.sensor.streams, vec![StreamType::Color, StreamType::Depth]);
    assert_eq!(config.align.depth_path.to_str(), Some("depth.png"));
}

#[test]
fn test_unknown_stream_name_is_rejected() {
    assert!(Config::from_toml("[sensor]\nstreams = [\"thermal\"]\n").is_err());
}

#[test]
fn test_requested_streams() {
    let mut config = Config::from_toml(SAMPLE).unwrap();
    assert_eq!(
        config.sensor.requested_streams(),
        vec![StreamType::Color, StreamType::Depth, StreamType::InfraredLeft]
    );

    config.sensor.streams = vec![StreamType::Depth];
    config.sensor.hardware_depth_registration = true;
    config.sensor.software_depth_registration = false;
    assert_eq!(
        config.sensor.depth_stream(),
        StreamType::RectifiedColorAlignedDepth
    );
    assert_eq!(
        config.sensor.requested_streams(),
        vec![StreamType::RectifiedColorAlignedDepth]
    );
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("rgbd-config-{}.toml", std::process::id()));
    std::fs::File::create(&path)
        .unwrap()
        .write_all(SAMPLE.as_bytes())
        .unwrap();

    let config = Config::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(config.sensor.software_depth_registration);
    assert_eq!(config.calibration.intrinsics.len(), 2);
}

#[test]
fn test_load_missing_file_fails() {
    let path = std::env::temp_dir().join("rgbd-config-does-not-exist.toml");
    assert!(Config::load(path).is_err());
}
