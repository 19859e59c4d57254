//! Sample command: print the lookup table of a color map file

use crate::SampleFormat;
use lumos_core::{Color, ColorMap, LoadPolicy, SampleValue};
use std::fmt::Display;
use std::path::Path;
use tracing::info;

/// Sampling parameters
#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub count: usize,
    /// Lower bound; the first control point of each channel when unset
    pub min: Option<f32>,
    /// Upper bound; the last control point of each channel when unset
    pub max: Option<f32>,
    pub format: SampleFormat,
    /// Use the default color map if the file cannot be loaded
    pub default_on_error: bool,
}

pub fn run(path: &Path, options: &SampleOptions) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", render(path, options)?);
    Ok(())
}

/// Load and sample the color map, one `r g b a` row per sample
pub fn render(path: &Path, options: &SampleOptions) -> Result<String, Box<dyn std::error::Error>> {
    let policy = if options.default_on_error {
        LoadPolicy::DefaultOnError {
            min: options.min.unwrap_or(0.0),
            max: options.max.unwrap_or(1.0),
        }
    } else {
        LoadPolicy::Strict
    };

    let mut color_map = ColorMap::load(path, policy)?;
    let min = options.min.unwrap_or(f32::NEG_INFINITY);
    let max = options.max.unwrap_or(f32::INFINITY);
    info!("Sampling {} colors from {}", options.count, path.display());

    let rows = match options.format {
        SampleFormat::Float => format_rows(&color_map.sample::<f32>(options.count, min, max, 0.0)),
        SampleFormat::U8 => format_rows(&color_map.sample::<u8>(options.count, min, max, 0)),
    };
    Ok(rows)
}

fn format_rows<T: SampleValue + Display>(colors: &[Color<T>]) -> String {
    colors
        .iter()
        .map(|c| format!("{} {} {} {}\n", c.r, c.g, c.b, c.a))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumos_core::{Channel, ControlPoint, CoreError};
    use tempfile::TempDir;

    fn options(format: SampleFormat) -> SampleOptions {
        SampleOptions {
            count: 3,
            min: None,
            max: None,
            format,
            default_on_error: false,
        }
    }

    fn write_ramp(dir: &TempDir) -> std::path::PathBuf {
        let mut color_map = ColorMap::new();
        for channel in Channel::ALL {
            color_map.add_control_point(ControlPoint::new(0.0, 0.0), channel);
            color_map.add_control_point(ControlPoint::new(1.0, 1.0), channel);
        }
        let path = dir.path().join("ramp.json");
        color_map.save(&path).unwrap();
        path
    }

    #[test]
    fn test_render_float() {
        let dir = TempDir::new().unwrap();
        let path = write_ramp(&dir);

        let rows = render(&path, &options(SampleFormat::Float)).unwrap();
        assert_eq!(rows, "0 0 0 0\n0.5 0.5 0.5 0.5\n1 1 1 1\n");
    }

    #[test]
    fn test_render_u8() {
        let dir = TempDir::new().unwrap();
        let path = write_ramp(&dir);

        let rows = render(&path, &options(SampleFormat::U8)).unwrap();
        assert_eq!(rows, "0 0 0 0\n127 127 127 127\n255 255 255 255\n");
    }

    #[test]
    fn test_render_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        let error = render(&path, &options(SampleFormat::U8)).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<CoreError>(),
            Some(CoreError::NotFound(_))
        ));

        let fallback = SampleOptions {
            default_on_error: true,
            ..options(SampleFormat::Float)
        };
        let rows = render(&path, &fallback).unwrap();
        assert_eq!(rows, "0 0 0 0\n1 0.25 0 0.5\n1 1 1 1\n");
    }
}
