use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Default rendered cell height in pixels.
pub const DEFAULT_CELL_HEIGHT: f32 = 32.0;

/// Default output size, in percent of the source image.
pub const DEFAULT_PERCENT: f32 = 2.0;

/// Value of `render.font` selecting the built-in bitmap font.
pub const BUILTIN_FONT: &str = "builtin";

/// Complete pipeline configuration.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use ap_core::config::PipelineConfig;
/// let config = PipelineConfig::default();
/// assert!(config.render_enabled);
/// assert_eq!(config.cell_height, 32.0);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PipelineConfig {
    // === Sortie ===
    /// Output width in characters. `None` = derived from `percent`.
    pub width: Option<u32>,
    /// Output height in characters. `None` = derived from `percent`.
    pub height: Option<u32>,
    /// Output size in percent of the source, used when width/height are unset.
    pub percent: f32,
    /// Directory receiving the artifacts. `None` = next to the input.
    pub out_dir: Option<PathBuf>,

    // === Rendu ===
    /// Rasterize the text into a PNG after sampling.
    pub render_enabled: bool,
    /// Font file path, or `"builtin"`.
    pub font: String,
    /// Canvas background.
    pub background: Rgb,
    /// Cell height in pixels; cells are half as wide.
    pub cell_height: f32,

    // === Artefact ===
    /// What happens to the text file after a successful render.
    pub retention: ArtifactRetention,
}

/// Fate of the intermediate text artifact.
///
/// # Example
/// ```
/// use ap_core::config::ArtifactRetention;
/// assert_eq!(ArtifactRetention::default(), ArtifactRetention::Keep);
/// ```
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ArtifactRetention {
    /// Always keep the `.txt` file.
    #[default]
    Keep,
    /// Delete it once the PNG has been written. Kept when rendering is off or fails.
    DeleteAfterRender,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            percent: DEFAULT_PERCENT,
            out_dir: None,
            render_enabled: true,
            font: BUILTIN_FONT.to_string(),
            background: Rgb::WHITE,
            cell_height: DEFAULT_CELL_HEIGHT,
            retention: ArtifactRetention::Keep,
        }
    }
}

impl PipelineConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    /// Non-finite values fall back to their default.
    pub fn clamp_all(&mut self) {
        if !self.percent.is_finite() {
            self.percent = DEFAULT_PERCENT;
        }
        if !self.cell_height.is_finite() {
            self.cell_height = DEFAULT_CELL_HEIGHT;
        }
        self.percent = self.percent.clamp(0.1, 100.0);
        self.cell_height = self.cell_height.clamp(4.0, 256.0);
        self.width = self.width.map(|w| w.max(1));
        self.height = self.height.map(|h| h.max(1));
    }

    /// True when the built-in font is selected.
    #[must_use]
    pub fn uses_builtin_font(&self) -> bool {
        self.font.eq_ignore_ascii_case(BUILTIN_FONT)
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    output: Option<OutputSection>,
    render: Option<RenderSection>,
    artifact: Option<ArtifactSection>,
}

#[derive(Deserialize)]
struct OutputSection {
    width: Option<u32>,
    height: Option<u32>,
    percent: Option<f32>,
    dir: Option<PathBuf>,
}

#[derive(Deserialize)]
struct RenderSection {
    enabled: Option<bool>,
    font: Option<String>,
    background: Option<Rgb>,
    cell_height: Option<f32>,
}

#[derive(Deserialize)]
struct ArtifactSection {
    retention: Option<ArtifactRetention>,
}

/// Parse TOML text and merge it over the defaults.
///
/// # Errors
/// Returns an error if the text is not valid TOML or a value has the wrong type.
///
/// # Example
/// ```
/// use ap_core::config::parse_config;
/// let config = parse_config("[render]\nbackground = \"black\"\n").unwrap();
/// assert_eq!(config.background, ap_core::color::Rgb::BLACK);
/// ```
pub fn parse_config(content: &str) -> Result<PipelineConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = PipelineConfig::default();

    if let Some(o) = file.output {
        if o.width.is_some() {
            config.width = o.width;
        }
        if o.height.is_some() {
            config.height = o.height;
        }
        if let Some(v) = o.percent {
            config.percent = v;
        }
        if o.dir.is_some() {
            config.out_dir = o.dir;
        }
    }

    if let Some(r) = file.render {
        if let Some(v) = r.enabled {
            config.render_enabled = v;
        }
        if let Some(v) = r.font {
            config.font = v;
        }
        if let Some(v) = r.background {
            config.background = v;
        }
        if let Some(v) = r.cell_height {
            config.cell_height = v;
        }
    }

    if let Some(a) = file.artifact
        && let Some(v) = a.retention
    {
        config.retention = v;
    }

    let parsed = config.clone();
    config.clamp_all();
    if config != parsed {
        log::warn!(
            "Valeurs hors plage corrigées : percent {} → {}, cell_height {} → {}",
            parsed.percent,
            config.percent,
            parsed.cell_height,
            config.cell_height
        );
    }
    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use ap_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Configuration invalide dans {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse_config("").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn partial_sections_override_only_their_fields() {
        let config = parse_config(
            r##"
            [output]
            width = 120

            [render]
            font = "fonts/Hack-Regular.ttf"
            background = "#101010"

            [artifact]
            retention = "DeleteAfterRender"
            "##,
        )
        .unwrap();
        assert_eq!(config.width, Some(120));
        assert_eq!(config.height, None);
        assert!((config.percent - DEFAULT_PERCENT).abs() < f32::EPSILON);
        assert_eq!(config.font, "fonts/Hack-Regular.ttf");
        assert!(!config.uses_builtin_font());
        assert_eq!(config.background, Rgb(16, 16, 16));
        assert_eq!(config.retention, ArtifactRetention::DeleteAfterRender);
        assert!(config.render_enabled);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config =
            parse_config("[output]\nwidth = 0\npercent = 900.0\n[render]\ncell_height = 1.0\n")
                .unwrap();
        assert_eq!(config.width, Some(1));
        assert!((config.percent - 100.0).abs() < f32::EPSILON);
        assert!((config.cell_height - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let config =
            parse_config("[output]\npercent = inf\n[render]\ncell_height = nan\n").unwrap();
        assert!((config.percent - DEFAULT_PERCENT).abs() < f32::EPSILON);
        assert!((config.cell_height - DEFAULT_CELL_HEIGHT).abs() < f32::EPSILON);

        let mut config = PipelineConfig {
            cell_height: f32::NAN,
            percent: f32::NEG_INFINITY,
            ..Default::default()
        };
        config.clamp_all();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn bad_color_is_an_error() {
        assert!(parse_config("[render]\nbackground = \"mauve\"\n").is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nenabled = false").unwrap();
        let config = load_config(file.path()).unwrap();
        assert!(!config.render_enabled);
    }

    #[test]
    fn shipped_default_matches_builtin_defaults() {
        let shipped = parse_config(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(shipped, PipelineConfig::default());
    }

    #[test]
    fn load_config_missing_file() {
        assert!(load_config(Path::new("/nonexistent/asciiparser.toml")).is_err());
    }
}
