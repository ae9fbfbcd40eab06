use std::path::PathBuf;

use ap_core::color::Rgb;
use ap_core::config::{ArtifactRetention, PipelineConfig};
use clap::Parser;

/// asciiparser — Image to ASCII art, re-rendered as a colorized PNG.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, GIF).
    pub image: PathBuf,

    /// Largeur de sortie en caractères.
    #[arg(long)]
    pub width: Option<u32>,

    /// Hauteur de sortie en caractères.
    #[arg(long)]
    pub height: Option<u32>,

    /// Taille de sortie en pourcentage de l'image (conseillé : 1 à 3).
    #[arg(long, conflicts_with_all = ["width", "height"])]
    pub percent: Option<f32>,

    /// Produire uniquement le fichier texte, sans PNG.
    #[arg(long, default_value_t = false)]
    pub no_render: bool,

    /// Police TrueType/OpenType, ou "builtin".
    #[arg(long)]
    pub font: Option<String>,

    /// Couleur de fond : white, black, #rrggbb ou r,g,b.
    #[arg(long)]
    pub background: Option<Rgb>,

    /// Hauteur de cellule en pixels (largeur = moitié).
    #[arg(long)]
    pub cell_height: Option<f32>,

    /// Conserver le fichier texte après le rendu.
    #[arg(long, default_value_t = false, conflicts_with = "delete_text")]
    pub keep_text: bool,

    /// Supprimer le fichier texte une fois le PNG écrit.
    #[arg(long, default_value_t = false)]
    pub delete_text: bool,

    /// Dossier de sortie. Défaut : dossier de l'image.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Apply command-line overrides on top of a loaded configuration.
    ///
    /// An explicit `--percent` clears sizes coming from the config file.
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(percent) = self.percent {
            config.percent = percent;
            config.width = None;
            config.height = None;
        }
        if self.width.is_some() {
            config.width = self.width;
        }
        if self.height.is_some() {
            config.height = self.height;
        }
        if self.no_render {
            config.render_enabled = false;
        }
        if let Some(ref font) = self.font {
            config.font.clone_from(font);
        }
        if let Some(background) = self.background {
            config.background = background;
        }
        if let Some(cell_height) = self.cell_height {
            config.cell_height = cell_height;
        }
        if self.keep_text {
            config.retention = ArtifactRetention::Keep;
        } else if self.delete_text {
            config.retention = ArtifactRetention::DeleteAfterRender;
        }
        if self.out_dir.is_some() {
            config.out_dir.clone_from(&self.out_dir);
        }
        config.clamp_all();
    }
}
