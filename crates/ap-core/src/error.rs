use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from the conversion pipeline.
///
/// Each variant maps to one failure class of the sample → render → encode
/// chain. Sampling errors abort before rendering starts; render and encode
/// errors never leave a file at the destination path.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The text artifact could not be created or written.
    #[error("Écriture du fichier texte impossible : {path}")]
    ArtifactWrite {
        /// Destination of the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The text artifact could not be read back.
    #[error("Lecture du fichier texte impossible : {path}")]
    ArtifactRead {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The font could not be loaded or parsed.
    #[error("Chargement de la police impossible : {0}")]
    FontLoad(String),

    /// A canvas or glyph buffer could not be allocated.
    #[error("Allocation impossible ({what}, {bytes} octets)")]
    Allocation {
        /// Which buffer failed.
        what: &'static str,
        /// Requested size.
        bytes: usize,
    },

    /// A character outside the sampling gradient was found in the text.
    #[error("Caractère non mappé {ch:?} à la position {position}")]
    UnmappedCharacter {
        /// Offending character.
        ch: char,
        /// Character offset in the text.
        position: usize,
    },

    /// The output raster could not be encoded or persisted.
    #[error("Encodage de l'image impossible : {path}: {reason}")]
    Encode {
        /// Destination path.
        path: PathBuf,
        /// Encoder or I/O message.
        reason: String,
    },

    /// Output dimensions are zero or larger than the source.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Unsupported channel count for a source image.
    #[error("Nombre de canaux non supporté : {0}")]
    InvalidChannels(u8),

    /// The pipeline was cancelled through its cooperative flag.
    #[error("Traitement annulé")]
    Cancelled,

    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),
}

/// Shorthand for results carrying a [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;
