//! What gets mirrored and how it is encoded

/// Audio extensions picked up from the source tree (case-sensitive, no dot)
pub const SOURCE_EXTENSIONS: &[&str] = &["flac", "mp3", "ogg", "opus"];

/// Cover art file names copied alongside transcoded albums
pub const COVER_ART_NAMES: &[&str] = &[
    "Cover.jpg",
    "cover.jpg",
    "Cover.png",
    "cover.png",
    "Folder.jpg",
    "folder.jpg",
    "Folder.png",
    "folder.png",
];

/// Extension of every transcoded file
pub const OUTPUT_EXTENSION: &str = "ogg";

/// Compression level handed to the transcoder via `-C`
pub const OUTPUT_QUALITY: &str = "2";

/// Matching rules and output format for a mirror run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorProfile {
    /// Source audio extensions, without the leading dot
    pub source_extensions: Vec<String>,
    /// Exact cover art file names
    pub cover_art_names: Vec<String>,
    /// Extension given to transcoded files, without the leading dot
    pub output_extension: String,
    /// Transcoder quality/compression argument
    pub quality: String,
}

impl Default for MirrorProfile {
    fn default() -> Self {
        Self {
            source_extensions: SOURCE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            cover_art_names: COVER_ART_NAMES.iter().map(|s| s.to_string()).collect(),
            output_extension: OUTPUT_EXTENSION.to_string(),
            quality: OUTPUT_QUALITY.to_string(),
        }
    }
}
