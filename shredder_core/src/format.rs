use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Media type used for any tag or extension outside the known table.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// The closed set of formats a generated file can be labelled as.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Txt,
    Jpg,
    Png,
    Pdf,
    #[default]
    Doc,
    Xls,
    Ppt,
    Zip,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown format tag '{0}' (expected one of: txt, jpg, png, pdf, doc, xls, ppt, zip)")]
pub struct FormatParseError(pub String);

impl FormatTag {
    pub const ALL: [FormatTag; 8] = [
        FormatTag::Txt,
        FormatTag::Jpg,
        FormatTag::Png,
        FormatTag::Pdf,
        FormatTag::Doc,
        FormatTag::Xls,
        FormatTag::Ppt,
        FormatTag::Zip,
    ];

    /// The short tag, which doubles as the file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatTag::Txt => "txt",
            FormatTag::Jpg => "jpg",
            FormatTag::Png => "png",
            FormatTag::Pdf => "pdf",
            FormatTag::Doc => "doc",
            FormatTag::Xls => "xls",
            FormatTag::Ppt => "ppt",
            FormatTag::Zip => "zip",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            FormatTag::Txt => "text/plain",
            FormatTag::Jpg => "image/jpeg",
            FormatTag::Png => "image/png",
            FormatTag::Pdf => "application/pdf",
            FormatTag::Doc => "application/msword",
            FormatTag::Xls => "application/vnd.ms-excel",
            FormatTag::Ppt => "application/vnd.ms-powerpoint",
            FormatTag::Zip => "application/zip",
        }
    }

    /// Exact, case-sensitive match on the short tag.
    fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension() == tag)
    }
}

impl FromStr for FormatTag {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('.').to_ascii_lowercase();
        Self::from_tag(&normalized).ok_or_else(|| FormatParseError(s.to_string()))
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.extension())
    }
}

/// Looks up the media type for a raw tag string.
///
/// Unknown tags never fail; they resolve to [`FALLBACK_MEDIA_TYPE`].
pub fn media_type_for_tag(tag: &str) -> &'static str {
    FormatTag::from_tag(tag)
        .map(|f| f.media_type())
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}

/// Media type for a file, chosen by its extension (case-insensitive).
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "jpeg" => FormatTag::Jpg.media_type(),
        other => media_type_for_tag(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_expected_media_types() {
        assert_eq!(media_type_for_tag("png"), "image/png");
        assert_eq!(media_type_for_tag("txt"), "text/plain");
        assert_eq!(media_type_for_tag("doc"), "application/msword");
        assert_eq!(media_type_for_tag("xls"), "application/vnd.ms-excel");
        assert_eq!(media_type_for_tag("ppt"), "application/vnd.ms-powerpoint");
        assert_eq!(media_type_for_tag("zip"), "application/zip");
    }

    #[test]
    fn falls_back_for_unknown_tags() {
        assert_eq!(media_type_for_tag("unknownxyz"), FALLBACK_MEDIA_TYPE);
        assert_eq!(media_type_for_tag(""), FALLBACK_MEDIA_TYPE);
        assert_eq!(media_type_for_tag("PNG"), FALLBACK_MEDIA_TYPE);
    }

    #[test]
    fn parses_tags_loosely() {
        assert_eq!("png".parse::<FormatTag>(), Ok(FormatTag::Png));
        assert_eq!(" .PDF ".parse::<FormatTag>(), Ok(FormatTag::Pdf));
        assert_eq!(
            "exe".parse::<FormatTag>(),
            Err(FormatParseError("exe".to_string()))
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for format in FormatTag::ALL {
            assert_eq!(format.to_string().parse::<FormatTag>(), Ok(format));
        }
    }

    #[test]
    fn default_format_is_doc() {
        assert_eq!(FormatTag::default(), FormatTag::Doc);
    }

    #[test]
    fn media_type_from_path_extension() {
        assert_eq!(media_type_for_path(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(media_type_for_path(Path::new("report.pdf")), "application/pdf");
        assert_eq!(media_type_for_path(Path::new("archive.bin")), FALLBACK_MEDIA_TYPE);
        assert_eq!(media_type_for_path(Path::new("no_extension")), FALLBACK_MEDIA_TYPE);
    }
}
