use std::fmt;
use std::str::FromStr;

/// Codecs the encoder knows how to open, keyed by their identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// Motion JPEG in AVI (`MJPG`).
    Mjpeg,
    /// H.264 in MP4 (`H264`, `AVC1`, `X264`).
    H264,
    /// Lossless FFV1 in Matroska (`FFV1`).
    Ffv1,
    /// Numbered PNG files in a directory (`PNG`).
    PngSequence,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown codec identifier '{0}'")]
pub struct UnknownCodec(pub String);

impl Codec {
    /// Container extension for this codec's output.
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Mjpeg => "avi",
            Codec::H264 => "mp4",
            Codec::Ffv1 => "mkv",
            Codec::PngSequence => "frames",
        }
    }

    /// Whether the codec is encoded by an external ffmpeg process.
    pub fn uses_ffmpeg(&self) -> bool {
        !matches!(self, Codec::PngSequence)
    }

    /// ffmpeg output arguments, placed after the raw input description.
    pub(crate) fn ffmpeg_args(&self) -> &'static [&'static str] {
        match self {
            Codec::Mjpeg => &["-c:v", "mjpeg", "-q:v", "3", "-pix_fmt", "yuvj444p"],
            Codec::H264 => &[
                "-c:v", "libx264",
                "-pix_fmt", "yuv420p",
                "-preset", "medium",
                "-crf", "23",
                "-movflags", "+faststart",
            ],
            Codec::Ffv1 => &["-c:v", "ffv1", "-level", "3"],
            Codec::PngSequence => &[],
        }
    }
}

impl FromStr for Codec {
    type Err = UnknownCodec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MJPG" | "MJPEG" => Ok(Codec::Mjpeg),
            "H264" | "AVC1" | "X264" => Ok(Codec::H264),
            "FFV1" => Ok(Codec::Ffv1),
            "PNG" => Ok(Codec::PngSequence),
            _ => Err(UnknownCodec(s.to_string())),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            Codec::Mjpeg => "MJPG",
            Codec::H264 => "H264",
            Codec::Ffv1 => "FFV1",
            Codec::PngSequence => "PNG",
        };
        f.write_str(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("mjpg".parse::<Codec>().unwrap(), Codec::Mjpeg);
        assert_eq!("avc1".parse::<Codec>().unwrap(), Codec::H264);
        assert_eq!(" PNG ".parse::<Codec>().unwrap(), Codec::PngSequence);
    }

    #[test]
    fn test_unknown_codec() {
        let err = "DIVX".parse::<Codec>().unwrap_err();
        assert_eq!(err.to_string(), "unknown codec identifier 'DIVX'");
    }

    #[test]
    fn test_extensions() {
        assert_eq!(Codec::Mjpeg.extension(), "avi");
        assert_eq!(Codec::H264.extension(), "mp4");
        assert_eq!(Codec::Ffv1.extension(), "mkv");
        assert!(!Codec::PngSequence.uses_ffmpeg());
    }

    #[test]
    fn test_display_round_trips() {
        for codec in [Codec::Mjpeg, Codec::H264, Codec::Ffv1, Codec::PngSequence] {
            assert_eq!(codec.to_string().parse::<Codec>().unwrap(), codec);
        }
    }
}
