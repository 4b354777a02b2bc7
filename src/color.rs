/// Severity buckets driving both region fill and marker icon choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorBucket {
    Red,
    Orange,
    Yellow,
    Green,
    Unknown,
}

/// Marker icons come in four fixed variants; yellow and unrecognized
/// buckets fall back to the gray default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerIcon {
    Red,
    Orange,
    Green,
    Gray,
}

impl MarkerIcon {
    pub fn asset_path(self) -> &'static str {
        match self {
            MarkerIcon::Red => "markers/red.png",
            MarkerIcon::Orange => "markers/orange.png",
            MarkerIcon::Green => "markers/green.png",
            MarkerIcon::Gray => "markers/gray.png",
        }
    }
}

/// Total over its domain: anything unrecognized or missing is Unknown.
pub fn classify(value: Option<&str>) -> ColorBucket {
    match value {
        Some("red") => ColorBucket::Red,
        Some("orange") => ColorBucket::Orange,
        Some("yellow") => ColorBucket::Yellow,
        Some("green") => ColorBucket::Green,
        _ => ColorBucket::Unknown,
    }
}

/// Display color per bucket. Fixed table, one entry per bucket.
pub fn color_code(bucket: ColorBucket) -> &'static str {
    match bucket {
        ColorBucket::Red => "#bb4747",
        ColorBucket::Orange => "#e6912b",
        ColorBucket::Yellow => "#e5d732",
        ColorBucket::Green => "#62b651",
        ColorBucket::Unknown => "#9b9b9b",
    }
}

pub fn marker_icon(bucket: ColorBucket) -> MarkerIcon {
    match bucket {
        ColorBucket::Red => MarkerIcon::Red,
        ColorBucket::Orange => MarkerIcon::Orange,
        ColorBucket::Green => MarkerIcon::Green,
        ColorBucket::Yellow | ColorBucket::Unknown => MarkerIcon::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values_map_to_their_bucket() {
        assert_eq!(classify(Some("red")), ColorBucket::Red);
        assert_eq!(classify(Some("orange")), ColorBucket::Orange);
        assert_eq!(classify(Some("yellow")), ColorBucket::Yellow);
        assert_eq!(classify(Some("green")), ColorBucket::Green);
    }

    #[test]
    fn unrecognized_and_missing_values_are_unknown_not_errors() {
        assert_eq!(classify(Some("purple")), ColorBucket::Unknown);
        assert_eq!(classify(Some("")), ColorBucket::Unknown);
        assert_eq!(classify(None), ColorBucket::Unknown);
    }

    #[test]
    fn every_bucket_has_a_display_color() {
        let buckets = [
            ColorBucket::Red,
            ColorBucket::Orange,
            ColorBucket::Yellow,
            ColorBucket::Green,
            ColorBucket::Unknown,
        ];
        for bucket in buckets {
            assert!(color_code(bucket).starts_with('#'));
        }
    }

    #[test]
    fn yellow_and_unknown_markers_use_the_gray_default() {
        assert_eq!(marker_icon(ColorBucket::Yellow), MarkerIcon::Gray);
        assert_eq!(marker_icon(ColorBucket::Unknown), MarkerIcon::Gray);
        assert_eq!(marker_icon(ColorBucket::Red), MarkerIcon::Red);
    }
}
