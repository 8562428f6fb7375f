use image::DynamicImage;

/// How the encoded pixels relate to the upright image, with the same
/// semantics and raw values as EXIF / CGImagePropertyOrientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    LeftMirrored,
    Right,
    RightMirrored,
    Left,
}

impl Orientation {
    pub fn exif_value(self) -> u8 {
        match self {
            Orientation::Up => 1,
            Orientation::UpMirrored => 2,
            Orientation::Down => 3,
            Orientation::DownMirrored => 4,
            Orientation::LeftMirrored => 5,
            Orientation::Right => 6,
            Orientation::RightMirrored => 7,
            Orientation::Left => 8,
        }
    }

    pub fn from_exif_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Orientation::Up),
            2 => Some(Orientation::UpMirrored),
            3 => Some(Orientation::Down),
            4 => Some(Orientation::DownMirrored),
            5 => Some(Orientation::LeftMirrored),
            6 => Some(Orientation::Right),
            7 => Some(Orientation::RightMirrored),
            8 => Some(Orientation::Left),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "up" => Some(Orientation::Up),
            "up-mirrored" => Some(Orientation::UpMirrored),
            "down" => Some(Orientation::Down),
            "down-mirrored" => Some(Orientation::DownMirrored),
            "left-mirrored" => Some(Orientation::LeftMirrored),
            "right" => Some(Orientation::Right),
            "right-mirrored" => Some(Orientation::RightMirrored),
            "left" => Some(Orientation::Left),
            _ => None,
        }
    }

    /// Returns the upright image.
    pub fn normalize(self, image: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Up => image,
            Orientation::UpMirrored => image.fliph(),
            Orientation::Down => image.rotate180(),
            Orientation::DownMirrored => image.flipv(),
            Orientation::LeftMirrored => image.rotate90().fliph(),
            Orientation::Right => image.rotate90(),
            Orientation::RightMirrored => image.rotate270().fliph(),
            Orientation::Left => image.rotate270(),
        }
    }
}

/// Orientation of a capture connection. Fixed once at session setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}
