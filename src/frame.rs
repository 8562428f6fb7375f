pub mod orientation;

use crate::error::FrameError;
use chrono::{DateTime, Utc};
use image::{DynamicImage, RgbImage, RgbaImage};
use orientation::VideoOrientation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Bgra8,
    Rgba8,
    Rgb8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Bgra8 | PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// 3x3 intrinsic matrix (row-major) attached to a sample by some cameras.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraIntrinsics {
    pub matrix: [[f32; 3]; 3],
}

impl CameraIntrinsics {
    pub fn focal_length(&self) -> (f32, f32) {
        (self.matrix[0][0], self.matrix[1][1])
    }

    pub fn principal_point(&self) -> (f32, f32) {
        (self.matrix[0][2], self.matrix[1][2])
    }
}

/// What a camera device hands over for one sample.
#[derive(Debug, Clone)]
pub struct CapturedBuffer {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub data: Vec<u8>,
    pub intrinsics: Option<CameraIntrinsics>,
}

#[derive(Debug)]
pub struct Frame {
    sequence: u64,
    captured_at: DateTime<Utc>,
    connection_orientation: VideoOrientation,
    buffer: CapturedBuffer,
}

impl Frame {
    pub fn new(
        sequence: u64,
        captured_at: DateTime<Utc>,
        connection_orientation: VideoOrientation,
        buffer: CapturedBuffer,
    ) -> Self {
        Self {
            sequence,
            captured_at,
            connection_orientation,
            buffer,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn connection_orientation(&self) -> VideoOrientation {
        self.connection_orientation
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.buffer.pixel_format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.buffer.width, self.buffer.height)
    }

    pub fn intrinsics(&self) -> Option<CameraIntrinsics> {
        self.buffer.intrinsics
    }

    /// Consumes the frame and decodes its pixels.
    pub fn into_image(self) -> Result<DynamicImage, FrameError> {
        let CapturedBuffer {
            width,
            height,
            pixel_format,
            mut data,
            ..
        } = self.buffer;

        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimensions { width, height });
        }

        let expected = width as usize * height as usize * pixel_format.bytes_per_pixel();
        let malformed = FrameError::MalformedBuffer {
            expected,
            actual: data.len(),
        };
        if data.len() != expected {
            return Err(malformed);
        }

        match pixel_format {
            PixelFormat::Bgra8 => {
                for pixel in data.chunks_exact_mut(4) {
                    pixel.swap(0, 2);
                }
                RgbaImage::from_raw(width, height, data)
                    .map(DynamicImage::ImageRgba8)
                    .ok_or(malformed)
            }
            PixelFormat::Rgba8 => RgbaImage::from_raw(width, height, data)
                .map(DynamicImage::ImageRgba8)
                .ok_or(malformed),
            PixelFormat::Rgb8 => RgbImage::from_raw(width, height, data)
                .map(DynamicImage::ImageRgb8)
                .ok_or(malformed),
        }
    }
}
