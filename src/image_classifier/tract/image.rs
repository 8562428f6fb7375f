use crate::image_classifier::interface::{ClassificationRequest, CropAndScale};
use image::{imageops, DynamicImage, GenericImageView};
use tract_onnx::prelude::*;

/// Scales so the shorter side fills the target, then keeps the centre.
pub fn center_crop(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let scale = (width as f32 / w).max(height as f32 / h);
    let scaled_w = ((w * scale).round() as u32).max(width);
    let scaled_h = ((h * scale).round() as u32).max(height);

    let scaled = image.resize_exact(scaled_w, scaled_h, imageops::FilterType::Triangle);
    let x_offset = (scaled_w - width) / 2;
    let y_offset = (scaled_h - height) / 2;

    scaled.crop_imm(x_offset, y_offset, width, height)
}

/// Scales to fit inside the target and pads the rest with black.
pub fn scale_fit(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let scale = (width as f32 / w).min(height as f32 / h);
    let new_w = ((w * scale) as u32).clamp(1, width);
    let new_h = ((h * scale) as u32).clamp(1, height);

    let scaled = image
        .resize_exact(new_w, new_h, imageops::FilterType::Triangle)
        .to_rgb8();

    let mut padded = DynamicImage::new_rgb8(width, height).to_rgb8();
    let x_offset = (width - new_w) / 2;
    let y_offset = (height - new_h) / 2;
    imageops::replace(&mut padded, &scaled, x_offset as i64, y_offset as i64);

    DynamicImage::from(padded)
}

pub fn crop_and_scale(image: &DynamicImage, request: &ClassificationRequest) -> DynamicImage {
    let (width, height) = (request.input_width, request.input_height);
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    match request.crop_and_scale {
        CropAndScale::CenterCrop => center_crop(image, width, height),
        CropAndScale::ScaleFit => scale_fit(image, width, height),
        CropAndScale::ScaleFill => image.resize_exact(width, height, imageops::FilterType::Triangle),
    }
}

/// NCHW f32 tensor, `(pixel / 255 - mean) / std` per channel.
pub fn image_to_tensor(image: &DynamicImage, mean: [f32; 3], std: [f32; 3]) -> Tensor {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    tract_ndarray::Array4::from_shape_fn(
        (1, 3, height as usize, width as usize),
        |(_, c, y, x)| {
            let pixel = rgb.get_pixel(x as u32, y as u32);
            (pixel[c] as f32 / 255.0 - mean[c]) / std[c]
        },
    )
    .into_tensor()
}
