//! Image to tensor conversions for each model stage.

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::{Array3, ArrayViewMut3, s};
use ocrspeak_core::Quad;

/// Longest side accepted by the detection model.
pub const DET_LIMIT_SIDE: u32 = 960;

/// Detection inputs are multiples of this stride.
pub const DET_STRIDE: u32 = 32;

/// Input height of the classification and recognition models.
pub const LINE_HEIGHT: u32 = 48;

/// Fixed classification input width.
pub const CLS_WIDTH: u32 = 192;

/// Minimum recognition input width.
pub const REC_MIN_WIDTH: u32 = 320;

/// Crops at least this much taller than wide are treated as vertical text.
const VERTICAL_RATIO: f32 = 1.5;

const DET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const DET_STD: [f32; 3] = [0.229, 0.224, 0.225];
const LINE_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
const LINE_STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Returns the detection input size for an image of `width` x `height`.
pub fn det_input_size(width: u32, height: u32) -> (u32, u32) {
    let max_side = width.max(height) as f32;
    let ratio = if max_side > DET_LIMIT_SIDE as f32 {
        DET_LIMIT_SIDE as f32 / max_side
    } else {
        1.0
    };

    let round = |side: u32| {
        let scaled = (side as f32 * ratio / DET_STRIDE as f32).round() as u32 * DET_STRIDE;
        scaled.max(DET_STRIDE)
    };

    (round(width), round(height))
}

/// Resizes and normalizes an image for the detection model.
pub fn det_tensor(image: &RgbImage) -> Array3<f32> {
    let (w, h) = det_input_size(image.width(), image.height());
    let resized = imageops::resize(image, w, h, FilterType::Triangle);

    let mut tensor = Array3::<f32>::zeros((3, h as usize, w as usize));
    write_bgr(tensor.view_mut(), &resized, &DET_MEAN, &DET_STD);
    tensor
}

/// Crops the axis-aligned bounds of `region`, turning vertical crops upright.
pub fn crop_region(image: &RgbImage, region: &Quad) -> RgbImage {
    let (min_x, min_y, max_x, max_y) = region.bounds();
    let (img_w, img_h) = (image.width(), image.height());

    let x0 = (min_x.max(0.0) as u32).min(img_w.saturating_sub(1));
    let y0 = (min_y.max(0.0) as u32).min(img_h.saturating_sub(1));
    let x1 = (max_x.max(0.0).ceil() as u32).clamp(x0 + 1, img_w);
    let y1 = (max_y.max(0.0).ceil() as u32).clamp(y0 + 1, img_h);

    let crop = imageops::crop_imm(image, x0, y0, x1 - x0, y1 - y0).to_image();
    if crop.height() as f32 / crop.width() as f32 >= VERTICAL_RATIO {
        imageops::rotate270(&crop)
    } else {
        crop
    }
}

/// Resizes a crop to the classifier input, padding the right side with zeros.
pub fn cls_tensor(crop: &RgbImage) -> Array3<f32> {
    line_tensor(crop, CLS_WIDTH)
}

/// Resizes a crop to a recognition input of `target_width`, padding with zeros.
pub fn rec_tensor(crop: &RgbImage, target_width: u32) -> Array3<f32> {
    line_tensor(crop, target_width)
}

/// Width of a recognition batch whose widest crop has the given aspect ratio.
pub fn rec_batch_width(max_ratio: f32) -> u32 {
    let fitted = (LINE_HEIGHT as f32 * max_ratio).ceil() as u32;
    fitted.max(REC_MIN_WIDTH)
}

/// Width over height of a crop.
pub fn aspect_ratio(crop: &RgbImage) -> f32 {
    crop.width() as f32 / crop.height().max(1) as f32
}

fn line_tensor(crop: &RgbImage, target_width: u32) -> Array3<f32> {
    let fitted = (LINE_HEIGHT as f32 * aspect_ratio(crop)).ceil() as u32;
    let width = fitted.clamp(1, target_width);
    let resized = imageops::resize(crop, width, LINE_HEIGHT, FilterType::Triangle);

    let filled = width as usize;
    let mut tensor = Array3::<f32>::zeros((3, LINE_HEIGHT as usize, target_width as usize));
    write_bgr(
        tensor.slice_mut(s![.., .., ..filled]),
        &resized,
        &LINE_MEAN,
        &LINE_STD,
    );
    tensor
}

/// Writes `image` into a CHW view in BGR channel order.
fn write_bgr(mut tensor: ArrayViewMut3<f32>, image: &RgbImage, mean: &[f32; 3], std: &[f32; 3]) {
    for (x, y, pixel) in image.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for (channel, source) in [2usize, 1, 0].into_iter().enumerate() {
            let value = pixel[source] as f32 / 255.0;
            tensor[[channel, y, x]] = (value - mean[channel]) / std[channel];
        }
    }
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    #[test]
    fn det_size_limits_and_rounds() {
        assert_eq!(det_input_size(1920, 1080), (960, 544));
        assert_eq!(det_input_size(100, 50), (96, 64));
        assert_eq!(det_input_size(5, 5), (32, 32));
    }

    #[test]
    fn det_tensor_uses_bgr_order() {
        let image = RgbImage::from_pixel(32, 32, Rgb([255, 0, 0]));
        let tensor = det_tensor(&image);
        assert_eq!(tensor.shape(), &[3, 32, 32]);

        let blue = (0.0 - DET_MEAN[0]) / DET_STD[0];
        let red = (1.0 - DET_MEAN[2]) / DET_STD[2];
        assert!((tensor[[0, 5, 5]] - blue).abs() < 1e-2);
        assert!((tensor[[2, 5, 5]] - red).abs() < 1e-2);
    }

    #[test]
    fn vertical_crops_are_rotated() {
        let image = RgbImage::from_pixel(100, 100, Rgb([10, 10, 10]));
        let tall = crop_region(&image, &Quad::from_bounds(10.0, 10.0, 20.0, 60.0));
        assert_eq!((tall.width(), tall.height()), (50, 10));

        let wide = crop_region(&image, &Quad::from_bounds(10.0, 10.0, 60.0, 20.0));
        assert_eq!((wide.width(), wide.height()), (50, 10));
    }

    #[test]
    fn crop_is_clamped_to_image() {
        let image = RgbImage::new(30, 20);
        let crop = crop_region(&image, &Quad::from_bounds(-5.0, -5.0, 100.0, 10.0));
        assert_eq!((crop.width(), crop.height()), (30, 10));
    }

    #[test]
    fn line_tensor_pads_with_zeros() {
        let crop = RgbImage::from_pixel(48, 48, Rgb([255, 255, 255]));
        let tensor = cls_tensor(&crop);
        assert_eq!(tensor.shape(), &[3, 48, 192]);
        assert!((tensor[[0, 0, 0]] - 1.0).abs() < 1e-2);
        assert_eq!(tensor[[0, 0, 100]], 0.0);
    }

    #[test]
    fn rec_batch_width_has_minimum() {
        assert_eq!(rec_batch_width(1.0), 320);
        assert_eq!(rec_batch_width(10.0), 480);
    }
}
