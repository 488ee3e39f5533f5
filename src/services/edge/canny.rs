use image::{GrayImage, Luma, imageops};

const BLUR_SIGMA: f32 = 1.4;
const EDGE: u8 = 255;

/// Canny-style edge map of a grayscale image.
///
/// Gaussian blur, 3x3 Sobel with L1 magnitude, non-maximum suppression along
/// four quantised directions, then hysteresis between `lower` and `upper`.
/// Edge pixels are white on black.
pub fn detect_edges(gray: &GrayImage, lower: f32, upper: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return GrayImage::new(width, height);
    }

    let blurred = imageops::blur(gray, BLUR_SIGMA);
    let (w, h) = (width as usize, height as usize);
    let at = |x: usize, y: usize| blurred.get_pixel(x as u32, y as u32)[0] as f32;

    let mut magnitude = vec![0f32; w * h];
    let mut direction = vec![0u8; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let gx = (at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x - 1, y) + at(x - 1, y + 1));
            let gy = (at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1))
                - (at(x - 1, y - 1) + 2.0 * at(x, y - 1) + at(x + 1, y - 1));
            let i = y * w + x;
            magnitude[i] = gx.abs() + gy.abs();
            direction[i] = quantize(gy.atan2(gx));
        }
    }

    let mut thin = vec![0f32; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let m = magnitude[i];
            if m == 0.0 {
                continue;
            }
            let (ahead, behind) = match direction[i] {
                0 => (i + 1, i - 1),
                1 => (i + w + 1, i - w - 1),
                2 => (i + w, i - w),
                _ => (i + w - 1, i - w + 1),
            };
            if m >= magnitude[ahead] && m >= magnitude[behind] {
                thin[i] = m;
            }
        }
    }

    let mut edges = vec![0u8; w * h];
    let mut stack: Vec<usize> = Vec::new();
    for (i, &m) in thin.iter().enumerate() {
        if m >= upper {
            edges[i] = EDGE;
            stack.push(i);
        }
    }

    while let Some(i) = stack.pop() {
        let (x, y) = (i % w, i / w);
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let j = ny * w + nx;
                if edges[j] == 0 && thin[j] >= lower && thin[j] > 0.0 {
                    edges[j] = EDGE;
                    stack.push(j);
                }
            }
        }
    }

    GrayImage::from_fn(width, height, |x, y| Luma([edges[y as usize * w + x as usize]]))
}

/// Maps a gradient angle to one of four directions (0°, 45°, 90°, 135°).
fn quantize(angle: f32) -> u8 {
    let degrees = angle.to_degrees().rem_euclid(180.0);
    if !(22.5..157.5).contains(&degrees) {
        0
    } else if degrees < 67.5 {
        1
    } else if degrees < 112.5 {
        2
    } else {
        3
    }
}
