//! Separable Gaussian smoothing with a fixed square kernel

use image::{ImageBuffer, Pixel};

/// Normalised 1-D Gaussian weights for a kernel of side `kernel_size`
///
/// Sigma is derived from the size the same way `OpenCV` does when no sigma is
/// given: `0.3 * ((k - 1) * 0.5 - 1) + 0.8`. Even sizes are treated as the
/// next odd size.
#[must_use]
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let size = kernel_size.max(1) | 1;
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let radius = (size / 2) as f32;
    let denominator = 2.0 * sigma * sigma;

    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - radius;
            (-(d * d) / denominator).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Blur every channel of `image` with a `kernel_size` x `kernel_size` Gaussian
///
/// Borders are mirrored without repeating the edge pixel (reflect-101).
/// Results are rounded, so a constant image comes back unchanged.
#[must_use]
pub fn gaussian_blur<P>(image: &ImageBuffer<P, Vec<u8>>, kernel_size: u32) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = image.dimensions();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return image.clone();
    }

    let kernel = gaussian_kernel(kernel_size);
    let radius = (kernel.len() / 2) as i64;
    let channels = usize::from(P::CHANNEL_COUNT);
    let (w, h) = (width as usize, height as usize);
    let src: &[u8] = image;

    // Horizontal pass keeps full precision for the vertical one.
    let mut horizontal = vec![0.0f32; src.len()];
    for y in 0..h {
        let row = y * w * channels;
        for x in 0..w {
            for c in 0..channels {
                let acc: f32 = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, weight)| {
                        let sx = reflect_101(x as i64 + k as i64 - radius, w);
                        weight * f32::from(src.get(row + sx * channels + c).copied().unwrap_or(0))
                    })
                    .sum();
                if let Some(slot) = horizontal.get_mut(row + x * channels + c) {
                    *slot = acc;
                }
            }
        }
    }

    let mut output = ImageBuffer::<P, Vec<u8>>::new(width, height);
    let dst: &mut [u8] = &mut output;
    for y in 0..h {
        for x in 0..w {
            for c in 0..channels {
                let acc: f32 = kernel
                    .iter()
                    .enumerate()
                    .map(|(k, weight)| {
                        let sy = reflect_101(y as i64 + k as i64 - radius, h);
                        weight * horizontal.get((sy * w + x) * channels + c).copied().unwrap_or(0.0)
                    })
                    .sum();
                if let Some(slot) = dst.get_mut((y * w + x) * channels + c) {
                    *slot = acc.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }

    output
}

/// Mirror an out-of-range index back into `0..len` (`dcb|abcd|cba`)
fn reflect_101(index: i64, len: usize) -> usize {
    let len = len as i64;
    if len <= 1 {
        return 0;
    }
    let mut i = index;
    while i < 0 || i >= len {
        i = if i < 0 { -i } else { 2 * len - 2 - i };
    }
    i as usize
}
