//! Color inversion

use crate::types::RasterBuffer;

/// `255 - v` on every channel, keeping the channel mode
///
/// Alpha is inverted too, so applying the filter twice restores the input.
#[must_use]
pub fn invert(buffer: RasterBuffer) -> RasterBuffer {
    match buffer {
        RasterBuffer::Gray(mut img) => {
            invert_channels(&mut img);
            RasterBuffer::Gray(img)
        },
        RasterBuffer::Color(mut img) => {
            invert_channels(&mut img);
            RasterBuffer::Color(img)
        },
        RasterBuffer::ColorAlpha(mut img) => {
            invert_channels(&mut img);
            RasterBuffer::ColorAlpha(img)
        },
    }
}

fn invert_channels<C: std::ops::DerefMut<Target = [u8]>>(data: &mut C) {
    for value in data.iter_mut() {
        *value = u8::MAX - *value;
    }
}
