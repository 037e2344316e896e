//! Property-based tests for video timing and status-code math.
//! Verifies invariants hold for ALL inputs, not just the reference panel.

#![allow(clippy::arithmetic_side_effects)]

use platform::{HalStatus, PixelFormat, VideoTiming};

proptest::proptest! {
    /// Horizontal settings never change the vertical total, and vice versa.
    #[test]
    fn totals_are_independent(h in 1u32..4096, v in 1u32..4096, porch in 0u32..1000) {
        let base = VideoTiming::new(h, v);
        let wide = base.hsync_back_porch(porch);
        let tall = base.vsync_back_porch(porch);
        assert_eq!(wide.v_total(), base.v_total());
        assert_eq!(tall.h_total(), base.h_total());
    }

    /// A faster pixel clock never lowers the refresh rate.
    #[test]
    fn refresh_rate_is_monotone_in_clock(a in 1u32..200, b in 1u32..200) {
        let t = VideoTiming::new(1024, 600)
            .hsync_pulse_width(10)
            .hsync_back_porch(160)
            .hsync_front_porch(160)
            .vsync_pulse_width(1)
            .vsync_back_porch(23)
            .vsync_front_porch(12);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let slow = t.refresh_millihz(lo);
        let fast = t.refresh_millihz(hi);
        assert!(slow.is_some() && fast.is_some());
        assert!(slow <= fast, "{lo} MHz -> {slow:?}, {hi} MHz -> {fast:?}");
    }

    /// Status decoding never panics; known codes re-encode to themselves and
    /// anything else non-zero collapses to `Fail`.
    #[test]
    fn status_decoding_is_consistent(code in proptest::num::i32::ANY) {
        match HalStatus::from_code(code) {
            None => assert_eq!(code, 0),
            Some(HalStatus::Fail) => assert_ne!(code, 0),
            Some(status) => assert_eq!(status.code(), code),
        }
    }
}

#[test]
fn pixel_formats_agree_with_bit_depth() {
    for format in [PixelFormat::Rgb565, PixelFormat::Rgb666, PixelFormat::Rgb888] {
        assert_eq!(
            PixelFormat::from_bits_per_pixel(format.bits_per_pixel()),
            Some(format)
        );
        assert!(u32::from(format.bytes_per_pixel()) * 8 >= u32::from(format.bits_per_pixel()));
    }
}
