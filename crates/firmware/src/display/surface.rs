//! Display surface
//!
//! The handle rendering collaborators receive once the panel is live. It
//! owns the initialised panel (and through it the command channel and bus),
//! knows the logical geometry and orientation, and carries the font set.
//! Creating one performs no pixel operations.

use embedded_graphics::geometry::{OriginDimensions, Point, Size};
use embedded_graphics::mono_font::{ascii, MonoFont};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use platform::{DsiHost, PixelFormat};

use super::driver::{Panel, Ready};
use crate::config::DisplayConfig;

/// Fonts handed to the UI layer.
#[derive(Clone, Copy)]
pub struct DisplayFonts {
    /// Body text.
    pub text: &'static MonoFont<'static>,
    /// Status-bar icons.
    pub icon: &'static MonoFont<'static>,
    /// Large emoji / emotion glyphs, if the board ships them.
    pub emoji: Option<&'static MonoFont<'static>>,
}

impl Default for DisplayFonts {
    fn default() -> Self {
        Self {
            text: &ascii::FONT_10X20,
            icon: &ascii::FONT_10X20,
            emoji: None,
        }
    }
}

impl core::fmt::Debug for DisplayFonts {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DisplayFonts")
            .field("text", &self.text.character_size)
            .field("icon", &self.icon.character_size)
            .field("emoji", &self.emoji.map(|font| font.character_size))
            .finish()
    }
}

/// Quarter-turn rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    /// No rotation.
    Deg0,
    /// 90° clockwise.
    Deg90,
    /// 180°.
    Deg180,
    /// 270° clockwise.
    Deg270,
}

/// Mirror/swap flags applied when mapping logical to panel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Orientation {
    /// Mirror along the X axis.
    pub mirror_x: bool,
    /// Mirror along the Y axis.
    pub mirror_y: bool,
    /// Swap X and Y.
    pub swap_xy: bool,
}

impl Orientation {
    /// The rotation these flags amount to, or `None` for a pure reflection.
    pub const fn rotation(&self) -> Option<Rotation> {
        match (self.swap_xy, self.mirror_x, self.mirror_y) {
            (false, false, false) => Some(Rotation::Deg0),
            (true, true, false) => Some(Rotation::Deg90),
            (false, true, true) => Some(Rotation::Deg180),
            (true, false, true) => Some(Rotation::Deg270),
            _ => None,
        }
    }
}

/// Pixel-addressable surface bound to a ready panel.
pub struct DisplaySurface<H, RST, D>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
{
    panel: Panel<H, RST, D, Ready>,
    width: u16,
    height: u16,
    offset: Point,
    orientation: Orientation,
    fonts: DisplayFonts,
}

impl<H, RST, D> DisplaySurface<H, RST, D>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
{
    /// Bind a surface to an initialised panel.
    pub fn create(
        panel: Panel<H, RST, D, Ready>,
        geometry: &DisplayConfig,
        fonts: DisplayFonts,
    ) -> Self {
        let orientation = Orientation {
            mirror_x: geometry.mirror_x,
            mirror_y: geometry.mirror_y,
            swap_xy: geometry.swap_xy,
        };
        info!(
            "Display surface {}x{} on {}",
            geometry.width,
            geometry.height,
            panel.name()
        );
        Self {
            panel,
            width: geometry.width,
            height: geometry.height,
            offset: Point::new(i32::from(geometry.offset_x), i32::from(geometry.offset_y)),
            orientation,
            fonts,
        }
    }

    /// Logical width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Logical height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Offset of the visible area.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Mirror/swap flags.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Font set.
    pub fn fonts(&self) -> &DisplayFonts {
        &self.fonts
    }

    /// Pixel format of the underlying panel.
    pub fn pixel_format(&self) -> PixelFormat {
        self.panel.pixel_format()
    }

    /// The live panel.
    pub fn panel(&self) -> &Panel<H, RST, D, Ready> {
        &self.panel
    }
}

impl<H, RST, D> OriginDimensions for DisplaySurface<H, RST, D>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
{
    fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }
}

impl<H, RST, D> core::fmt::Debug for DisplaySurface<H, RST, D>
where
    H: DsiHost,
    RST: OutputPin,
    D: DelayNs,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DisplaySurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("offset", &self.offset)
            .field("orientation", &self.orientation)
            .field("panel", &self.panel)
            .finish_non_exhaustive()
    }
}
