use crate::geometry::Rect;

pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Plain RGBA8 pixel buffer, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TRANSPARENT)
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let mut rgba = vec![0; width as usize * height as usize * 4];
        for chunk in rgba.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    /// Wraps an existing buffer; `None` when its length does not match.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if rgba.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width as i32, self.height as i32)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_size(self.width as i32, self.height as i32)
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        let offset = self.offset(x, y)?;
        let mut color = TRANSPARENT;
        color.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(color)
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(offset) = self.offset(x, y) {
            self.rgba[offset..offset + 4].copy_from_slice(&color);
        }
    }

    pub fn fill_rect(&mut self, rect: &Rect, color: Rgba) {
        let Some(area) = rect.intersection(&self.rect()) else {
            return;
        };
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                self.put_pixel(x, y, color);
            }
        }
    }

    /// Copies `src_rect` of `src` to `dest`, replacing pixels outright.
    pub fn copy_from(&mut self, src: &Surface, src_rect: &Rect, dest: (i32, i32)) {
        let bounds = self.rect();
        self.transfer(src, src_rect, dest, &bounds, false);
    }

    /// Draws `src_rect` of `src` at `dest`, limited to `clip`. Fully
    /// transparent source pixels are skipped.
    pub fn blit(&mut self, src: &Surface, src_rect: &Rect, dest: (i32, i32), clip: &Rect) {
        self.transfer(src, src_rect, dest, clip, true);
    }

    fn transfer(
        &mut self,
        src: &Surface,
        src_rect: &Rect,
        dest: (i32, i32),
        clip: &Rect,
        skip_transparent: bool,
    ) {
        let Some(src_rect) = src_rect.intersection(&src.rect()) else {
            return;
        };
        let placed = Rect::new(dest.0, dest.1, src_rect.w, src_rect.h);
        let Some(area) = placed
            .intersection(&self.rect())
            .and_then(|area| area.intersection(clip))
        else {
            return;
        };
        let dx = src_rect.x - dest.0;
        let dy = src_rect.y - dest.1;
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                let Some(color) = src.pixel(x + dx, y + dy) else {
                    continue;
                };
                if skip_transparent && color[3] == 0 {
                    continue;
                }
                self.put_pixel(x, y, color);
            }
        }
    }

    pub fn sub_surface(&self, rect: &Rect) -> Surface {
        let mut out = Surface::new(rect.w.max(0) as u32, rect.h.max(0) as u32);
        out.copy_from(self, rect, (0, 0));
        out
    }

    /// Nearest-neighbor scale of `region` into the whole of `out`.
    pub fn resample_into(&self, region: &Rect, out: &mut Surface) {
        if region.is_empty() || out.width == 0 || out.height == 0 {
            return;
        }
        let x_scale = region.w as f32 / out.width as f32;
        let y_scale = region.h as f32 / out.height as f32;
        for out_y in 0..out.height as i32 {
            let src_y = region.y + ((out_y as f32 * y_scale).floor() as i32).min(region.h - 1);
            for out_x in 0..out.width as i32 {
                let src_x =
                    region.x + ((out_x as f32 * x_scale).floor() as i32).min(region.w - 1);
                let color = self.pixel(src_x, src_y).unwrap_or(TRANSPARENT);
                out.put_pixel(out_x, out_y, color);
            }
        }
    }
}
