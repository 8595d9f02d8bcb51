use tracing::debug;

use crate::config::ViewportConfig;
use crate::geometry::{Rect, Vec2};
use crate::input::MouseButton;

use super::Surface;

/// Zooming, scrolling window onto the world surface. Level 0 shows the whole
/// world; each further level halves the visible width and height.
#[derive(Debug, Clone)]
pub struct Viewport {
    world: Rect,
    view_size: (u32, u32),
    zoom_levels: Vec<(i32, i32)>,
    level: usize,
    scroll: Rect,
    margin: i32,
    speed: i32,
    image: Surface,
    stale: bool,
}

impl Viewport {
    pub fn new(world: Rect, config: &ViewportConfig) -> Self {
        let zoom_levels = zoom_sizes(world, config.zoom_levels);
        let scroll = Rect::new(world.x, world.y, zoom_levels[0].0, zoom_levels[0].1);
        Self {
            world,
            view_size: (config.view_width, config.view_height),
            zoom_levels,
            level: 0,
            scroll,
            margin: config.scroll_margin,
            speed: config.scroll_speed,
            image: Surface::new(config.view_width, config.view_height),
            stale: true,
        }
    }

    pub fn zoom_level(&self) -> usize {
        self.level
    }

    pub fn max_zoom(&self) -> usize {
        self.zoom_levels.len() - 1
    }

    pub fn scroll_rect(&self) -> Rect {
        self.scroll
    }

    pub fn view_size(&self) -> (u32, u32) {
        self.view_size
    }

    pub fn view_center(&self) -> (i32, i32) {
        (self.view_size.0 as i32 / 2, self.view_size.1 as i32 / 2)
    }

    pub fn image(&self) -> &Surface {
        &self.image
    }

    /// World units per output pixel at the current zoom level.
    pub fn scales(&self) -> (f32, f32) {
        let (zoom_w, zoom_h) = self.zoom_levels[self.level];
        (
            zoom_w as f32 / self.view_size.0.max(1) as f32,
            zoom_h as f32 / self.view_size.1.max(1) as f32,
        )
    }

    pub fn map_pos(&self, screen: (i32, i32)) -> Vec2 {
        let (x_scale, y_scale) = self.scales();
        Vec2 {
            x: self.scroll.left() as f32 + screen.0 as f32 * x_scale,
            y: self.scroll.top() as f32 + screen.1 as f32 * y_scale,
        }
    }

    /// Rect of the current zoom level's size centered on `center`, clamped
    /// to the world.
    pub fn zoom_rect_at(&self, center: Vec2) -> Rect {
        let (w, h) = self.zoom_levels[self.level];
        Rect::with_center(w, h, (center.x as i32, center.y as i32)).clamp_within(&self.world)
    }

    /// Left click zooms in, right click zooms out, both centered on the
    /// clicked world point. Returns true when the zoom level changed; the
    /// window layer then warps the pointer to `view_center`.
    pub fn handle_click(&mut self, button: MouseButton, screen: (i32, i32)) -> bool {
        let next = match button {
            MouseButton::Left if self.level < self.max_zoom() => self.level + 1,
            MouseButton::Right if self.level > 0 => self.level - 1,
            _ => return false,
        };
        let center = self.map_pos(screen);
        self.level = next;
        self.scroll = self.zoom_rect_at(center);
        self.stale = true;
        debug!(
            level = self.level,
            x = self.scroll.x,
            y = self.scroll.y,
            "viewport_zoomed"
        );
        true
    }

    /// Scrolls when the pointer sits within the margin of a view edge, and
    /// flags a resample when the view scrolled or overlaps a dirty region.
    /// `pointer` is `None` while it is outside the window.
    pub fn update(&mut self, pointer: Option<(i32, i32)>, dirty: &[Rect]) -> bool {
        let offset = pointer.map_or((0, 0), |position| self.scroll_offset(position));
        if offset != (0, 0) {
            let moved = self.scroll.translated(offset.0, offset.1);
            self.scroll = moved.clamp_within(&self.world);
            self.stale = true;
        } else if dirty.iter().any(|rect| rect.overlaps(&self.scroll)) {
            self.stale = true;
        }
        self.stale
    }

    fn scroll_offset(&self, (x, y): (i32, i32)) -> (i32, i32) {
        let (view_w, view_h) = (self.view_size.0 as i32, self.view_size.1 as i32);
        let mut offset = (0, 0);
        if x < self.margin {
            offset.0 -= self.speed;
        } else if x > view_w - self.margin {
            offset.0 += self.speed;
        }
        if y < self.margin {
            offset.1 -= self.speed;
        } else if y > view_h - self.margin {
            offset.1 += self.speed;
        }
        offset
    }

    /// Resamples the scroll rect of `world_surface` into the output image if
    /// anything flagged it stale. Returns true when the image changed.
    pub fn refresh(&mut self, world_surface: &Surface) -> bool {
        if !self.stale {
            return false;
        }
        world_surface.resample_into(&self.scroll, &mut self.image);
        self.stale = false;
        true
    }
}

/// Halved sizes for each zoom level, stopping early once both sides bottom
/// out at one pixel.
fn zoom_sizes(world: Rect, levels: u32) -> Vec<(i32, i32)> {
    let halve = |side: i32, level: u32| side.checked_shr(level).unwrap_or(0).max(1);
    let mut sizes = vec![(world.w.max(1), world.h.max(1))];
    for level in 1..levels {
        let size = (halve(world.w, level), halve(world.h, level));
        if sizes.last() == Some(&size) {
            break;
        }
        sizes.push(size);
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: Rect = Rect::new(0, 0, 512, 512);

    fn viewport() -> Viewport {
        Viewport::new(WORLD, &ViewportConfig::default())
    }

    #[test]
    fn zoom_levels_halve_each_step() {
        let view = viewport();
        assert_eq!(view.zoom_levels, vec![(512, 512), (256, 256), (128, 128)]);
        assert_eq!(view.scroll_rect(), WORLD);
        assert_eq!(view.max_zoom(), 2);
    }

    #[test]
    fn excess_zoom_levels_stop_at_one_pixel() {
        let config = ViewportConfig {
            zoom_levels: 40,
            ..ViewportConfig::default()
        };
        let mut view = Viewport::new(WORLD, &config);
        assert_eq!(view.max_zoom(), 9);
        assert_eq!(view.zoom_levels.last(), Some(&(1, 1)));

        for _ in 0..40 {
            view.handle_click(MouseButton::Left, (256, 256));
        }
        assert_eq!(view.zoom_level(), 9);
        assert_eq!(view.scroll_rect().size(), (1, 1));
    }

    #[test]
    fn zoom_in_then_out_restores_full_world() {
        let mut view = viewport();
        assert!(view.handle_click(MouseButton::Left, (100, 400)));
        assert_eq!(view.zoom_level(), 1);
        // Centered on (100, 400), then pushed back inside the world.
        assert_eq!(view.scroll_rect(), Rect::new(0, 256, 256, 256));

        assert!(view.handle_click(MouseButton::Right, (256, 256)));
        assert_eq!(view.zoom_level(), 0);
        assert_eq!(view.scroll_rect(), WORLD);
    }

    #[test]
    fn zoom_is_clamped_to_configured_levels() {
        let mut view = viewport();
        assert!(!view.handle_click(MouseButton::Right, (10, 10)));
        assert!(view.handle_click(MouseButton::Left, (256, 256)));
        assert!(view.handle_click(MouseButton::Left, (256, 256)));
        assert!(!view.handle_click(MouseButton::Left, (256, 256)));
        assert!(!view.handle_click(MouseButton::Middle, (256, 256)));
        assert_eq!(view.zoom_level(), 2);
        assert_eq!(view.scroll_rect(), Rect::new(192, 192, 128, 128));
    }

    #[test]
    fn map_pos_scales_with_zoom() {
        let mut view = viewport();
        assert_eq!(view.map_pos((100, 50)), Vec2 { x: 100.0, y: 50.0 });
        view.handle_click(MouseButton::Left, (256, 256));
        assert_eq!(view.scroll_rect(), Rect::new(128, 128, 256, 256));
        assert_eq!(view.map_pos((100, 50)), Vec2 { x: 178.0, y: 153.0 });
    }

    #[test]
    fn pointer_near_edge_scrolls_and_clamps() {
        let mut view = viewport();
        view.handle_click(MouseButton::Left, (256, 256));
        view.refresh(&Surface::new(512, 512));

        assert!(view.update(Some((5, 256)), &[]));
        assert_eq!(view.scroll_rect().x, 123);
        view.refresh(&Surface::new(512, 512));

        for _ in 0..100 {
            view.update(Some((500, 500)), &[]);
        }
        assert_eq!(view.scroll_rect(), Rect::new(256, 256, 256, 256));
    }

    #[test]
    fn resample_only_when_scrolled_or_dirty_overlaps() {
        let mut view = viewport();
        view.handle_click(MouseButton::Left, (100, 100));
        let world = Surface::new(512, 512);
        assert!(view.refresh(&world));

        assert!(!view.update(Some((256, 256)), &[Rect::new(400, 400, 10, 10)]));
        assert!(!view.refresh(&world));
        assert!(!view.update(None, &[]));

        assert!(view.update(Some((256, 256)), &[Rect::new(10, 10, 10, 10)]));
        assert!(view.refresh(&world));
    }

    #[test]
    fn refresh_scales_scroll_region_to_view() {
        let mut view = viewport();
        let mut world = Surface::new(512, 512);
        world.put_pixel(0, 0, [255, 0, 0, 255]);
        view.handle_click(MouseButton::Left, (0, 0));
        view.handle_click(MouseButton::Left, (0, 0));
        assert_eq!(view.scroll_rect(), Rect::new(0, 0, 128, 128));
        view.refresh(&world);
        // One world pixel covers a 4x4 block of the output.
        assert_eq!(view.image().pixel(3, 3), Some([255, 0, 0, 255]));
        assert_eq!(view.image().pixel(4, 4), Some([0, 0, 0, 0]));
    }
}
