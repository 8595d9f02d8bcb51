use crate::geometry::Rect;
use crate::render::{Rgba, Surface};
use crate::sim::Direction;

pub(crate) const PLACEHOLDER_CHARACTERS: [&str; 8] = [
    "warrior_m",
    "warrior_f",
    "healer_m",
    "healer_f",
    "ranger_m",
    "ranger_f",
    "mage_m",
    "mage_f",
];

const GRASS_BASE: Rgba = [58, 104, 48, 255];
const GRASS_BLADE: Rgba = [74, 126, 58, 255];
const STONE_BASE: Rgba = [118, 118, 126, 255];
const STONE_SHADE: Rgba = [86, 86, 94, 255];
const STONE_LIGHT: Rgba = [156, 156, 166, 255];
const SKIN: Rgba = [236, 196, 160, 255];
const EYE: Rgba = [24, 24, 28, 255];
const BOOT: Rgba = [60, 40, 28, 255];
const BUBBLE_FILL: Rgba = [248, 248, 248, 255];
const BUBBLE_EDGE: Rgba = [40, 40, 48, 255];
const BUBBLE_INK: [Rgba; 4] = [
    [200, 40, 40, 255],
    [40, 120, 200, 255],
    [40, 160, 60, 255],
    [200, 150, 30, 255],
];

const CLOTHES: [Rgba; 8] = [
    [170, 40, 40, 255],
    [200, 80, 120, 255],
    [230, 230, 230, 255],
    [210, 210, 150, 255],
    [50, 130, 60, 255],
    [100, 160, 80, 255],
    [60, 70, 170, 255],
    [130, 70, 180, 255],
];

pub(crate) fn grass_tile(size: i32) -> Surface {
    let side = size.max(1) as u32;
    let mut tile = Surface::filled(side, side, GRASS_BASE);
    let step = (size / 4).max(2);
    let mut y = step / 2;
    while y < size {
        let mut x = (y * 3) % step;
        while x < size {
            tile.put_pixel(x, y, GRASS_BLADE);
            tile.put_pixel(x, y - 1, GRASS_BLADE);
            x += step;
        }
        y += step;
    }
    tile
}

pub(crate) fn stone(size: i32) -> Surface {
    let side = size.max(1);
    let mut stone = Surface::new(side as u32, side as u32);
    let body = Rect::new(1, side / 4, side - 2, side - side / 4);
    stone.fill_rect(&body, STONE_BASE);
    stone.fill_rect(&Rect::new(1, body.bottom() - 3, side - 2, 3), STONE_SHADE);
    stone.fill_rect(&Rect::new(3, body.top() + 2, side / 3, 2), STONE_LIGHT);
    stone
}

/// A `columns` x 4 walk sheet. Rows follow `Direction::ALL`; odd columns
/// shift the boots so the two walk frames read as a step.
pub(crate) fn character_sheet(
    index: usize,
    frame_size: (i32, i32),
    columns: u32,
    rows: u32,
) -> Surface {
    let (fw, fh) = frame_size;
    let mut sheet = Surface::new(fw as u32 * columns, fh as u32 * rows);
    let clothes = CLOTHES[index % CLOTHES.len()];
    for direction in Direction::ALL {
        let row = direction.row() as i32;
        for column in 0..columns as i32 {
            let origin = (column * fw, row * fh);
            draw_figure(&mut sheet, origin, frame_size, clothes, direction, column);
        }
    }
    sheet
}

fn draw_figure(
    sheet: &mut Surface,
    origin: (i32, i32),
    (fw, fh): (i32, i32),
    clothes: Rgba,
    direction: Direction,
    column: i32,
) {
    let (ox, oy) = origin;
    let head = Rect::new(ox + fw / 2 - fw / 6, oy + fh / 9, fw / 3, fh / 4);
    let body = Rect::new(ox + fw / 4, head.bottom(), fw / 2, fh / 2 - 2);
    sheet.fill_rect(&head, SKIN);
    sheet.fill_rect(&body, clothes);

    let stride = if column % 2 == 0 { 0 } else { 2 };
    let boot_w = (fw / 8).max(1);
    let boot_top = body.bottom();
    let boot_h = oy + fh - boot_top;
    sheet.fill_rect(
        &Rect::new(body.left() + stride, boot_top, boot_w, boot_h),
        BOOT,
    );
    sheet.fill_rect(
        &Rect::new(body.right() - boot_w - stride, boot_top, boot_w, boot_h),
        BOOT,
    );

    let eye_y = head.top() + head.h / 2;
    match direction {
        Direction::Up => {}
        Direction::Down => {
            sheet.put_pixel(head.left() + 1, eye_y, EYE);
            sheet.put_pixel(head.right() - 2, eye_y, EYE);
        }
        Direction::Left => sheet.put_pixel(head.left() + 1, eye_y, EYE),
        Direction::Right => sheet.put_pixel(head.right() - 2, eye_y, EYE),
    }
}

/// Horizontal strip of bubble frames. Frame 0 stays blank.
pub(crate) fn bubble_sheet(frame_size: (i32, i32), frame_count: u32) -> Surface {
    let (fw, fh) = frame_size;
    let mut sheet = Surface::new(fw as u32 * frame_count, fh as u32);
    for frame in 1..frame_count as i32 {
        let ox = frame * fw;
        let body = Rect::new(ox + 2, 2, fw - 4, fh / 2);
        sheet.fill_rect(&body, BUBBLE_EDGE);
        sheet.fill_rect(
            &Rect::new(body.x + 1, body.y + 1, body.w - 2, body.h - 2),
            BUBBLE_FILL,
        );
        let tail_x = ox + fw / 2 - 1;
        for (depth, y) in (body.bottom()..fh - 2).enumerate() {
            let half = (3 - depth as i32).max(0);
            for x in tail_x - half..=tail_x + half {
                sheet.put_pixel(x, y, BUBBLE_EDGE);
            }
        }
        let ink = BUBBLE_INK[frame as usize % BUBBLE_INK.len()];
        let marks = 1 + frame % 3;
        for mark in 0..marks {
            let mark_rect = Rect::new(body.x + 4 + mark * 7, body.y + body.h / 2 - 2, 4, 4);
            sheet.fill_rect(&mark_rect, ink);
        }
    }
    sheet
}
