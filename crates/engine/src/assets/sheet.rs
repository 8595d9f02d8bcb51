use crate::geometry::Rect;
use crate::render::Surface;
use crate::sim::{Direction, WalkFrames};

use super::{AssetError, ImageId, ImageStore};

/// Slices `sheet` into a `rows` x `columns` grid of `frame_size` frames and
/// stores each one. The result is indexed `[row][column]`.
pub fn split_sheet(
    store: &mut ImageStore,
    name: &str,
    sheet: &Surface,
    frame_size: (i32, i32),
    columns: u32,
    rows: u32,
) -> Result<Vec<Vec<ImageId>>, AssetError> {
    let (frame_w, frame_h) = frame_size;
    let needed_w = frame_w.saturating_mul(columns as i32);
    let needed_h = frame_h.saturating_mul(rows as i32);
    if frame_w <= 0 || frame_h <= 0 || sheet.size().0 < needed_w || sheet.size().1 < needed_h {
        return Err(AssetError::SheetTooSmall {
            name: name.to_string(),
            size: sheet.size(),
            frame_size,
            columns,
            rows,
        });
    }

    let mut grid = Vec::with_capacity(rows as usize);
    for row in 0..rows as i32 {
        let mut frames = Vec::with_capacity(columns as usize);
        for column in 0..columns as i32 {
            let rect = Rect::new(column * frame_w, row * frame_h, frame_w, frame_h);
            frames.push(store.insert(sheet.sub_surface(&rect)));
        }
        grid.push(frames);
    }
    Ok(grid)
}

/// Walk cycle uses the first and third column of each direction row.
pub fn walk_frames_from_grid(grid: &[Vec<ImageId>]) -> Option<WalkFrames> {
    let mut frames = [[ImageId(0); 2]; 4];
    for direction in Direction::ALL {
        let row = grid.get(direction.row())?;
        frames[direction.row()] = [*row.first()?, *row.get(2)?];
    }
    Some(WalkFrames { frames })
}

/// Fills a surface of `size` by repeating `tile` from the top-left corner.
pub fn tile_surface(size: (u32, u32), tile: &Surface) -> Surface {
    let mut surface = Surface::new(size.0, size.1);
    let (tile_w, tile_h) = tile.size();
    if tile_w <= 0 || tile_h <= 0 {
        return surface;
    }
    let mut y = 0;
    while y < size.1 as i32 {
        let mut x = 0;
        while x < size.0 as i32 {
            surface.copy_from(tile, &tile.rect(), (x, y));
            x += tile_w;
        }
        y += tile_h;
    }
    surface
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_sheet(columns: u32, rows: u32, frame: (i32, i32)) -> Surface {
        let mut sheet = Surface::new(columns * frame.0 as u32, rows * frame.1 as u32);
        for row in 0..rows as i32 {
            for column in 0..columns as i32 {
                let marker = [row as u8, column as u8, 0, 255];
                sheet.put_pixel(column * frame.0, row * frame.1, marker);
            }
        }
        sheet
    }

    #[test]
    fn split_sheet_keeps_row_column_order() {
        let mut store = ImageStore::default();
        let sheet = numbered_sheet(3, 4, (32, 36));
        let grid = split_sheet(&mut store, "hero", &sheet, (32, 36), 3, 4).expect("split");
        assert_eq!(grid.len(), 4);
        assert!(grid.iter().all(|row| row.len() == 3));
        let frame = store.get(grid[2][1]).expect("frame");
        assert_eq!(frame.size(), (32, 36));
        assert_eq!(frame.pixel(0, 0), Some([2, 1, 0, 255]));
    }

    #[test]
    fn split_sheet_rejects_small_sheet() {
        let mut store = ImageStore::default();
        let sheet = Surface::new(64, 144);
        let err = split_sheet(&mut store, "tiny", &sheet, (32, 36), 3, 4).expect_err("too small");
        assert!(matches!(err, AssetError::SheetTooSmall { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn walk_frames_use_first_and_third_column() {
        let grid: Vec<Vec<ImageId>> = (0..4)
            .map(|row| (0..3).map(|column| ImageId(row * 3 + column)).collect())
            .collect();
        let frames = walk_frames_from_grid(&grid).expect("frames");
        assert_eq!(frames.for_direction(Direction::Up), [ImageId(0), ImageId(2)]);
        assert_eq!(
            frames.for_direction(Direction::Left),
            [ImageId(9), ImageId(11)]
        );
    }

    #[test]
    fn tile_surface_repeats_tile() {
        let mut tile = Surface::new(2, 2);
        tile.put_pixel(0, 0, [9, 9, 9, 255]);
        let surface = tile_surface((5, 3), &tile);
        assert_eq!(surface.pixel(4, 2), Some([9, 9, 9, 255]));
        assert_eq!(surface.pixel(3, 2), Some([0, 0, 0, 0]));
    }
}
