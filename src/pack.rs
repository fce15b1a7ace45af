use crate::scale::GlyphRecord;

/// Pack every record's cell into a `width` x `height` texture.
///
/// Items are grown by `spacing` and the container is inset by `spacing` on
/// the low sides, which keeps every pair of cells and every cell and the
/// texture edge at least `spacing` texels apart. On success each record's
/// position is set; on failure the records are left untouched.
pub fn pack(records: &mut [GlyphRecord], width: u32, height: u32, spacing: u32) -> bool {
    let spacing = spacing as usize;
    let items = records.iter().enumerate().map(|(index, record)| crunch::Item {
        data: index,
        w: record.placement.width as usize + spacing,
        h: record.placement.height as usize + spacing,
        rot: crunch::Rotation::None,
    });
    let container = crunch::Rect {
        x: spacing,
        y: spacing,
        w: (width as usize).saturating_sub(spacing),
        h: (height as usize).saturating_sub(spacing),
    };
    match crunch::Packer::with_items(items).pack(container) {
        Ok(packed) => {
            for item in packed {
                let placement = &mut records[item.data].placement;
                // positions lie inside the texture
                placement.x = item.rect.x as u32;
                placement.y = item.rect.y as u32;
            }
            true
        }
        Err(_) => false,
    }
}
