use image::Rgba;

/// The eight overlay colors, in cycling order.
pub const PALETTE: [Rgba<u8>; 8] = [
    Rgba([255, 107, 107, 255]),
    Rgba([78, 205, 196, 255]),
    Rgba([69, 183, 209, 255]),
    Rgba([255, 160, 122, 255]),
    Rgba([152, 216, 200, 255]),
    Rgba([247, 220, 111, 255]),
    Rgba([187, 143, 206, 255]),
    Rgba([133, 193, 226, 255]),
];

/// Color for the detection at `index` of its response, cycling through
/// [`PALETTE`].
///
/// Part of the renderer's public contract: color follows position in the
/// input list, not detection id, so re-rendering the same list reproduces
/// the same colors while a reordered list may recolor its entries.
pub fn palette_color(index: usize) -> Rgba<u8> {
    PALETTE[index % PALETTE.len()]
}
