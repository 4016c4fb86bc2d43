use crate::decode_payload;
use chrono::{Datelike, Local, Timelike};
use eyewire_tiles::{Layout, PlaceholderKey};
use image::{DynamicImage, ImageFormat};
use std::fs::File;
use std::io::Write;
use zip::write::SimpleFileOptions;

/// Writes every filled placeholder of `layout` into a ZIP archive as
/// `tileImg_X_Y_Z.png`, re-encoding each tile as PNG.
///
/// Returns the number of tiles written.
pub fn layout_to_zip<F>(layout: &Layout, filename: &str, mut on_tile: Option<F>) -> anyhow::Result<usize>
where
    F: FnMut(PlaceholderKey, &DynamicImage),
{
    let file = File::create(filename).map_err(|e| anyhow::anyhow!("File::create: {}", e))?;
    let mut zip = zip::ZipWriter::new(file);

    let now = Local::now();
    let dt = zip::DateTime::from_date_and_time(
        now.year() as u16,
        now.month() as u8,
        now.day() as u8,
        now.hour() as u8,
        now.minute() as u8,
        now.second() as u8,
    )
    .map_err(|_| anyhow::anyhow!("Invalid current local time for ZIP"))?;

    let options = SimpleFileOptions::default().last_modified_time(dt);

    println!("Writing tiles to ZIP: {}", filename);
    let mut count = 0;
    for (key, payload) in layout.filled() {
        let bytes = decode_payload(payload)
            .map_err(|e| anyhow::anyhow!("tile {}: {}", key.element_id(), e))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| anyhow::anyhow!("tile {}: image::load_from_memory: {}", key.element_id(), e))?;
        if let Some(ref mut f) = on_tile {
            f(key, &img);
        }

        let mut buffer = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| anyhow::anyhow!("img.write_to: {}", e))?;

        zip.start_file(format!("{}.png", key.element_id()), options)
            .map_err(|e| anyhow::anyhow!("zip.start_file: {}", e))?;
        zip.write_all(&buffer)
            .map_err(|e| anyhow::anyhow!("zip.write_all: {}", e))?;
        count += 1;
    }

    zip.finish().map_err(|e| anyhow::anyhow!("zip.finish: {}", e))?;

    Ok(count)
}
