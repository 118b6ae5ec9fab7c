//! PPM image output for benchmark renders.

use anyhow::{ensure, Context, Result};
use gridsweep_kernels::Rgb;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a binary P6 portable pixmap.
pub fn write_ppm(path: &Path, width: usize, height: usize, pixels: &[Rgb]) -> Result<()> {
    ensure!(
        pixels.len() == width * height,
        "pixel buffer holds {} cells, image needs {}",
        pixels.len(),
        width * height
    );

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write!(writer, "P6\n# gridsweep\n{width}\n{height}\n255\n")?;
    for pixel in pixels {
        writer.write_all(pixel)?;
    }
    writer.flush()?;
    Ok(())
}

/// Turn a case name into a filename fragment: spaces and commas become
/// underscores, parentheses are dropped.
pub fn safe_name(name: &str) -> String {
    name.chars()
        .filter_map(|c| match c {
            ' ' | ',' => Some('_'),
            '(' | ')' => None,
            other => Some(other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppm_header_and_payload_are_written() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("out.ppm");
        let pixels = vec![[1u8, 2, 3]; 6];
        write_ppm(&path, 3, 2, &pixels).expect("write image");

        let blob = std::fs::read(&path).expect("read image");
        assert!(blob.starts_with(b"P6\n"));
        assert_eq!(blob.len(), b"P6\n# gridsweep\n3\n2\n255\n".len() + 18);
        assert!(blob.ends_with(&[1, 2, 3]));
    }

    #[test]
    fn mismatched_buffers_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("out.ppm");
        assert!(write_ppm(&path, 4, 4, &[[0u8, 0, 0]; 3]).is_err());
    }

    #[test]
    fn names_become_safe_filename_fragments() {
        assert_eq!(safe_name("static (default)"), "static_default");
        assert_eq!(safe_name("dynamic,100"), "dynamic_100");
    }
}
