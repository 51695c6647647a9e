use crate::core::models::geometry::Geometry;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Writer for the plain XYZ format: atom count, comment line, then one
/// `element x y z` row per atom. Multi-frame files repeat the block.
pub struct XyzFile;

impl XyzFile {
    pub fn write_to(geometry: &Geometry, comment: &str, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "{}", geometry.len())?;
        // The comment line must stay a single line or readers lose the frame boundary.
        writeln!(writer, "{}", comment.replace(['\n', '\r'], " "))?;
        for atom in geometry.atoms() {
            let p = atom.position;
            writeln!(
                writer,
                "{:<2} {:>14.8} {:>14.8} {:>14.8}",
                atom.element, p.x, p.y, p.z
            )?;
        }
        Ok(())
    }

    /// Writes all frames to one multi-frame stream, titled `<title> <index>`.
    pub fn write_trajectory_to<'a>(
        frames: impl IntoIterator<Item = &'a Geometry>,
        title: &str,
        writer: &mut impl Write,
    ) -> io::Result<()> {
        for (i, frame) in frames.into_iter().enumerate() {
            Self::write_to(frame, &format!("{title} {i}"), writer)?;
        }
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(
        geometry: &Geometry,
        comment: &str,
        path: P,
    ) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(geometry, comment, &mut writer)?;
        writer.flush()
    }
}
