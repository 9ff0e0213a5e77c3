//! ZIP packaging of export directories.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::format::error::FormatError;

/// Archive every file below `dir` into `writer`.
///
/// Entry names are relative to `dir` with `/` separators, sorted for a
/// stable layout. Returns the entry names written.
pub fn make_zip_archive<W: Write + Seek>(
    dir: &Path,
    writer: W,
) -> Result<Vec<String>, FormatError> {
    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);
    let mut entries = Vec::with_capacity(files.len());

    for path in files {
        let name = entry_name(dir, &path)?;
        log::debug!("Adding '{}' to archive", name);

        zip.start_file(name.as_str(), options)?;
        let mut file = File::open(&path)?;
        std::io::copy(&mut file, &mut zip)?;
        entries.push(name);
    }

    zip.finish()?;

    log::info!("Archived {} files from {:?}", entries.len(), dir);

    Ok(entries)
}

/// Read one named entry out of a ZIP archive.
pub fn read_zip_entry<R: Read + Seek>(reader: R, name: &str) -> Result<Vec<u8>, FormatError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut file = archive.by_name(name)?;

    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    log::debug!("Read '{}' from archive ({} bytes)", name, data.len());
    Ok(data)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), FormatError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn entry_name(root: &Path, path: &Path) -> Result<String, FormatError> {
    let relative = path.strip_prefix(root).map_err(|_| {
        FormatError::invalid_format(format!("{:?} is outside {:?}", path, root))
    })?;

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
