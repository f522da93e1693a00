//! Component J (loader half): reads big-endian LC-3 object files into
//! memory. The first word is the origin, the rest are contiguous contents;
//! hosts are assumed little-endian so every word is byte-swapped on the way
//! in. The last file loaded sets the user program counter.

use std::path::Path;

use crate::error::LoaderError;
use crate::memory::Memory;

/// Reads one big-endian object file and writes it into `memory` starting at
/// its origin word. Returns the origin, which becomes the user PC if this
/// is the last file loaded.
pub fn load_object_file(memory: &mut Memory, path: &Path) -> Result<u16, LoaderError> {
    let bytes = std::fs::read(path).map_err(|source| LoaderError::ProgramFile {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.len() % 2 != 0 {
        return Err(LoaderError::TruncatedFile { path: path.to_path_buf() });
    }

    let words: Vec<u16> = bytes.chunks_exact(2).map(|pair| u16::from_be_bytes([pair[0], pair[1]])).collect();

    let Some((&origin, contents)) = words.split_first() else {
        return Ok(0);
    };

    for (offset, &word) in contents.iter().enumerate() {
        memory.write(origin.wrapping_add(offset as u16), word);
    }

    Ok(origin)
}

/// Loads every file in `paths` in order, writing the last file's origin
/// into the bootstrap's user-PC slot (word `bootstrap + 10`). A failure on
/// any file but the last is a warning printed to the caller's logger, not a
/// hard error; the caller decides what "last" means since an empty `paths`
/// is the caller's responsibility to reject.
pub fn load_all(memory: &mut Memory, paths: &[std::path::PathBuf], user_pc_slot: u16) -> Result<(), LoaderError> {
    let mut last_origin = None;
    for (i, path) in paths.iter().enumerate() {
        match load_object_file(memory, path) {
            Ok(origin) => last_origin = Some(origin),
            Err(err) if i + 1 < paths.len() => {
                tracing::warn!(%err, path = %path.display(), "skipping unreadable auxiliary object file");
            }
            Err(err) => return Err(err),
        }
    }
    if let Some(origin) = last_origin {
        memory.write(user_pc_slot, origin);
    }
    Ok(())
}
