use crate::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Copy `src` to `dst`, failing if `dst` already exists. The copy keeps the
/// source modification time. A partially written destination is removed.
pub fn copy_no_clobber(src: &Path, dst: &Path) -> Result<(), Error> {
    copy_inner(src, dst).map_err(|source| Error::Transfer {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    })
}

/// Move `src` to `dst`, failing if `dst` already exists. Falls back to copy
/// and delete when the rename crosses filesystems.
pub fn move_no_clobber(src: &Path, dst: &Path) -> Result<(), Error> {
    let wrap = |source: io::Error| Error::Transfer {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    };

    if fs::symlink_metadata(dst).is_ok() {
        return Err(wrap(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        )));
    }

    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                "Rename across filesystems, copying {} then removing source",
                src.display()
            );
            copy_inner(src, dst).map_err(wrap)?;
            fs::remove_file(src).map_err(|e| {
                warn!(
                    "Copied {} to {} but could not remove the source",
                    src.display(),
                    dst.display()
                );
                wrap(e)
            })
        }
        Err(err) => Err(wrap(err)),
    }
}

fn copy_inner(src: &Path, dst: &Path) -> io::Result<()> {
    let source_file = File::open(src)?;
    let modified = source_file.metadata()?.modified()?;

    let dest_file = OpenOptions::new().write(true).create_new(true).open(dst)?;

    let result = (|| -> io::Result<()> {
        let mut reader = BufReader::new(&source_file);
        let mut writer = BufWriter::new(&dest_file);
        io::copy(&mut reader, &mut writer)?;
        writer.flush()?;
        drop(writer);
        dest_file.set_modified(modified)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(dst);
    }
    result
}
