use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Creates `directory` (and its parents) unless it exists. Returns `true` when
/// it was created. Another process creating it at the same time is not an error.
pub fn ensure_dir(directory: &Path) -> io::Result<bool> {
    if directory.is_dir() {
        return Ok(false);
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o775);
    }

    match builder.create(directory) {
        Ok(()) => Ok(true),
        Err(_) if directory.is_dir() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Moves `src` to `dst` without ever exposing a partial file at `dst`.
///
/// The data is first copied into a temporary file next to `dst`, which is then
/// renamed over `dst` (replacing it if it exists). `src` is removed last.
pub fn safe_move(src: &Path, dst: &Path) -> io::Result<()> {
    let folder = match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".cog-")
        .suffix(".temp")
        .tempfile_in(folder)?;

    let mut reader = File::open(src)?;
    io::copy(&mut reader, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o644))?;
    }

    tmp.persist(dst).map_err(|e| e.error)?;
    fs::remove_file(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("cog").join("ndvi300_v2");

        assert!(ensure_dir(&nested).unwrap());
        assert!(nested.is_dir());
        assert!(!ensure_dir(&nested).unwrap());
    }

    #[test]
    fn test_ensure_dir_on_file_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a_file");
        fs::write(&file, b"x").unwrap();
        assert!(ensure_dir(&file).is_err());
    }

    #[test]
    fn test_safe_move_creates_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("band.tmp.tiff");
        let dst = dir.path().join("out").join("band.tiff");
        fs::create_dir(dir.path().join("out")).unwrap();
        fs::write(&src, b"complete cog").unwrap();

        safe_move(&src, &dst).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), b"complete cog");
        assert!(!src.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dst).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }
    }

    #[test]
    fn test_safe_move_replaces_whole_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("new.tiff");
        let dst = dir.path().join("final.tiff");
        fs::write(&dst, vec![b'o'; 4096]).unwrap();
        fs::write(&src, b"new").unwrap();

        // leftovers of an interrupted earlier move must not end up at the final path
        fs::write(dir.path().join(".cog-interrupted.temp"), b"partial").unwrap();

        safe_move(&src, &dst).unwrap();

        assert_eq!(fs::read(&dst).unwrap(), b"new");
    }

    #[test]
    fn test_safe_move_missing_source_leaves_destination() {
        let dir = tempdir().unwrap();
        let dst = dir.path().join("final.tiff");
        fs::write(&dst, b"old").unwrap();

        assert!(safe_move(&dir.path().join("absent.tiff"), &dst).is_err());
        assert_eq!(fs::read(&dst).unwrap(), b"old");

        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
