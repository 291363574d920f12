//! Writing dumps to streams and files

use flate2::Compression;
use flate2::write::GzEncoder;
use sqldump_core::{Connection, Result};
use std::fs::Permissions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::assembler::generate_dump;
use crate::options::DumpOptions;

/// Generate a dump and write it to `writer`.
///
/// Nothing is written if generation fails.
pub fn dump_to_writer<C, W>(connection: &mut C, options: &DumpOptions, writer: &mut W) -> Result<()>
where
    C: Connection + ?Sized,
    W: Write + ?Sized,
{
    let document = generate_dump(connection, options)?;
    writer.write_all(document.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Generate a dump and atomically replace `path` with it.
///
/// The target directory is checked before any query runs. The document is
/// written to a temporary file next to the target and renamed over it, so a
/// failed dump never leaves a truncated file behind. A replaced file keeps its
/// permissions; a new one is created world-readable (`0644` on Unix). A `.gz`
/// extension gzip-compresses the output.
#[tracing::instrument(skip(connection, options), fields(path = %path.as_ref().display()))]
pub fn dump_to_file<C: Connection + ?Sized>(
    connection: &mut C,
    options: &DumpOptions,
    path: impl AsRef<Path>,
) -> Result<PathBuf> {
    let path = path.as_ref();
    let dir = target_directory(path);
    ensure_writable_directory(dir)?;

    let document = generate_dump(connection, options)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    if is_gzip(path) {
        let mut encoder = GzEncoder::new(file.as_file_mut(), Compression::default());
        encoder.write_all(document.as_bytes())?;
        encoder.finish()?;
    } else {
        file.write_all(document.as_bytes())?;
    }
    if let Some(permissions) = target_permissions(path) {
        file.as_file().set_permissions(permissions)?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    tracing::info!(bytes = document.len(), "dump written");
    Ok(path.to_path_buf())
}

fn target_directory(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Temp files are created owner-only; the final file should not be.
fn target_permissions(path: &Path) -> Option<Permissions> {
    match std::fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => new_file_permissions(),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

fn ensure_writable_directory(dir: &Path) -> io::Result<()> {
    let metadata = std::fs::metadata(dir).map_err(|_| not_writable(dir))?;
    if !metadata.is_dir() || metadata.permissions().readonly() {
        return Err(not_writable(dir));
    }
    Ok(())
}

fn not_writable(dir: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!(
            "Target directory does not exist or is not writable: {}",
            dir.display()
        ),
    )
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockConnection;
    use flate2::read::GzDecoder;
    use sqldump_core::{SqlDumpError, Value};
    use std::io::Read;

    fn conn() -> MockConnection {
        MockConnection::new("app").with_simple_table(
            "users",
            vec![vec![Value::Int64(1), Value::String("Ann".into())]],
        )
    }

    #[test]
    fn test_dump_to_writer() {
        let mut out = Vec::new();
        dump_to_writer(&mut conn(), &DumpOptions::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("INSERT INTO `users` (`id`, `name`) VALUES\n  ('1', 'Ann');"));
    }

    #[test]
    fn test_dump_to_writer_writes_nothing_on_failure() {
        let mut out = Vec::new();
        let mut conn = conn().fail_on("SELECT", 2013);
        let err = dump_to_writer(&mut conn, &DumpOptions::default(), &mut out).unwrap_err();
        assert!(matches!(err, SqlDumpError::Query { code: 2013, .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_dump_to_file_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("backup.sql");
        std::fs::write(&target, "stale").unwrap();

        let written = dump_to_file(&mut conn(), &DumpOptions::default(), &target).unwrap();
        assert_eq!(written, target);

        let text = std::fs::read_to_string(&target).unwrap();
        assert!(text.starts_with("-- ----"));
        assert!(text.contains("CREATE TABLE IF NOT EXISTS `users`"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_dump_to_file_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing").join("backup.sql");
        let mut conn = conn();

        let err = dump_to_file(&mut conn, &DumpOptions::default(), &target).unwrap_err();
        assert!(matches!(err, SqlDumpError::Io(_)));
        assert!(conn.queries().is_empty(), "no query runs before the check");
    }

    #[test]
    fn test_dump_to_file_keeps_old_file_on_query_failure() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("backup.sql");
        std::fs::write(&target, "previous dump").unwrap();

        let mut conn = conn().fail_on("SHOW TABLES", 1045);
        assert!(dump_to_file(&mut conn, &DumpOptions::default(), &target).is_err());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "previous dump");
    }

    #[cfg(unix)]
    #[test]
    fn test_dump_to_file_keeps_target_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("backup.sql");
        std::fs::write(&target, "previous dump").unwrap();
        std::fs::set_permissions(&target, Permissions::from_mode(0o640)).unwrap();

        dump_to_file(&mut conn(), &DumpOptions::default(), &target).unwrap();

        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn test_dump_to_file_new_target_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fresh.sql");

        dump_to_file(&mut conn(), &DumpOptions::default(), &target).unwrap();

        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_dump_to_file_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("backup.sql.gz");
        dump_to_file(&mut conn(), &DumpOptions::default(), &target).unwrap();

        let mut decoder = GzDecoder::new(std::fs::File::open(&target).unwrap());
        let mut text = String::new();
        decoder.read_to_string(&mut text).unwrap();
        assert!(text.contains("INSERT INTO `users`"));
    }
}
