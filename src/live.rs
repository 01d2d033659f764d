// ABOUTME: Live device tree walker over a filesystem representation
// ABOUTME: Directories become nodes and regular files become properties

use std::fs::{self, File};
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::trace;

use crate::dtb::error::{DumpError, Result};
use crate::render::Renderer;

/// Most bytes read from a single property file; longer files are cut off
pub const MAX_PROPERTY_SIZE: usize = 4 * 1024;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> DumpError + '_ {
    move |source| DumpError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Render the tree rooted at `path`, e.g. `/proc/device-tree`.
///
/// Any entry that cannot be listed, opened or read stops the walk.
pub fn dump_live<W: Write>(path: &Path, renderer: &mut Renderer<W>) -> Result<()> {
    // Collecting the components drops trailing slashes
    let root: PathBuf = path.components().collect();

    renderer.version_tag()?;
    renderer.comment(0, format_args!("dump of live tree at {}", root.display()))?;
    renderer.blank()?;
    renderer.begin_node(0, "")?;
    dump_dir(&root, 1, renderer)?;
    renderer.end_node(0)
}

/// Render the contents of one directory at `depth`.
///
/// Properties (regular files) all come before child nodes (directories), so
/// the directory is listed twice. Within each pass entries keep the order the
/// filesystem returns them in.
fn dump_dir<W: Write>(dir: &Path, depth: usize, renderer: &mut Renderer<W>) -> Result<()> {
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_error(&path))?;
        if !file_type.is_file() {
            continue;
        }

        trace!("property {}", path.display());
        let (value, truncated) = read_property(&path)?;
        renderer.property(
            depth,
            &entry.file_name().to_string_lossy(),
            &value,
            truncated,
        )?;
    }

    // read_dir never yields `.` or `..`
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_error(&path))?;
        if !file_type.is_dir() {
            continue;
        }

        trace!("node {}", path.display());
        renderer.begin_node(depth, &entry.file_name().to_string_lossy())?;
        dump_dir(&path, depth + 1, renderer)?;
        renderer.end_node(depth)?;
    }

    Ok(())
}

/// Read up to [`MAX_PROPERTY_SIZE`] bytes of a property file.
///
/// Returns the bytes and whether the file was longer than what was kept. The
/// file is closed before returning.
fn read_property(path: &Path) -> Result<(Vec<u8>, bool)> {
    let mut file = File::open(path).map_err(io_error(path))?;
    let size = file.metadata().map_err(io_error(path))?.len();
    let chunk = size.min(MAX_PROPERTY_SIZE as u64) as usize;

    let mut buf = vec![0u8; chunk];
    let mut filled = 0;
    while filled < chunk {
        match file.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {}
            Err(e) => return Err(io_error(path)(e)),
        }
    }
    buf.truncate(filled);

    Ok((buf, (chunk as u64) < size))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn dump(path: &Path) -> String {
        let mut out = Vec::new();
        dump_live(path, &mut Renderer::new(&mut out, false)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_tree() {
        let dir = TempDir::new().unwrap();
        let expected = format!(
            "/dts-v1/;\n// dump of live tree at {}\n\n/ {{\n}};\n",
            dir.path().display()
        );
        assert_eq!(dump(dir.path()), expected);
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let dir = TempDir::new().unwrap();
        let with_slash = PathBuf::from(format!("{}//", dir.path().display()));
        let text = dump(&with_slash);
        assert!(text.contains(&format!("at {}\n", dir.path().display())));
    }

    #[test]
    fn test_read_property_small_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model");
        fs::write(&path, b"qemu\0").unwrap();
        assert_eq!(read_property(&path).unwrap(), (b"qemu\0".to_vec(), false));
    }

    #[test]
    fn test_read_property_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob");
        fs::write(&path, vec![0xa5u8; MAX_PROPERTY_SIZE + 3]).unwrap();

        let (value, truncated) = read_property(&path).unwrap();
        assert_eq!(value.len(), MAX_PROPERTY_SIZE);
        assert!(truncated);
    }

    #[test]
    fn test_read_property_exact_limit_is_not_truncated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob");
        fs::write(&path, vec![0u8; MAX_PROPERTY_SIZE]).unwrap();
        assert!(!read_property(&path).unwrap().1);
    }

    /// Output sink that deletes `victims` once the first `x` property is written
    struct RemoveAfterFirstProperty {
        out: Vec<u8>,
        victims: Vec<PathBuf>,
    }

    impl Write for RemoveAfterFirstProperty {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.out.extend_from_slice(buf);
            if String::from_utf8_lossy(&self.out).contains("= \"x\";") {
                for victim in self.victims.drain(..) {
                    let _ = fs::remove_file(victim);
                }
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_entry_vanishing_mid_walk_is_an_error() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, b"x\0").unwrap();
        fs::write(&b, b"x\0").unwrap();

        // Both entries are listed before the first one is read, so the
        // second open finds its file gone
        let mut sink = RemoveAfterFirstProperty {
            out: Vec::new(),
            victims: vec![a.clone(), b.clone()],
        };
        let result = dump_live(dir.path(), &mut Renderer::new(&mut sink, false));

        assert!(
            matches!(&result, Err(DumpError::Io { path, source })
                if (*path == a || *path == b) && source.kind() == ErrorKind::NotFound),
            "unexpected result {result:?}"
        );
        let text = String::from_utf8(sink.out).unwrap();
        assert_eq!(text.matches("= \"x\";").count(), 1);
        assert!(!text.contains("};"));
    }

    #[test]
    fn test_read_property_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone");
        assert!(matches!(
            read_property(&path),
            Err(DumpError::Io { path: p, .. }) if p == path
        ));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let mut out = Vec::new();
        let result = dump_live(&missing, &mut Renderer::new(&mut out, false));
        assert!(matches!(result, Err(DumpError::Io { path, .. }) if path == missing));
    }
}
