use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

use crate::error::{ProcessingError, Result};

/// Read a UTF-8 text file, dropping a leading byte-order mark if present.
///
/// With `use_mmap` the file is memory-mapped instead of read into a buffer.
pub fn read_utf8_file(path: &Path, use_mmap: bool) -> Result<String> {
    if use_mmap {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(String::new());
        }
        let mmap = unsafe { Mmap::map(&file)? };
        decode_utf8(&mmap, path)
    } else {
        let bytes = std::fs::read(path)?;
        decode_utf8(&bytes, path)
    }
}

fn decode_utf8(bytes: &[u8], path: &Path) -> Result<String> {
    let (text, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        return Err(ProcessingError::InvalidFormat(format!(
            "{} is not valid UTF-8",
            path.display()
        )));
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_bom_is_removed() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"\xEF\xBB\xBFname,lat\n")?;
        file.write_all("Đà Lạt,11.94\n".as_bytes())?;

        for use_mmap in [false, true] {
            let text = read_utf8_file(file.path(), use_mmap)?;
            assert!(text.starts_with("name,lat"));
            assert!(text.contains("Đà Lạt"));
        }
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(&[0x66, 0xFF, 0xFE, 0x0A])?;
        assert!(read_utf8_file(file.path(), false).is_err());
        Ok(())
    }

    #[test]
    fn test_empty_file_with_mmap() -> Result<()> {
        let file = NamedTempFile::new()?;
        assert_eq!(read_utf8_file(file.path(), true)?, "");
        Ok(())
    }
}
