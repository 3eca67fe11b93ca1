// SD card file operations.
// All app data lives in one directory on the card root; names are 8.3.
// Every call opens volume -> root -> dir -> file and closes on return,
// so the card can be pulled between calls without losing a write.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;
use embedded_sdmmc::{Mode, VolumeIdx};

use crate::drivers::sdcard::SdStorage;

// all app data lives under this directory on the SD root
pub const APP_DIR: &str = "_SURVEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    NoCard,
    NotFound,
    OpenDir,
    OpenFile,
    MakeDir,
    Seek,
    Read,
    Write,
    Flush,
    ReadOnly,
}

impl StorageError {
    pub const fn as_str(self) -> &'static str {
        match self {
            StorageError::NoCard => "open volume failed",
            StorageError::NotFound => "not found",
            StorageError::OpenDir => "open dir failed",
            StorageError::OpenFile => "open file failed",
            StorageError::MakeDir => "make dir failed",
            StorageError::Seek => "seek failed",
            StorageError::Read => "read failed",
            StorageError::Write => "write failed",
            StorageError::Flush => "flush failed",
            StorageError::ReadOnly => "read-only mode",
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File access inside the app directory. The SD card implements it;
/// tests use an in-memory store.
pub trait FileStore {
    fn is_present(&self) -> bool;
    fn ensure_app_dir(&self) -> Result<(), StorageError>;
    fn exists(&self, name: &str) -> Result<bool, StorageError>;
    fn append(&self, name: &str, data: &[u8]) -> Result<(), StorageError>;
    fn write(&self, name: &str, data: &[u8]) -> Result<(), StorageError>;
    fn read_chunk(&self, name: &str, offset: u32, buf: &mut [u8]) -> Result<usize, StorageError>;
}

fn not_found_or<E>(e: embedded_sdmmc::Error<E>, other: StorageError) -> StorageError
where
    E: fmt::Debug,
{
    match e {
        embedded_sdmmc::Error::NotFound => StorageError::NotFound,
        _ => other,
    }
}

// open volume → root → subdir, execute body with the subdir handle
macro_rules! with_subdir {
    ($sd:expr, $dir:expr, |$sub:ident| $body:expr) => {{
        let volume = $sd
            .volume_mgr
            .open_volume(VolumeIdx(0))
            .map_err(|_| StorageError::NoCard)?;
        let root = volume.open_root_dir().map_err(|_| StorageError::OpenDir)?;
        let $sub = root
            .open_dir($dir)
            .map_err(|e| not_found_or(e, StorageError::OpenDir))?;
        $body
    }};
}

// create dir in root if it doesn't already exist
pub fn ensure_dir<SPI, DELAY>(sd: &SdStorage<SPI, DELAY>, name: &str) -> Result<(), StorageError>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    let volume = sd
        .volume_mgr
        .open_volume(VolumeIdx(0))
        .map_err(|_| StorageError::NoCard)?;
    let root = volume.open_root_dir().map_err(|_| StorageError::OpenDir)?;

    // already exists; done
    if root.open_dir(name).is_ok() {
        return Ok(());
    }

    root.make_dir_in_dir(name)
        .map_err(|_| StorageError::MakeDir)?;

    Ok(())
}

pub fn file_exists_in_dir<SPI, DELAY>(
    sd: &SdStorage<SPI, DELAY>,
    dir: &str,
    name: &str,
) -> Result<bool, StorageError>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    with_subdir!(sd, dir, |sub| {
        match sub.open_file_in_dir(name, Mode::ReadOnly) {
            Ok(_) => Ok(true),
            Err(embedded_sdmmc::Error::NotFound) => Ok(false),
            Err(_) => Err(StorageError::OpenFile),
        }
    })
}

// write (create-or-truncate) file inside a subdirectory of root
pub fn write_file_in_dir<SPI, DELAY>(
    sd: &SdStorage<SPI, DELAY>,
    dir: &str,
    name: &str,
    data: &[u8],
) -> Result<(), StorageError>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    with_subdir!(sd, dir, |sub| {
        let file = sub
            .open_file_in_dir(name, Mode::ReadWriteCreateOrTruncate)
            .map_err(|_| StorageError::OpenFile)?;
        if !data.is_empty() {
            file.write(data).map_err(|_| StorageError::Write)?;
        }
        file.flush().map_err(|_| StorageError::Flush)?;
        Ok(())
    })
}

// append to file (or create) inside a subdirectory of root
pub fn append_file_in_dir<SPI, DELAY>(
    sd: &SdStorage<SPI, DELAY>,
    dir: &str,
    name: &str,
    data: &[u8],
) -> Result<(), StorageError>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    with_subdir!(sd, dir, |sub| {
        let file = sub
            .open_file_in_dir(name, Mode::ReadWriteCreateOrAppend)
            .map_err(|_| StorageError::OpenFile)?;
        if !data.is_empty() {
            file.write(data).map_err(|_| StorageError::Write)?;
        }
        file.flush().map_err(|_| StorageError::Flush)?;
        Ok(())
    })
}

// read chunk from file in subdir at offset
pub fn read_file_chunk_in_dir<SPI, DELAY>(
    sd: &SdStorage<SPI, DELAY>,
    dir: &str,
    name: &str,
    offset: u32,
    buf: &mut [u8],
) -> Result<usize, StorageError>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    with_subdir!(sd, dir, |sub| {
        let file = sub
            .open_file_in_dir(name, Mode::ReadOnly)
            .map_err(|e| not_found_or(e, StorageError::OpenFile))?;
        file.seek_from_start(offset)
            .map_err(|_| StorageError::Seek)?;
        let mut total = 0;
        while !file.is_eof() && total < buf.len() {
            let n = file
                .read(&mut buf[total..])
                .map_err(|_| StorageError::Read)?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    })
}

impl<SPI, DELAY> FileStore for SdStorage<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    fn is_present(&self) -> bool {
        SdStorage::is_present(self)
    }

    fn ensure_app_dir(&self) -> Result<(), StorageError> {
        ensure_dir(self, APP_DIR)
    }

    fn exists(&self, name: &str) -> Result<bool, StorageError> {
        match file_exists_in_dir(self, APP_DIR, name) {
            Err(StorageError::NotFound) => Ok(false),
            other => other,
        }
    }

    fn append(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        append_file_in_dir(self, APP_DIR, name, data)
    }

    fn write(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        write_file_in_dir(self, APP_DIR, name, data)
    }

    fn read_chunk(&self, name: &str, offset: u32, buf: &mut [u8]) -> Result<usize, StorageError> {
        read_file_chunk_in_dir(self, APP_DIR, name, offset, buf)
    }
}

// in-memory FileStore for host tests
#[cfg(test)]
pub(crate) mod mem {
    use core::cell::{Cell, RefCell};
    use std::string::{String, ToString};
    use std::vec::Vec;

    use super::{FileStore, StorageError};

    #[derive(Default)]
    pub struct MemStore {
        files: RefCell<Vec<(String, Vec<u8>)>>,
        pub fail_writes: Cell<bool>,
        pub absent: Cell<bool>,
        pub dir_made: Cell<bool>,
    }

    impl MemStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(self, name: &str, data: &[u8]) -> Self {
            self.files
                .borrow_mut()
                .push((name.to_string(), data.to_vec()));
            self
        }

        pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
            self.files
                .borrow()
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, d)| d.clone())
        }

        fn check(&self) -> Result<(), StorageError> {
            if self.absent.get() {
                Err(StorageError::NoCard)
            } else {
                Ok(())
            }
        }
    }

    impl FileStore for MemStore {
        fn is_present(&self) -> bool {
            !self.absent.get()
        }

        fn ensure_app_dir(&self) -> Result<(), StorageError> {
            self.check()?;
            self.dir_made.set(true);
            Ok(())
        }

        fn exists(&self, name: &str) -> Result<bool, StorageError> {
            self.check()?;
            Ok(self.contents(name).is_some())
        }

        fn append(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
            self.check()?;
            if self.fail_writes.get() {
                return Err(StorageError::Write);
            }
            let mut files = self.files.borrow_mut();
            match files.iter_mut().find(|(n, _)| n == name) {
                Some((_, d)) => d.extend_from_slice(data),
                None => files.push((name.to_string(), data.to_vec())),
            }
            Ok(())
        }

        fn write(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
            self.check()?;
            if self.fail_writes.get() {
                return Err(StorageError::Write);
            }
            let mut files = self.files.borrow_mut();
            files.retain(|(n, _)| n != name);
            files.push((name.to_string(), data.to_vec()));
            Ok(())
        }

        fn read_chunk(
            &self,
            name: &str,
            offset: u32,
            buf: &mut [u8],
        ) -> Result<usize, StorageError> {
            self.check()?;
            let data = self.contents(name).ok_or(StorageError::NotFound)?;
            let start = (offset as usize).min(data.len());
            let n = (data.len() - start).min(buf.len());
            buf[..n].copy_from_slice(&data[start..start + n]);
            Ok(n)
        }
    }
}
