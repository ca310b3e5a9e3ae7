// Product store open/append/list with file locking on the JSONL store.
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use getrandom::fill as fill_random;
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, ErrorKind};

const STORE_FILE: &str = "products.jsonl";
const PRODUCT_ID_BYTES: usize = 16;

pub const STATUS_ACTIVE: &str = "active";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub status: String,
    pub created: String,
}

#[derive(Debug)]
pub struct Catalog {
    store_path: PathBuf,
}

impl Catalog {
    /// Opens the catalog at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to create catalog directory")
                .with_path(&dir)
                .with_source(err)
        })?;
        let store_path = dir.join(STORE_FILE);
        Ok(Self { store_path })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Validates `name`, mints an id, and appends the new product record.
    ///
    /// The append happens under an exclusive file lock so concurrent writers
    /// (CLI and server) serialize on the store.
    pub fn create_product(&self, name: &str) -> Result<Product, Error> {
        let name = validate_name(name)?;
        let product = Product {
            id: generate_product_id()?,
            name: name.to_string(),
            status: STATUS_ACTIVE.to_string(),
            created: now_rfc3339()?,
        };
        let mut line = serde_json::to_vec(&product).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to encode product record")
                .with_source(err)
        })?;
        line.push(b'\n');

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.store_path)
            .map_err(|err| open_error(&self.store_path, err))?;
        let _lock = StoreLock::exclusive(&file, &self.store_path)?;
        (&file).write_all(&line).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to append product record")
                .with_path(&self.store_path)
                .with_source(err)
        })?;
        Ok(product)
    }

    /// Lists products in insertion order. A missing store file is an empty
    /// catalog, not an error.
    pub fn list_products(&self) -> Result<Vec<Product>, Error> {
        let file = match File::open(&self.store_path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(open_error(&self.store_path, err)),
        };
        let _lock = StoreLock::shared(&file, &self.store_path)?;
        let mut products = Vec::new();
        for (index, line) in BufReader::new(&file).lines().enumerate() {
            let line = line.map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read product store")
                    .with_path(&self.store_path)
                    .with_source(err)
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let product: Product = serde_json::from_str(&line).map_err(|err| {
                Error::new(ErrorKind::Corrupt)
                    .with_message(format!("invalid product record on line {}", index + 1))
                    .with_path(&self.store_path)
                    .with_source(err)
            })?;
            products.push(product);
        }
        Ok(products)
    }
}

/// Trims `name` and rejects blank values.
pub fn validate_name(name: &str) -> Result<&str, Error> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("product name must not be empty"));
    }
    Ok(trimmed)
}

struct StoreLock<'a> {
    file: &'a File,
}

impl<'a> StoreLock<'a> {
    fn exclusive(file: &'a File, path: &Path) -> Result<Self, Error> {
        file.lock_exclusive()
            .map_err(|err| lock_error(path, err))?;
        Ok(Self { file })
    }

    fn shared(file: &'a File, path: &Path) -> Result<Self, Error> {
        file.lock_shared().map_err(|err| lock_error(path, err))?;
        Ok(Self { file })
    }
}

impl<'a> Drop for StoreLock<'a> {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn lock_error(path: &Path, err: io::Error) -> Error {
    Error::new(lock_error_kind(&err))
        .with_message("failed to lock product store")
        .with_path(path)
        .with_source(err)
}

fn lock_error_kind(err: &io::Error) -> ErrorKind {
    match err.kind() {
        io::ErrorKind::WouldBlock => ErrorKind::Busy,
        io::ErrorKind::PermissionDenied => ErrorKind::Permission,
        _ => ErrorKind::Io,
    }
}

fn open_error(path: &Path, err: io::Error) -> Error {
    let kind = match err.kind() {
        io::ErrorKind::NotFound => ErrorKind::NotFound,
        io::ErrorKind::PermissionDenied => ErrorKind::Permission,
        _ => ErrorKind::Io,
    };
    Error::new(kind)
        .with_message("failed to open product store")
        .with_path(path)
        .with_source(err)
}

fn generate_product_id() -> Result<String, Error> {
    let mut bytes = [0u8; PRODUCT_ID_BYTES];
    fill_random(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Internal).with_message(format!("failed to generate product id: {err}"))
    })?;
    Ok(hex_encode(&bytes))
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(nibble_hex(byte >> 4));
        out.push(nibble_hex(byte & 0x0f));
    }
    out
}

fn nibble_hex(nibble: u8) -> char {
    match nibble {
        0..=9 => char::from(b'0' + nibble),
        _ => char::from(b'a' + (nibble - 10)),
    }
}

fn now_rfc3339() -> Result<String, Error> {
    use time::format_description::well_known::Rfc3339;
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("failed to format creation time")
                .with_source(err)
        })
}
