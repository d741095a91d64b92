//! Key/value configuration records.
//!
//! The image has the layout of a flash config sector: records of
//! `u32` big-endian length, key, `\0`, value, terminated by erased
//! (all ones) space. Later records shadow earlier ones and an empty value
//! removes a key.

use std::{error, fmt, str};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder};

/// Size of a config sector.
pub const DEFAULT_SIZE: usize = 0x10000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    SpaceExhausted,
    Truncated { offset: usize },
    InvalidSize { offset: usize, size: usize },
    MissingSeparator { offset: usize },
    Utf8Error(str::Utf8Error),
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &Error::SpaceExhausted =>
                write!(f, "space exhausted"),
            &Error::Truncated { offset } =>
                write!(f, "truncated record at offset {}", offset),
            &Error::InvalidSize { offset, size } =>
                write!(f, "invalid record size {} at offset {}", size, offset),
            &Error::MissingSeparator { offset } =>
                write!(f, "missing separator at offset {}", offset),
            &Error::Utf8Error(err) =>
                write!(f, "{}", err),
            &Error::Io(ref err) =>
                write!(f, "{}", err),
        }
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        "config error"
    }
}

#[derive(Clone)]
struct Iter<'a> {
    data:   &'a [u8],
    offset: usize
}

impl<'a> Iter<'a> {
    fn new(data: &'a [u8]) -> Iter<'a> {
        Iter { data: data, offset: 0 }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Result<(&'a [u8], &'a [u8]), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let data = &self.data[self.offset..];

        if data.is_empty() {
            // full image
            return None
        } else if data.len() < 4 {
            return Some(Err(Error::Truncated { offset: self.offset }))
        }

        let record_size = BigEndian::read_u32(data) as usize;
        if record_size == !0u32 as usize /* erased */ {
            return None
        } else if record_size < 4 || record_size > data.len() {
            return Some(Err(Error::InvalidSize { offset: self.offset, size: record_size }))
        }

        let record_body = &data[4..record_size];
        match record_body.iter().position(|&x| x == 0) {
            None => Some(Err(Error::MissingSeparator { offset: self.offset })),
            Some(pos) => {
                self.offset += record_size;
                let (key, zero_and_value) = record_body.split_at(pos);
                Some(Ok((key, &zero_and_value[1..])))
            }
        }
    }
}

pub struct Config {
    data: Vec<u8>,
    path: Option<PathBuf>,
}

impl Config {
    /// An erased image of `size` bytes.
    pub fn new(size: usize) -> Config {
        Config { data: vec![0xff; size], path: None }
    }

    pub fn from_image(image: &[u8]) -> Config {
        Config { data: image.to_vec(), path: None }
    }

    /// Image backed by `path`; a missing file reads as erased.
    pub fn open(path: &Path, size: usize) -> Result<Config, Error> {
        let mut config = Config::new(size);
        config.path = Some(path.to_owned());
        match File::open(path) {
            Ok(mut f) => {
                let mut image = Vec::new();
                f.read_to_end(&mut image).map_err(|e| Error::Io(e.to_string()))?;
                let n = image.len().min(size);
                config.data[..n].copy_from_slice(&image[..n]);
            }
            Err(ref e) if e.kind() == ::std::io::ErrorKind::NotFound => (),
            Err(e) => return Err(Error::Io(e.to_string()))
        }
        Ok(config)
    }

    pub fn image(&self) -> &[u8] {
        &self.data
    }

    fn save(&self) -> Result<(), Error> {
        if let Some(ref path) = self.path {
            File::create(path)
                .and_then(|mut f| f.write_all(&self.data))
                .map_err(|e| Error::Io(e.to_string()))?;
        }
        Ok(())
    }

    fn lookup(&self, key: &str) -> Result<&[u8], Error> {
        let mut iter = Iter::new(&self.data);
        let mut value = &[][..];
        while let Some(result) = iter.next() {
            let (record_key, record_value) = result?;
            if key.as_bytes() == record_key {
                // last write wins
                value = record_value
            }
        }
        Ok(value)
    }

    pub fn read<F: FnOnce(Result<&[u8], Error>) -> R, R>(&self, key: &str, f: F) -> R {
        f(self.lookup(key))
    }

    pub fn read_str<F: FnOnce(Result<&str, Error>) -> R, R>(&self, key: &str, f: F) -> R {
        self.read(key, |result| {
            f(result.and_then(|value| str::from_utf8(value).map_err(Error::Utf8Error)))
        })
    }

    /// Keys with a live value, in order of first appearance.
    pub fn keys(&self) -> Result<Vec<String>, Error> {
        let mut keys: Vec<String> = Vec::new();
        for result in Iter::new(&self.data) {
            let (key, _) = result?;
            let key = String::from_utf8_lossy(key).into_owned();
            if !keys.contains(&key) {
                keys.push(key)
            }
        }
        let mut live = Vec::new();
        for key in keys {
            if !self.lookup(&key)?.is_empty() {
                live.push(key)
            }
        }
        Ok(live)
    }

    fn append_at(data: &mut [u8], offset: usize, key: &[u8], value: &[u8]) -> Result<usize, Error> {
        let record_size = 4 + key.len() + 1 + value.len();
        if offset + record_size > data.len() {
            return Err(Error::SpaceExhausted)
        }

        let record = &mut data[offset..offset + record_size];
        BigEndian::write_u32(&mut record[..4], record_size as u32);
        record[4..4 + key.len()].copy_from_slice(key);
        record[4 + key.len()] = 0;
        record[5 + key.len()..].copy_from_slice(value);
        Ok(offset + record_size)
    }

    fn compact(&mut self) -> Result<(), Error> {
        let old_data = self.data.clone();
        for b in self.data.iter_mut() {
            *b = 0xff;
        }

        let mut offset = 0;
        let mut iter = Iter::new(&old_data);
        'iter: while let Some(result) = iter.next() {
            let (key, value) = result?;
            if value.is_empty() {
                // removed entry
                continue
            }

            let mut next_iter = iter.clone();
            while let Some(next_result) = next_iter.next() {
                let (next_key, _) = next_result?;
                if key == next_key {
                    // shadowed by a later entry
                    continue 'iter
                }
            }
            offset = Config::append_at(&mut self.data, offset, key, value)?;
        }
        debug!("config compacted to {} bytes", offset);
        Ok(())
    }

    fn append(&mut self, key: &str, value: &[u8]) -> Result<(), Error> {
        let free_offset = {
            let mut iter = Iter::new(&self.data);
            while let Some(result) = iter.next() {
                let _ = result?;
            }
            iter.offset
        };
        Config::append_at(&mut self.data, free_offset, key.as_bytes(), value)?;
        Ok(())
    }

    pub fn write(&mut self, key: &str, value: &[u8]) -> Result<(), Error> {
        match self.append(key, value) {
            Err(Error::SpaceExhausted) => {
                self.compact()?;
                self.append(key, value)?
            }
            res => res?
        }
        self.save()
    }

    pub fn write_int(&mut self, key: &str, value: u32) -> Result<(), Error> {
        self.write(key, value.to_string().as_bytes())
    }

    pub fn remove(&mut self, key: &str) -> Result<(), Error> {
        self.write(key, &[])
    }

    pub fn erase(&mut self) -> Result<(), Error> {
        for b in self.data.iter_mut() {
            *b = 0xff;
        }
        self.save()
    }
}
