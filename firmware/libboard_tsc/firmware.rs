//! Microcode blobs and their download into program RAM.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::result;

use byteorder::{BigEndian, ByteOrder};
use crc::crc32;

use clock::Clock;
use hw::Hw;
use lane::LaneMask;
use sbus::{self, Bus, Transfer};
use uc::{self, UcRegs};

const MAGIC: &'static [u8; 4] = b"TSCU";
const HEADER_SIZE: usize = 12;
const TRAILER_SIZE: usize = 4;

/// Bytes per program RAM write.
pub const WORD_BYTES: usize = 16;

pub const SEARCH_DIRS: [&'static str; 3] = [
    "/lib/firmware/tsc",
    "/usr/lib/firmware/tsc",
    "/usr/local/lib/firmware/tsc",
];

#[derive(Fail, Debug, Clone, PartialEq)]
pub enum Error {
    #[fail(display = "{} not found in {:?}", name, dirs)]
    NotFound { name: String, dirs: Vec<String> },
    #[fail(display = "{}: {}", path, error)]
    Io { path: String, error: String },
    #[fail(display = "not a microcode record")]
    BadMagic,
    #[fail(display = "truncated record: {} bytes, need {}", actual, expected)]
    Truncated { actual: usize, expected: usize },
    #[fail(display = "record crc failed (actual {:08x}, expected {:08x})", actual, expected)]
    RecordCrc { actual: u32, expected: u32 },
    #[fail(display = "empty microcode")]
    Empty,
    #[fail(display = "microcode of {} bytes does not fit program RAM", _0)]
    TooLarge(usize),
}

/// A versioned microcode image. `crc` is what the microcontroller reports
/// for a correct download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub version: u16,
    pub crc:     u16,
    pub data:    Vec<u8>,
}

impl Blob {
    pub fn new(version: u16, crc: u16, data: Vec<u8>) -> result::Result<Blob, Error> {
        if data.is_empty() {
            return Err(Error::Empty)
        }
        // The CRC command takes a 16 bit length.
        if data.len() > 0xffff {
            return Err(Error::TooLarge(data.len()))
        }
        Ok(Blob { version: version, crc: crc, data: data })
    }

    pub fn len(&self) -> u16 {
        self.data.len() as u16
    }

    /// Decodes a stored record:
    /// `"TSCU"`, version, crc, length, payload, crc32 of all the preceding bytes.
    pub fn parse(record: &[u8]) -> result::Result<Blob, Error> {
        if record.len() < HEADER_SIZE + TRAILER_SIZE {
            return Err(Error::Truncated { actual: record.len(),
                                          expected: HEADER_SIZE + TRAILER_SIZE })
        }
        if &record[0..4] != &MAGIC[..] {
            return Err(Error::BadMagic)
        }
        let version = BigEndian::read_u16(&record[4..]);
        let crc = BigEndian::read_u16(&record[6..]);
        let length = BigEndian::read_u32(&record[8..]) as usize;

        let end = HEADER_SIZE + length;
        if record.len() < end + TRAILER_SIZE {
            return Err(Error::Truncated { actual: record.len(), expected: end + TRAILER_SIZE })
        }
        let expected_crc = BigEndian::read_u32(&record[end..]);
        let actual_crc = crc32::checksum_ieee(&record[..end]);
        if actual_crc != expected_crc {
            return Err(Error::RecordCrc { actual: actual_crc, expected: expected_crc })
        }

        Blob::new(version, crc, record[HEADER_SIZE..end].to_vec())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut record = vec![0; HEADER_SIZE + self.data.len() + TRAILER_SIZE];
        record[0..4].copy_from_slice(&MAGIC[..]);
        BigEndian::write_u16(&mut record[4..], self.version);
        BigEndian::write_u16(&mut record[6..], self.crc);
        BigEndian::write_u32(&mut record[8..], self.data.len() as u32);
        let end = HEADER_SIZE + self.data.len();
        record[HEADER_SIZE..end].copy_from_slice(&self.data);
        let crc = crc32::checksum_ieee(&record[..end]);
        BigEndian::write_u32(&mut record[end..], crc);
        record
    }

    pub fn read_file(path: &Path) -> result::Result<Blob, Error> {
        let io_error = |e: ::std::io::Error| {
            Error::Io { path: path.display().to_string(), error: e.to_string() }
        };
        let mut record = Vec::new();
        File::open(path).and_then(|mut f| f.read_to_end(&mut record)).map_err(io_error)?;
        Blob::parse(&record)
    }
}

/// Directories searched for microcode, most specific first.
pub fn search_dirs(firmware_dir: Option<&str>) -> Vec<PathBuf> {
    firmware_dir.into_iter()
        .chain(SEARCH_DIRS.iter().cloned())
        .map(PathBuf::from)
        .collect()
}

pub fn find(name: &str, dirs: &[PathBuf]) -> result::Result<PathBuf, Error> {
    for dir in dirs {
        let path = dir.join(name);
        if path.is_file() {
            return Ok(path)
        }
    }
    Err(Error::NotFound {
        name: name.to_owned(),
        dirs: dirs.iter().map(|d| d.display().to_string()).collect(),
    })
}

pub fn load(name: &str, dirs: &[PathBuf]) -> result::Result<Blob, Error> {
    let path = find(name, dirs)?;
    let blob = Blob::read_file(&path)?;
    info!("loaded {} version {:04x} ({} bytes)", path.display(), blob.version, blob.data.len());
    Ok(blob)
}

/// Packs bytes little endian into 32 bit words, zero padded to whole
/// 16 byte entries. Returns the words and the number of entries.
pub fn pack(data: &[u8]) -> (Vec<u32>, usize) {
    let n_entries = (data.len() + WORD_BYTES - 1) / WORD_BYTES;
    let mut words = vec![0u32; n_entries * WORD_BYTES / 4];
    for (i, &b) in data.iter().enumerate() {
        words[i / 4] |= (b as u32) << (8 * (i % 4));
    }
    (words, n_entries)
}

/// Streams `blob` into program RAM with direct memory access enabled for
/// the duration of the write.
///
/// The core must already be held in the download state; see `phy::init`.
pub fn download<B: Bus, C: Clock>(hw: &mut Hw<B, C>, blob: &Blob) -> ::Result<()> {
    let block = hw.req.target().block;
    let (words, n_entries) = pack(&blob.data);
    info!("downloading microcode version {:04x}, {} entries", blob.version, n_entries);

    hw.req.push(Transfer::write_register(block, sbus::PHY_UC_DATA_ACCESS_MODE, 1));
    hw.req.push(Transfer::write_memory(block, sbus::WC_UCMEM_DATA, words, n_entries));
    hw.req.push(Transfer::write_register(block, sbus::PHY_UC_DATA_ACCESS_MODE, 0));
    hw.flush()
}

/// Has the microcontroller checksum the downloaded image.
pub fn verify_crc<B: Bus, C: Clock>(hw: &mut Hw<B, C>, regs: &UcRegs, lanes: LaneMask,
                                    blob: &Blob) -> ::Result<()> {
    let actual = uc::compute_ucode_crc(hw, regs, lanes, blob.len())?;
    if actual != blob.crc {
        error!("uc ucode crc does not match got {:04x} != want {:04x}", actual, blob.crc);
        return Err(::Error::CrcMismatch { expected: blob.crc, actual: actual })
    }
    info!("ucode crc {:04x} ok", actual);
    Ok(())
}
