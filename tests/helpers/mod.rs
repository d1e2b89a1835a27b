//! Shared fixture builders for the integration tests.
//!
//! Everything here produces real on-disk artifacts: shortcut byte images
//! laid out the way the decoder expects them, BrainVision-style header
//! documents, and history containers built with the same compound-file
//! implementation the patcher uses.

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use cfb::CompoundFile;

/// Shell-link class id bytes, as in every well-formed shortcut header.
const SHELL_LINK_CLSID: [u8; 16] = [
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x46,
];

/// Build a shortcut byte image whose pathname region holds `segments`.
pub fn shortcut_image(segments: &[&str], with_id_list: bool) -> Vec<u8> {
    let mut region = Vec::new();
    for segment in segments {
        region.extend_from_slice(segment.as_bytes());
        region.push(0);
    }

    let mut data = Vec::new();
    data.extend_from_slice(&0x4Cu32.to_le_bytes());
    data.extend_from_slice(&SHELL_LINK_CLSID);
    let flags: u32 = u32::from(with_id_list);
    data.extend_from_slice(&flags.to_le_bytes());
    data.resize(0x4C, 0);

    if with_id_list {
        let id_list = [0xEEu8; 14];
        data.extend_from_slice(&(id_list.len() as u16).to_le_bytes());
        data.extend_from_slice(&id_list);
    }

    let base_offset = 28u32;
    let total_len = base_offset + region.len() as u32;
    data.extend_from_slice(&total_len.to_le_bytes());
    data.extend_from_slice(&28u32.to_le_bytes());
    data.extend_from_slice(&[0u8; 8]);
    data.extend_from_slice(&base_offset.to_le_bytes());
    data.extend_from_slice(&[0u8; 8]);
    data.extend_from_slice(&region);
    data
}

/// Write a shortcut file at `path` pointing at `target`.
pub fn write_shortcut(path: &Path, target: &Path) {
    fs::create_dir_all(path.parent().expect("shortcut parent")).expect("mkdir");
    fs::write(path, shortcut_image(&[&target.to_string_lossy()], true)).expect("write shortcut");
}

/// Write a header document referencing `<name>.eeg`, plus the raw file
/// itself, into `dir`. Returns the header path.
pub fn write_dataset(dir: &Path, name: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("mkdir");
    let header = dir.join(format!("{name}.vhdr"));
    fs::write(
        &header,
        format!("[Common Infos]\nCodepage=UTF-8\nDataFile={name}.eeg\nMarkerFile={name}.vmrk\n"),
    )
    .expect("write header");
    fs::write(dir.join(format!("{name}.eeg")), b"\x00raw bytes\x00").expect("write raw");
    header
}

/// Build a history container with stale path streams and write it to
/// `dir/<name>.ehst2`. Returns the container path.
pub fn write_history(dir: &Path, name: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("mkdir");
    let mut comp = CompoundFile::create(Cursor::new(Vec::new())).expect("create container");
    for field in ["DataPath", "HeaderPath"] {
        for stream_name in [field.to_owned(), format!("{field}W")] {
            let mut stream = comp.create_stream(&stream_name).expect("create stream");
            stream
                .write_all(format!("C:\\stale\\{name}.old\0").as_bytes())
                .expect("seed stream");
        }
    }
    let mut marker = comp.create_stream("NodeData").expect("create marker stream");
    marker.write_all(b"opaque history payload").expect("seed marker");
    drop(marker);
    comp.flush().expect("flush");

    let path = dir.join(format!("{name}.ehst2"));
    fs::write(&path, comp.into_inner().into_inner()).expect("write container");
    path
}

/// Read one named stream back out of a container on disk.
pub fn read_stream(path: &Path, name: &str) -> Vec<u8> {
    let bytes = fs::read(path).expect("read container");
    let mut comp = CompoundFile::open(Cursor::new(bytes)).expect("open container");
    let mut stream = comp.open_stream(name).expect("open stream");
    let mut out = Vec::new();
    stream.read_to_end(&mut out).expect("read stream");
    out
}
