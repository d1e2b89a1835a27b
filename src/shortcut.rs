//! Decoder for OS shortcut (`.lnk`) files.
//!
//! Header discovery follows shortcuts to wherever a dataset actually lives,
//! so this module recovers the literal target path a shortcut encodes. Only
//! the pieces needed for that are decoded: the fixed header, the optional
//! shell-item-id list (skipped), and the file-location-info block holding
//! the base pathname.

use std::fs;
use std::path::Path;

use crate::error::{HfError, HfResult};

/// Fixed header length and the value of the leading size field.
const HEADER_LEN: usize = 0x4C;

/// Shell-link class id, bytes 4..20 of every well-formed shortcut.
const SHELL_LINK_CLSID: [u8; 16] = [
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x46,
];

/// Byte offset of the link-flags field inside the fixed header.
const FLAGS_OFFSET: usize = 20;

/// Flags bit 0: a shell-item-id list sits between header and location info.
const FLAG_HAS_ID_LIST: u32 = 0x0000_0001;

/// Offset, within the file-location-info block, of the u32 relative offset
/// of the base-pathname region.
const BASE_PATH_OFFSET_FIELD: usize = 16;

/// Decode the shortcut at `path` and return the target path it encodes.
///
/// Read-only; the file handle is released before returning. Fails with a
/// `Format` error when the file is not a shortcut or its structure is
/// internally inconsistent.
pub fn resolve_target(path: &Path) -> HfResult<String> {
    let data = fs::read(path)?;
    decode_target(&data).map_err(|detail| HfError::format(path, detail))
}

/// Pure decode over the raw bytes; errors are detail strings for the caller
/// to attach the file path to.
fn decode_target(data: &[u8]) -> Result<String, String> {
    if data.len() < HEADER_LEN {
        return Err(format!("{} bytes is too short for a shortcut", data.len()));
    }
    if read_u32(data, 0)? != HEADER_LEN as u32 {
        return Err("leading size field is not 0x4C; not a shortcut".to_owned());
    }
    if data[4..20] != SHELL_LINK_CLSID {
        return Err("shell-link class id mismatch; not a shortcut".to_owned());
    }
    let flags = read_u32(data, FLAGS_OFFSET)?;

    // The id list, when present, is prefixed by its own u16 length; both
    // must be skipped to reach the file-location-info block.
    let mut pos = HEADER_LEN;
    if flags & FLAG_HAS_ID_LIST != 0 {
        let id_list_len = read_u16(data, pos)? as usize;
        pos = pos
            .checked_add(2 + id_list_len)
            .ok_or("shell-item-id list length overflows")?;
    }

    let block_start = pos;
    let total_len = read_u32(data, block_start)? as usize;
    let block_end = block_start
        .checked_add(total_len)
        .filter(|end| *end <= data.len())
        .ok_or("file-location-info length exceeds the file")?;
    let base_offset = read_u32(data, block_start + BASE_PATH_OFFSET_FIELD)? as usize;
    let path_start = block_start
        .checked_add(base_offset)
        .ok_or("base-pathname offset overflows")?;
    // One terminator byte closes the pathname region.
    let path_end = block_end
        .checked_sub(1)
        .filter(|end| path_start <= *end)
        .ok_or("base-pathname region is outside the location-info block")?;

    reconstruct_path(&data[path_start..path_end])
}

/// Rebuild the target path from the null-delimited pathname region.
///
/// The region can hold a single local path, a network prefix plus a
/// relative tail, or a local form followed by both pieces of a UNC
/// rewrite. Empty segments are padding and dropped.
fn reconstruct_path(region: &[u8]) -> Result<String, String> {
    let mut segments = Vec::new();
    for chunk in region.split(|byte| *byte == 0) {
        if chunk.is_empty() {
            continue;
        }
        let text = std::str::from_utf8(chunk)
            .map_err(|_| "non-UTF-8 bytes in pathname region".to_owned())?;
        segments.push(text);
    }

    match segments.as_slice() {
        [] => Err("pathname region holds no path".to_owned()),
        [only] => Ok((*only).to_owned()),
        [prefix, tail] if prefix.starts_with("\\\\") => {
            Ok(format!("{}\\{}", prefix.trim_end_matches('\\'), tail))
        }
        [.., stem, tail] => Ok(format!("{}\\{}", stem.trim_end_matches('\\'), tail)),
    }
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16, String> {
    let bytes: [u8; 2] = data
        .get(offset..offset + 2)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| format!("truncated u16 at offset {offset}"))?;
    Ok(u16::from_le_bytes(bytes))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32, String> {
    let bytes: [u8; 4] = data
        .get(offset..offset + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| format!("truncated u32 at offset {offset}"))?;
    Ok(u32::from_le_bytes(bytes))
}

/// Build a shortcut byte image whose pathname region holds `segments`.
/// Shared with the discovery tests, which plant shortcuts in fixture trees.
#[cfg(test)]
pub(crate) fn build_shortcut(segments: &[&str], with_id_list: bool) -> Vec<u8> {
    let mut region = Vec::new();
    for segment in segments {
        region.extend_from_slice(segment.as_bytes());
        region.push(0);
    }

    let mut data = Vec::new();
    data.extend_from_slice(&(HEADER_LEN as u32).to_le_bytes());
    data.extend_from_slice(&SHELL_LINK_CLSID);
    let flags: u32 = if with_id_list { FLAG_HAS_ID_LIST } else { 0 };
    data.extend_from_slice(&flags.to_le_bytes());
    data.resize(HEADER_LEN, 0);

    if with_id_list {
        let id_list = [0xABu8; 10];
        data.extend_from_slice(&(id_list.len() as u16).to_le_bytes());
        data.extend_from_slice(&id_list);
    }

    // Location-info block: size, header size, flags, volume-id offset,
    // base-path offset, then the pathname region directly after.
    let base_offset = 28u32;
    let total_len = base_offset + region.len() as u32;
    data.extend_from_slice(&total_len.to_le_bytes());
    data.extend_from_slice(&28u32.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&base_offset.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&region);
    data
}
