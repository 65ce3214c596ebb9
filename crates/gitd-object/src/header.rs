use crate::{ObjectError, ObjectType};

/// Parse an object header from decompressed bytes.
///
/// The header format is `"<type> <size>\0"`. Returns
/// `(type, payload_size, header_length)` where `header_length` includes the
/// null terminator.
pub fn parse_header(data: &[u8]) -> Result<(ObjectType, usize, usize), ObjectError> {
    let space_pos = data
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| ObjectError::InvalidHeader("missing space".into()))?;

    let null_pos = data[space_pos + 1..]
        .iter()
        .position(|&b| b == 0)
        .map(|p| p + space_pos + 1)
        .ok_or_else(|| ObjectError::InvalidHeader("missing null terminator".into()))?;

    let obj_type = ObjectType::from_bytes(&data[..space_pos])?;

    let size_str = std::str::from_utf8(&data[space_pos + 1..null_pos])
        .map_err(|_| ObjectError::InvalidHeader("non-ASCII size".into()))?;
    let size: usize = size_str
        .parse()
        .map_err(|_| ObjectError::InvalidHeader(format!("invalid size: {size_str}")))?;

    Ok((obj_type, size, null_pos + 1))
}

/// Write an object header: `"<type> <size>\0"`.
pub fn write_header(obj_type: ObjectType, size: usize) -> Vec<u8> {
    format!("{} {}\0", obj_type, size).into_bytes()
}
