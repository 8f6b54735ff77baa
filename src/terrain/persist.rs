//! Voxel field archives
//!
//! A field is archived with rkyv and LZ4-compressed, the same layout the
//! engine uses for chunk files, behind a small magic + version header.

use std::path::Path;

use rkyv::{Archive, Deserialize, Serialize};

use super::field::VoxelField;
use crate::core::{Error, Result};
use crate::core::types::Rgba;

/// File magic for voxel field archives
pub const MAGIC: [u8; 4] = *b"TGVF";

/// Current archive version
pub const VERSION: u32 = 1;

const HEADER_LEN: usize = MAGIC.len() + 4;

/// Serializable field data
#[derive(Archive, Deserialize, Serialize)]
pub struct FieldData {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub random_seed: u32,
    pub values: Vec<f32>,
    pub use_color: bool,
    pub color_indices: Vec<u8>,
    pub palette: Vec<Rgba>,
}

impl From<&VoxelField> for FieldData {
    fn from(field: &VoxelField) -> Self {
        Self {
            width: field.width(),
            height: field.height(),
            depth: field.depth(),
            random_seed: field.random_seed,
            values: field.values().to_vec(),
            use_color: field.use_color(),
            color_indices: field.color_indices().to_vec(),
            palette: field.palette.clone(),
        }
    }
}

impl From<FieldData> for VoxelField {
    fn from(data: FieldData) -> Self {
        VoxelField::from_parts(
            (data.width, data.height, data.depth),
            data.random_seed,
            data.values,
            data.use_color,
            data.color_indices,
            data.palette,
        )
    }
}

impl FieldData {
    /// Reject dimensions whose voxel count overflows and storage whose length
    /// does not match the dimensions.
    pub fn validate(&self) -> Result<()> {
        let (w, h, d) = (self.width, self.height, self.depth);
        if w == 0 || h == 0 || d == 0 {
            return Err(Error::Format(format!("empty field dimensions {}x{}x{}", w, h, d)));
        }
        let size = VoxelField::checked_len(w, h, d)
            .ok_or_else(|| Error::Format(format!("field dimensions {}x{}x{} overflow", w, h, d)))?;
        if self.values.len() != size {
            return Err(Error::Format(format!(
                "field {}x{}x{} holds {} values, expected {}",
                w, h, d, self.values.len(), size
            )));
        }
        if self.use_color && self.color_indices.len() != size {
            return Err(Error::Format(format!(
                "field {}x{}x{} holds {} color indices, expected {}",
                w, h, d, self.color_indices.len(), size
            )));
        }
        Ok(())
    }
}

/// Serialize field data to bytes (uncompressed, no header)
fn serialize_data(data: &FieldData) -> Result<Vec<u8>> {
    let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(data)
        .map_err(|e| Error::Format(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// Serialize a field to bytes (uncompressed, no header)
pub fn serialize_field(field: &VoxelField) -> Result<Vec<u8>> {
    serialize_data(&FieldData::from(field))
}

/// Deserialize a field from bytes produced by [`serialize_field`]
pub fn deserialize_field(data: &[u8]) -> Result<VoxelField> {
    // Decompressed buffers carry no alignment guarantee
    let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(data.len());
    aligned.extend_from_slice(data);

    let archived = rkyv::access::<ArchivedFieldData, rkyv::rancor::Error>(&aligned)
        .map_err(|e| Error::Format(e.to_string()))?;

    let field_data: FieldData = rkyv::deserialize::<FieldData, rkyv::rancor::Error>(archived)
        .map_err(|e| Error::Format(e.to_string()))?;

    field_data.validate()?;
    Ok(field_data.into())
}

/// Encode a field as header + LZ4-compressed archive
pub fn to_bytes(field: &VoxelField) -> Result<Vec<u8>> {
    encode(&FieldData::from(field))
}

fn encode(data: &FieldData) -> Result<Vec<u8>> {
    let serialized = serialize_data(data)?;
    let compressed = lz4_flex::compress_prepend_size(&serialized);

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&compressed);
    Ok(out)
}

/// Decode bytes produced by [`to_bytes`]
pub fn from_bytes(data: &[u8]) -> Result<VoxelField> {
    if data.len() < HEADER_LEN {
        return Err(Error::Format(format!("field archive too short: {} bytes", data.len())));
    }
    let (header, body) = data.split_at(HEADER_LEN);
    if header[..4] != MAGIC {
        return Err(Error::Format("bad field archive magic".to_string()));
    }
    let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if version != VERSION {
        return Err(Error::Format(format!("unsupported field archive version {}", version)));
    }

    let decompressed = lz4_flex::decompress_size_prepended(body)
        .map_err(|e| Error::Format(format!("LZ4 decompression failed: {}", e)))?;
    deserialize_field(&decompressed)
}

/// Save a field archive to disk, creating parent directories
pub fn save_field(path: &Path, field: &VoxelField) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_bytes(field)?)?;
    log::info!(
        "Saved {}x{}x{} field to {}",
        field.width(),
        field.height(),
        field.depth(),
        path.display()
    );
    Ok(())
}

/// Load a field archive from disk
pub fn load_field(path: &Path) -> Result<VoxelField> {
    let bytes = std::fs::read(path)?;
    from_bytes(&bytes)
}
