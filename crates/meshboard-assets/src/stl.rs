use std::collections::HashMap;

use tracing::debug;

use crate::decoder::MeshDecoder;
use crate::error::DecodeError;
use crate::mesh::DecodedMesh;

const HEADER_LEN: usize = 80;
const RECORD_LEN: usize = 50;

/// Decoder for binary and ASCII STL payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct StlDecoder;

impl MeshDecoder for StlDecoder {
    fn decode(&self, payload: &[u8]) -> Result<DecodedMesh, DecodeError> {
        decode_stl(payload)
    }
}

/// Decode an STL payload, welding identical vertices.
///
/// Binary STL is recognised by an exact length match against the triangle
/// count in its header, which is checked before the `solid` keyword since
/// some exporters write binary files whose header starts with `solid`.
pub fn decode_stl(payload: &[u8]) -> Result<DecodedMesh, DecodeError> {
    let triangles = match binary_triangle_count(payload) {
        Some(Ok(count)) => read_binary(payload, count)?,
        Some(Err(err)) if !looks_ascii(payload) => return Err(err),
        _ if looks_ascii(payload) => read_ascii(payload)?,
        _ => return Err(DecodeError::UnrecognizedFormat),
    };

    if triangles.is_empty() {
        return Err(DecodeError::NoGeometry);
    }

    let mesh = weld(&triangles)?;
    debug!(
        "Decoded STL: {} points, {} faces",
        mesh.point_count(),
        mesh.face_count()
    );
    Ok(mesh)
}

/// `None` if the payload is too short to carry a binary header.
fn binary_triangle_count(payload: &[u8]) -> Option<Result<u32, DecodeError>> {
    let count_bytes: [u8; 4] = payload.get(HEADER_LEN..HEADER_LEN + 4)?.try_into().ok()?;
    let declared = u32::from_le_bytes(count_bytes);
    let expected = (HEADER_LEN as u64 + 4) + declared as u64 * RECORD_LEN as u64;
    if expected == payload.len() as u64 {
        Some(Ok(declared))
    } else {
        Some(Err(DecodeError::LengthMismatch {
            declared,
            actual: payload.len(),
        }))
    }
}

fn looks_ascii(payload: &[u8]) -> bool {
    let start = payload
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(payload.len());
    payload[start..]
        .get(..5)
        .map(|kw| kw.eq_ignore_ascii_case(b"solid"))
        .unwrap_or(false)
}

fn read_binary(payload: &[u8], count: u32) -> Result<Vec<[[f32; 3]; 3]>, DecodeError> {
    let records = &payload[HEADER_LEN + 4..];
    let mut triangles = Vec::with_capacity(count as usize);

    for record in records.chunks_exact(RECORD_LEN) {
        // Skip the 12-byte facet normal; it is recomputed by renderers anyway.
        let mut corners = [[0.0f32; 3]; 3];
        for (v, corner) in corners.iter_mut().enumerate() {
            for (axis, value) in corner.iter_mut().enumerate() {
                let offset = 12 + v * 12 + axis * 4;
                let bytes = [
                    record[offset],
                    record[offset + 1],
                    record[offset + 2],
                    record[offset + 3],
                ];
                *value = f32::from_le_bytes(bytes);
            }
        }
        triangles.push(corners);
    }

    Ok(triangles)
}

fn read_ascii(payload: &[u8]) -> Result<Vec<[[f32; 3]; 3]>, DecodeError> {
    let text = std::str::from_utf8(payload).map_err(|_| DecodeError::UnrecognizedFormat)?;
    let mut triangles = Vec::new();
    let mut facet: Option<Vec<[f32; 3]>> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "facet" => {
                if facet.is_some() {
                    return Err(malformed(line_no, "facet opened inside another facet"));
                }
                facet = Some(Vec::with_capacity(3));
            }
            "vertex" => {
                let Some(corners) = facet.as_mut() else {
                    return Err(malformed(line_no, "vertex outside of a facet"));
                };
                let mut coords = [0.0f32; 3];
                for coord in coords.iter_mut() {
                    *coord = tokens
                        .next()
                        .ok_or_else(|| malformed(line_no, "vertex needs three coordinates"))?
                        .parse()
                        .map_err(|_| malformed(line_no, "vertex coordinate is not a number"))?;
                }
                corners.push(coords);
            }
            "endfacet" => {
                let corners = facet
                    .take()
                    .ok_or_else(|| malformed(line_no, "endfacet without facet"))?;
                let triangle: [[f32; 3]; 3] = corners
                    .try_into()
                    .map_err(|_| malformed(line_no, "facet must have exactly three vertices"))?;
                triangles.push(triangle);
            }
            _ => {}
        }
    }

    if facet.is_some() {
        return Err(malformed(text.lines().count(), "unterminated facet"));
    }

    Ok(triangles)
}

fn malformed(line: usize, reason: &str) -> DecodeError {
    DecodeError::Malformed {
        line,
        reason: reason.to_string(),
    }
}

fn weld(triangles: &[[[f32; 3]; 3]]) -> Result<DecodedMesh, DecodeError> {
    let mut lookup: HashMap<[u32; 3], u32> = HashMap::new();
    let mut positions = Vec::new();
    let mut indices = Vec::with_capacity(triangles.len() * 3);

    for (triangle_idx, triangle) in triangles.iter().enumerate() {
        for corner in triangle {
            if corner.iter().any(|c| !c.is_finite()) {
                return Err(DecodeError::NonFinite {
                    triangle: triangle_idx,
                });
            }
            // -0.0 and 0.0 are the same point.
            let key = corner.map(|c| if c == 0.0 { 0.0f32.to_bits() } else { c.to_bits() });
            let index = *lookup.entry(key).or_insert_with(|| {
                positions.push(*corner);
                (positions.len() - 1) as u32
            });
            indices.push(index);
        }
    }

    Ok(DecodedMesh { positions, indices })
}
