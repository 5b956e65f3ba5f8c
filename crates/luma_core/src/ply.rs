//! Loader for the PLY mesh format (ASCII and both binary flavors).

use crate::shapes::MeshData;
use luma_math::{Vec2, Vec3};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum PlyError {
    #[error("could not open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("i/o error while reading PLY data: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed PLY header: {0}")]
    MalformedHeader(String),
    #[error("unsupported PLY feature: {0}")]
    Unsupported(String),
    #[error("face with {0} vertices (only triangles are supported)")]
    NonTriangleFace(usize),
    #[error("vertex positions (x, y, z) missing from PLY header")]
    MissingPositions,
    #[error("not enough data for the declared element counts")]
    TruncatedData,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Format {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

/// Which slot of the vertex record feeds which attribute.
#[derive(Debug, Default)]
struct VertexLayout {
    x: Option<usize>,
    y: Option<usize>,
    z: Option<usize>,
    nx: Option<usize>,
    ny: Option<usize>,
    nz: Option<usize>,
    u: Option<usize>,
    v: Option<usize>,
    property_count: usize,
}

impl VertexLayout {
    fn has_positions(&self) -> bool {
        self.x.is_some() && self.y.is_some() && self.z.is_some()
    }

    fn has_normals(&self) -> bool {
        self.nx.is_some() && self.ny.is_some() && self.nz.is_some()
    }

    fn has_texcoords(&self) -> bool {
        self.u.is_some() && self.v.is_some()
    }
}

struct Header {
    format: Format,
    vertex_count: usize,
    face_count: usize,
    layout: VertexLayout,
}

/// Loads a PLY file into raw mesh buffers.
pub fn load(path: &Path) -> Result<MeshData, PlyError> {
    let file = File::open(path).map_err(|source| PlyError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let header = parse_header(&mut reader)?;
    match header.format {
        Format::Ascii => read_ascii(&mut reader, &header),
        Format::BinaryLittleEndian => read_binary(&mut reader, &header, false),
        Format::BinaryBigEndian => read_binary(&mut reader, &header, true),
    }
}

fn parse_header<R: BufRead>(reader: &mut R) -> Result<Header, PlyError> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.trim() != "ply" {
        return Err(PlyError::MalformedHeader("missing 'ply' magic".into()));
    }

    let mut format = None;
    let mut vertex_count = None;
    let mut face_count = None;
    let mut layout = VertexLayout::default();

    // which element the upcoming property lines belong to
    enum Element {
        None,
        Vertex,
        Face,
    }
    let mut current = Element::None;

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(PlyError::MalformedHeader("unterminated header".into()));
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            [] | ["comment", ..] => continue,
            ["end_header"] => break,
            ["format", kind, "1.0"] => {
                format = Some(match *kind {
                    "ascii" => Format::Ascii,
                    "binary_little_endian" => Format::BinaryLittleEndian,
                    "binary_big_endian" => Format::BinaryBigEndian,
                    other => {
                        return Err(PlyError::Unsupported(format!("format '{other}'")));
                    }
                });
            }
            ["element", "vertex", count] => {
                current = Element::Vertex;
                vertex_count = Some(count.parse().map_err(|_| {
                    PlyError::MalformedHeader(format!("bad vertex count '{count}'"))
                })?);
            }
            ["element", "face", count] => {
                current = Element::Face;
                face_count = Some(count.parse().map_err(|_| {
                    PlyError::MalformedHeader(format!("bad face count '{count}'"))
                })?);
            }
            ["element", name, _] => {
                return Err(PlyError::Unsupported(format!("element '{name}'")));
            }
            ["property", "list", _count_type, _index_type, _name] => match current {
                Element::Face => {}
                _ => {
                    return Err(PlyError::Unsupported(
                        "list property outside face element".into(),
                    ));
                }
            },
            ["property", kind, name] => match current {
                Element::Vertex => {
                    if !matches!(*kind, "float" | "float32") {
                        return Err(PlyError::Unsupported(format!(
                            "vertex property type '{kind}'"
                        )));
                    }
                    let slot = layout.property_count;
                    layout.property_count += 1;
                    match *name {
                        "x" => layout.x = Some(slot),
                        "y" => layout.y = Some(slot),
                        "z" => layout.z = Some(slot),
                        "nx" => layout.nx = Some(slot),
                        "ny" => layout.ny = Some(slot),
                        "nz" => layout.nz = Some(slot),
                        "u" | "s" => layout.u = Some(slot),
                        "v" | "t" => layout.v = Some(slot),
                        // unknown float properties are read and discarded
                        _ => {}
                    }
                }
                _ => {
                    return Err(PlyError::Unsupported(format!(
                        "property outside vertex element: '{name}'"
                    )));
                }
            },
            _ => {
                return Err(PlyError::MalformedHeader(format!(
                    "unrecognized line '{}'",
                    line.trim()
                )));
            }
        }
    }

    let format = format.ok_or_else(|| PlyError::MalformedHeader("missing format".into()))?;
    if !layout.has_positions() {
        return Err(PlyError::MissingPositions);
    }
    Ok(Header {
        format,
        vertex_count: vertex_count.unwrap_or(0),
        face_count: face_count.unwrap_or(0),
        layout,
    })
}

fn build_mesh(
    header: &Header,
    properties: Vec<f32>,
    triangles: Vec<[u32; 3]>,
) -> Result<MeshData, PlyError> {
    let layout = &header.layout;
    let stride = layout.property_count;
    let slot = |row: usize, index: Option<usize>| properties[row * stride + index.unwrap()];

    let mut positions = Vec::with_capacity(header.vertex_count);
    let mut normals = layout.has_normals().then(Vec::new);
    let mut texcoords = layout.has_texcoords().then(Vec::new);

    for row in 0..header.vertex_count {
        positions.push(Vec3::new(
            slot(row, layout.x),
            slot(row, layout.y),
            slot(row, layout.z),
        ));
        if let Some(normals) = &mut normals {
            let n = Vec3::new(
                slot(row, layout.nx),
                slot(row, layout.ny),
                slot(row, layout.nz),
            );
            normals.push(n.normalize_or_zero());
        }
        if let Some(texcoords) = &mut texcoords {
            texcoords.push(Vec2::new(slot(row, layout.u), slot(row, layout.v)));
        }
    }

    Ok(MeshData {
        triangles,
        positions,
        normals,
        texcoords,
    })
}

fn read_ascii<R: BufRead>(reader: &mut R, header: &Header) -> Result<MeshData, PlyError> {
    let stride = header.layout.property_count;
    let mut properties = Vec::with_capacity(header.vertex_count * stride);
    let mut line = String::new();

    for _ in 0..header.vertex_count {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(PlyError::TruncatedData);
        }
        let mut count = 0;
        for token in line.split_whitespace().take(stride) {
            properties.push(token.parse::<f32>().unwrap_or(0.0));
            count += 1;
        }
        // rows may omit trailing properties; pad so indexing stays aligned
        properties.extend(std::iter::repeat(0.0).take(stride - count));
    }

    let mut triangles = Vec::with_capacity(header.face_count);
    for _ in 0..header.face_count {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(PlyError::TruncatedData);
        }
        let indices: Vec<u32> = line
            .split_whitespace()
            .filter_map(|t| t.parse().ok())
            .collect();
        let [count, rest @ ..] = indices.as_slice() else {
            return Err(PlyError::TruncatedData);
        };
        if *count != 3 || rest.len() < 3 {
            return Err(PlyError::NonTriangleFace(*count as usize));
        }
        triangles.push([rest[0], rest[1], rest[2]]);
    }

    build_mesh(header, properties, triangles)
}

fn read_binary<R: Read>(
    reader: &mut R,
    header: &Header,
    swap_endian: bool,
) -> Result<MeshData, PlyError> {
    let read_f32 = |reader: &mut R| -> Result<f32, PlyError> {
        let mut bytes = [0u8; 4];
        reader.read_exact(&mut bytes)?;
        Ok(if swap_endian {
            f32::from_be_bytes(bytes)
        } else {
            f32::from_le_bytes(bytes)
        })
    };
    let read_u32 = |reader: &mut R| -> Result<u32, PlyError> {
        let mut bytes = [0u8; 4];
        reader.read_exact(&mut bytes)?;
        Ok(if swap_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    };

    let stride = header.layout.property_count;
    let mut properties = Vec::with_capacity(header.vertex_count * stride);
    for _ in 0..header.vertex_count * stride {
        properties.push(read_f32(reader)?);
    }

    let mut triangles = Vec::with_capacity(header.face_count);
    for _ in 0..header.face_count {
        let mut count = [0u8; 1];
        reader.read_exact(&mut count)?;
        if count[0] != 3 {
            return Err(PlyError::NonTriangleFace(count[0] as usize));
        }
        triangles.push([read_u32(reader)?, read_u32(reader)?, read_u32(reader)?]);
    }

    build_mesh(header, properties, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    const ASCII_PLY: &str = "ply\n\
        format ascii 1.0\n\
        comment a single triangle\n\
        element vertex 3\n\
        property float x\n\
        property float y\n\
        property float z\n\
        property float nx\n\
        property float ny\n\
        property float nz\n\
        property float u\n\
        property float v\n\
        element face 1\n\
        property list uchar int vertex_indices\n\
        end_header\n\
        0 0 0 0 0 1 0 0\n\
        1 0 0 0 0 1 1 0\n\
        0 1 0 0 0 1 0 1\n\
        3 0 1 2\n";

    #[test]
    fn test_ascii_triangle() {
        let path = write_temp("luma_test_ascii.ply", ASCII_PLY.as_bytes());
        let mesh = load(&path).expect("valid file parses");
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
        let normals = mesh.normals.expect("normals are declared");
        assert!((normals[0] - Vec3::Z).length() < 1e-6);
        let texcoords = mesh.texcoords.expect("texcoords are declared");
        assert_eq!(texcoords[1], Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_binary_little_endian_triangle() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(
            b"ply\nformat binary_little_endian 1.0\n\
              element vertex 3\n\
              property float x\nproperty float y\nproperty float z\n\
              element face 1\n\
              property list uchar int vertex_indices\n\
              end_header\n",
        );
        for v in [
            [0.0_f32, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        ] {
            for c in v {
                bytes.extend_from_slice(&c.to_le_bytes());
            }
        }
        bytes.push(3);
        for i in [0u32, 1, 2] {
            bytes.extend_from_slice(&i.to_le_bytes());
        }

        let path = write_temp("luma_test_binary_le.ply", &bytes);
        let mesh = load(&path).expect("valid file parses");
        assert_eq!(mesh.positions[1], Vec3::X);
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
        assert!(mesh.normals.is_none());
    }

    #[test]
    fn test_binary_big_endian_vertex() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(
            b"ply\nformat binary_big_endian 1.0\n\
              element vertex 1\n\
              property float x\nproperty float y\nproperty float z\n\
              element face 0\n\
              property list uchar int vertex_indices\n\
              end_header\n",
        );
        for c in [1.5_f32, 2.5, -3.0] {
            bytes.extend_from_slice(&c.to_be_bytes());
        }
        let path = write_temp("luma_test_binary_be.ply", &bytes);
        let mesh = load(&path).expect("valid file parses");
        assert_eq!(mesh.positions[0], Vec3::new(1.5, 2.5, -3.0));
    }

    #[test]
    fn test_quad_face_is_an_error() {
        let quad = ASCII_PLY.replace("3 0 1 2", "4 0 1 2 2");
        let path = write_temp("luma_test_quad.ply", quad.as_bytes());
        assert!(matches!(load(&path), Err(PlyError::NonTriangleFace(4))));
    }

    #[test]
    fn test_missing_positions_is_an_error() {
        let bad = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float q\nend_header\n0\n";
        let path = write_temp("luma_test_nopos.ply", bad.as_bytes());
        assert!(matches!(load(&path), Err(PlyError::MissingPositions)));
    }

    #[test]
    fn test_truncated_file_is_an_error() {
        let truncated = &ASCII_PLY[..ASCII_PLY.len() - 20];
        let path = write_temp("luma_test_trunc.ply", truncated.as_bytes());
        assert!(load(&path).is_err());
    }
}
