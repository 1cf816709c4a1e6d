//! Minimal OBJ parser supporting positions, normals and texture coordinates.
//!
//! Only triangular faces written as `f p/t/n p/t/n p/t/n` are understood.
//! The output is not indexed: every face-vertex becomes its own entry.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use glam::{Vec2, Vec3};

use crate::{
    error::{IndexKind, ObjError, PreconditionFailure},
    model::Model,
};

type Result<T> = std::result::Result<T, ObjError>;

/// Load an OBJ model from a file path.
///
/// The path must end in `.obj` and point at an existing file; both are
/// checked before the file is opened.
pub fn load_obj_model(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    check_path(path)?;

    let file = File::open(path)?;
    let model = load_obj_from_reader(BufReader::new(file))?;
    log::debug!(
        "Loaded {}: {} triangles",
        path.display(),
        model.triangle_count()
    );
    Ok(model)
}

/// Load an OBJ model from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<Model> {
    let (tables, faces) = read_lines(reader)?;
    resolve(&tables, &faces)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<Model> {
    load_obj_from_reader(io::Cursor::new(contents))
}

fn check_path(path: &Path) -> Result<()> {
    let has_obj_ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
    if !has_obj_ext {
        return Err(ObjError::precondition(
            path,
            PreconditionFailure::MissingExtension,
        ));
    }
    if !path.exists() {
        return Err(ObjError::precondition(path, PreconditionFailure::NotFound));
    }
    if !path.is_file() {
        return Err(ObjError::precondition(path, PreconditionFailure::NotAFile));
    }
    Ok(())
}

/// Attribute tables in file order. OBJ indices into them are 1-based.
#[derive(Debug, Default)]
struct RawAttributeTables {
    positions: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    normals: Vec<Vec3>,
}

/// One vertex of a face as written: 1-based position/uv/normal indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FaceVertex {
    position: i64,
    texcoord: i64,
    normal: i64,
}

/// A triangular face plus the line it came from, for error reporting.
#[derive(Clone, Copy, Debug)]
struct FaceIndexTriple {
    line: usize,
    corners: [FaceVertex; 3],
}

fn read_lines<R: BufRead>(reader: R) -> Result<(RawAttributeTables, Vec<FaceIndexTriple>)> {
    let mut tables = RawAttributeTables::default();
    let mut faces = Vec::new();

    for (line_no, raw) in reader.split(b'\n').enumerate() {
        let raw = raw?;
        let line_no = line_no + 1;
        // Comments are skipped before decoding; exporters write them in any encoding.
        let raw = raw.trim_ascii();
        if raw.is_empty() || raw.starts_with(b"#") {
            continue;
        }
        let trimmed = std::str::from_utf8(raw)
            .map_err(|_| format_error(line_no, "line", &String::from_utf8_lossy(raw)))?;

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                tables.positions.push(Vec3::new(x, y, z));
            }
            "vt" => {
                // V is kept as written; no vertical flip.
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = parse_f32(parts.next(), line_no, "v coordinate")?;
                tables.texcoords.push(Vec2::new(u, v));
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                tables.normals.push(Vec3::new(nx, ny, nz));
            }
            "f" => faces.push(parse_face(parts, line_no)?),
            _ => {
                // Ignore other directives (o/g/s/usemtl/mtllib/etc.)
            }
        }
    }

    Ok((tables, faces))
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &'static str) -> Result<f32> {
    let token = value.ok_or_else(|| format_error(line_no, what, ""))?;
    token
        .parse::<f32>()
        .map_err(|_| format_error(line_no, what, token))
}

fn parse_face<'a>(
    mut parts: impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<FaceIndexTriple> {
    let mut corners = [FaceVertex {
        position: 0,
        texcoord: 0,
        normal: 0,
    }; 3];

    for (slot, corner) in corners.iter_mut().enumerate() {
        let token = parts.next().ok_or_else(|| ObjError::IndexOutOfRange {
            line: line_no,
            kind: IndexKind::FaceVertex,
            index: slot as i64 + 1,
            len: slot,
        })?;
        *corner = parse_face_vertex(token, line_no)?;
    }
    // Anything after the third descriptor is ignored.

    Ok(FaceIndexTriple {
        line: line_no,
        corners,
    })
}

fn parse_face_vertex(token: &str, line_no: usize) -> Result<FaceVertex> {
    let mut split = token.split('/');
    let mut next_index = |what: &'static str| -> Result<i64> {
        let part = split
            .next()
            .ok_or_else(|| format_error(line_no, what, token))?;
        part.parse::<i64>()
            .map_err(|_| format_error(line_no, what, token))
    };

    Ok(FaceVertex {
        position: next_index("position index")?,
        texcoord: next_index("texture coordinate index")?,
        normal: next_index("normal index")?,
    })
}

fn format_error(line: usize, what: &'static str, token: &str) -> ObjError {
    ObjError::Format {
        line,
        what,
        token: token.to_owned(),
    }
}

fn resolve(tables: &RawAttributeTables, faces: &[FaceIndexTriple]) -> Result<Model> {
    let count = faces.len() * 3;
    let mut vertices = Vec::with_capacity(count);
    let mut uvs = Vec::with_capacity(count);
    let mut normals = Vec::with_capacity(count);

    for face in faces {
        for corner in &face.corners {
            vertices.push(lookup(
                &tables.positions,
                corner.position,
                IndexKind::Position,
                face.line,
            )?);
            uvs.push(lookup(
                &tables.texcoords,
                corner.texcoord,
                IndexKind::TexCoord,
                face.line,
            )?);
            normals.push(lookup(
                &tables.normals,
                corner.normal,
                IndexKind::Normal,
                face.line,
            )?);
        }
    }

    log::debug!(
        "OBJ: {} positions, {} uvs, {} normals, {} faces",
        tables.positions.len(),
        tables.texcoords.len(),
        tables.normals.len(),
        faces.len()
    );

    Ok(Model::new(vertices, uvs, normals))
}

fn lookup<T: Copy>(table: &[T], index: i64, kind: IndexKind, line: usize) -> Result<T> {
    let out_of_range = || ObjError::IndexOutOfRange {
        line,
        kind,
        index,
        len: table.len(),
    };
    index
        .checked_sub(1)
        .and_then(|slot| usize::try_from(slot).ok())
        .and_then(|slot| table.get(slot).copied())
        .ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{vec2, vec3};

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\nf 1/1/1 2/2/2 3/3/3\n";

    #[test]
    fn parse_simple_triangle() {
        let model = load_obj_from_str(TRIANGLE).expect("parse triangle");
        assert_eq!(
            model.vertices,
            vec![vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0)]
        );
        assert_eq!(
            model.uvs,
            vec![vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(0.0, 1.0)]
        );
        assert_eq!(model.normals, vec![Vec3::Z; 3]);
        assert!(model.indices.is_empty());
        assert!(model.is_consistent());
    }

    #[test]
    fn faces_expand_in_file_order_without_dedup() {
        let src = r#"
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 1.0 1.0 0.0
            v 0.0 1.0 0.0
            vt 0.0 0.0
            vt 1.0 1.0
            vn 0.0 0.0 1.0
            vn 0.0 1.0 0.0
            f 1/1/1 2/1/1 3/2/1
            f 1/1/2 3/2/2 4/2/2
        "#;
        let model = load_obj_from_str(src).expect("parse quad");
        assert_eq!(model.vertex_count(), 6);
        assert_eq!(model.triangle_count(), 2);
        // Vertex 1 is referenced twice and appears twice.
        assert_eq!(model.vertices[0], model.vertices[3]);
        assert_eq!(model.vertices[5], vec3(0.0, 1.0, 0.0));
        assert_eq!(model.uvs[2], vec2(1.0, 1.0));
        assert_eq!(&model.normals[..3], &[Vec3::Z; 3]);
        assert_eq!(&model.normals[3..], &[Vec3::Y; 3]);
    }

    #[test]
    fn comments_blank_lines_and_unknown_tags_are_skipped() {
        let src = format!("# header\n\nmtllib scene.mtl\no Tri\ns off\n{TRIANGLE}\n# trailing\n");
        let model = load_obj_from_str(&src).expect("parse");
        assert_eq!(model.vertex_count(), 3);
    }

    #[test]
    fn latin1_comment_does_not_fail_the_load() {
        let src: &[u8] = b"# made by caf\xe9 exporter\nv 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/1\n";
        let model = load_obj_from_reader(io::Cursor::new(src)).expect("parse");
        assert_eq!(model.vertex_count(), 3);
    }

    #[test]
    fn non_utf8_data_line_is_format_error() {
        let src: &[u8] = b"v 0 0 0\no caf\xe9\n";
        let err = load_obj_from_reader(io::Cursor::new(src)).unwrap_err();
        assert!(matches!(err, ObjError::Format { line: 2, what: "line", .. }), "{err:?}");
    }

    #[test]
    fn crlf_line_endings_are_accepted() {
        let src = TRIANGLE.replace('\n', "\r\n");
        let model = load_obj_from_str(&src).expect("parse");
        assert_eq!(model.triangle_count(), 1);
    }

    #[test]
    fn texcoord_index_past_table_end_is_out_of_range() {
        let src = TRIANGLE.replace("f 1/1/1 2/2/2 3/3/3", "f 1/1/1 2/5/2 3/3/3");
        let err = load_obj_from_str(&src).unwrap_err();
        assert!(
            matches!(
                err,
                ObjError::IndexOutOfRange {
                    line: 10,
                    kind: IndexKind::TexCoord,
                    index: 5,
                    len: 3,
                }
            ),
            "{err:?}"
        );
    }

    #[test]
    fn texcoords_are_not_flipped() {
        let src = "v 0 0 0\nvt 0.25 0.75\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/1\n";
        let model = load_obj_from_str(src).expect("parse");
        assert_eq!(model.uvs[0], vec2(0.25, 0.75));
    }

    #[test]
    fn extra_descriptors_are_ignored() {
        let src = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1 1/1/1 1/1/1\n";
        let model = load_obj_from_str(src).expect("parse");
        assert_eq!(model.triangle_count(), 1);
    }

    #[test]
    fn empty_input_yields_empty_model() {
        let model = load_obj_from_str("# nothing here\n").expect("parse");
        assert!(model.is_empty());
        assert!(model.is_consistent());
    }

    #[test]
    fn malformed_number_is_format_error() {
        let err = load_obj_from_str("v 0 zero 0\n").unwrap_err();
        match err {
            ObjError::Format { line, what, token } => {
                assert_eq!(line, 1);
                assert_eq!(what, "y coordinate");
                assert_eq!(token, "zero");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_coordinate_is_format_error() {
        let err = load_obj_from_str("vn 0 1\n").unwrap_err();
        assert!(matches!(err, ObjError::Format { line: 1, .. }));
    }

    #[test]
    fn incomplete_descriptor_is_format_error() {
        let src = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1 1/1/1 1/1/1\n";
        let err = load_obj_from_str(src).unwrap_err();
        assert!(matches!(err, ObjError::Format { line: 4, .. }));

        let err = load_obj_from_str("f 1//1 1/1/1 1/1/1\n").unwrap_err();
        assert!(matches!(err, ObjError::Format { .. }));
    }

    #[test]
    fn short_face_is_index_out_of_range() {
        let src = "v 0 0 0\nvt 0 0\nvn 0 0 1\nf 1/1/1 1/1/1\n";
        let err = load_obj_from_str(src).unwrap_err();
        match err {
            ObjError::IndexOutOfRange { line, kind, len, .. } => {
                assert_eq!(line, 4);
                assert_eq!(kind, IndexKind::FaceVertex);
                assert_eq!(len, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn index_past_table_end_is_out_of_range() {
        let src = TRIANGLE.replace("f 1/1/1 2/2/2 3/3/3", "f 1/1/1 2/2/2 3/3/4");
        let err = load_obj_from_str(&src).unwrap_err();
        match err {
            ObjError::IndexOutOfRange {
                line,
                kind,
                index,
                len,
            } => {
                assert_eq!(line, 10);
                assert_eq!(kind, IndexKind::Normal);
                assert_eq!(index, 4);
                assert_eq!(len, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_and_negative_indices_are_out_of_range() {
        for face in ["f 0/1/1 1/1/1 1/1/1", "f -1/1/1 1/1/1 1/1/1"] {
            let src = format!("v 0 0 0\nvt 0 0\nvn 0 0 1\n{face}\n");
            let err = load_obj_from_str(&src).unwrap_err();
            assert!(
                matches!(
                    err,
                    ObjError::IndexOutOfRange {
                        kind: IndexKind::Position,
                        ..
                    }
                ),
                "{face}: {err:?}"
            );
        }
    }

    #[test]
    fn faces_may_reference_later_attributes() {
        let src = "f 1/1/1 1/1/1 1/1/1\nv 1 2 3\nvt 0.5 0.5\nvn 1 0 0\n";
        let model = load_obj_from_str(src).expect("parse");
        assert_eq!(model.vertices, vec![vec3(1.0, 2.0, 3.0); 3]);
    }
}
