// Copyright @yucwang 2026

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use wavefront_obj::{mtl, obj, ParseError};

use crate::math::constants::{ Vector2f, Vector3f };

#[derive(Debug)]
pub enum ObjLoadError {
    Io(std::io::Error),
    Parse(ParseError),
    InvalidIndex { kind: &'static str, index: usize, count: usize },
    TooManyIndices { kind: &'static str, count: usize },
}

impl From<std::io::Error> for ObjLoadError {
    fn from(err: std::io::Error) -> Self {
        ObjLoadError::Io(err)
    }
}

impl From<ParseError> for ObjLoadError {
    fn from(err: ParseError) -> Self {
        ObjLoadError::Parse(err)
    }
}

impl fmt::Display for ObjLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjLoadError::Io(err) => write!(f, "io error: {}", err),
            ObjLoadError::Parse(err) => write!(f, "parse error: {}", err),
            ObjLoadError::InvalidIndex { kind, index, count } => {
                write!(f, "{} index {} out of range (object has {})", kind, index, count)
            }
            ObjLoadError::TooManyIndices { kind, count } => {
                write!(f, "{} count {} does not fit 32-bit indices", kind, count)
            }
        }
    }
}

impl std::error::Error for ObjLoadError {}

/// One triangle corner. `position` is a global id into `ObjData::positions`,
/// the optional ids index `texcoords` / `normals`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ObjCorner {
    pub position: u32,
    pub texcoord: Option<usize>,
    pub normal: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjTriangle {
    pub corners: [ObjCorner; 3],
    pub material_id: Option<usize>,
}

/// Flattened content of an OBJ file: attribute pools shared by all objects,
/// triangles with corners in file order and the materials of the `mtllib`
/// when it could be read.
#[derive(Default)]
pub struct ObjData {
    pub positions: Vec<Vector3f>,
    pub normals: Vec<Vector3f>,
    pub texcoords: Vec<Vector2f>,
    pub triangles: Vec<ObjTriangle>,
    pub materials: Vec<mtl::Material>,
    pub warnings: Vec<String>,
}

impl ObjData {
    fn warn(&mut self, message: String) {
        log::warn!("[obj] {}", message);
        self.warnings.push(message);
    }
}

pub fn load_obj_from_str<S: AsRef<str>>(input: S) -> Result<obj::ObjSet, ParseError> {
    let triangulated = triangulate_faces(input.as_ref());
    obj::parse(triangulated)
}

/// Reads an OBJ file and its material libraries (looked up next to the file).
pub fn read_obj_data_from_file<P: AsRef<Path>>(path: P, triangulate: bool) -> Result<ObjData, ObjLoadError> {
    let path = path.as_ref();
    log::info!("Starting reading OBJ mesh from: {}.", path.display());

    let data = fs::read_to_string(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    read_obj_data(&data, Some(base_dir), triangulate)
}

/// Parses OBJ text. Without `base_dir` no material library is opened and the
/// `mtllib` statement only produces a warning.
///
/// `wavefront_obj` splits polygons itself, fanning from the last corner, so
/// `triangulate` only selects our first-corner fan split instead of that one.
pub fn read_obj_data(input: &str, base_dir: Option<&Path>, triangulate: bool) -> Result<ObjData, ObjLoadError> {
    let mut obj_set = if triangulate {
        load_obj_from_str(input)?
    } else {
        obj::parse(input.to_string())?
    };

    let mut data = ObjData::default();
    if let Some(library) = obj_set.material_library.take() {
        load_material_library(&mut data, &library, base_dir);
    }
    flatten_obj_set(&mut data, obj_set, leading_material(input))?;

    Ok(data)
}

/// Last `usemtl` before the first face. The parser files it under an empty
/// object that it drops when the statement precedes the vertex block.
fn leading_material(input: &str) -> Option<String> {
    let mut material = None;
    for line in input.lines() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("f") => break,
            Some("usemtl") => material = parts.next().map(String::from),
            _ => {}
        }
    }
    material
}

fn load_material_library(data: &mut ObjData, library: &str, base_dir: Option<&Path>) {
    let base_dir = match base_dir {
        Some(dir) => dir,
        None => {
            data.warn(format!("material library {} ignored: no search directory", library));
            return;
        }
    };

    let path = base_dir.join(library);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) => {
            data.warn(format!("cannot read material library {}: {}", path.display(), err));
            return;
        }
    };

    match mtl::parse(text) {
        Ok(mtl_set) => {
            log::info!("Loaded {} materials from {}.", mtl_set.materials.len(), path.display());
            data.materials.extend(mtl_set.materials);
        }
        Err(err) => data.warn(format!("cannot parse material library {}: {}", path.display(), err)),
    }
}

struct IndexBase {
    position: usize,
    texcoord: usize,
    normal: usize,
}

fn flatten_obj_set(data: &mut ObjData,
                   obj_set: obj::ObjSet,
                   leading_material: Option<String>) -> Result<(), ObjLoadError> {
    let mut material_ids: HashMap<String, usize> = HashMap::new();
    for (id, material) in data.materials.iter().enumerate() {
        material_ids.entry(material.name.clone()).or_insert(id);
    }
    let mut unknown_materials: HashSet<String> = HashSet::new();
    let mut skipped_primitives = 0usize;
    // A material stays active until the next `usemtl`, across objects too.
    let mut active_material = leading_material;

    for object in obj_set.objects {
        // Face indices are local to their object.
        let base = IndexBase {
            position: data.positions.len(),
            texcoord: data.texcoords.len(),
            normal: data.normals.len(),
        };

        for v in object.vertices {
            data.positions.push(Vector3f::new(v.x as f32, v.y as f32, v.z as f32));
        }
        for vn in object.normals {
            data.normals.push(Vector3f::new(vn.x as f32, vn.y as f32, vn.z as f32));
        }
        for vt in object.tex_vertices {
            data.texcoords.push(Vector2f::new(vt.u as f32, vt.v as f32));
        }

        for geom in object.geometry {
            if geom.material_name.is_some() {
                active_material = geom.material_name.clone();
            }
            let material_id = match &active_material {
                Some(name) => {
                    let id = material_ids.get(name).copied();
                    if id.is_none() && unknown_materials.insert(name.clone()) {
                        data.warn(format!("material {} is not defined by any material library", name));
                    }
                    id
                }
                None => None,
            };

            for shape in geom.shapes {
                if let obj::Primitive::Triangle(a, b, c) = shape.primitive {
                    // The parser emits `f 1 2 3` as (3, 1, 2); shift back to file order.
                    let corners = [
                        rebase_corner(data, &base, b)?,
                        rebase_corner(data, &base, c)?,
                        rebase_corner(data, &base, a)?,
                    ];
                    data.triangles.push(ObjTriangle { corners, material_id });
                    index_count(data.triangles.len() * 3, "corner")?;
                } else {
                    skipped_primitives += 1;
                }
            }
        }
    }

    if skipped_primitives > 0 {
        data.warn(format!("skipped {} point/line primitives", skipped_primitives));
    }

    Ok(())
}

fn rebase_corner(data: &ObjData,
                 base: &IndexBase,
                 (v, t, n): (usize, Option<usize>, Option<usize>)) -> Result<ObjCorner, ObjLoadError> {
    let position = rebase(base.position + v, data.positions.len(), "position")?;
    let position = index_count(position, "position")?;
    let texcoord = t.map(|t| rebase(base.texcoord + t, data.texcoords.len(), "texcoord")).transpose()?;
    let normal = n.map(|n| rebase(base.normal + n, data.normals.len(), "normal")).transpose()?;

    Ok(ObjCorner { position, texcoord, normal })
}

/// Indices are published as `u32`; larger counts are rejected up front.
fn index_count(count: usize, kind: &'static str) -> Result<u32, ObjLoadError> {
    u32::try_from(count).map_err(|_| ObjLoadError::TooManyIndices { kind, count })
}

fn rebase(index: usize, count: usize, kind: &'static str) -> Result<usize, ObjLoadError> {
    if index < count {
        Ok(index)
    } else {
        Err(ObjLoadError::InvalidIndex { kind, index, count })
    }
}

/// Fan-splits every polygon face with more than three corners.
fn triangulate_faces(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 4);
    for line in input.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("f ") || trimmed.starts_with("f\t") {
            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            if parts.len() > 4 {
                let base = parts[1];
                for i in 2..(parts.len() - 1) {
                    out.push_str("f ");
                    out.push_str(base);
                    out.push(' ');
                    out.push_str(parts[i]);
                    out.push(' ');
                    out.push_str(parts[i + 1]);
                    out.push('\n');
                }
                continue;
            }
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
