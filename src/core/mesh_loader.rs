// Copyright @yucwang 2026

use std::path::Path;

use wavefront_obj::mtl::Material;

use super::error::LoadError;
use super::indexing::{ build_indexed_buffers, BoundingStats, MeshBuffers, NormalSource };
use super::vertex::Vertex;
use crate::io::obj_utils::{ self, ObjData };
use crate::math::constants::{ Float, Vector2f, Vector3f };

/// Which normal feeds the published vertices.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NormalMode {
    /// Smooth shading: normalized sum of the normals around each position.
    Vertex,
    /// Flat shading: the plane normal of each triangle.
    Face,
}

impl Default for NormalMode {
    fn default() -> Self {
        NormalMode::Vertex
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fan-split polygons from their first corner before parsing. When off,
    /// polygons are still triangulated by `wavefront_obj`, fanned from the
    /// last corner instead.
    pub triangulate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { triangulate: true }
    }
}

/// Loads an OBJ mesh and keeps it as an indexed, deduplicated vertex buffer.
///
/// Raw positions, triangle corners, face normals and accumulated vertex
/// normals are cached so that `set_normal_mode` only reruns the indexing pass.
/// Slices handed out by the accessors are replaced wholesale by every
/// `load*` or effective `set_normal_mode` call.
#[derive(Default)]
pub struct MeshLoader {
    raw_positions: Vec<Vector3f>,
    raw_indices: Vec<u32>,
    corner_texcoords: Vec<Vector2f>,
    face_normals: Vec<Vector3f>,
    vertex_normals: Vec<Vector3f>,

    buffers: MeshBuffers,
    bounds: BoundingStats,

    materials: Vec<Material>,
    face_material_ids: Vec<Option<usize>>,
    warnings: Vec<String>,

    mode: NormalMode,
}

impl MeshLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path` with polygon triangulation enabled.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        self.load_with_options(path, &LoadOptions::default())
    }

    pub fn load_with_options<P: AsRef<Path>>(&mut self, path: P, options: &LoadOptions) -> Result<(), LoadError> {
        self.reset();
        let data = obj_utils::read_obj_data_from_file(path.as_ref(), options.triangulate)
            .map_err(|err| {
                log::error!("Failed to load {}: {}.", path.as_ref().display(), err);
                LoadError::from(err)
            })?;
        self.ingest(data)
    }

    /// Loads OBJ text held in memory. Material libraries are not resolved.
    pub fn load_from_str(&mut self, input: &str, options: &LoadOptions) -> Result<(), LoadError> {
        self.reset();
        let data = obj_utils::read_obj_data(input, None, options.triangulate)?;
        self.ingest(data)
    }

    pub fn normal_mode(&self) -> NormalMode {
        self.mode
    }

    /// Switches the normal source and rebuilds the vertex/index buffers.
    /// Bounds are left untouched.
    pub fn set_normal_mode(&mut self, mode: NormalMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if !self.raw_indices.is_empty() {
            log::debug!("Rebuilding vertex buffer for {:?} normals.", mode);
            self.rebuild_vertices();
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.buffers.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.buffers.indices
    }

    pub fn buffers(&self) -> &MeshBuffers {
        &self.buffers
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Material of each triangle, in the order of `indices` triples.
    pub fn material_ids_per_face(&self) -> &[Option<usize>] {
        &self.face_material_ids
    }

    pub fn center(&self) -> Vector3f {
        self.bounds.center
    }

    pub fn max_extent(&self) -> Float {
        self.bounds.max_extent
    }

    pub fn bounding_stats(&self) -> &BoundingStats {
        &self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.face_normals.len()
    }

    pub fn raw_positions(&self) -> &[Vector3f] {
        &self.raw_positions
    }

    pub fn face_normals(&self) -> &[Vector3f] {
        &self.face_normals
    }

    pub fn vertex_normals(&self) -> &[Vector3f] {
        &self.vertex_normals
    }

    /// Non-fatal parser messages from the last load.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    fn reset(&mut self) {
        let mode = self.mode;
        *self = Self::default();
        self.mode = mode;
    }

    fn ingest(&mut self, data: ObjData) -> Result<(), LoadError> {
        let ObjData { positions, normals, texcoords, triangles, materials, warnings } = data;

        let corner_count = triangles.len() * 3;
        let mut raw_indices = Vec::with_capacity(corner_count);
        let mut corner_texcoords = Vec::with_capacity(corner_count);
        let mut face_normals = Vec::with_capacity(triangles.len());
        let mut face_material_ids = Vec::with_capacity(triangles.len());
        let mut vertex_normals = vec![Vector3f::zeros(); positions.len()];
        let mut referenced = vec![false; positions.len()];

        for triangle in &triangles {
            let [c0, c1, c2] = triangle.corners;
            let p0 = positions[c0.position as usize];
            let p1 = positions[c1.position as usize];
            let p2 = positions[c2.position as usize];
            // Zero-area triangles normalize to NaN and are kept that way.
            let face_normal = (p1 - p0).cross(&(p2 - p0)).normalize();
            face_normals.push(face_normal);
            face_material_ids.push(triangle.material_id);

            for corner in &triangle.corners {
                let vid = corner.position as usize;
                raw_indices.push(corner.position);
                corner_texcoords.push(corner.texcoord.map_or_else(Vector2f::zeros, |t| texcoords[t]));

                vertex_normals[vid] += match corner.normal {
                    Some(n) => normals[n],
                    None => face_normal,
                };
                referenced[vid] = true;
            }
        }

        // Unreferenced positions keep a zero normal.
        for (n, used) in vertex_normals.iter_mut().zip(referenced.iter()) {
            if *used {
                *n = n.normalize();
            }
        }

        self.raw_positions = positions;
        self.raw_indices = raw_indices;
        self.corner_texcoords = corner_texcoords;
        self.face_normals = face_normals;
        self.vertex_normals = vertex_normals;
        self.materials = materials;
        self.face_material_ids = face_material_ids;
        self.warnings = warnings;

        self.rebuild_vertices();

        match BoundingStats::from_vertices(&self.buffers.vertices) {
            Ok(bounds) => self.bounds = bounds,
            Err(err) => {
                log::error!("Mesh has no triangles.");
                self.reset();
                return Err(err);
            }
        }

        log::info!("Mesh loaded, {} triangles, {} unique vertices, max extent = {}.",
                   self.triangle_count(), self.buffers.vertices.len(), self.bounds.max_extent);
        Ok(())
    }

    fn rebuild_vertices(&mut self) {
        let normals = match self.mode {
            NormalMode::Face => NormalSource::PerFace(&self.face_normals),
            NormalMode::Vertex => NormalSource::PerVertex(&self.vertex_normals),
        };
        self.buffers = build_indexed_buffers(&self.raw_positions, &self.raw_indices,
                                             normals, &self.corner_texcoords);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use std::path::PathBuf;

    const TRIANGLE: &str = "\
v 0.0 0.0 0.0
v 2.0 0.0 0.0
v 0.0 1.0 0.5
vn 0.0 0.0 1.0
vn 0.0 0.0 1.0
vn 0.0 0.0 1.0
f 1//1 2//2 3//3
";

    const CUBE: &str = "\
v -1.0 -1.0 -1.0
v  1.0 -1.0 -1.0
v  1.0  1.0 -1.0
v -1.0  1.0 -1.0
v -1.0 -1.0  1.0
v  1.0 -1.0  1.0
v  1.0  1.0  1.0
v -1.0  1.0  1.0
f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 4 7 3
f 4 8 7
f 1 5 8
f 1 8 4
f 2 3 7
f 2 7 6
";

    fn load_str(input: &str) -> MeshLoader {
        let mut loader = MeshLoader::new();
        loader.load_from_str(input, &LoadOptions::default()).expect("failed to load mesh");
        loader
    }

    fn write_fixture(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("objmesh_loader_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn assert_valid_buffers(loader: &MeshLoader) {
        let count = loader.vertices().len() as u32;
        assert_eq!(loader.indices().len() % 3, 0);
        assert!(loader.indices().iter().all(|&i| i < count));

        let unique: HashSet<Vertex> = loader.vertices().iter().cloned().collect();
        assert_eq!(unique.len(), loader.vertices().len());
    }

    #[test]
    fn test_single_triangle() {
        let loader = load_str(TRIANGLE);
        assert_eq!(loader.vertices().len(), 3);
        assert_eq!(loader.indices(), &[0, 1, 2]);
        assert_eq!(loader.max_extent(), 2.0);
        assert_eq!(loader.center(), Vector3f::new(1.0, 0.5, 0.25));
        assert_eq!(loader.vertices()[1].normal, Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(loader.vertices()[2].texcoord, Vector2f::zeros());
        assert_valid_buffers(&loader);
    }

    #[test]
    fn test_cube_modes() {
        let mut loader = load_str(CUBE);
        assert_eq!(loader.normal_mode(), NormalMode::Vertex);
        assert_eq!(loader.vertices().len(), 8);
        assert_eq!(loader.triangle_count(), 12);
        assert_eq!(loader.indices().len(), 36);
        assert_valid_buffers(&loader);
        for n in loader.vertex_normals() {
            assert!((n.norm() - 1.0).abs() < 1e-5);
        }

        loader.set_normal_mode(NormalMode::Face);
        assert_eq!(loader.normal_mode(), NormalMode::Face);
        // Each corner of a cube touches three faces, each split in two triangles.
        assert_eq!(loader.vertices().len(), 24);
        assert_eq!(loader.indices().len(), 36);
        assert_valid_buffers(&loader);
    }

    #[test]
    fn test_face_normals_follow_winding() {
        let loader = load_str(CUBE);
        let bottom = loader.face_normals()[0];
        assert!((bottom - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-6);
        let top = loader.face_normals()[2];
        assert!((top - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_mode_round_trip_and_bounds() {
        let mut loader = load_str(CUBE);
        let fresh = loader.buffers().clone();
        let bounds = *loader.bounding_stats();

        loader.set_normal_mode(NormalMode::Face);
        assert_eq!(*loader.bounding_stats(), bounds);
        loader.set_normal_mode(NormalMode::Face);
        loader.set_normal_mode(NormalMode::Vertex);

        assert_eq!(*loader.buffers(), fresh);
        assert_eq!(*loader.bounding_stats(), bounds);
        assert_eq!(loader.center(), Vector3f::zeros());
        assert_eq!(loader.max_extent(), 2.0);
    }

    #[test]
    fn test_loading_is_deterministic() {
        for mode in [NormalMode::Vertex, NormalMode::Face].iter() {
            let mut a = MeshLoader::new();
            a.set_normal_mode(*mode);
            a.load_from_str(CUBE, &LoadOptions::default()).unwrap();
            let mut b = MeshLoader::new();
            b.set_normal_mode(*mode);
            b.load_from_str(CUBE, &LoadOptions::default()).unwrap();
            assert_eq!(a.buffers(), b.buffers());
        }
    }

    #[test]
    fn test_explicit_normals_override_face_normal() {
        let input = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
v 1.0 1.0 0.0
vn 1.0 0.0 0.0
f 1//1 2//1 3//1
f 2 4 3
";
        let loader = load_str(input);
        assert_eq!(loader.vertex_normals()[0], Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(loader.vertex_normals()[3], Vector3f::new(0.0, 0.0, 1.0));
        assert_eq!(loader.face_normals()[0], Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_unreferenced_position_keeps_zero_normal() {
        let input = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
v 9.0 9.0 9.0
f 1 2 3
";
        let loader = load_str(input);
        assert_eq!(loader.raw_positions().len(), 4);
        assert_eq!(loader.vertex_normals()[3], Vector3f::zeros());
        // Bounds come from the published vertices only.
        assert_eq!(loader.max_extent(), 1.0);
    }

    #[test]
    fn test_degenerate_triangle_is_accepted() {
        let input = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 2.0 0.0 0.0
f 1 2 3
";
        let mut loader = load_str(input);
        assert!(loader.face_normals()[0].iter().any(|c| c.is_nan()));

        loader.set_normal_mode(NormalMode::Face);
        assert_eq!(loader.vertices().len(), 3);
        assert_eq!(loader.indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_quad_triangulation_and_texcoords() {
        let input = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1 2/2 3/3 4/4
";
        let loader = load_str(input);
        assert_eq!(loader.triangle_count(), 2);
        assert_eq!(loader.vertices().len(), 4);
        assert_eq!(loader.indices(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(loader.vertices()[2].texcoord, Vector2f::new(1.0, 1.0));
        assert_eq!(loader.material_ids_per_face(), &[None, None]);
    }

    #[test]
    fn test_untriangulated_quad_fans_from_last_corner() {
        let input = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3 4
";
        let mut loader = MeshLoader::new();
        loader.load_from_str(input, &LoadOptions { triangulate: false }).unwrap();
        assert_eq!(loader.triangle_count(), 2);
        assert_eq!(loader.indices(), &[0, 1, 2, 1, 3, 2]);
        assert_eq!(loader.vertices()[2].position, Vector3f::new(0.0, 1.0, 0.0));
        assert_valid_buffers(&loader);
    }

    #[test]
    fn test_missing_file_fails_and_clears_state() {
        let mut loader = load_str(CUBE);
        let err = loader.load("/nonexistent/objmesh/missing.obj").unwrap_err();
        match err {
            LoadError::ParseFailed(_) => {}
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(loader.vertices().is_empty());
        assert!(loader.indices().is_empty());
        assert_eq!(loader.triangle_count(), 0);
    }

    #[test]
    fn test_malformed_input_fails() {
        let mut loader = MeshLoader::new();
        let result = loader.load_from_str("v 0.0 zero 0.0\nf 1 2 3\n", &LoadOptions::default());
        assert!(matches!(result, Err(LoadError::ParseFailed(_))));
        assert!(loader.vertices().is_empty());
    }

    #[test]
    fn test_mesh_without_faces_is_empty() {
        let mut loader = MeshLoader::new();
        let result = loader.load_from_str("v 0.0 0.0 0.0\nv 1.0 0.0 0.0\n", &LoadOptions::default());
        assert_eq!(result, Err(LoadError::EmptyMesh));
        assert!(loader.raw_positions().is_empty());
        assert_eq!(loader.max_extent(), 1.0);
    }

    #[test]
    fn test_load_from_file_with_materials() {
        write_fixture("cube.mtl", "\
newmtl grey
Ns 10.0
Ka 0.0 0.0 0.0
Kd 0.5 0.5 0.5
Ks 0.0 0.0 0.0
Ni 1.0
d 1.0
illum 2
");
        let mut obj = String::from("mtllib cube.mtl\nusemtl grey\n");
        obj.push_str(CUBE);
        let path = write_fixture("cube.obj", &obj);

        let mut loader = MeshLoader::new();
        loader.load(&path).expect("failed to load cube");
        assert_eq!(loader.materials().len(), 1);
        assert_eq!(loader.material_ids_per_face().len(), 12);
        assert!(loader.material_ids_per_face().iter().all(|id| *id == Some(0)));
        assert!(loader.warnings().is_empty());

        let mut again = MeshLoader::new();
        again.load(&path).unwrap();
        assert_eq!(loader.buffers(), again.buffers());
    }

    #[test]
    fn test_mode_persists_across_loads() {
        let mut loader = MeshLoader::new();
        loader.set_normal_mode(NormalMode::Face);
        assert!(loader.vertices().is_empty());

        loader.load_from_str(CUBE, &LoadOptions::default()).unwrap();
        assert_eq!(loader.normal_mode(), NormalMode::Face);
        assert_eq!(loader.vertices().len(), 24);
    }
}
