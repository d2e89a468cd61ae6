//! Pure Rust physics backend
//!
//! [`SoftwareBackend`] keeps every native object in a `SlotMap` and
//! implements enough of a physics engine for the shape pipeline to run end
//! to end: cooking with the usual result codes, geometry validation and
//! world bounds. It never simulates.
//!
//! Cooked meshes use a small binary stream:
//!
//! ```text
//! "CKMS" | version u8 | kind u8 | point count u32 LE | index count u32 LE
//! points [f32; 3] * n | indices u32 * m
//! ```

use colliderkit_core::{
    ActorHandle, EntityId, FilterData, HeightFieldData, HeightFieldHandle, MaterialHandle, MeshHandle, MeshKind,
    PhysicsMaterial, ShapeHandle,
};
use colliderkit_math::{Aabb, Pose, Vec3};
use slotmap::SlotMap;

use crate::backend::{
    CookingParams, Cooked, ConvexCookingResult, DynamicProperties, Geometry, PhysicsBackend, ShapeFlags,
    TriangleCookingResult,
};

const COOKED_MAGIC: &[u8; 4] = b"CKMS";
const COOKED_VERSION: u8 = 1;
const COOKED_HEADER_LEN: usize = 4 + 1 + 1 + 4 + 4;

/// Distance below which points are treated as coincident
const DEGENERATE_EPSILON: f32 = 1e-6;

fn kind_byte(kind: MeshKind) -> u8 {
    match kind {
        MeshKind::Convex => 0,
        MeshKind::Triangle => 1,
    }
}

/// Serialize mesh data into the cooked stream
fn encode_cooked(kind: MeshKind, points: &[Vec3], indices: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(COOKED_HEADER_LEN + points.len() * 12 + indices.len() * 4);
    out.extend_from_slice(COOKED_MAGIC);
    out.push(COOKED_VERSION);
    out.push(kind_byte(kind));
    out.extend_from_slice(&(points.len() as u32).to_le_bytes());
    out.extend_from_slice(&(indices.len() as u32).to_le_bytes());
    out.extend_from_slice(bytemuck::cast_slice(points));
    out.extend_from_slice(bytemuck::cast_slice(indices));
    out
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let word: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(word))
}

/// Parse a cooked stream, checking it holds a mesh of `kind`
fn decode_cooked(bytes: &[u8], kind: MeshKind) -> Option<MeshRecord> {
    if bytes.len() < COOKED_HEADER_LEN || &bytes[..4] != COOKED_MAGIC {
        return None;
    }
    if bytes[4] != COOKED_VERSION || bytes[5] != kind_byte(kind) {
        return None;
    }

    let point_count = read_u32(bytes, 6)? as usize;
    let index_count = read_u32(bytes, 10)? as usize;
    let points_end = COOKED_HEADER_LEN + point_count * std::mem::size_of::<Vec3>();
    let indices_end = points_end + index_count * std::mem::size_of::<u32>();
    if bytes.len() != indices_end {
        return None;
    }

    let points: Vec<Vec3> = bytemuck::pod_collect_to_vec(&bytes[COOKED_HEADER_LEN..points_end]);
    let indices: Vec<u32> = bytemuck::pod_collect_to_vec(&bytes[points_end..indices_end]);
    if indices.iter().any(|&i| i as usize >= points.len()) {
        return None;
    }

    Some(MeshRecord { kind, points, indices })
}

/// Whether the points span a volume
fn spans_volume(points: &[Vec3]) -> bool {
    let Some(&origin) = points.first() else {
        return false;
    };
    let Some(&p1) = points.iter().find(|p| p.distance(origin) > DEGENERATE_EPSILON) else {
        return false;
    };
    let edge = p1 - origin;
    let Some(normal) = points
        .iter()
        .map(|p| edge.cross(*p - origin))
        .find(|n| n.length() > DEGENERATE_EPSILON)
    else {
        return false;
    };
    let normal = normal.normalize();
    points.iter().any(|p| normal.dot(*p - origin).abs() > DEGENERATE_EPSILON)
}

struct MeshRecord {
    kind: MeshKind,
    points: Vec<Vec3>,
    indices: Vec<u32>,
}

/// Shape state held by the software backend
#[derive(Clone, Debug)]
pub struct SoftwareShape {
    pub geometry: Geometry,
    pub materials: Vec<MaterialHandle>,
    pub exclusive: bool,
    pub simulation_filter: FilterData,
    pub query_filter: FilterData,
    pub flags: ShapeFlags,
    pub local_pose: Pose,
    pub name: String,
    pub rest_offset: f32,
    pub contact_offset: f32,
    pub actor: Option<ActorHandle>,
}

/// Actor state held by the software backend
#[derive(Clone, Debug)]
pub struct SoftwareActor {
    pub pose: Pose,
    pub entity: EntityId,
    pub name: String,
    /// `None` for static actors
    pub dynamics: Option<DynamicProperties>,
    pub shapes: Vec<ShapeHandle>,
}

/// In-memory backend used by tests and the demo binary
pub struct SoftwareBackend {
    params: CookingParams,
    materials: SlotMap<MaterialHandle, PhysicsMaterial>,
    meshes: SlotMap<MeshHandle, MeshRecord>,
    height_fields: SlotMap<HeightFieldHandle, HeightFieldData>,
    shapes: SlotMap<ShapeHandle, SoftwareShape>,
    actors: SlotMap<ActorHandle, SoftwareActor>,
    meshes_created: usize,
    refuse_creation: bool,
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareBackend {
    /// Create a backend with default cooking limits
    pub fn new() -> Self {
        Self::with_params(CookingParams::default())
    }

    /// Create a backend with custom cooking limits
    pub fn with_params(params: CookingParams) -> Self {
        Self {
            params,
            materials: SlotMap::with_key(),
            meshes: SlotMap::with_key(),
            height_fields: SlotMap::with_key(),
            shapes: SlotMap::with_key(),
            actors: SlotMap::with_key(),
            meshes_created: 0,
            refuse_creation: false,
        }
    }

    /// Make every subsequent shape, mesh and actor creation fail
    pub fn set_refuse_creation(&mut self, refuse: bool) {
        self.refuse_creation = refuse;
    }

    /// Number of meshes created over the backend's life
    pub fn meshes_created(&self) -> usize {
        self.meshes_created
    }

    /// Number of live meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of live height fields
    pub fn height_field_count(&self) -> usize {
        self.height_fields.len()
    }

    /// Number of live shapes
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Number of live actors
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Inspect a shape
    pub fn shape(&self, shape: ShapeHandle) -> Option<&SoftwareShape> {
        self.shapes.get(shape)
    }

    /// Inspect an actor
    pub fn actor(&self, actor: ActorHandle) -> Option<&SoftwareActor> {
        self.actors.get(actor)
    }

    fn local_bounds(&self, geometry: &Geometry) -> Option<Aabb> {
        match *geometry {
            Geometry::Sphere { radius } => Some(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(radius))),
            Geometry::Box { half_extents } => Some(Aabb::from_center_half_extents(Vec3::ZERO, half_extents)),
            Geometry::Capsule { radius, half_height } => Some(Aabb::from_center_half_extents(
                Vec3::ZERO,
                Vec3::new(half_height + radius, radius, radius),
            )),
            Geometry::ConvexMesh { mesh, scale } | Geometry::TriangleMesh { mesh, scale } => {
                let record = self.meshes.get(mesh)?;
                Some(Aabb::from_points(record.points.iter().map(|p| scale.apply(*p))))
            }
            Geometry::HeightField {
                field,
                height_scale,
                row_scale,
                column_scale,
            } => {
                let data = self.height_fields.get(field)?;
                let (low, high) = data.height_range()?;
                // Rows run along x, columns along z, heights along y
                Some(Aabb::new(
                    Vec3::new(0.0, f32::from(low) * height_scale, 0.0),
                    Vec3::new(
                        (data.rows - 1) as f32 * row_scale,
                        f32::from(high) * height_scale,
                        (data.columns - 1) as f32 * column_scale,
                    ),
                ))
            }
        }
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

impl PhysicsBackend for SoftwareBackend {
    fn cooking_params(&self) -> CookingParams {
        self.params
    }

    fn create_material(&mut self, material: &PhysicsMaterial) -> Option<MaterialHandle> {
        Some(self.materials.insert(*material))
    }

    fn material(&self, handle: MaterialHandle) -> Option<PhysicsMaterial> {
        self.materials.get(handle).copied()
    }

    fn cook_convex_mesh(&mut self, points: &[Vec3]) -> Cooked<ConvexCookingResult> {
        let result = if points.iter().any(|p| !p.is_finite()) {
            ConvexCookingResult::Failure
        } else if points.len() < 4 || !spans_volume(points) {
            ConvexCookingResult::ZeroAreaTestFailed
        } else if points.len() > self.params.max_convex_vertices as usize {
            ConvexCookingResult::PolygonsLimitReached
        } else {
            ConvexCookingResult::Success
        };

        let data = match result {
            ConvexCookingResult::Success => encode_cooked(MeshKind::Convex, points, &[]),
            _ => Vec::new(),
        };
        Cooked { result, data }
    }

    fn cook_triangle_mesh(&mut self, points: &[Vec3], indices: &[u32]) -> Cooked<TriangleCookingResult> {
        let failed = Cooked {
            result: TriangleCookingResult::Failure,
            data: Vec::new(),
        };
        if points.is_empty() || indices.is_empty() || indices.len() % 3 != 0 {
            return failed;
        }
        if points.iter().any(|p| !p.is_finite()) || indices.iter().any(|&i| i as usize >= points.len()) {
            return failed;
        }

        let max_edge = self.params.max_triangle_edge;
        let too_large = indices.chunks_exact(3).any(|tri| {
            let a = points[tri[0] as usize];
            let b = points[tri[1] as usize];
            let c = points[tri[2] as usize];
            a.distance(b) > max_edge || b.distance(c) > max_edge || c.distance(a) > max_edge
        });
        if too_large {
            return Cooked {
                result: TriangleCookingResult::LargeTriangle,
                data: Vec::new(),
            };
        }

        Cooked {
            result: TriangleCookingResult::Success,
            data: encode_cooked(MeshKind::Triangle, points, indices),
        }
    }

    fn create_mesh(&mut self, cooked: &[u8], kind: MeshKind) -> Option<MeshHandle> {
        if self.refuse_creation {
            return None;
        }
        let record = decode_cooked(cooked, kind)?;
        self.meshes_created += 1;
        Some(self.meshes.insert(record))
    }

    fn mesh_kind(&self, mesh: MeshHandle) -> Option<MeshKind> {
        self.meshes.get(mesh).map(|m| m.kind)
    }

    fn release_mesh(&mut self, mesh: MeshHandle) {
        self.meshes.remove(mesh);
    }

    fn create_height_field(&mut self, data: &HeightFieldData) -> Option<HeightFieldHandle> {
        if self.refuse_creation || !data.is_valid() {
            return None;
        }
        Some(self.height_fields.insert(data.clone()))
    }

    fn release_height_field(&mut self, field: HeightFieldHandle) {
        self.height_fields.remove(field);
    }

    fn is_geometry_valid(&self, geometry: &Geometry) -> bool {
        match *geometry {
            Geometry::Sphere { radius } => positive(radius),
            Geometry::Box { half_extents } => half_extents.to_array().into_iter().all(positive),
            Geometry::Capsule { radius, half_height } => positive(radius) && positive(half_height),
            Geometry::ConvexMesh { mesh, scale } => {
                self.mesh_kind(mesh) == Some(MeshKind::Convex) && scale.scale.to_array().into_iter().all(positive)
            }
            Geometry::TriangleMesh { mesh, scale } => {
                self.mesh_kind(mesh) == Some(MeshKind::Triangle) && scale.scale.to_array().into_iter().all(positive)
            }
            Geometry::HeightField {
                field,
                height_scale,
                row_scale,
                column_scale,
            } => {
                self.height_fields.contains_key(field)
                    && positive(height_scale)
                    && positive(row_scale)
                    && positive(column_scale)
            }
        }
    }

    fn geometry_world_bounds(&self, geometry: &Geometry, pose: &Pose, inflation: f32) -> Option<Aabb> {
        let local = self.local_bounds(geometry)?;
        Some(local.transformed(pose).inflated(inflation))
    }

    fn create_shape(&mut self, geometry: &Geometry, materials: &[MaterialHandle], exclusive: bool) -> Option<ShapeHandle> {
        if self.refuse_creation || materials.is_empty() || !self.is_geometry_valid(geometry) {
            return None;
        }
        if materials.iter().any(|m| !self.materials.contains_key(*m)) {
            return None;
        }

        Some(self.shapes.insert(SoftwareShape {
            geometry: *geometry,
            materials: materials.to_vec(),
            exclusive,
            simulation_filter: FilterData::default(),
            query_filter: FilterData::default(),
            flags: ShapeFlags::default(),
            local_pose: Pose::IDENTITY,
            name: String::new(),
            rest_offset: 0.0,
            contact_offset: 0.02,
            actor: None,
        }))
    }

    fn shape_geometry(&self, shape: ShapeHandle) -> Option<Geometry> {
        self.shapes.get(shape).map(|s| s.geometry)
    }

    fn shape_materials(&self, shape: ShapeHandle) -> Option<Vec<MaterialHandle>> {
        self.shapes.get(shape).map(|s| s.materials.clone())
    }

    fn set_simulation_filter_data(&mut self, shape: ShapeHandle, filter: FilterData) {
        if let Some(s) = self.shapes.get_mut(shape) {
            s.simulation_filter = filter;
        }
    }

    fn simulation_filter_data(&self, shape: ShapeHandle) -> Option<FilterData> {
        self.shapes.get(shape).map(|s| s.simulation_filter)
    }

    fn set_query_filter_data(&mut self, shape: ShapeHandle, filter: FilterData) {
        if let Some(s) = self.shapes.get_mut(shape) {
            s.query_filter = filter;
        }
    }

    fn query_filter_data(&self, shape: ShapeHandle) -> Option<FilterData> {
        self.shapes.get(shape).map(|s| s.query_filter)
    }

    fn set_shape_flags(&mut self, shape: ShapeHandle, flags: ShapeFlags) {
        if let Some(s) = self.shapes.get_mut(shape) {
            s.flags = flags;
        }
    }

    fn shape_flags(&self, shape: ShapeHandle) -> Option<ShapeFlags> {
        self.shapes.get(shape).map(|s| s.flags)
    }

    fn set_contact_offsets(&mut self, shape: ShapeHandle, rest_offset: f32, contact_offset: f32) {
        if let Some(s) = self.shapes.get_mut(shape) {
            s.rest_offset = rest_offset;
            s.contact_offset = contact_offset;
        }
    }

    fn local_pose(&self, shape: ShapeHandle) -> Option<Pose> {
        self.shapes.get(shape).map(|s| s.local_pose)
    }

    fn set_local_pose(&mut self, shape: ShapeHandle, pose: Pose) {
        if let Some(s) = self.shapes.get_mut(shape) {
            s.local_pose = pose;
        }
    }

    fn set_shape_name(&mut self, shape: ShapeHandle, name: &str) {
        if let Some(s) = self.shapes.get_mut(shape) {
            s.name = name.to_string();
        }
    }

    fn shape_name(&self, shape: ShapeHandle) -> Option<String> {
        self.shapes.get(shape).map(|s| s.name.clone())
    }

    fn release_shape(&mut self, shape: ShapeHandle) {
        if let Some(removed) = self.shapes.remove(shape) {
            if let Some(actor) = removed.actor.and_then(|a| self.actors.get_mut(a)) {
                actor.shapes.retain(|s| *s != shape);
            }
        }
    }

    fn create_static_actor(&mut self, pose: Pose, entity: EntityId, name: &str) -> Option<ActorHandle> {
        if self.refuse_creation || !pose.is_finite() {
            return None;
        }
        Some(self.actors.insert(SoftwareActor {
            pose,
            entity,
            name: name.to_string(),
            dynamics: None,
            shapes: Vec::new(),
        }))
    }

    fn create_dynamic_actor(
        &mut self,
        pose: Pose,
        entity: EntityId,
        name: &str,
        properties: &DynamicProperties,
    ) -> Option<ActorHandle> {
        if self.refuse_creation || !pose.is_finite() || !positive(properties.mass) {
            return None;
        }
        Some(self.actors.insert(SoftwareActor {
            pose,
            entity,
            name: name.to_string(),
            dynamics: Some(*properties),
            shapes: Vec::new(),
        }))
    }

    fn attach_shape(&mut self, actor: ActorHandle, shape: ShapeHandle) -> bool {
        let Some(record) = self.shapes.get_mut(shape) else {
            return false;
        };
        if record.actor.is_some() || !self.actors.contains_key(actor) {
            return false;
        }
        // Triangle meshes and height fields cannot be simulated on dynamic actors
        let is_dynamic = self.actors.get(actor).is_some_and(|a| a.dynamics.is_some_and(|d| !d.kinematic));
        let static_only = matches!(
            record.geometry,
            Geometry::TriangleMesh { .. } | Geometry::HeightField { .. }
        );
        if is_dynamic && static_only && record.flags.contains(ShapeFlags::SIMULATION_SHAPE) {
            return false;
        }

        record.actor = Some(actor);
        if let Some(a) = self.actors.get_mut(actor) {
            a.shapes.push(shape);
        }
        true
    }

    fn actor_pose(&self, actor: ActorHandle) -> Option<Pose> {
        self.actors.get(actor).map(|a| a.pose)
    }

    fn actor_shapes(&self, actor: ActorHandle) -> Vec<ShapeHandle> {
        self.actors.get(actor).map(|a| a.shapes.clone()).unwrap_or_default()
    }

    fn release_actor(&mut self, actor: ActorHandle) {
        if let Some(removed) = self.actors.remove(actor) {
            for shape in removed.shapes {
                self.shapes.remove(shape);
            }
        }
    }
}
