//! Hemispherical skydome mesh generation.
//!
//! Stands in for an external model loader: the renderer consumes only the
//! raw-byte contract (`vertex_bytes` / `index_bytes` / counts, 32-bit
//! indices), so a file-backed dome could replace this module without
//! touching GPU code. Triangles are wound clockwise as seen from inside the
//! dome, which is where the camera sits; the renderer culls the outside.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex layout of the dome contract: position, normal, UV. Must match the
/// renderer's vertex buffer layout (32-byte stride).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DomeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Dome tessellation parameters.
#[derive(Debug, Clone)]
pub struct DomeConfig {
    /// Dome radius in world units.
    pub radius: f32,
    /// Longitudinal segments.
    pub segments: u32,
    /// Latitudinal rings from zenith to rim.
    pub rings: u32,
    /// How far past the horizon the rim extends, in radians. A small skirt
    /// hides the seam between dome and background at grazing view angles.
    pub skirt: f32,
}

impl Default for DomeConfig {
    fn default() -> Self {
        Self {
            radius: 100.0,
            segments: 48,
            rings: 24,
            skirt: 0.15,
        }
    }
}

/// Generated dome mesh plus the raw-byte loader contract.
#[derive(Debug, Clone)]
pub struct DomeMeshData {
    pub vertices: Vec<DomeVertex>,
    pub indices: Vec<u32>,
}

impl DomeMeshData {
    /// Tessellate a UV hemisphere per `config`.
    pub fn generate(config: &DomeConfig) -> Self {
        let segments = config.segments.max(3);
        let rings = config.rings.max(2);
        let phi_max = std::f32::consts::FRAC_PI_2 + config.skirt;

        let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        for ring in 0..=rings {
            let phi = phi_max * ring as f32 / rings as f32;
            let y = config.radius * phi.cos();
            let ring_radius = config.radius * phi.sin();

            for segment in 0..=segments {
                let theta = std::f32::consts::TAU * segment as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();

                let position = [x, y, z];
                // Camera is inside; normals face it.
                let normal = -Vec3::new(x, y, z).normalize();
                let uv = [
                    segment as f32 / segments as f32,
                    ring as f32 / rings as f32,
                ];
                vertices.push(DomeVertex {
                    position,
                    normal: normal.into(),
                    uv,
                });
            }
        }

        let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;

                // Clockwise from inside the dome.
                indices.push(current);
                indices.push(current + 1);
                indices.push(next);

                indices.push(current + 1);
                indices.push(next + 1);
                indices.push(next);
            }
        }

        Self { vertices, indices }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Number of 32-bit indices.
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Raw vertex bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes (u32, little-endian) for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dome() -> DomeMeshData {
        DomeMeshData::generate(&DomeConfig::default())
    }

    #[test]
    fn triangulated_with_indices_in_range() {
        let mesh = dome();
        assert_eq!(mesh.index_count() % 3, 0);
        let verts = mesh.vertex_count();
        assert!(mesh.indices.iter().all(|&i| i < verts));
    }

    #[test]
    fn positions_on_hemisphere_surface() {
        let config = DomeConfig::default();
        let mesh = DomeMeshData::generate(&config);
        let rim_y = config.radius * (std::f32::consts::FRAC_PI_2 + config.skirt).cos();
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position);
            assert!((p.length() - config.radius).abs() < 1e-3);
            assert!(p.y >= rim_y - 1e-3);
        }
    }

    /// Winding contract: every triangle reads clockwise from the camera at
    /// the origin, i.e. its geometric normal points away from the origin.
    #[test]
    fn winding_clockwise_from_inside() {
        let mesh = dome();
        for tri in mesh.indices.chunks_exact(3) {
            let a = Vec3::from_array(mesh.vertices[tri[0] as usize].position);
            let b = Vec3::from_array(mesh.vertices[tri[1] as usize].position);
            let c = Vec3::from_array(mesh.vertices[tri[2] as usize].position);
            let n = (b - a).cross(c - a);
            if n.length_squared() < 1e-6 {
                continue; // degenerate pole triangle
            }
            let centroid = (a + b + c) / 3.0;
            assert!(
                n.dot(centroid) > 0.0,
                "counter-clockwise triangle {tri:?}"
            );
        }
    }

    #[test]
    fn raw_contract_sizes_consistent() {
        let mesh = dome();
        assert_eq!(std::mem::size_of::<DomeVertex>(), 32);
        assert_eq!(
            mesh.vertex_bytes().len(),
            mesh.vertex_count() as usize * 32
        );
        assert_eq!(
            mesh.index_bytes().len(),
            mesh.index_count() as usize * std::mem::size_of::<u32>()
        );
    }

    #[test]
    fn vertex_normals_face_inward() {
        let mesh = dome();
        for v in &mesh.vertices {
            let p = Vec3::from_array(v.position);
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(n.dot(p) < 0.0);
        }
    }
}
