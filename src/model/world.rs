use bytemuck::{Pod, Zeroable};

pub const GRID_HALF_EXTENT: i32 = 20;
pub const GRID_STEP: usize = 1;
pub const AXIS_LENGTH: f32 = 20.0;

const GRID_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
const AXIS_X_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const AXIS_Y_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const AXIS_Z_COLOR: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(pos: [f32; 3], color: [f32; 4]) -> Self {
        Self { pos, color }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append another mesh, rebasing its indices.
    pub fn extend(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    fn push_line(&mut self, a: [f32; 3], b: [f32; 3], color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        self.vertices.push(Vertex::new(a, color));
        self.vertices.push(Vertex::new(b, color));
        self.indices.extend_from_slice(&[base, base + 1]);
    }

    fn push_quad(&mut self, corners: [[f32; 3]; 4], color: [f32; 4]) {
        let base = self.vertices.len() as u32;
        for corner in corners {
            self.vertices.push(Vertex::new(corner, color));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Axis-aligned cube given by its center and edge length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub center: [f32; 3],
    pub size: f32,
}

impl Cube {
    pub const fn new(x: f32, y: f32, z: f32, size: f32) -> Self {
        Self { center: [x, y, z], size }
    }

    /// Six quads, one color per face.
    pub fn mesh(&self) -> Mesh {
        let h = self.size / 2.0;
        let [x, y, z] = self.center;
        let mut mesh = Mesh::empty();

        // +Z red
        mesh.push_quad(
            [[x - h, y - h, z + h], [x + h, y - h, z + h], [x + h, y + h, z + h], [x - h, y + h, z + h]],
            [1.0, 0.0, 0.0, 1.0],
        );
        // -Z green
        mesh.push_quad(
            [[x - h, y - h, z - h], [x - h, y + h, z - h], [x + h, y + h, z - h], [x + h, y - h, z - h]],
            [0.0, 1.0, 0.0, 1.0],
        );
        // +Y blue
        mesh.push_quad(
            [[x - h, y + h, z - h], [x - h, y + h, z + h], [x + h, y + h, z + h], [x + h, y + h, z - h]],
            [0.0, 0.0, 1.0, 1.0],
        );
        // -Y yellow
        mesh.push_quad(
            [[x - h, y - h, z - h], [x + h, y - h, z - h], [x + h, y - h, z + h], [x - h, y - h, z + h]],
            [1.0, 1.0, 0.0, 1.0],
        );
        // +X magenta
        mesh.push_quad(
            [[x + h, y - h, z - h], [x + h, y + h, z - h], [x + h, y + h, z + h], [x + h, y - h, z + h]],
            [1.0, 0.0, 1.0, 1.0],
        );
        // -X cyan
        mesh.push_quad(
            [[x - h, y - h, z - h], [x - h, y - h, z + h], [x - h, y + h, z + h], [x - h, y + h, z - h]],
            [0.0, 1.0, 1.0, 1.0],
        );

        mesh
    }
}

/// Fixed scene geometry: ground grid, coordinate axes and a list of cubes.
#[derive(Debug, Clone)]
pub struct World {
    pub grid_half_extent: i32,
    pub grid_step: usize,
    pub axis_length: f32,
    pub cubes: Vec<Cube>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            grid_half_extent: GRID_HALF_EXTENT,
            grid_step: GRID_STEP,
            axis_length: AXIS_LENGTH,
            cubes: vec![
                Cube::new(3.0, 1.0, -5.0, 1.0),
                Cube::new(-4.0, 1.0, -6.0, 1.0),
                Cube::new(0.0, 1.0, -10.0, 1.0),
                Cube::new(5.0, 1.0, -3.0, 1.0),
                Cube::new(-2.0, 1.0, -3.0, 2.0),
                Cube::new(0.0, 0.5, -20.0, 4.0),
            ],
        }
    }
}

impl World {
    /// Line-list mesh for the ground grid on y = 0 followed by the three axes.
    pub fn line_mesh(&self) -> Mesh {
        let mut mesh = Mesh::empty();
        let s = self.grid_half_extent;
        let step = self.grid_step.max(1);
        let sf = s as f32;

        for i in (-s..=s).step_by(step) {
            let f = i as f32;
            mesh.push_line([f, 0.0, -sf], [f, 0.0, sf], GRID_COLOR);
        }
        for i in (-s..=s).step_by(step) {
            let f = i as f32;
            mesh.push_line([-sf, 0.0, f], [sf, 0.0, f], GRID_COLOR);
        }

        let l = self.axis_length;
        mesh.push_line([0.0; 3], [l, 0.0, 0.0], AXIS_X_COLOR);
        mesh.push_line([0.0; 3], [0.0, l, 0.0], AXIS_Y_COLOR);
        mesh.push_line([0.0; 3], [0.0, 0.0, l], AXIS_Z_COLOR);

        mesh
    }

    /// Triangle-list mesh with every cube.
    pub fn cube_mesh(&self) -> Mesh {
        let mut mesh = Mesh::empty();
        for cube in &self.cubes {
            mesh.extend(&cube.mesh());
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_world_has_six_cubes() {
        let world = World::default();
        assert_eq!(world.cubes.len(), 6);
        assert_eq!(world.cubes[4], Cube::new(-2.0, 1.0, -3.0, 2.0));
    }

    #[test]
    fn line_mesh_counts() {
        let world = World::default();
        let mesh = world.line_mesh();
        // 41 lines per direction plus three axes, two vertices each
        let lines = 41 * 2 + 3;
        assert_eq!(mesh.vertices.len(), lines * 2);
        assert_eq!(mesh.indices.len(), lines * 2);
        assert!(mesh.vertices.iter().take(41 * 4).all(|v| v.pos[1] == 0.0));
    }

    #[test]
    fn cube_mesh_indices_stay_in_bounds() {
        let mesh = World::default().cube_mesh();
        assert_eq!(mesh.vertices.len(), 6 * 6 * 4);
        assert_eq!(mesh.indices.len(), 6 * 6 * 6);
        let max = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn cube_faces_span_its_size() {
        let mesh = Cube::new(0.0, 0.5, -20.0, 4.0).mesh();
        let min_y = mesh.vertices.iter().map(|v| v.pos[1]).fold(f32::MAX, f32::min);
        let max_z = mesh.vertices.iter().map(|v| v.pos[2]).fold(f32::MIN, f32::max);
        assert_eq!(min_y, -1.5);
        assert_eq!(max_z, -18.0);
    }
}
