use crate::{connectivity::line_connectivity, Connectivity, MeshError, Segment1dConnectivity};
use nalgebra::{Point1, RealField};

/// Relative tolerance on the spacing between neighbouring vertices
///
/// Positions usually arrive from text tables printed with a handful of significant figures,
/// so the check is loose compared to machine precision.
const SPACING_TOLERANCE: f64 = 1e-6;

/// A uniformly spaced mesh of vertices along the growth axis
#[derive(Clone, Debug)]
pub struct Mesh1d<T: RealField> {
    vertices: Vec<Point1<T>>,
    connectivity: Vec<Segment1dConnectivity>,
    spacing: T,
}

impl<T> Mesh1d<T>
where
    T: Copy + RealField,
{
    /// Construct a mesh from an ordered list of positions
    ///
    /// Fails if there are fewer than three positions, if any position is not finite, or if the
    /// spacing between neighbours is not constant.
    pub fn from_positions(positions: &[T]) -> Result<Self, MeshError> {
        if positions.len() < 3 {
            return Err(MeshError::TooFewVertices(positions.len()));
        }
        if let Some(index) = positions.iter().position(|z| !z.is_finite()) {
            return Err(MeshError::NonFinitePosition(index));
        }
        let spacing = positions[1] - positions[0];
        let tolerance = spacing.abs() * nalgebra::convert(SPACING_TOLERANCE);
        for (index, pair) in positions.windows(2).enumerate() {
            let delta = pair[1] - pair[0];
            if delta <= T::zero() || (delta - spacing).abs() > tolerance {
                return Err(MeshError::NonUniformSpacing {
                    index: index + 1,
                    expected: nalgebra::try_convert(spacing).unwrap_or(f64::NAN),
                    found: nalgebra::try_convert(delta).unwrap_or(f64::NAN),
                });
            }
        }

        Ok(Self {
            vertices: positions.iter().map(|&z| Point1::new(z)).collect(),
            connectivity: line_connectivity(positions.len()),
            spacing,
        })
    }

    pub(crate) fn from_vertices_and_connectivity(
        vertices: Vec<Point1<T>>,
        connectivity: Vec<Segment1dConnectivity>,
        spacing: T,
    ) -> Self {
        Self {
            vertices,
            connectivity,
            spacing,
        }
    }

    /// The number of vertices in the mesh
    pub fn num_nodes(&self) -> usize {
        self.vertices.len()
    }

    /// The distance between neighbouring vertices
    pub fn spacing(&self) -> T {
        self.spacing
    }

    /// The distance between the first and last vertex
    pub fn span(&self) -> T {
        self.vertices[self.vertices.len() - 1].x - self.vertices[0].x
    }

    /// The vertices, ordered along the growth axis
    pub fn vertices(&self) -> &[Point1<T>] {
        &self.vertices
    }

    /// The vertex coordinates as a flat vector
    pub fn positions(&self) -> Vec<T> {
        self.vertices.iter().map(|vertex| vertex.x).collect()
    }

    /// The neighbour indices of each vertex
    pub fn connectivity(&self) -> Vec<&[usize]> {
        self.connectivity.iter().map(|x| x.as_inner()).collect()
    }

    /// Whether the vertex at `vertex_index` is one of the two edge vertices
    pub fn is_boundary(&self, vertex_index: usize) -> bool {
        self.connectivity[vertex_index].is_boundary()
    }

    /// The index of the vertex at the middle of the structure
    pub fn midpoint_index(&self) -> usize {
        self.vertices.len() / 2
    }

    /// The index of the vertex closest to `position`, the first one wins a tie
    pub fn index_nearest(&self, position: T) -> usize {
        let mut nearest = 0;
        let mut distance = (self.vertices[0].x - position).abs();
        for (index, vertex) in self.vertices.iter().enumerate().skip(1) {
            let candidate = (vertex.x - position).abs();
            if candidate < distance {
                nearest = index;
                distance = candidate;
            }
        }
        nearest
    }

    /// Whether two meshes sample the same positions
    pub fn is_aligned_with(&self, other: &Mesh1d<T>) -> bool {
        self.num_nodes() == other.num_nodes()
            && self
                .vertices
                .iter()
                .zip(other.vertices.iter())
                .all(|(a, b)| {
                    (a.x - b.x).abs() <= self.spacing * nalgebra::convert(SPACING_TOLERANCE)
                })
    }
}
