/// Vertex connectivity for a line segment mesh
///
/// Interior vertices see both neighbours, the two boundary vertices see only the single
/// vertex inside the structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment1dConnectivity {
    /// An interior vertex, holding the indices of the left and right neighbours
    Core([usize; 2]),
    /// A vertex at the edge of the structure, holding the index of its only neighbour
    Boundary([usize; 1]),
}

/// Access to the raw neighbour indices of a vertex
pub trait Connectivity {
    /// The neighbour indices as a slice
    fn as_inner(&self) -> &[usize];
    /// Whether the vertex sits on the edge of the mesh
    fn is_boundary(&self) -> bool;
}

impl Connectivity for Segment1dConnectivity {
    fn as_inner(&self) -> &[usize] {
        match self {
            Segment1dConnectivity::Core(x) => x,
            Segment1dConnectivity::Boundary(x) => x,
        }
    }

    fn is_boundary(&self) -> bool {
        matches!(self, Segment1dConnectivity::Boundary(_))
    }
}

/// Builds the connectivity for a line of `num_vertices` vertices, which must be at least two
pub(crate) fn line_connectivity(num_vertices: usize) -> Vec<Segment1dConnectivity> {
    let mut cells = Vec::with_capacity(num_vertices);
    cells.push(Segment1dConnectivity::Boundary([1]));
    for i in 1..num_vertices - 1 {
        cells.push(Segment1dConnectivity::Core([i - 1, i + 1]));
    }
    cells.push(Segment1dConnectivity::Boundary([num_vertices - 2]));
    cells
}
