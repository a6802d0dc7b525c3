//! # Error
//! Failures raised while validating a mesh or the profiles sampled on it

use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic, PartialEq)]
/// Error for mesh construction and profile alignment
pub enum MeshError {
    /// Central differences need a vertex on either side of at least one interior point
    #[error("a mesh needs at least 3 vertices, found {0}")]
    #[diagnostic(code(stratum::mesh::too_few_vertices))]
    TooFewVertices(usize),
    /// The spacing between two vertices differs from the first spacing in the mesh
    #[error("non-uniform mesh spacing at vertex {index}: expected {expected:e}, found {found:e}")]
    #[diagnostic(
        code(stratum::mesh::non_uniform),
        help("all solvers require a uniformly sampled structure")
    )]
    NonUniformSpacing {
        /// Index of the vertex ending the offending interval
        index: usize,
        /// The spacing of the first interval
        expected: f64,
        /// The spacing of the offending interval
        found: f64,
    },
    /// A position is NaN or infinite
    #[error("vertex {0} has a non-finite position")]
    #[diagnostic(code(stratum::mesh::non_finite))]
    NonFinitePosition(usize),
    /// A value array does not line up with the mesh it is attached to
    #[error("profile has {values} values but the mesh has {vertices} vertices")]
    #[diagnostic(code(stratum::mesh::length_mismatch))]
    LengthMismatch {
        /// Number of mesh vertices
        vertices: usize,
        /// Number of values supplied
        values: usize,
    },
}
