//! Uniform one-dimensional meshes and the sampled profiles defined on them
//!
//! Every solver in the workspace works on quantities sampled at the vertices of a
//! uniformly spaced line mesh running along the growth axis of the structure. A
//! [`Mesh1d`] holds the vertex positions and their nearest-neighbour connectivity,
//! a [`Profile`] pairs a mesh with one array of values.
#![warn(missing_docs)]

mod connectivity;
mod error;
mod generate;
mod mesh;
mod profile;

pub use connectivity::*;
pub use error::MeshError;
pub use generate::*;
pub use mesh::*;
pub use profile::*;

use nalgebra::{OPoint, RealField, U1};

/// Read access to the geometry of a finite difference mesh
///
/// The Poisson operator assembly is written against this trait rather than the concrete
/// [`Mesh1d`] so the assemblers only see what they need: the vertices, their neighbours
/// and the spacing between them.
pub trait FiniteDifferenceMesh<T>
where
    T: RealField,
{
    /// The number of vertices in the mesh
    fn number_of_nodes(&self) -> usize;
    /// The uniform distance between neighbouring vertices
    fn spacing(&self) -> T;
    /// The vertex coordinates
    fn get_vertices(&self) -> &[OPoint<T, U1>];
    /// The indices of the vertices connected to each vertex
    fn get_connectivity(&self) -> Vec<&[usize]>;
}

impl<T> FiniteDifferenceMesh<T> for Mesh1d<T>
where
    T: Copy + RealField,
{
    fn number_of_nodes(&self) -> usize {
        self.num_nodes()
    }
    fn spacing(&self) -> T {
        self.spacing()
    }
    fn get_vertices(&self) -> &[OPoint<T, U1>] {
        self.vertices()
    }
    fn get_connectivity(&self) -> Vec<&[usize]> {
        self.connectivity()
    }
}
