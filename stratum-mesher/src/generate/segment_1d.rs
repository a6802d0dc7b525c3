use crate::connectivity::line_connectivity;
use crate::mesh::Mesh1d;
use crate::MeshError;
use nalgebra::{Point1, RealField};

/// A mesh of `number_of_vertices` vertices on the unit interval
pub fn create_unit_line_segment_mesh_1d<T>(
    number_of_vertices: usize,
) -> Result<Mesh1d<T>, MeshError>
where
    T: Copy + RealField,
{
    let spacing = T::one() / nalgebra::convert((number_of_vertices.max(2) - 1) as f64);
    create_line_segment_mesh_1d(spacing, number_of_vertices, T::zero())
}

/// A uniform mesh of `number_of_vertices` vertices separated by `spacing`, starting at `origin`
pub fn create_line_segment_mesh_1d<T>(
    spacing: T,
    number_of_vertices: usize,
    origin: T,
) -> Result<Mesh1d<T>, MeshError>
where
    T: Copy + RealField,
{
    if number_of_vertices < 3 {
        return Err(MeshError::TooFewVertices(number_of_vertices));
    }
    let vertices = (0..number_of_vertices)
        .map(|i| {
            let i_as_t: T = nalgebra::convert(i as f64);
            Point1::new(origin + i_as_t * spacing)
        })
        .collect::<Vec<_>>();

    Ok(Mesh1d::from_vertices_and_connectivity(
        vertices,
        line_connectivity(number_of_vertices),
        spacing,
    ))
}
