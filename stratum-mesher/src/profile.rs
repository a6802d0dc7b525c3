use crate::{Mesh1d, MeshError};
use nalgebra::{DVector, RealField};

/// A scalar quantity sampled at every vertex of a [`Mesh1d`]
///
/// The values are index-aligned with the mesh vertices, so `values()[i]` is the quantity at
/// `mesh().vertices()[i]`.
#[derive(Clone, Debug)]
pub struct Profile<T: RealField> {
    mesh: Mesh1d<T>,
    values: DVector<T>,
}

impl<T> Profile<T>
where
    T: Copy + RealField,
{
    /// Attach `values` to `mesh`, which must have one value per vertex
    pub fn new(mesh: Mesh1d<T>, values: DVector<T>) -> Result<Self, MeshError> {
        if mesh.num_nodes() != values.len() {
            return Err(MeshError::LengthMismatch {
                vertices: mesh.num_nodes(),
                values: values.len(),
            });
        }
        Ok(Self { mesh, values })
    }

    /// A profile holding `value` at every vertex
    pub fn from_element(mesh: Mesh1d<T>, value: T) -> Self {
        let values = DVector::from_element(mesh.num_nodes(), value);
        Self { mesh, values }
    }

    /// Build a profile by evaluating `f` at every vertex position
    pub fn from_fn(mesh: Mesh1d<T>, mut f: impl FnMut(T) -> T) -> Self {
        let values = DVector::from_iterator(
            mesh.num_nodes(),
            mesh.vertices().iter().map(|vertex| f(vertex.x)),
        );
        Self { mesh, values }
    }

    /// The mesh the profile is sampled on
    pub fn mesh(&self) -> &Mesh1d<T> {
        &self.mesh
    }

    /// The sampled values, one per vertex
    pub fn values(&self) -> &DVector<T> {
        &self.values
    }

    /// Mutable access to the samples. The slice cannot change length, so the profile stays
    /// aligned with its mesh
    pub fn values_mut(&mut self) -> &mut [T] {
        self.values.as_mut_slice()
    }

    /// The number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the profile holds no samples
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Swap in a freshly computed value array, returning the previous one
    pub fn replace_values(&mut self, values: DVector<T>) -> Result<DVector<T>, MeshError> {
        if values.len() != self.values.len() {
            return Err(MeshError::LengthMismatch {
                vertices: self.mesh.num_nodes(),
                values: values.len(),
            });
        }
        Ok(std::mem::replace(&mut self.values, values))
    }

    /// Consume the profile, keeping only the mesh and values
    pub fn into_parts(self) -> (Mesh1d<T>, DVector<T>) {
        (self.mesh, self.values)
    }

    /// Trapezoidal integral of the profile over the mesh
    pub fn integrate(&self) -> T {
        let half: T = nalgebra::convert(0.5);
        let n = self.values.len();
        let interior = self.values.rows(1, n - 2).sum();
        (interior + (self.values[0] + self.values[n - 1]) * half) * self.mesh.spacing()
    }

    /// The largest value in the profile
    pub fn max(&self) -> T {
        self.values.max()
    }
}
