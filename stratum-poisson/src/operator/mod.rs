//! Assembly of the discrete operator `-d/dz (eps d/dz)`
//!
//! Each row couples a vertex to its neighbours through the permittivity at the half-point
//! between them. Vertices whose potential is pinned by the boundary condition are eliminated
//! symmetrically: their row becomes the identity and their column is dropped from the rows of
//! their neighbours (the pinned value is moved to the source, see `crate::source`). This keeps
//! the operator symmetric positive definite.
use crate::PoissonError;
use itertools::izip;
use nalgebra::{DVector, RealField};
use nalgebra_sparse::CsrMatrix;
use stratum_mesher::FiniteDifferenceMesh;

/// How the ends of the structure close the linear system
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Closure {
    /// No flux through either end. The potential at the first vertex is pinned to fix the
    /// otherwise free additive constant
    Neumann,
    /// The potential is pinned at both ends
    Dirichlet,
}

impl Closure {
    /// Whether the potential at `vertex_index` is fixed by the closure
    pub(crate) fn is_pinned(&self, vertex_index: usize, num_nodes: usize) -> bool {
        match self {
            Closure::Neumann => vertex_index == 0,
            Closure::Dirichlet => vertex_index == 0 || vertex_index == num_nodes - 1,
        }
    }
}

/// The permittivity midway between two neighbouring vertices
pub(crate) fn half_point_permittivity<T: Copy + RealField>(
    permittivity: &DVector<T>,
    i: usize,
    j: usize,
) -> T {
    (permittivity[i] + permittivity[j]) / (T::one() + T::one())
}

pub(crate) struct OperatorAssemblerBuilder<RefMesh, RefPermittivity> {
    mesh: RefMesh,
    permittivity: RefPermittivity,
}

impl OperatorAssemblerBuilder<(), ()> {
    pub(crate) fn new() -> Self {
        Self {
            mesh: (),
            permittivity: (),
        }
    }
}

impl<RefMesh, RefPermittivity> OperatorAssemblerBuilder<RefMesh, RefPermittivity> {
    pub(crate) fn with_mesh<Mesh>(
        self,
        mesh: &Mesh,
    ) -> OperatorAssemblerBuilder<&Mesh, RefPermittivity> {
        OperatorAssemblerBuilder {
            mesh,
            permittivity: self.permittivity,
        }
    }

    pub(crate) fn with_permittivity<Permittivity>(
        self,
        permittivity: &Permittivity,
    ) -> OperatorAssemblerBuilder<RefMesh, &Permittivity> {
        OperatorAssemblerBuilder {
            mesh: self.mesh,
            permittivity,
        }
    }
}

impl<'a, Mesh, T> OperatorAssemblerBuilder<&'a Mesh, &'a DVector<T>> {
    pub(crate) fn build(self) -> OperatorAssembler<'a, Mesh, T> {
        OperatorAssembler {
            mesh: self.mesh,
            permittivity: self.permittivity,
        }
    }
}

pub(crate) struct OperatorAssembler<'a, Mesh, T> {
    mesh: &'a Mesh,
    permittivity: &'a DVector<T>,
}

impl<'a, Mesh, T> OperatorAssembler<'a, Mesh, T>
where
    T: Copy + RealField,
    Mesh: FiniteDifferenceMesh<T>,
{
    fn num_nodes(&self) -> usize {
        self.mesh.number_of_nodes()
    }

    /// Assemble the operator as a CSR matrix under the given closure
    pub(crate) fn assemble_matrix(&self, closure: Closure) -> Result<CsrMatrix<T>, PoissonError> {
        let n = self.num_nodes();
        let dz_squared = self.mesh.spacing().powi(2);

        let mut row_offsets = Vec::with_capacity(n + 1);
        let mut col_indices = Vec::with_capacity(n * 3 - 2);
        let mut values = Vec::with_capacity(n * 3 - 2);
        row_offsets.push(0);

        for (idx, connections) in izip!(0..n, self.mesh.get_connectivity()) {
            if closure.is_pinned(idx, n) {
                col_indices.push(idx);
                values.push(T::one());
                row_offsets.push(col_indices.len());
                continue;
            }

            // A boundary vertex only sees its inward neighbour: this is the zero-flux row
            let mut row = Vec::with_capacity(3);
            let mut diagonal = T::zero();
            for &neighbour in connections {
                let coupling =
                    half_point_permittivity(self.permittivity, idx, neighbour) / dz_squared;
                diagonal += coupling;
                if !closure.is_pinned(neighbour, n) {
                    row.push((neighbour, -coupling));
                }
            }
            row.push((idx, diagonal));
            row.sort_by_key(|&(column, _)| column);

            for (column, value) in row {
                col_indices.push(column);
                values.push(value);
            }
            row_offsets.push(col_indices.len());
        }

        CsrMatrix::try_from_csr_data(n, n, row_offsets, col_indices, values)
            .map_err(|e| PoissonError::Csr(e.to_string()))
    }
}
