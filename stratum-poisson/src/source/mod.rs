//! Assembly of the right hand side of the discrete Poisson equation
//!
//! The source vector holds the charge density at each vertex, weighted by the control volume the
//! vertex owns. Under a Neumann closure the end vertices own half a cell and the charge is first
//! neutralised, as a closed structure with a net charge has no solution with zero field at both
//! ends. Pinned potentials are moved from the operator into the source so the operator stays
//! symmetric.
use crate::operator::half_point_permittivity;
use nalgebra::{DVector, RealField};
use stratum_mesher::FiniteDifferenceMesh;

pub(crate) struct SourceAssemblerBuilder<RefMesh, RefPermittivity, RefCharge> {
    mesh: RefMesh,
    permittivity: RefPermittivity,
    charge_density: RefCharge,
}

impl SourceAssemblerBuilder<(), (), ()> {
    pub(crate) fn new() -> Self {
        Self {
            mesh: (),
            permittivity: (),
            charge_density: (),
        }
    }
}

impl<RefMesh, RefPermittivity, RefCharge>
    SourceAssemblerBuilder<RefMesh, RefPermittivity, RefCharge>
{
    pub(crate) fn with_mesh<Mesh>(
        self,
        mesh: &Mesh,
    ) -> SourceAssemblerBuilder<&Mesh, RefPermittivity, RefCharge> {
        SourceAssemblerBuilder {
            mesh,
            permittivity: self.permittivity,
            charge_density: self.charge_density,
        }
    }

    pub(crate) fn with_permittivity<Permittivity>(
        self,
        permittivity: &Permittivity,
    ) -> SourceAssemblerBuilder<RefMesh, &Permittivity, RefCharge> {
        SourceAssemblerBuilder {
            mesh: self.mesh,
            permittivity,
            charge_density: self.charge_density,
        }
    }

    pub(crate) fn with_charge_density<Charge>(
        self,
        charge_density: &Charge,
    ) -> SourceAssemblerBuilder<RefMesh, RefPermittivity, &Charge> {
        SourceAssemblerBuilder {
            mesh: self.mesh,
            permittivity: self.permittivity,
            charge_density,
        }
    }
}

impl<'a, Mesh, T> SourceAssemblerBuilder<&'a Mesh, &'a DVector<T>, &'a DVector<T>> {
    pub(crate) fn build(self) -> SourceAssembler<'a, Mesh, T> {
        SourceAssembler {
            mesh: self.mesh,
            permittivity: self.permittivity,
            charge_density: self.charge_density,
        }
    }
}

pub(crate) struct SourceAssembler<'a, Mesh, T> {
    mesh: &'a Mesh,
    permittivity: &'a DVector<T>,
    charge_density: &'a DVector<T>,
}

impl<'a, Mesh, T> SourceAssembler<'a, Mesh, T>
where
    T: Copy + RealField,
    Mesh: FiniteDifferenceMesh<T>,
{
    /// The charge density less a uniform background carrying the opposite of its net charge
    ///
    /// The net charge is the control-volume weighted sum of the samples, so it vanishes exactly
    /// under the half-cell weighting used by [`Self::assemble_neumann`].
    pub(crate) fn neutralised_charge_density(&self) -> DVector<T> {
        let n = self.charge_density.len();
        let two = T::one() + T::one();
        let net = self.charge_density.sum()
            - (self.charge_density[0] + self.charge_density[n - 1]) / two;
        let background = net / T::from_usize(n - 1).unwrap_or_else(T::one);
        self.charge_density.map(|rho| rho - background)
    }

    /// The source under a Neumann closure, with the potential at the first vertex pinned to zero
    pub(crate) fn assemble_neumann(&self) -> DVector<T> {
        let n = self.charge_density.len();
        let two = T::one() + T::one();
        let mut source = self.neutralised_charge_density();
        source[n - 1] /= two;
        // The pinned value is zero, so nothing is carried to the neighbouring row
        source[0] = T::zero();
        source
    }

    /// The source under a Dirichlet closure, with the potential pinned to zero at the first vertex
    /// and `voltage_drop` at the last
    pub(crate) fn assemble_dirichlet(&self, voltage_drop: T) -> DVector<T> {
        let n = self.charge_density.len();
        let mut source = self.charge_density.clone();
        source[0] = T::zero();
        source[n - 1] = voltage_drop;
        if n > 2 {
            let coupling = half_point_permittivity(self.permittivity, n - 2, n - 1)
                / self.mesh.spacing().powi(2);
            source[n - 2] += coupling * voltage_drop;
        }
        source
    }
}
