//! Model container: element entities, DOF bookkeeping and sparse assembly

use std::collections::HashMap;

use log::warn;
use nalgebra::{DMatrix, Matrix3};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use serde::{Deserialize, Serialize};

use crate::elements::quad::{self, Quad4, Quad8, Quad9};
use crate::elements::{Dof, LinearElastic, Node};
use crate::error::{FeaError, FeaResult};
use crate::loads::TimeSeries;
use crate::math::sparse::SparseMatrixBuilder;
use crate::quadrature::QuadratureRule;

/// Elements per assembly batch; bounds the COO scatter buffer
const ASSEMBLY_BATCH: usize = 5_000;

/// Quadrilateral element topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Quad4,
    Quad8,
    Quad9,
}

impl ElementKind {
    pub fn node_count(&self) -> usize {
        match self {
            ElementKind::Quad4 => 4,
            ElementKind::Quad8 => 8,
            ElementKind::Quad9 => 9,
        }
    }

    pub fn dof_count(&self) -> usize {
        2 * self.node_count()
    }

    fn stiffness(
        &self,
        ncoords: &DMatrix<f64>,
        cmatrix: &[Matrix3<f64>],
        thickness: &[f64],
        rule: &QuadratureRule,
    ) -> FeaResult<DMatrix<f64>> {
        match self {
            ElementKind::Quad4 => quad::stiffness::<Quad4>(ncoords, cmatrix, thickness, rule),
            ElementKind::Quad8 => quad::stiffness::<Quad8>(ncoords, cmatrix, thickness, rule),
            ElementKind::Quad9 => quad::stiffness::<Quad9>(ncoords, cmatrix, thickness, rule),
        }
    }

    fn mass(
        &self,
        ncoords: &DMatrix<f64>,
        density: &[f64],
        thickness: &[f64],
        rule: &QuadratureRule,
    ) -> FeaResult<DMatrix<f64>> {
        match self {
            ElementKind::Quad4 => quad::mass::<Quad4>(ncoords, density, thickness, rule),
            ElementKind::Quad8 => quad::mass::<Quad8>(ncoords, density, thickness, rule),
            ElementKind::Quad9 => quad::mass::<Quad9>(ncoords, density, thickness, rule),
        }
    }

    fn strain(
        &self,
        ncoords: &DMatrix<f64>,
        u: &DMatrix<f64>,
        rule: &QuadratureRule,
        r1: f64,
        r2: f64,
    ) -> FeaResult<DMatrix<f64>> {
        match self {
            ElementKind::Quad4 => quad::strain::<Quad4>(ncoords, u, rule, r1, r2),
            ElementKind::Quad8 => quad::strain::<Quad8>(ncoords, u, rule, r1, r2),
            ElementKind::Quad9 => quad::strain::<Quad9>(ncoords, u, rule, r1, r2),
        }
    }
}

/// One quadrilateral element: node labels, per-integration-point material
/// and thickness, and its quadrature rule
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) label: usize,
    nodes: Vec<usize>,
    kind: ElementKind,
    materials: Vec<LinearElastic>,
    thickness: Vec<f64>,
    rule: QuadratureRule,
}

impl Element {
    pub fn new(
        nodes: Vec<usize>,
        kind: ElementKind,
        materials: Vec<LinearElastic>,
        thickness: Vec<f64>,
        rule: QuadratureRule,
    ) -> FeaResult<Self> {
        if nodes.len() != kind.node_count() {
            return Err(FeaError::InvalidElement(format!(
                "{:?} takes {} nodes, got {}",
                kind,
                kind.node_count(),
                nodes.len()
            )));
        }
        if materials.len() != rule.len() || thickness.len() != rule.len() {
            return Err(FeaError::InvalidElement(format!(
                "need one material and thickness per integration point \
                 ({} points, {} materials, {} thicknesses)",
                rule.len(),
                materials.len(),
                thickness.len()
            )));
        }
        Ok(Self {
            label: usize::MAX,
            nodes,
            kind,
            materials,
            thickness,
            rule,
        })
    }

    pub fn label(&self) -> usize {
        self.label
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn node_labels(&self) -> &[usize] {
        &self.nodes
    }

    pub fn rule(&self) -> &QuadratureRule {
        &self.rule
    }

    pub fn materials(&self) -> &[LinearElastic] {
        &self.materials
    }

    /// Nodal coordinate matrix (n x 2)
    pub fn node_coordinates(&self, nodes: &[Node]) -> DMatrix<f64> {
        let mut ncoords = DMatrix::zeros(self.nodes.len(), 2);
        for (i, &label) in self.nodes.iter().enumerate() {
            ncoords[(i, 0)] = nodes[label].x();
            ncoords[(i, 1)] = nodes[label].y();
        }
        ncoords
    }

    /// Global equation numbers in element order: u then v per node
    pub fn global_dofs(&self, nodes: &[Node]) -> FeaResult<Vec<usize>> {
        let mut dofs = Vec::with_capacity(self.kind.dof_count());
        for &label in &self.nodes {
            for dof in [Dof::X, Dof::Y] {
                dofs.push(nodes[label].number(dof).ok_or_else(|| {
                    FeaError::InvalidElement(format!(
                        "node {label} has no active {dof:?} degree of freedom"
                    ))
                })?);
            }
        }
        Ok(dofs)
    }

    /// Element stiffness K_e from the per-point constitutive matrices
    pub fn stiffness(&self, nodes: &[Node]) -> FeaResult<DMatrix<f64>> {
        let ncoords = self.node_coordinates(nodes);
        let cmatrix: Vec<Matrix3<f64>> =
            self.materials.iter().map(|m| *m.constitutive()).collect();
        self.kind
            .stiffness(&ncoords, &cmatrix, &self.thickness, &self.rule)
    }

    /// Consistent element mass M_e from the per-point densities
    pub fn mass(&self, nodes: &[Node]) -> FeaResult<DMatrix<f64>> {
        let ncoords = self.node_coordinates(nodes);
        let density: Vec<f64> = self.materials.iter().map(|m| m.density()).collect();
        self.kind
            .mass(&ncoords, &density, &self.thickness, &self.rule)
    }

    /// Strain at the natural coordinate (r1, r2) for displacement columns `u`
    pub fn strain(
        &self,
        nodes: &[Node],
        u: &DMatrix<f64>,
        r1: f64,
        r2: f64,
    ) -> FeaResult<DMatrix<f64>> {
        let ncoords = self.node_coordinates(nodes);
        self.kind.strain(&ncoords, u, &self.rule, r1, r2)
    }
}

/// Insertion-ordered map from (node label, DOF index) to global number
///
/// Parallel arrays keep the deterministic ordering the assembler and the
/// partitions rely on; the hash index keeps lookups O(1).
#[derive(Debug, Clone, Default)]
pub struct DofMap {
    keys: Vec<(usize, usize)>,
    numbers: Vec<usize>,
    index: HashMap<(usize, usize), usize>,
}

impl DofMap {
    fn insert(&mut self, key: (usize, usize), number: usize) {
        debug_assert!(!self.index.contains_key(&key));
        self.index.insert(key, self.keys.len());
        self.keys.push(key);
        self.numbers.push(number);
    }

    fn remove(&mut self, key: (usize, usize)) -> Option<usize> {
        let pos = self.index.remove(&key)?;
        self.keys.remove(pos);
        let number = self.numbers.remove(pos);
        for (i, k) in self.keys.iter().enumerate().skip(pos) {
            self.index.insert(*k, i);
        }
        Some(number)
    }

    pub fn contains(&self, key: (usize, usize)) -> bool {
        self.index.contains_key(&key)
    }

    pub fn get(&self, key: (usize, usize)) -> Option<usize> {
        self.index.get(&key).map(|&pos| self.numbers[pos])
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> &[(usize, usize)] {
        &self.keys
    }

    /// Global numbers in insertion order
    pub fn numbers(&self) -> &[usize] {
        &self.numbers
    }
}

/// Lumped boundary contributions: parallel (node, dof, number, value) rows
#[derive(Debug, Clone, Default)]
pub struct LumpedTable {
    pub node_labels: Vec<usize>,
    pub dof_indices: Vec<usize>,
    pub numbers: Vec<usize>,
    pub values: Vec<f64>,
}

impl LumpedTable {
    fn push(&mut self, node: usize, dof: usize, number: usize, value: f64) {
        self.node_labels.push(node);
        self.dof_indices.push(dof);
        self.numbers.push(number);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

/// The assembled structural model
///
/// Owns the node and element arenas; all cross-references are integer
/// labels. Construction numbers the degrees of freedom; the constraint and
/// load operators mutate the partition maps afterwards.
#[derive(Debug)]
pub struct Model {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,

    pub(crate) ndof: DofMap,
    pub(crate) fdof: DofMap,
    pub(crate) rdof: DofMap,
    pub(crate) ldof: DofMap,

    pub(crate) loads: Vec<TimeSeries>,
    pub(crate) springs: LumpedTable,
    pub(crate) masses: LumpedTable,

    selection: CsrMatrix<f64>,

    pub(crate) alpha: f64,
    pub(crate) beta: f64,
}

impl Model {
    /// Take ownership of nodes and elements, label them and number the DOFs
    pub fn new(nodes: Vec<Node>, elements: Vec<Element>) -> Self {
        let mut nodes = nodes;
        let mut elements = elements;

        for (label, element) in elements.iter_mut().enumerate() {
            element.label = label;
            for &node in &element.nodes {
                nodes[node].add_link(label);
            }
        }

        let mut ndof = DofMap::default();
        let mut fdof = DofMap::default();
        let mut counter = 0;
        for (label, node) in nodes.iter_mut().enumerate() {
            node.label = label;
            for dof in 0..6 {
                if node.active[dof] {
                    node.numbers[dof] = Some(counter);
                    ndof.insert((label, dof), counter);
                    fdof.insert((label, dof), counter);
                    counter += 1;
                }
            }
        }

        let mut model = Self {
            nodes,
            elements,
            ndof,
            fdof,
            rdof: DofMap::default(),
            ldof: DofMap::default(),
            loads: Vec::new(),
            springs: LumpedTable::default(),
            masses: LumpedTable::default(),
            selection: CsrMatrix::zeros(0, 0),
            alpha: 0.0,
            beta: 0.0,
        };
        model.rebuild_selection();
        model
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Total number of equations (active DOFs)
    pub fn dof_count(&self) -> usize {
        self.ndof.len()
    }

    /// Free-DOF global numbers in partition order
    pub fn free_dofs(&self) -> &[usize] {
        self.fdof.numbers()
    }

    /// Restrained-DOF global numbers in partition order
    pub fn restrained_dofs(&self) -> &[usize] {
        self.rdof.numbers()
    }

    /// Loaded-DOF global numbers in partition order
    pub fn loaded_dofs(&self) -> &[usize] {
        self.ldof.numbers()
    }

    pub fn load_series(&self) -> &[TimeSeries] {
        &self.loads
    }

    /// The sparse 0/1 gather from load entries into the free-DOF space
    pub fn selection(&self) -> &CsrMatrix<f64> {
        &self.selection
    }

    /// Rayleigh damping coefficients (alpha, beta)
    pub fn damping(&self) -> (f64, f64) {
        (self.alpha, self.beta)
    }

    pub fn set_damping_coefficients(&mut self, alpha: f64, beta: f64) {
        self.alpha = alpha;
        self.beta = beta;
    }

    fn active_number(&self, label: usize, dof: Dof) -> FeaResult<usize> {
        self.nodes
            .get(label)
            .ok_or_else(|| FeaError::InvalidConfig(format!("unknown node label {label}")))?
            .number(dof)
            .ok_or_else(|| {
                FeaError::InvalidConfig(format!(
                    "{dof:?} is not an active degree of freedom of node {label}"
                ))
            })
    }

    /// Fully fix the given DOFs; already-restrained entries are skipped
    pub fn add_fixation(&mut self, labels: &[usize], dofs: &[Dof]) -> FeaResult<()> {
        for &label in labels {
            for &dof in dofs {
                let key = (label, dof.index());
                if self.rdof.contains(key) {
                    continue;
                }
                let number = self.active_number(label, dof)?;
                self.nodes[label].fixed[dof.index()] = true;
                self.fdof.remove(key);
                self.rdof.insert(key, number);
            }
        }
        self.rebuild_selection();
        Ok(())
    }

    /// Attach grounded springs; one stiffness value per DOF, shared by all
    /// listed nodes
    pub fn add_spring(&mut self, labels: &[usize], dofs: &[Dof], values: &[f64]) -> FeaResult<()> {
        for &label in labels {
            for (&dof, &value) in dofs.iter().zip(values) {
                let number = self.active_number(label, dof)?;
                self.springs.push(label, dof.index(), number, value);
            }
        }
        Ok(())
    }

    /// Attach lumped masses; one value per DOF, shared by all listed nodes
    pub fn add_mass(&mut self, labels: &[usize], dofs: &[Dof], values: &[f64]) -> FeaResult<()> {
        for &label in labels {
            for (&dof, &value) in dofs.iter().zip(values) {
                let number = self.active_number(label, dof)?;
                self.masses.push(label, dof.index(), number, value);
            }
        }
        Ok(())
    }

    /// Apply time-dependent point forces; restrained DOFs are skipped
    pub fn add_force(
        &mut self,
        labels: &[usize],
        dofs: &[Dof],
        series: &[TimeSeries],
    ) -> FeaResult<()> {
        for &label in labels {
            for (&dof, ts) in dofs.iter().zip(series) {
                let key = (label, dof.index());
                if self.rdof.contains(key) {
                    continue;
                }
                if self.ldof.contains(key) {
                    warn!("Node {label} {dof:?} is already loaded; skipping duplicate");
                    continue;
                }
                let number = self.active_number(label, dof)?;
                self.loads.push(ts.clone());
                self.ldof.insert(key, number);
            }
        }
        self.rebuild_selection();
        Ok(())
    }

    /// Rebuild Sp, the (|fdof| x |ldof|) gather of loaded DOFs into the
    /// free-DOF space
    fn rebuild_selection(&mut self) {
        let rows = self.fdof.len();
        let cols = self.ldof.len();
        let row_of: HashMap<usize, usize> = self
            .fdof
            .numbers()
            .iter()
            .enumerate()
            .map(|(row, &num)| (num, row))
            .collect();

        let mut coo = CooMatrix::new(rows, cols);
        for (col, &num) in self.ldof.numbers().iter().enumerate() {
            if let Some(&row) = row_of.get(&num) {
                coo.push(row, col, 1.0);
            }
        }
        self.selection = CsrMatrix::from(&coo);
    }

    /// Assembled global stiffness including the spring diagonal
    pub fn stiffness_matrix(&self) -> FeaResult<CsrMatrix<f64>> {
        assemble(self, |element| element.stiffness(&self.nodes), &self.springs)
    }

    /// Assembled global mass including the lumped-mass diagonal
    pub fn mass_matrix(&self) -> FeaResult<CsrMatrix<f64>> {
        assemble(self, |element| element.mass(&self.nodes), &self.masses)
    }
}

/// Assemble a global matrix from per-element contributions plus a lumped
/// diagonal
///
/// Elements are processed in label order in bounded batches; each batch is
/// scattered into a COO buffer, converted to CSR and accumulated.
pub fn assemble<F>(
    model: &Model,
    mut local: F,
    extras: &LumpedTable,
) -> FeaResult<CsrMatrix<f64>>
where
    F: FnMut(&Element) -> FeaResult<DMatrix<f64>>,
{
    let m = model.dof_count();
    let mut full = CsrMatrix::zeros(m, m);

    for chunk in model.elements.chunks(ASSEMBLY_BATCH) {
        let footprint: usize = chunk
            .iter()
            .map(|e| e.kind.dof_count() * e.kind.dof_count())
            .sum();
        let mut builder = SparseMatrixBuilder::with_capacity(m, footprint);
        for element in chunk {
            let matrix = local(element)?;
            let dofs = element.global_dofs(&model.nodes)?;
            builder.add_element_matrix(&dofs, &matrix);
        }
        full = &full + &builder.to_csr();
    }

    if !extras.is_empty() {
        let mut builder = SparseMatrixBuilder::with_capacity(m, extras.len());
        for (&number, &value) in extras.numbers.iter().zip(&extras.values) {
            builder.add(number, number, value);
        }
        full = &full + &builder.to_csr();
    }

    Ok(full)
}
