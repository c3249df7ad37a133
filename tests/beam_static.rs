//! Static bending of the simply-supported strip: closed-form deflection,
//! modal superposition consistency and strain recovery.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};
use quadfem::analysis::StaticResult;
use quadfem::prelude::*;
use quadfem::results;

const LENGTH: f64 = 20.0;
const HEIGHT: f64 = 0.6;
const THICKNESS: f64 = 0.1;
const YOUNGS: f64 = 1.8e11;
const POISSON: f64 = 0.3;
const DENSITY: f64 = 2000.0;

fn build_strip(nel_x: usize, nel_y: usize) -> Model {
    let dx = LENGTH / nel_x as f64;
    let dy = HEIGHT / nel_y as f64;

    let mut nodes = Vec::with_capacity((nel_x + 1) * (nel_y + 1));
    for i in 0..=nel_x {
        for r in 0..=nel_y {
            let mut node = Node::new(i as f64 * dx, -HEIGHT / 2.0 + r as f64 * dy, 0.0);
            node.activate(&[Dof::X, Dof::Y]);
            nodes.push(node);
        }
    }

    let rule = QuadratureRule::quadrilateral(2).unwrap();
    let material = LinearElastic::new(YOUNGS, POISSON, DENSITY);
    let stride = nel_y + 1;
    let mut elements = Vec::with_capacity(nel_x * nel_y);
    for i in 0..nel_x {
        for r in 0..nel_y {
            let j = i * stride + r;
            elements.push(
                Element::new(
                    vec![j, j + stride, j + stride + 1, j + 1],
                    ElementKind::Quad4,
                    vec![material.clone(); 4],
                    vec![THICKNESS; 4],
                    rule.clone(),
                )
                .unwrap(),
            );
        }
    }

    Model::new(nodes, elements)
}

fn pin_simply_supported(model: &mut Model, nel_x: usize, nel_y: usize) {
    let stride = nel_y + 1;
    model.add_fixation(&[0], &[Dof::X, Dof::Y]).unwrap();
    model.add_fixation(&[nel_x * stride], &[Dof::Y]).unwrap();
}

#[test]
fn midspan_point_load_matches_the_thin_beam_deflection() {
    let nel_x = 200;
    let nel_y = 6;
    let stride = nel_y + 1;
    let mid_bottom = (nel_x / 2) * stride;

    let mut model = build_strip(nel_x, nel_y);
    pin_simply_supported(&mut model, nel_x, nel_y);

    let load = -1e3;
    model
        .add_force(
            &[mid_bottom],
            &[Dof::Y],
            &[TimeSeries::constant(30.0, load)],
        )
        .unwrap();

    let result = StaticAnalysis::new(&model).solve().unwrap();
    let uy = result.displacement[model.nodes[mid_bottom].number(Dof::Y).unwrap()];

    let inertia = THICKNESS * HEIGHT.powi(3) / 12.0;
    let reference = load * LENGTH.powi(3) / (48.0 * YOUNGS * inertia);
    let error = (uy - reference).abs() / reference.abs();
    assert!(
        error < 0.02,
        "midspan deflection {uy:.6e} vs PL^3/48EI = {reference:.6e} ({:.2}%)",
        100.0 * error
    );

    // Restrained DOFs stay put
    assert_eq!(result.displacement[model.nodes[0].number(Dof::Y).unwrap()], 0.0);
}

#[test]
fn truncated_modal_sum_converges_to_the_direct_solve() {
    let nel_x = 16;
    let nel_y = 2;
    let stride = nel_y + 1;
    let mid_bottom = (nel_x / 2) * stride;

    let mut model = build_strip(nel_x, nel_y);
    pin_simply_supported(&mut model, nel_x, nel_y);
    model
        .add_force(&[mid_bottom], &[Dof::Y], &[TimeSeries::constant(1.0, -1e3)])
        .unwrap();

    let direct = StaticAnalysis::new(&model).solve().unwrap();
    let probe = model.nodes[mid_bottom].number(Dof::Y).unwrap();

    // Static force gathered into the free partition
    let loads = DVector::from_vec(vec![-1e3]);
    let gathered = quadfem::math::sparse::matvec(model.selection(), &loads);

    let free = model.free_dofs();
    let mut errors = Vec::new();
    for &m in &[10, 60] {
        let modal = ModalAnalysis::new(&model)
            .with_modes(m)
            .with_tolerance(1e-10)
            .solve()
            .unwrap();
        let modes = modal.modes.unwrap();
        let vectors = results::select_rows(&modes, free);

        let mut u_free = DVector::zeros(free.len());
        for i in 0..modal.frequencies.len() {
            let phi = vectors.column(i).into_owned();
            let omega_sq = (2.0 * PI * modal.frequencies[i]).powi(2);
            let participation = phi.dot(&gathered) / omega_sq;
            u_free.axpy(participation, &phi, 1.0);
        }

        let mut u_full = DVector::zeros(model.dof_count());
        for (row, &number) in free.iter().enumerate() {
            u_full[number] = u_free[row];
        }
        errors.push((u_full[probe] - direct.displacement[probe]).abs());
    }

    let scale = direct.displacement[probe].abs();
    assert!(
        errors[1] < errors[0],
        "modal truncation error did not shrink: {errors:?}"
    );
    assert!(
        errors[1] / scale < 0.01,
        "60-mode superposition off by {:.3}%",
        100.0 * errors[1] / scale
    );
}

#[test]
fn linear_field_strain_recovery_round_trip() {
    let nel_x = 8;
    let nel_y = 2;
    let stride = nel_y + 1;

    let model = {
        let mut model = build_strip(nel_x, nel_y);
        pin_simply_supported(&mut model, nel_x, nel_y);
        model
    };

    // Impose u = a + b x, v = c + d y directly as a solved state
    let (a, b, c, d) = (1e-3, 4e-4, -2e-3, 7e-4);
    let mut displacement = DVector::zeros(model.dof_count());
    for node in &model.nodes {
        displacement[node.number(Dof::X).unwrap()] = a + b * node.x();
        displacement[node.number(Dof::Y).unwrap()] = c + d * node.y();
    }
    let state = StaticResult { displacement };

    // Interior nodes see every corner of their four incident elements
    let sensor_labels: Vec<usize> = (1..nel_x)
        .map(|i| i * stride + 1)
        .collect();
    let sensors = SensorSet::new(&model, &sensor_labels).unwrap();

    let strains = results::static_strains(&model, &state, &sensors).unwrap();
    assert_eq!(strains.nrows(), 1);
    assert_eq!(strains.ncols(), 3 * sensors.len());
    for k in 0..sensors.len() {
        assert!((strains[(0, 3 * k)] - b).abs() < 1e-10);
        assert!((strains[(0, 3 * k + 1)] - d).abs() < 1e-10);
        assert!(strains[(0, 3 * k + 2)].abs() < 1e-10);
    }
}

#[test]
fn bending_strain_changes_sign_through_the_depth() {
    let nel_x = 40;
    let nel_y = 4;
    let stride = nel_y + 1;
    let mid = nel_x / 2;

    let mut model = build_strip(nel_x, nel_y);
    pin_simply_supported(&mut model, nel_x, nel_y);
    model
        .add_force(
            &[mid * stride],
            &[Dof::Y],
            &[TimeSeries::constant(1.0, -1e3)],
        )
        .unwrap();

    let result = StaticAnalysis::new(&model).solve().unwrap();

    // Bottom fibre stretches, top fibre shortens under a sagging moment
    let quarter = nel_x / 4;
    let bottom = SensorSet::new(&model, &[quarter * stride + 1]).unwrap();
    let top = SensorSet::new(&model, &[quarter * stride + nel_y - 1]).unwrap();
    let eps_bottom = results::static_strains(&model, &result, &bottom).unwrap()[(0, 0)];
    let eps_top = results::static_strains(&model, &result, &top).unwrap()[(0, 0)];

    assert!(eps_bottom > 0.0, "bottom fibre strain {eps_bottom}");
    assert!(eps_top < 0.0, "top fibre strain {eps_top}");
    assert!(
        (eps_bottom + eps_top).abs() < 0.2 * eps_bottom.abs(),
        "strains should be nearly antisymmetric: {eps_bottom} vs {eps_top}"
    );
}
