//! Demo driver: a slender simply-supported strip run through all three
//! analyses, with results written to the working directory.
//!
//! Run with: cargo run --bin beam-demo

use std::path::Path;

use anyhow::{Context, Result};
use nalgebra::DMatrix;

use quadfem::prelude::*;
use quadfem::{io, results};

/// Build a length x height strip meshed with nel_x x nel_y Quad4 elements.
/// Nodes are generated column by column, bottom to top.
fn build_strip(
    length: f64,
    height: f64,
    nel_x: usize,
    nel_y: usize,
    thickness: f64,
    e: f64,
    nu: f64,
    rho: f64,
) -> Model {
    let dx = length / nel_x as f64;
    let dy = height / nel_y as f64;

    let mut nodes = Vec::with_capacity((nel_x + 1) * (nel_y + 1));
    for i in 0..=nel_x {
        for r in 0..=nel_y {
            let mut node = Node::new(i as f64 * dx, -height / 2.0 + r as f64 * dy, 0.0);
            node.activate(&[Dof::X, Dof::Y]);
            nodes.push(node);
        }
    }

    let rule = QuadratureRule::quadrilateral(2).expect("tabulated rule");
    let material = LinearElastic::new(e, nu, rho);
    let stride = nel_y + 1;
    let mut elements = Vec::with_capacity(nel_x * nel_y);
    for i in 0..nel_x {
        for r in 0..nel_y {
            let j = i * stride + r;
            let connectivity = vec![j, j + stride, j + stride + 1, j + 1];
            elements.push(
                Element::new(
                    connectivity,
                    ElementKind::Quad4,
                    vec![material.clone(); 4],
                    vec![thickness; 4],
                    rule.clone(),
                )
                .expect("consistent element data"),
            );
        }
    }

    Model::new(nodes, elements)
}

fn main() -> Result<()> {
    env_logger::init();

    let job = JobDefinition::from_json(
        r#"{
            "name": "beam-demo",
            "model_index": 0,
            "thickness": 0.1,
            "damage": 0.0,
            "material": [[1.8e11, 0.3, 10.0]],
            "boundary1": [[1e15, 1e15, 20.0]],
            "boundary2": [[1e15, 1e15, 20.0]],
            "boundary3": [[1e15, 1e15, 20.0]],
            "corrosion_wastage": [[0.0, 0.5]],
            "temperature": [[10.0, 0.5]],
            "analysis": "Modal",
            "modal_settings": {"modes": 8, "normalization": "Mass"},
            "th_settings": {"alpha": 0.002, "beta": 1e-4, "period": 2.0,
                            "increment": 0.005, "load_case": 1}
        }"#,
    )
    .context("parsing the demo job record")?;

    let (length, height) = (20.0, 0.6);
    let (nel_x, nel_y) = (100, 4);
    let stride = nel_y + 1;
    let [e, nu, _temp] = job.material[0];

    let mut model = build_strip(length, height, nel_x, nel_y, job.thickness, e, nu, 2000.0);
    println!(
        "Strip model: {} nodes, {} elements, {} DOFs",
        model.node_count(),
        model.element_count(),
        model.dof_count()
    );

    // Simple supports at the bottom corners: y at both ends, x at the left
    let right = nel_x * stride;
    model.add_fixation(&[0], &[Dof::X, Dof::Y])?;
    model.add_fixation(&[right], &[Dof::Y])?;

    // Elastic vertical support near mid-span, from the job boundary table
    let [_, ky, _] = job.boundary2[0];
    let mid_bottom = (nel_x / 2) * stride;
    model.add_spring(&[mid_bottom], &[Dof::Y], &[ky * 1e-9])?;

    // Sensors: top-fibre nodes at the quarter points
    let sensor_labels: Vec<usize> = [nel_x / 4, nel_x / 2, 3 * nel_x / 4]
        .iter()
        .map(|&i| i * stride + nel_y)
        .collect();
    let sensors = SensorSet::new(&model, &sensor_labels)?;
    io::write_sensor_nodes(Path::new("Output_nodes.dat"), &model, &sensors)?;

    // Modal analysis
    let settings = job.modal_settings.as_ref().expect("modal job");
    let modal = ModalAnalysis::new(&model)
        .with_modes(settings.modes)
        .with_normalization(settings.normalization)
        .solve()?;
    println!("First frequencies (Hz):");
    for (i, f) in modal.frequencies.iter().take(4).enumerate() {
        println!("  mode {}: {:10.4}", i + 1, f);
    }
    io::write_frequencies(
        Path::new(&format!("{}_frequencies.dat", job.name)),
        &modal.frequencies,
    )?;
    let shapes = modal.modes.as_ref().expect("shapes requested");
    let sensor_modes = results::select_rows(shapes, sensors.dof_numbers());
    io::write_modes(
        Path::new(&format!("{}_modes.dat", job.name)),
        &sensors,
        &sensor_modes,
    )?;

    // Transient analysis: a short triangular pulse at mid-span, bottom fibre
    let th = job.th_settings.as_ref().expect("time-history settings");
    model.set_damping_coefficients(th.alpha, th.beta);
    let pulse = TimeSeries::new(vec![0.0, 0.05, 0.1, th.period], vec![0.0, 1e3, 0.0, 0.0])?;
    model.add_force(&[mid_bottom], &[Dof::Y], &[pulse])?;

    let transient = TransientAnalysis::new(&model)
        .with_period(th.period)
        .with_increment(th.increment)
        .with_modes(settings.modes)
        .solve()?;

    let displacements = results::sensor_displacements(&transient, &sensors);
    let accelerations = results::sensor_accelerations(&transient, &sensors);
    let strains = results::transient_strains(&model, &transient, &sensors)?;

    io::write_table(
        Path::new(&format!("{}_displacements.dat", job.name)),
        &io::response_header(sensors.labels(), &["Ux", "Uy"]),
        &displacements,
    )?;
    io::write_table(
        Path::new(&format!("{}_accelerations.dat", job.name)),
        &io::response_header(sensors.labels(), &["Ax", "Ay"]),
        &accelerations,
    )?;
    io::write_table(
        Path::new(&format!("{}_strains.dat", job.name)),
        &io::response_header(sensors.labels(), &["Exx", "Eyy", "Exy"]),
        &strains,
    )?;

    // Static check: a constant point load at the quarter point
    let quarter_bottom = (nel_x / 4) * stride;
    model.add_force(
        &[quarter_bottom],
        &[Dof::Y],
        &[TimeSeries::constant(30.0, -1e3)],
    )?;
    let statics = StaticAnalysis::new(&model).solve()?;
    let u = results::static_sensor_displacements(&statics, &sensors);
    let table = DMatrix::from_row_slice(1, u.len(), u.as_slice());
    io::write_table(
        Path::new(&format!("{}_static.dat", job.name)),
        &io::response_header(sensors.labels(), &["Ux", "Uy"]),
        &table,
    )?;

    println!(
        "Peak mid-span deflection over the history: {:.4e} m",
        displacements
            .column(3)
            .iter()
            .fold(0.0_f64, |a, &b| a.max(b.abs()))
    );
    println!("Wrote Output_nodes.dat and {}_*.dat", job.name);

    Ok(())
}
