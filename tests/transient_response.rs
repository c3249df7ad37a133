//! Transient impulse response of the strip: the ring-down after a short
//! pulse must oscillate at the fundamental natural frequency.

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

/// Dominant frequency from the mean distance between downward zero
/// crossings
fn dominant_frequency(time: &[f64], signal: &[f64], from: f64) -> f64 {
    let mut crossings = Vec::new();
    for j in 1..signal.len() {
        if time[j] < from {
            continue;
        }
        if signal[j - 1] > 0.0 && signal[j] <= 0.0 {
            // Linear interpolation of the crossing instant
            let t = time[j - 1]
                + (time[j] - time[j - 1]) * signal[j - 1] / (signal[j - 1] - signal[j]);
            crossings.push(t);
        }
    }
    assert!(
        crossings.len() >= 3,
        "too few zero crossings ({})",
        crossings.len()
    );
    let periods: Vec<f64> = crossings.windows(2).map(|w| w[1] - w[0]).collect();
    let mean = periods.iter().sum::<f64>() / periods.len() as f64;
    1.0 / mean
}

#[test]
fn impulse_ring_down_oscillates_at_the_fundamental_frequency() {
    let nel_x = 60;
    let nel_y = 4;
    let stride = nel_y + 1;
    let mid_bottom = (nel_x / 2) * stride;
    let mid_top = mid_bottom + nel_y;

    let mut model = build_strip(nel_x, nel_y);
    model.add_fixation(&[0], &[Dof::X, Dof::Y]).unwrap();
    model.add_fixation(&[nel_x * stride], &[Dof::Y]).unwrap();
    model.set_damping_coefficients(0.0, 0.0);

    // 0.1 s triangular pulse at mid-span
    let pulse = TimeSeries::new(vec![0.0, 0.05, 0.1, 2.0], vec![0.0, 1e3, 0.0, 0.0]).unwrap();
    model.add_force(&[mid_bottom], &[Dof::Y], &[pulse]).unwrap();

    let period = 2.0;
    let increment = 1e-3;
    let result = TransientAnalysis::new(&model)
        .with_period(period)
        .with_increment(increment)
        .with_modes(5)
        .solve()
        .unwrap();

    assert_eq!(result.time.len(), 2001);
    assert_eq!(result.displacement.nrows(), 5);
    assert_eq!(result.displacement.ncols(), result.time.len());

    let sensors = SensorSet::new(&model, &[mid_top]).unwrap();
    let displacements = results::sensor_displacements(&result, &sensors);
    let uy: Vec<f64> = (0..displacements.nrows())
        .map(|j| displacements[(j, 1)])
        .collect();

    // Free vibration after the pulse is dominated by mode 1
    let f_est = dominant_frequency(&result.time, &uy, 0.3);
    let f1 = result.frequencies[0];
    let error = (f_est - f1).abs() / f1;
    assert!(
        error < 0.05,
        "ring-down frequency {f_est:.3} Hz vs fundamental {f1:.3} Hz"
    );

    // The pulse must actually have moved the beam
    let peak = uy.iter().fold(0.0_f64, |a, &b| a.max(b.abs()));
    assert!(peak > 1e-7, "no measurable response ({peak:.3e} m)");
}

#[test]
fn rayleigh_damping_attenuates_the_ring_down() {
    let nel_x = 40;
    let nel_y = 4;
    let stride = nel_y + 1;
    let mid_bottom = (nel_x / 2) * stride;

    let run = |alpha: f64, beta: f64| -> f64 {
        let mut model = build_strip(nel_x, nel_y);
        model.add_fixation(&[0], &[Dof::X, Dof::Y]).unwrap();
        model.add_fixation(&[nel_x * stride], &[Dof::Y]).unwrap();
        model.set_damping_coefficients(alpha, beta);
        let pulse =
            TimeSeries::new(vec![0.0, 0.05, 0.1, 4.0], vec![0.0, 1e3, 0.0, 0.0]).unwrap();
        model.add_force(&[mid_bottom], &[Dof::Y], &[pulse]).unwrap();

        let result = TransientAnalysis::new(&model)
            .with_period(4.0)
            .with_increment(2e-3)
            .with_modes(3)
            .solve()
            .unwrap();

        // Peak modal displacement over the last quarter of the history
        let start = 3 * result.displacement.ncols() / 4;
        (start..result.displacement.ncols())
            .map(|j| result.displacement[(0, j)].abs())
            .fold(0.0_f64, f64::max)
    };

    let undamped_tail = run(0.0, 0.0);
    let damped_tail = run(1.0, 1e-4);
    assert!(
        damped_tail < 0.5 * undamped_tail,
        "damping did not attenuate: {damped_tail:.3e} vs {undamped_tail:.3e}"
    );
}

#[test]
fn transient_strain_histories_have_the_sensor_layout() {
    let nel_x = 20;
    let nel_y = 2;
    let stride = nel_y + 1;
    let mid_bottom = (nel_x / 2) * stride;

    let mut model = build_strip(nel_x, nel_y);
    model.add_fixation(&[0], &[Dof::X, Dof::Y]).unwrap();
    model.add_fixation(&[nel_x * stride], &[Dof::Y]).unwrap();
    let pulse = TimeSeries::new(vec![0.0, 0.05, 0.1, 1.0], vec![0.0, 1e3, 0.0, 0.0]).unwrap();
    model.add_force(&[mid_bottom], &[Dof::Y], &[pulse]).unwrap();

    let result = TransientAnalysis::new(&model)
        .with_period(1.0)
        .with_increment(5e-3)
        .with_modes(3)
        .solve()
        .unwrap();

    let sensor_labels = [5 * stride + 1, 10 * stride + 1, 15 * stride + 1];
    let sensors = SensorSet::new(&model, &sensor_labels).unwrap();
    let strains = results::transient_strains(&model, &result, &sensors).unwrap();

    assert_eq!(strains.nrows(), result.time.len());
    assert_eq!(strains.ncols(), 3 * sensors.len());

    // The mid-span sensor sees a non-trivial axial strain history
    let peak = (0..strains.nrows())
        .map(|j| strains[(j, 3)].abs())
        .fold(0.0_f64, f64::max);
    assert!(peak > 1e-10, "strain history is identically zero");
}
