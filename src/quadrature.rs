//! Gauss quadrature tables over the reference integration domains
//!
//! Every rule is a table of sample points and weights in the natural
//! (or barycentric) coordinates of its domain. Tensor-product domains
//! (line, quadrilateral, hexahedron) carry one weight per axis, so a
//! quadrilateral row reads `r1 r2 w1 w2` and the element loop multiplies
//! `w1 * w2`. Simplex domains carry a single weight column.

use nalgebra::DMatrix;

use crate::error::{FeaError, FeaResult};

/// Reference integration domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Line,
    Triangle,
    Quadrilateral,
    Tetrahedron,
    Hexahedron,
}

impl Domain {
    pub fn name(&self) -> &'static str {
        match self {
            Domain::Line => "line",
            Domain::Triangle => "triangle",
            Domain::Quadrilateral => "quadrilateral",
            Domain::Tetrahedron => "tetrahedron",
            Domain::Hexahedron => "hexahedron",
        }
    }
}

/// A tabulated quadrature rule: row-aligned sample points and weights
#[derive(Debug, Clone)]
pub struct QuadratureRule {
    points: DMatrix<f64>,
    weights: DMatrix<f64>,
}

impl QuadratureRule {
    fn from_rows(dim: usize, wdim: usize, points: Vec<f64>, weights: Vec<f64>) -> Self {
        let n = points.len() / dim;
        debug_assert_eq!(weights.len() / wdim, n);
        Self {
            points: DMatrix::from_row_slice(n, dim, &points),
            weights: DMatrix::from_row_slice(n, wdim, &weights),
        }
    }

    /// Dispatching constructor over the domain tag
    pub fn gauss(domain: Domain, rule: i32) -> FeaResult<Self> {
        match domain {
            Domain::Line => Self::line(rule),
            Domain::Triangle => Self::triangle(rule),
            Domain::Quadrilateral => Self::quadrilateral(rule),
            Domain::Tetrahedron => Self::tetrahedron(rule),
            Domain::Hexahedron => Self::hexahedron(rule),
        }
    }

    /// Number of sample points
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// Spatial dimension of the sample points
    pub fn dim(&self) -> usize {
        self.points.ncols()
    }

    /// Sample point coordinates, row-major (p x dim)
    pub fn points(&self) -> &DMatrix<f64> {
        &self.points
    }

    /// Per-axis weights, row-major (p x dim for tensor products, p x 1 otherwise)
    pub fn weights(&self) -> &DMatrix<f64> {
        &self.weights
    }

    /// Combined weight of sample point `i` (product over the axes)
    pub fn weight(&self, i: usize) -> f64 {
        self.weights.row(i).iter().product()
    }

    /// Gauss rule on the line [-1, 1]
    ///
    /// Rules 1..=5 integrate polynomials up to degree 1, 3, 5, 7, 9.
    pub fn line(rule: i32) -> FeaResult<Self> {
        let (points, weights) = match rule {
            1 => (vec![0.0], vec![2.0]),
            2 => {
                let p = 3.0_f64.sqrt() / 3.0;
                (vec![p, -p], vec![1.0, 1.0])
            }
            3 => {
                let p = (3.0_f64 / 5.0).sqrt();
                (vec![-p, 0.0, p], vec![5.0 / 9.0, 8.0 / 9.0, 5.0 / 9.0])
            }
            4 => {
                let p1 = (525.0 + 70.0 * 30.0_f64.sqrt()).sqrt() / 35.0;
                let p2 = (525.0 - 70.0 * 30.0_f64.sqrt()).sqrt() / 35.0;
                let w1 = (18.0 - 30.0_f64.sqrt()) / 36.0;
                let w2 = (18.0 + 30.0_f64.sqrt()) / 36.0;
                (vec![-p1, -p2, p2, p1], vec![w1, w2, w2, w1])
            }
            5 => {
                let p1 = (5.0 + 2.0 * (10.0_f64 / 7.0).sqrt()).sqrt() / 3.0;
                let p2 = (5.0 - 2.0 * (10.0_f64 / 7.0).sqrt()).sqrt() / 3.0;
                let w1 = (322.0 - 13.0 * 70.0_f64.sqrt()) / 900.0;
                let w2 = (322.0 + 13.0 * 70.0_f64.sqrt()) / 900.0;
                (
                    vec![-p1, -p2, 0.0, p1, p2],
                    vec![w1, w2, 128.0 / 225.0, w1, w2],
                )
            }
            _ => {
                return Err(FeaError::InvalidRule {
                    domain: Domain::Line.name(),
                    rule,
                })
            }
        };
        Ok(Self::from_rows(1, 1, points, weights))
    }

    /// Gauss rule on the unit triangle, barycentric coordinates
    ///
    /// Rule 1 is the centroid rule, 3 the interior three-point rule,
    /// -3 the midpoint variant and 7 Radon's degree-5 formula.
    pub fn triangle(rule: i32) -> FeaResult<Self> {
        match rule {
            1 => Ok(Self::from_rows(
                3,
                1,
                vec![1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
                vec![1.0],
            )),
            3 => {
                let (p1, p2) = (1.0 / 6.0, 2.0 / 3.0);
                Ok(Self::from_rows(
                    3,
                    1,
                    vec![p2, p1, p1, p1, p2, p1, p1, p1, p2],
                    vec![1.0 / 3.0; 3],
                ))
            }
            -3 => Ok(Self::from_rows(
                3,
                1,
                vec![0.0, 0.5, 0.5, 0.5, 0.0, 0.5, 0.5, 0.5, 0.0],
                vec![1.0 / 3.0; 3],
            )),
            7 => {
                let p0 = 1.0 / 3.0;
                let s15 = 15.0_f64.sqrt();
                let p1 = (6.0 + s15) / 21.0;
                let p2 = (6.0 - s15) / 21.0;
                let p3 = (9.0 + 2.0 * s15) / 21.0;
                let p4 = (9.0 - 2.0 * s15) / 21.0;
                let w0 = 9.0 / 40.0;
                let w1 = (155.0 + s15) / 1200.0;
                let w2 = (155.0 - s15) / 1200.0;
                Ok(Self::from_rows(
                    2,
                    1,
                    vec![p0, p0, p1, p4, p1, p1, p4, p1, p3, p2, p2, p3, p2, p2],
                    vec![w0, w1, w1, w1, w2, w2, w2],
                ))
            }
            _ => Err(FeaError::InvalidRule {
                domain: Domain::Triangle.name(),
                rule,
            }),
        }
    }

    /// Gauss rule on the quadrilateral [-1, 1]^2, per-axis weights
    ///
    /// Rule 2 (2x2) lists its points in the Quad4 corner order and is the
    /// workhorse for Quad4 stiffness and mass; rule 3 (3x3) covers Quad8
    /// and Quad9.
    pub fn quadrilateral(rule: i32) -> FeaResult<Self> {
        match rule {
            1 => Ok(Self::from_rows(2, 2, vec![0.0, 0.0], vec![2.0, 2.0])),
            2 => {
                let p = 3.0_f64.sqrt() / 3.0;
                Ok(Self::from_rows(
                    2,
                    2,
                    vec![p, p, -p, p, -p, -p, p, -p],
                    vec![1.0; 8],
                ))
            }
            3 => {
                let p = (3.0_f64 / 5.0).sqrt();
                let w0 = 8.0 / 9.0;
                let w1 = 5.0 / 9.0;
                #[rustfmt::skip]
                let points = vec![
                     p,  p,
                    -p, -p,
                    -p,  p,
                     p, -p,
                    0.0, p,
                    -p, 0.0,
                    0.0, -p,
                     p, 0.0,
                    0.0, 0.0,
                ];
                #[rustfmt::skip]
                let weights = vec![
                    w1, w1,
                    w1, w1,
                    w1, w1,
                    w1, w1,
                    w0, w1,
                    w1, w0,
                    w0, w1,
                    w1, w0,
                    w0, w0,
                ];
                Ok(Self::from_rows(2, 2, points, weights))
            }
            4 => {
                let (points, weights) = perimeter_pattern_16();
                Ok(Self::from_rows(2, 2, points, weights))
            }
            5 => {
                let (points, weights) = lattice_pattern_25();
                Ok(Self::from_rows(2, 2, points, weights))
            }
            _ => Err(FeaError::InvalidRule {
                domain: Domain::Quadrilateral.name(),
                rule,
            }),
        }
    }

    /// Gauss rule on the unit tetrahedron, barycentric coordinates
    pub fn tetrahedron(rule: i32) -> FeaResult<Self> {
        match rule {
            1 => Ok(Self::from_rows(4, 1, vec![0.25; 4], vec![1.0])),
            4 => {
                let p1 = (5.0 - 5.0_f64.sqrt()) / 20.0;
                let p2 = (5.0 + 3.0 * 5.0_f64.sqrt()) / 20.0;
                Ok(Self::from_rows(
                    4,
                    1,
                    vertex_orbit(p2, p1),
                    vec![0.25; 4],
                ))
            }
            8 => {
                let s17 = 17.0_f64.sqrt();
                let p1 = (55.0 - 3.0 * s17 + (1022.0 - 134.0 * s17).sqrt()) / 196.0;
                let p2 = (55.0 - 3.0 * s17 - (1022.0 - 134.0 * s17).sqrt()) / 196.0;
                let wr = ((1715161837.0 - 406006699.0 * s17) / 23101.0).sqrt() / 3120.0;
                let w1 = 0.125 + wr;
                let w2 = 0.125 - wr;
                let mut points = vertex_orbit(1.0 - 3.0 * p1, p1);
                points.extend(vertex_orbit(1.0 - 3.0 * p2, p2));
                Ok(Self::from_rows(
                    4,
                    1,
                    points,
                    vec![w1, w1, w1, w1, w2, w2, w2, w2],
                ))
            }
            -8 => {
                // Vertices and face centres as sample points
                let mut points = vertex_orbit(1.0, 0.0);
                points.extend(vertex_orbit(0.0, 1.0 / 3.0));
                let (w1, w2) = (1.0 / 40.0, 9.0 / 40.0);
                Ok(Self::from_rows(
                    4,
                    1,
                    points,
                    vec![w1, w1, w1, w1, w2, w2, w2, w2],
                ))
            }
            15 => {
                let s15 = 15.0_f64.sqrt();
                let p1 = (7.0 - s15) / 34.0;
                let p2 = 7.0 / 17.0 - p1;
                let p3 = (10.0 - 2.0 * s15) / 40.0;
                let w1 = (2665.0 + 14.0 * s15) / 37800.0;
                let w2 = (2665.0 - 14.0 * s15) / 37800.0;
                let w3 = 10.0 / 189.0;
                let mut points = vertex_orbit(1.0 - 3.0 * p1, p1);
                points.extend(vertex_orbit(1.0 - 3.0 * p2, p2));
                points.extend(edge_orbit(p3));
                points.extend_from_slice(&[0.25; 4]);
                let mut weights = vec![w1, w1, w1, w1, w2, w2, w2, w2];
                weights.extend(vec![w3; 6]);
                weights.push(16.0 / 135.0);
                Ok(Self::from_rows(4, 1, points, weights))
            }
            -15 => {
                let p1 = (13.0 - 91.0_f64.sqrt()) / 52.0;
                let (p2, p3) = (1.0 / 3.0, 1.0 / 11.0);
                let w1 = 81.0 / 2240.0;
                let w2 = 161051.0 / 2304960.0;
                let w3 = 338.0 / 5145.0;
                let mut points = vertex_orbit(0.0, p2);
                points.extend(vertex_orbit(8.0 / 11.0, p3));
                points.extend(edge_orbit(p1));
                points.extend_from_slice(&[0.25; 4]);
                let mut weights = vec![w1, w1, w1, w1, w2, w2, w2, w2];
                weights.extend(vec![w3; 6]);
                weights.push(6544.0 / 36015.0);
                Ok(Self::from_rows(4, 1, points, weights))
            }
            24 => {
                // Degree-6 rule: three vertex orbits plus the 12-point orbit
                // built from (3-sqrt5)/12, (5+sqrt5)/12 and (1+sqrt5)/12.
                let g1 = 0.214_602_871_259_152;
                let g2 = 0.040_673_958_534_611;
                let g3 = 0.322_337_890_142_276;
                let w1 = 0.039_922_750_257_87;
                let w2 = 0.010_077_211_055_321;
                // The three vertex-orbit weights sum to 59/560 exactly
                let w3 = 59.0 / 560.0 - w1 - w2;
                let s5 = 5.0_f64.sqrt();
                let p = (3.0 - s5) / 12.0;
                let pj = (5.0 + s5) / 12.0;
                let pk = (1.0 + s5) / 12.0;
                let w4 = 27.0 / 560.0;
                let mut points = vertex_orbit(1.0 - 3.0 * g1, g1);
                points.extend(vertex_orbit(1.0 - 3.0 * g2, g2));
                points.extend(vertex_orbit(1.0 - 3.0 * g3, g3));
                #[rustfmt::skip]
                points.extend_from_slice(&[
                    pj, pk, p,  p,
                    pj, p,  pk, p,
                    pj, p,  p,  pk,
                    p,  pj, pk, p,
                    p,  pj, p,  pk,
                    p,  p,  pj, pk,
                    pk, pj, p,  p,
                    pk, p,  pj, p,
                    pk, p,  p,  pj,
                    p,  pk, pj, p,
                    p,  pk, p,  pj,
                    p,  p,  pk, pj,
                ]);
                let mut weights = Vec::with_capacity(24);
                for w in [w1, w2, w3] {
                    weights.extend(vec![w; 4]);
                }
                weights.extend(vec![w4; 12]);
                Ok(Self::from_rows(4, 1, points, weights))
            }
            _ => Err(FeaError::InvalidRule {
                domain: Domain::Tetrahedron.name(),
                rule,
            }),
        }
    }

    /// Gauss rule on the hexahedron [-1, 1]^3, per-axis weights
    ///
    /// Rules 3..=5 are slice-major tensor products of the matching
    /// two-dimensional patterns over the 1D Gauss abscissae.
    pub fn hexahedron(rule: i32) -> FeaResult<Self> {
        match rule {
            1 => Ok(Self::from_rows(
                3,
                3,
                vec![0.0, 0.0, 0.0],
                vec![2.0, 2.0, 2.0],
            )),
            2 => {
                let p = 3.0_f64.sqrt() / 3.0;
                #[rustfmt::skip]
                let points = vec![
                    -p, -p, -p,
                     p, -p, -p,
                     p,  p, -p,
                    -p,  p, -p,
                    -p, -p,  p,
                     p, -p,  p,
                     p,  p,  p,
                    -p,  p,  p,
                ];
                Ok(Self::from_rows(3, 3, points, vec![1.0; 24]))
            }
            3 => {
                let p = (3.0_f64 / 5.0).sqrt();
                let w0 = 8.0 / 9.0;
                let w1 = 5.0 / 9.0;
                // Centre-first ring pattern per slice
                #[rustfmt::skip]
                let pattern = [
                    (0.0, 0.0, w0, w0),
                    ( -p,  -p, w1, w1),
                    (0.0,  -p, w0, w1),
                    (  p,  -p, w1, w1),
                    (  p, 0.0, w1, w0),
                    (  p,   p, w1, w1),
                    (0.0,   p, w0, w1),
                    ( -p,   p, w1, w1),
                    ( -p, 0.0, w1, w0),
                ];
                let (points, weights) = stack_slices(&pattern, &[(-p, w1), (0.0, w0), (p, w1)]);
                Ok(Self::from_rows(3, 3, points, weights))
            }
            4 => {
                let (pts, wts) = perimeter_pattern_16();
                let pattern = zip_pattern(&pts, &wts);
                let p1 = (525.0 + 70.0 * 30.0_f64.sqrt()).sqrt() / 35.0;
                let p2 = (525.0 - 70.0 * 30.0_f64.sqrt()).sqrt() / 35.0;
                let w1 = (18.0 - 30.0_f64.sqrt()) / 36.0;
                let w2 = (18.0 + 30.0_f64.sqrt()) / 36.0;
                let slices = [(-p1, w1), (-p2, w2), (p2, w2), (p1, w1)];
                let (points, weights) = stack_slices(&pattern, &slices);
                Ok(Self::from_rows(3, 3, points, weights))
            }
            5 => {
                let (pts, wts) = lattice_pattern_25();
                let pattern = zip_pattern(&pts, &wts);
                let p1 = (5.0 + 2.0 * (10.0_f64 / 7.0).sqrt()).sqrt() / 3.0;
                let p2 = (5.0 - 2.0 * (10.0_f64 / 7.0).sqrt()).sqrt() / 3.0;
                let w0 = 128.0 / 225.0;
                let w1 = (322.0 - 13.0 * 70.0_f64.sqrt()) / 900.0;
                let w2 = (322.0 + 13.0 * 70.0_f64.sqrt()) / 900.0;
                let slices = [(-p1, w1), (-p2, w2), (0.0, w0), (p2, w2), (p1, w1)];
                let (points, weights) = stack_slices(&pattern, &slices);
                Ok(Self::from_rows(3, 3, points, weights))
            }
            _ => Err(FeaError::InvalidRule {
                domain: Domain::Hexahedron.name(),
                rule,
            }),
        }
    }
}

/// Barycentric orbit (a, b, b, b) and its three rotations
fn vertex_orbit(a: f64, b: f64) -> Vec<f64> {
    #[rustfmt::skip]
    let orbit = vec![
        a, b, b, b,
        b, a, b, b,
        b, b, a, b,
        b, b, b, a,
    ];
    orbit
}

/// Barycentric orbit (1/2-p, 1/2-p, p, p) over the six edge pairings
fn edge_orbit(p: f64) -> Vec<f64> {
    let q = 0.5 - p;
    #[rustfmt::skip]
    let orbit = vec![
        q, q, p, p,
        q, p, q, p,
        q, p, p, q,
        p, q, q, p,
        p, q, p, q,
        p, p, q, q,
    ];
    orbit
}

/// The 16-point degree-7 pattern: perimeter counter-clockwise, inner square last
fn perimeter_pattern_16() -> (Vec<f64>, Vec<f64>) {
    let p1 = (525.0 + 70.0 * 30.0_f64.sqrt()).sqrt() / 35.0;
    let p2 = (525.0 - 70.0 * 30.0_f64.sqrt()).sqrt() / 35.0;
    let w1 = (18.0 - 30.0_f64.sqrt()) / 36.0;
    let w2 = (18.0 + 30.0_f64.sqrt()) / 36.0;
    #[rustfmt::skip]
    let points = vec![
        -p1, -p1,
        -p2, -p1,
         p2, -p1,
         p1, -p1,
         p1, -p2,
         p1,  p2,
         p1,  p1,
         p2,  p1,
        -p2,  p1,
        -p1,  p1,
        -p1,  p2,
        -p1, -p2,
        -p2, -p2,
         p2, -p2,
         p2,  p2,
        -p2,  p2,
    ];
    #[rustfmt::skip]
    let weights = vec![
        w1, w1,
        w2, w1,
        w2, w1,
        w1, w1,
        w1, w2,
        w1, w2,
        w1, w1,
        w2, w1,
        w2, w1,
        w1, w1,
        w1, w2,
        w1, w2,
        w2, w2,
        w2, w2,
        w2, w2,
        w2, w2,
    ];
    (points, weights)
}

/// The 25-point degree-9 pattern: row-major over [-p1, -p2, 0, p2, p1]
fn lattice_pattern_25() -> (Vec<f64>, Vec<f64>) {
    let p1 = (5.0 + 2.0 * (10.0_f64 / 7.0).sqrt()).sqrt() / 3.0;
    let p2 = (5.0 - 2.0 * (10.0_f64 / 7.0).sqrt()).sqrt() / 3.0;
    let w0 = 128.0 / 225.0;
    let w1 = (322.0 - 13.0 * 70.0_f64.sqrt()) / 900.0;
    let w2 = (322.0 + 13.0 * 70.0_f64.sqrt()) / 900.0;
    let abscissae = [(-p1, w1), (-p2, w2), (0.0, w0), (p2, w2), (p1, w1)];
    let mut points = Vec::with_capacity(50);
    let mut weights = Vec::with_capacity(50);
    for &(y, wy) in &abscissae {
        for &(x, wx) in &abscissae {
            points.extend_from_slice(&[x, y]);
            weights.extend_from_slice(&[wx, wy]);
        }
    }
    (points, weights)
}

fn zip_pattern(points: &[f64], weights: &[f64]) -> Vec<(f64, f64, f64, f64)> {
    points
        .chunks(2)
        .zip(weights.chunks(2))
        .map(|(p, w)| (p[0], p[1], w[0], w[1]))
        .collect()
}

/// Replicate a 2D pattern over z-slices, slice-major
fn stack_slices(
    pattern: &[(f64, f64, f64, f64)],
    slices: &[(f64, f64)],
) -> (Vec<f64>, Vec<f64>) {
    let n = pattern.len() * slices.len();
    let mut points = Vec::with_capacity(3 * n);
    let mut weights = Vec::with_capacity(3 * n);
    for &(z, wz) in slices {
        for &(x, y, wx, wy) in pattern {
            points.extend_from_slice(&[x, y, z]);
            weights.extend_from_slice(&[wx, wy, wz]);
        }
    }
    (points, weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Integrate x^i * y^j * ... over the tensor-product domain
    fn integrate<F: Fn(&[f64]) -> f64>(rule: &QuadratureRule, f: F) -> f64 {
        (0..rule.len())
            .map(|i| {
                let row: Vec<f64> = rule.points().row(i).iter().copied().collect();
                rule.weight(i) * f(&row)
            })
            .sum()
    }

    #[test]
    fn line_rule_sizes() {
        for (rule, n) in [(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)] {
            let q = QuadratureRule::line(rule).unwrap();
            assert_eq!(q.len(), n);
            assert_relative_eq!(integrate(&q, |_| 1.0), 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn line_rules_are_degree_exact() {
        // Rule r integrates monomials up to degree 2r - 1 exactly
        for rule in 1..=5 {
            let q = QuadratureRule::line(rule).unwrap();
            for degree in 0..(2 * rule as u32) {
                let exact = if degree % 2 == 0 {
                    2.0 / (degree as f64 + 1.0)
                } else {
                    0.0
                };
                let value = integrate(&q, |x| x[0].powi(degree as i32));
                assert_relative_eq!(value, exact, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn quadrilateral_rule_two_reproduces_quadratic() {
        // int int (r1^2 + r2^2) over [-1,1]^2 = 8/3
        let q = QuadratureRule::quadrilateral(2).unwrap();
        let value = integrate(&q, |x| x[0] * x[0] + x[1] * x[1]);
        assert_relative_eq!(value, 8.0 / 3.0, epsilon = 1e-12);

        for rule in 3..=5 {
            let q = QuadratureRule::quadrilateral(rule).unwrap();
            let value = integrate(&q, |x| x[0] * x[0] + x[1] * x[1]);
            assert_relative_eq!(value, 8.0 / 3.0, epsilon = 1e-12);
        }

        // The one-point rule annihilates the quadratic
        let q = QuadratureRule::quadrilateral(1).unwrap();
        let value = integrate(&q, |x| x[0] * x[0] + x[1] * x[1]);
        assert_relative_eq!(value, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn quadrilateral_rule_two_matches_corner_order() {
        let q = QuadratureRule::quadrilateral(2).unwrap();
        let p = 3.0_f64.sqrt() / 3.0;
        let signs = [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)];
        for (i, (sx, sy)) in signs.iter().enumerate() {
            assert_relative_eq!(q.points()[(i, 0)], sx * p, epsilon = 1e-15);
            assert_relative_eq!(q.points()[(i, 1)], sy * p, epsilon = 1e-15);
        }
    }

    #[test]
    fn quadrilateral_high_rules_are_degree_exact() {
        for (rule, degree) in [(4, 7_i32), (5, 9_i32)] {
            let q = QuadratureRule::quadrilateral(rule).unwrap();
            assert_relative_eq!(integrate(&q, |_| 1.0), 4.0, epsilon = 1e-12);
            let top = degree - 1; // highest even degree below `degree`
            let exact_top = 2.0 / (top as f64 + 1.0) * 2.0;
            assert_relative_eq!(
                integrate(&q, |x| x[0].powi(top)),
                exact_top,
                epsilon = 1e-12
            );
            assert_relative_eq!(
                integrate(&q, |x| x[1].powi(top)),
                exact_top,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn triangle_weights_sum_to_one() {
        for rule in [1, 3, -3, 7] {
            let q = QuadratureRule::triangle(rule).unwrap();
            let total: f64 = (0..q.len()).map(|i| q.weight(i)).sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn triangle_barycentric_points_are_consistent() {
        for rule in [1, 3, -3] {
            let q = QuadratureRule::triangle(rule).unwrap();
            for i in 0..q.len() {
                let sum: f64 = q.points().row(i).iter().sum();
                assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn tetrahedron_weights_sum_to_one() {
        for rule in [1, 4, 8, -8, 15, -15, 24] {
            let q = QuadratureRule::tetrahedron(rule).unwrap();
            let total: f64 = (0..q.len()).map(|i| q.weight(i)).sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-12, max_relative = 1e-12);
        }
    }

    #[test]
    fn tetrahedron_points_lie_in_the_simplex() {
        for rule in [1, 4, 8, -8, 15, -15, 24] {
            let q = QuadratureRule::tetrahedron(rule).unwrap();
            for i in 0..q.len() {
                let sum: f64 = q.points().row(i).iter().sum();
                assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn hexahedron_rules_integrate_volume() {
        for (rule, n) in [(1, 1), (2, 8), (3, 27), (4, 64), (5, 125)] {
            let q = QuadratureRule::hexahedron(rule).unwrap();
            assert_eq!(q.len(), n);
            assert_relative_eq!(integrate(&q, |_| 1.0), 8.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn hexahedron_rule_three_is_degree_five() {
        let q = QuadratureRule::hexahedron(3).unwrap();
        // int x^2 y^2 z^2 over [-1,1]^3 = (2/3)^3
        let value = integrate(&q, |x| x[0] * x[0] * x[1] * x[1] * x[2] * x[2]);
        assert_relative_eq!(value, 8.0 / 27.0, epsilon = 1e-12);
        let value = integrate(&q, |x| x[0].powi(4) * x[1] * x[1]);
        assert_relative_eq!(value, (2.0 / 5.0) * (2.0 / 3.0) * 2.0, epsilon = 1e-12);
    }

    #[test]
    fn unknown_rules_are_rejected() {
        assert!(matches!(
            QuadratureRule::line(0),
            Err(FeaError::InvalidRule { domain: "line", .. })
        ));
        assert!(QuadratureRule::triangle(6).is_err());
        assert!(QuadratureRule::quadrilateral(7).is_err());
        assert!(QuadratureRule::tetrahedron(14).is_err());
        assert!(QuadratureRule::hexahedron(-2).is_err());
        assert!(QuadratureRule::gauss(Domain::Quadrilateral, 99).is_err());
    }
}
