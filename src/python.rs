use crate::config::{EngineConfig, ThresholdsConfig};
use crate::core::sweep::{self, outcome_row, SweepBounds, ROW_COLUMNS};
use crate::core::{CollisionOutcome, ImpactType, SimParams, SwingSimulation};
use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_impact(name: &str) -> PyResult<ImpactType> {
    match name.to_ascii_lowercase().as_str() {
        "frontal" => Ok(ImpactType::Frontal),
        "concentrated" => Ok(ImpactType::Concentrated),
        other => Err(py_err(format!(
            "impact must be 'frontal' or 'concentrated', got '{other}'"
        ))),
    }
}

fn parse_profile(name: Option<&str>) -> PyResult<ThresholdsConfig> {
    match name.map(|s| s.to_ascii_lowercase()) {
        None => Ok(ThresholdsConfig::from_env_or_default()),
        Some(s) if s == "csa" || s == "csa_z614" => Ok(ThresholdsConfig::csa_z614()),
        Some(s) if s == "pediatric" || s == "child" => Ok(ThresholdsConfig::pediatric()),
        Some(s) => Err(py_err(format!("unknown threshold profile '{s}'"))),
    }
}

fn outcome_dict<'py>(py: Python<'py>, o: &CollisionOutcome) -> PyResult<Bound<'py, PyDict>> {
    let d = PyDict::new(py);
    d.set_item("tick", o.tick)?;
    d.set_item("time", o.time_s)?;
    d.set_item("angles_deg", (o.angle1_deg, o.angle2_deg))?;
    d.set_item("masses_kg", (o.mass1_kg, o.mass2_kg))?;
    d.set_item("velocities", (o.velocity1, o.velocity2))?;
    d.set_item("velocities_after", (o.velocity1_after, o.velocity2_after))?;
    d.set_item("relative_velocity", o.relative_velocity)?;
    d.set_item("reduced_mass", o.reduced_mass_kg)?;
    d.set_item("force", o.force_n)?;
    d.set_item("surface_cm2", o.surface_cm2)?;
    d.set_item("pressure_mpa", o.pressure_mpa)?;
    d.set_item("acceleration", o.acceleration_ms2)?;
    d.set_item("peak_acceleration", o.peak_acceleration_ms2)?;
    d.set_item("hic", o.hic)?;
    d.set_item("is_safe", o.is_safe())?;

    let risk = PyDict::new(py);
    risk.set_item("decapitation", o.risk.decapitation.display_name())?;
    risk.set_item("cervical_fracture", o.risk.cervical_fracture.display_name())?;
    risk.set_item("concussion", o.risk.concussion.display_name())?;
    d.set_item("risk", risk)?;

    let diagnostics: Vec<String> = o.diagnostics.iter().map(|x| x.to_string()).collect();
    d.set_item("diagnostics", diagnostics)?;
    Ok(d)
}

/// Python-facing wrapper around one swing collision run.
///
/// API:
/// - __new__(age=3, max_height=1.5, mass1=40.0, mass2=40.0, v_init1=0.0, v_init2=0.0,
///           impact="concentrated", profile=None)
/// - reset(...), start(), stop(), is_running(), tick(dt=None) -> dict | None
/// - angles() / angular_velocities() -> (swing1, swing2)
/// - max_angle(height), sweep(n, seed=None) -> np.ndarray
#[pyclass]
pub struct SwingSim {
    sim: SwingSimulation,
}

#[pymethods]
impl SwingSim {
    /// Create an idle run.
    ///
    /// Parameters
    /// - age: child age in years (1 to 5)
    /// - max_height: release height of both platforms (m)
    /// - mass1, mass2: masses on each swing (lbs)
    /// - v_init1, v_init2: extra push toward the centre (m/s)
    /// - impact: "frontal" or "concentrated"
    /// - profile: thresholds preset ("csa" or "pediatric"); None reads the environment
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (
        age=3, max_height=1.5, mass1=40.0, mass2=40.0,
        v_init1=0.0, v_init2=0.0, impact="concentrated", profile=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        age: u8,
        max_height: f64,
        mass1: f64,
        mass2: f64,
        v_init1: f64,
        v_init2: f64,
        impact: &str,
        profile: Option<&str>,
    ) -> PyResult<Self> {
        let params = SimParams {
            age,
            max_height_m: max_height,
            mass1_lbs: mass1,
            mass2_lbs: mass2,
            v_init1,
            v_init2,
            impact_type: parse_impact(impact)?,
        };
        let config = EngineConfig {
            thresholds: parse_profile(profile)?,
            ..EngineConfig::default()
        };
        let sim = SwingSimulation::new(params, config).map_err(py_err)?;
        Ok(Self { sim })
    }

    /// Reinitialise both swings. Omitted arguments keep their current value.
    #[pyo3(signature = (
        age=None, max_height=None, mass1=None, mass2=None,
        v_init1=None, v_init2=None, impact=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn reset(
        &mut self,
        age: Option<u8>,
        max_height: Option<f64>,
        mass1: Option<f64>,
        mass2: Option<f64>,
        v_init1: Option<f64>,
        v_init2: Option<f64>,
        impact: Option<&str>,
    ) -> PyResult<()> {
        let cur = *self.sim.params();
        let params = SimParams {
            age: age.unwrap_or(cur.age),
            max_height_m: max_height.unwrap_or(cur.max_height_m),
            mass1_lbs: mass1.unwrap_or(cur.mass1_lbs),
            mass2_lbs: mass2.unwrap_or(cur.mass2_lbs),
            v_init1: v_init1.unwrap_or(cur.v_init1),
            v_init2: v_init2.unwrap_or(cur.v_init2),
            impact_type: match impact {
                Some(name) => parse_impact(name)?,
                None => cur.impact_type,
            },
        };
        self.sim.reset_state(params).map_err(py_err)?;
        Ok(())
    }

    /// Start the run. Returns False if the collision already happened (reset first).
    fn start(&mut self) -> bool {
        self.sim.start()
    }

    fn stop(&mut self) {
        self.sim.stop()
    }

    fn is_running(&self) -> bool {
        self.sim.is_running()
    }

    /// Advance one frame. Returns the collision outcome as a dict on the collision tick.
    #[pyo3(signature = (dt=None))]
    fn tick(&mut self, py: Python<'_>, dt: Option<f64>) -> PyResult<Option<Py<PyDict>>> {
        let outcome = py.detach(|| self.sim.tick(dt)).map_err(py_err)?;
        match outcome {
            Some(o) => Ok(Some(outcome_dict(py, &o)?.unbind())),
            None => Ok(None),
        }
    }

    /// Current swing angles in degrees.
    fn angles(&self) -> (f64, f64) {
        let (a, b) = self.sim.pendulums();
        (a.theta.to_degrees(), b.theta.to_degrees())
    }

    /// Current angular velocities in rad/s.
    fn angular_velocities(&self) -> (f64, f64) {
        let (a, b) = self.sim.pendulums();
        (a.omega, b.omega)
    }

    fn time(&self) -> f64 {
        self.sim.time()
    }

    fn collision_occurred(&self) -> bool {
        self.sim.collision_occurred()
    }

    /// Release angle (degrees) for a platform raised to `height` metres.
    fn max_angle(&self, height: f64) -> PyResult<f64> {
        self.sim.compute_max_angle(height).map_err(py_err)
    }

    /// Run `n` random parameter sets in parallel (releases the GIL).
    ///
    /// Returns an (n, 11) float64 array; see `columns()` for the column order.
    /// Outcome columns are NaN for runs without a collision or with invalid parameters.
    #[pyo3(signature = (n, seed=None))]
    fn sweep(&self, py: Python<'_>, n: usize, seed: Option<u64>) -> PyResult<Py<PyArray2<f64>>> {
        let config = self.sim.config().clone();
        let mut bounds = SweepBounds::default();
        bounds.max_height_m.1 = bounds.max_height_m.1.min(config.swing.length_m);
        let rows = py
            .detach(|| -> crate::error::Result<Vec<[f64; 11]>> {
                let params = sweep::sample_params(n, &bounds, seed)?;
                let results = sweep::run_batch(&params, &config);
                Ok(params
                    .iter()
                    .zip(results)
                    .map(|(p, r)| outcome_row(p, r.ok().flatten().as_ref()))
                    .collect())
            })
            .map_err(py_err)?;
        let mut arr = Array2::<f64>::zeros((rows.len(), ROW_COLUMNS.len()));
        for (i, row) in rows.iter().enumerate() {
            for (k, v) in row.iter().enumerate() {
                arr[[i, k]] = *v;
            }
        }
        Ok(arr.into_pyarray(py).to_owned().into())
    }

    /// Column names of the `sweep` array.
    #[staticmethod]
    fn columns() -> Vec<&'static str> {
        ROW_COLUMNS.to_vec()
    }
}

/// The swingsim Python module entry point.
#[pymodule]
fn swingsim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<SwingSim>()?;
    Ok(())
}
