//! NIF interface for Elixir
//!
//! Provides Rustler NIFs around a runtime-configured `PwmModule`. Carrier
//! shape, action policy and phase mode are selected at construction time
//! via atom matching; optional arguments take `nil` for their default.

use rustler::{Atom, NifResult, ResourceArc};
use std::sync::{Mutex, MutexGuard};

use crate::actions::{ActionMode, PolicyKind};
use crate::carriers::{CarrierShape, PhaseMode};
use crate::channel::{ParameterUpdate, PwmModule, PwmOutputs};
use crate::config::PwmConfig;
use crate::deadtime::{CompareCommand, DeadTime};

rustler::atoms! {
    ok,
    // Carrier shapes
    triangular,
    sawtooth_up,
    sawtooth_down,
    // Action policies
    threshold,
    set_down_b_clear_up_a,
    set_down_a_clear_up_b,
    // Phase modes
    continuous,
    immediate,
}

fn atom_to_shape(atom: Atom) -> Result<CarrierShape, &'static str> {
    if atom == triangular() {
        Ok(CarrierShape::Triangular)
    } else if atom == sawtooth_up() {
        Ok(CarrierShape::SawtoothUp)
    } else if atom == sawtooth_down() {
        Ok(CarrierShape::SawtoothDown)
    } else {
        Err("unsupported carrier shape")
    }
}

fn atom_to_policy(atom: Atom) -> Result<PolicyKind, &'static str> {
    if atom == threshold() {
        Ok(PolicyKind::Threshold)
    } else if atom == set_down_b_clear_up_a() {
        Ok(PolicyKind::Crossing(ActionMode::SetDownBClearUpA))
    } else if atom == set_down_a_clear_up_b() {
        Ok(PolicyKind::Crossing(ActionMode::SetDownAClearUpB))
    } else {
        Err("unsupported action policy")
    }
}

fn atom_to_phase_mode(atom: Atom) -> Result<PhaseMode, &'static str> {
    if atom == continuous() {
        Ok(PhaseMode::Continuous)
    } else if atom == immediate() {
        Ok(PhaseMode::Immediate)
    } else {
        Err("unsupported phase mode")
    }
}

/// NIF resource wrapper for a PWM module
pub struct PwmResource {
    pub inner: Mutex<PwmModule>,
}

impl PwmResource {
    fn lock(&self) -> NifResult<MutexGuard<'_, PwmModule>> {
        self.inner
            .lock()
            .map_err(|_| rustler::Error::Term(Box::new("lock poisoned")))
    }
}

/// Gate A voltage, gate B voltage, period sync
type StepResult = (f64, f64, bool);

fn step_result(outputs: PwmOutputs) -> StepResult {
    (outputs.gate_a, outputs.gate_b, outputs.period_sync)
}

/// Create a new PWM module
///
/// # Arguments
/// * `frequency` - Switching frequency in Hz
/// * `shape` - Atom: :triangular, :sawtooth_up, :sawtooth_down
/// * `policy` - Atom: :threshold, :set_down_b_clear_up_a, :set_down_a_clear_up_b
/// * `phase_mode` - Atom: :continuous (default) or :immediate
/// * `dead_time` - Symmetric dead time in seconds (default 0)
/// * `phase_offset` - Phase offset in seconds (default 0)
/// * `duty` - Initial duty cycle (default 0)
/// * `sync_enable` - Accept external sync pulses (default false)
#[allow(clippy::too_many_arguments)]
#[rustler::nif]
pub fn pwm_new(
    frequency: f64,
    shape: Atom,
    policy: Atom,
    phase_mode: Option<Atom>,
    dead_time: Option<f64>,
    phase_offset: Option<f64>,
    duty: Option<f64>,
    sync_enable: Option<bool>,
) -> NifResult<ResourceArc<PwmResource>> {
    let shape = atom_to_shape(shape).map_err(|e| rustler::Error::Term(Box::new(e)))?;
    let policy = atom_to_policy(policy).map_err(|e| rustler::Error::Term(Box::new(e)))?;
    let phase_mode = phase_mode
        .map(atom_to_phase_mode)
        .transpose()
        .map_err(|e| rustler::Error::Term(Box::new(e)))?
        .unwrap_or_default();

    let dead_time = dead_time.map_or(DeadTime::None, DeadTime::Symmetric);

    let config = PwmConfig::new(frequency)
        .with_shape(shape)
        .with_policy(policy)
        .with_phase_mode(phase_mode)
        .with_dead_time(dead_time)
        .with_phase_offset(phase_offset.unwrap_or(0.0))
        .with_duty(duty.unwrap_or(0.0))
        .with_sync(sync_enable.unwrap_or(false));

    let module = PwmModule::init(config).map_err(|e| rustler::Error::Term(Box::new(e.to_string())))?;

    Ok(ResourceArc::new(PwmResource {
        inner: Mutex::new(module),
    }))
}

/// Advance to `time` with the stored duty
#[rustler::nif]
pub fn pwm_step(pwm: ResourceArc<PwmResource>, time: f64, sync_in: bool) -> NifResult<StepResult> {
    let mut state = pwm.lock()?;
    Ok(step_result(state.step(time, sync_in)))
}

/// Advance to `time` with dual compare values, which are kept for later steps
#[rustler::nif]
pub fn pwm_step_dual(
    pwm: ResourceArc<PwmResource>,
    time: f64,
    compare_a: f64,
    compare_b: f64,
    sync_in: bool,
) -> NifResult<StepResult> {
    let mut state = pwm.lock()?;
    let command = CompareCommand::Dual {
        a: compare_a,
        b: compare_b,
    };
    Ok(step_result(state.step_with(time, command, sync_in)))
}

/// Advance through a batch of timestamps without external sync
#[rustler::nif]
pub fn pwm_step_many(pwm: ResourceArc<PwmResource>, times: Vec<f64>) -> NifResult<Vec<StepResult>> {
    let mut state = pwm.lock()?;
    Ok(times
        .into_iter()
        .map(|t| step_result(state.step(t, false)))
        .collect())
}

/// Update parameters using the host sentinel convention
///
/// Non-positive frequency, negative dead time, NaN phase and negative duty
/// leave the corresponding parameter unchanged.
#[rustler::nif]
pub fn pwm_update(
    pwm: ResourceArc<PwmResource>,
    frequency: f64,
    dead_time: f64,
    phase_offset: Option<f64>,
    duty: f64,
) -> NifResult<Atom> {
    let update = ParameterUpdate::from_sentinels(
        frequency,
        dead_time,
        phase_offset.unwrap_or(f64::NAN),
        duty,
    );

    let mut state = pwm.lock()?;
    state
        .update_parameters(update)
        .map_err(|e| rustler::Error::Term(Box::new(e.to_string())))?;
    Ok(ok())
}

/// Reset module state, keeping its configuration
#[rustler::nif]
pub fn pwm_reset(pwm: ResourceArc<PwmResource>) -> Atom {
    if let Ok(mut state) = pwm.inner.lock() {
        state.reset();
    }
    ok()
}
