pub const TO_KELVIN: f64 = 273.15;
pub const KM_TO_M: f64 = 1000.0;
pub const KM_TO_CM: f64 = 1.0e5;
pub const MIO: f64 = 1_000_000.0;
pub const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;
pub const SECONDS_PER_MYR: f64 = SECONDS_PER_YEAR * MIO;

// Thermal diffusivity used by the closed-form cooling models (m²/s)
pub const HALFSPACE_DIFFUSIVITY_M2_S: f64 = 1.0e-6;

// Defaults for thermal policies
pub const DEFAULT_SURFACE_TEMP_C: f64 = 0.0;
pub const DEFAULT_MANTLE_TEMP_C: f64 = 1350.0;
pub const DEFAULT_PLATE_AGE_MYR: f64 = 60.0;
pub const DEFAULT_SPREADING_VELOCITY_CM_YR: f64 = 3.0;
pub const DEFAULT_ADIABAT_K_PER_KM: f64 = 0.5;
pub const DEFAULT_LITHOSPHERE_AGE_MYR: f64 = 120.0;
pub const DEFAULT_UPPER_FLUX_W_M2: f64 = 50.0e-3;
pub const DEFAULT_LOWER_FLUX_W_M2: f64 = 10.0e-3;
pub const DEFAULT_DT_SAFETY_FACTOR: f64 = 0.9;
pub const DEFAULT_PROFILE_SAMPLES: usize = 201;

// Iteration count above which the diffusion solver logs a warning
pub const LARGE_ITERATION_COUNT: usize = 50_000_000;
