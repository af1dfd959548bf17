//! Constants used throughout the MediChain core crate.
//!
//! This module collects the fixed values the portal relies on so they are defined once.

/// Coins credited to a patient each time a prescription is added for them.
pub const HEALTH_COINS_PER_PRESCRIPTION: u64 = 10;

/// Seconds in one day, used to turn timestamp spans into day counts.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Prescriptions-per-day rate above which the trend is reported as increasing.
pub const INCREASING_RATE_THRESHOLD: f64 = 1.0;

/// Prescriptions-per-day rate below which the trend is reported as decreasing.
pub const DECREASING_RATE_THRESHOLD: f64 = 0.5;

/// A diagnosis group with more prescriptions than this is flagged as high significance.
pub const HIGH_SIGNIFICANCE_MIN_EXCLUSIVE: usize = 3;

/// Systolic reading (mmHg) at or above which a high blood pressure alert is raised.
pub const SYSTOLIC_ALERT_MMHG: u32 = 140;

/// Diastolic reading (mmHg) at or above which a high blood pressure alert is raised.
pub const DIASTOLIC_ALERT_MMHG: u32 = 90;

/// Blood sugar reading (mg/dL) at or above which a high blood sugar alert is raised.
pub const BLOOD_SUGAR_ALERT_MG_DL: f64 = 180.0;

/// Body temperature (°F) at or above which a fever alert is raised.
pub const FEVER_ALERT_FAHRENHEIT: f64 = 100.4;

/// Default hosted inference endpoint.
pub const DEFAULT_INFERENCE_API_URL: &str = "https://api-inference.huggingface.co";

/// Default text-generation model for the health advisor.
pub const DEFAULT_INFERENCE_MODEL: &str = "google/flan-t5-xl";

/// Maximum number of tokens requested from the text-generation model.
pub const ADVISOR_MAX_NEW_TOKENS: u32 = 500;

/// Sampling temperature requested from the text-generation model.
pub const ADVISOR_TEMPERATURE: f32 = 0.7;

/// Nucleus sampling cutoff requested from the text-generation model.
pub const ADVISOR_TOP_P: f32 = 0.95;

/// The single message shown to users when the advisor cannot answer.
pub const ADVISOR_FAILURE_MESSAGE: &str =
    "An error occurred while processing your request. Please try again.";

/// Departments a patient may book an appointment with.
pub const DEPARTMENTS: [&str; 11] = [
    "General",
    "Cardiology",
    "Dermatology",
    "ENT",
    "Gastroenterology",
    "Neurology",
    "Oncology",
    "Orthopedics",
    "Pediatrics",
    "Psychiatry",
    "Urology",
];
