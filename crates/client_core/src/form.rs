//! Editable recipe inputs, kept as raw text until submission.

use shared::{domain::BrewMethod, error::ValidationError, protocol::BrewRequest};

use crate::ratio::RatioCalculator;

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeForm {
    pub method: BrewMethod,
    pub coffee_dose: String,
    pub water_yield: String,
    pub temperature: String,
    pub brew_time: String,
    pub grind_size: String,
    pub roast_level: String,
}

impl RecipeForm {
    pub fn new(method: BrewMethod) -> Self {
        let mut form = Self {
            method,
            coffee_dose: String::new(),
            water_yield: String::new(),
            temperature: String::new(),
            brew_time: String::new(),
            grind_size: String::new(),
            roast_level: String::new(),
        };
        form.select_method(method);
        form
    }

    /// Switches method and replaces every field with that method's defaults.
    pub fn select_method(&mut self, method: BrewMethod) {
        let defaults = method.defaults();
        self.method = method;
        self.coffee_dose = format_number(defaults.coffee_dose);
        self.water_yield = format_number(defaults.water_yield);
        self.temperature = format_number(defaults.temperature);
        self.brew_time = defaults.brew_time.to_string();
        self.grind_size = defaults.grind_size.to_string();
        self.roast_level = defaults.roast_level.to_string();
    }

    /// Copies the calculator's dose and computed water into the form.
    pub fn apply_ratio(&mut self, calculator: &RatioCalculator) {
        self.coffee_dose = format_number(calculator.dose);
        self.water_yield = format_number(calculator.water());
    }

    pub fn to_request(&self) -> Result<BrewRequest, ValidationError> {
        let coffee_dose = positive("coffee_dose", &self.coffee_dose)?;
        let water_yield = positive("water_yield", &self.water_yield)?;
        let temperature = finite("temperature", &self.temperature)?;
        let brew_time = seconds(&self.brew_time)?;
        let grind_size = required("grind_size", &self.grind_size)?;
        let roast_level = required("roast_level", &self.roast_level)?;

        Ok(BrewRequest {
            method: self.method,
            coffee_dose,
            water_yield,
            temperature,
            brew_time,
            grind_size,
            roast_level,
        })
    }
}

impl Default for RecipeForm {
    fn default() -> Self {
        Self::new(BrewMethod::default())
    }
}

/// Renders `15.0` as `15` and `16.5` as `16.5`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn required(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing { field });
    }
    Ok(trimmed.to_string())
}

fn finite(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let trimmed = required(field, raw)?;
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::NotANumber {
            field,
            raw: trimmed,
        }),
    }
}

fn positive(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let value = finite(field, raw)?;
    if value <= 0.0 {
        return Err(ValidationError::NonPositive { field, value });
    }
    Ok(value)
}

fn seconds(raw: &str) -> Result<u32, ValidationError> {
    let trimmed = required("brew_time", raw)?;
    trimmed
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidTime { raw: trimmed })
}
