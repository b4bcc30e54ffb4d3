//! Budget overrun forecaster
//!
//! Projects year-end (or period-end) spend from the current run rate:
//! `daily_average = current_spent / days_elapsed`, `projected = daily_average *
//! total_days`. No smoothing or seasonality. Zero elapsed days projects zero
//! spend instead of failing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::format::CurrencyFormat;
use crate::models::BudgetState;

/// Forecaster settings
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Period length used when the caller does not supply one
    pub default_total_days: u32,
    /// Template for the overrun message; `{department}`, `{budget}`,
    /// `{projected}` and `{overage}` are replaced with formatted values
    pub over_budget_message: String,
    pub within_budget_message: String,
    pub currency: CurrencyFormat,
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_total_days == 0 {
            return Err(Error::InvalidRule(
                "forecast default_total_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Run-rate projection for one department
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetForecast {
    pub department: String,
    pub current_spent: f64,
    pub total_budget: f64,
    pub days_elapsed: u32,
    pub total_days: u32,
    pub daily_average: f64,
    pub projected_spent: f64,
    pub will_exceed: bool,
    /// Projected spend above budget (0 when within budget)
    pub overage: f64,
    /// Share of the period already observed, in [0, 1]
    pub confidence: f64,
}

/// A forecast together with its rendered alert and the figures behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub forecast: BudgetForecast,
    pub alert_message: String,
    pub evidence: Vec<String>,
}

/// Linear run-rate forecaster
#[derive(Debug, Clone)]
pub struct BudgetForecaster {
    config: ForecastConfig,
}

impl BudgetForecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn forecast(&self, state: &BudgetState) -> BudgetForecast {
        let total_days = state.total_days.unwrap_or(self.config.default_total_days);

        let daily_average = if state.days_elapsed > 0 {
            state.current_spent / f64::from(state.days_elapsed)
        } else {
            0.0
        };
        let projected_spent = daily_average * f64::from(total_days);
        let will_exceed = projected_spent > state.total_budget;
        let overage = if will_exceed {
            projected_spent - state.total_budget
        } else {
            0.0
        };
        let confidence = if total_days > 0 {
            (f64::from(state.days_elapsed) / f64::from(total_days)).min(1.0)
        } else {
            0.0
        };

        debug!(
            department = %state.department,
            daily_average,
            projected_spent,
            will_exceed,
            "Budget forecast computed"
        );

        BudgetForecast {
            department: state.department.clone(),
            current_spent: state.current_spent,
            total_budget: state.total_budget,
            days_elapsed: state.days_elapsed,
            total_days,
            daily_average,
            projected_spent,
            will_exceed,
            overage,
            confidence,
        }
    }

    /// Render the alert message for a forecast
    pub fn message(&self, forecast: &BudgetForecast) -> String {
        if !forecast.will_exceed {
            return self.config.within_budget_message.clone();
        }

        let currency = &self.config.currency;
        self.config
            .over_budget_message
            .replace("{department}", &forecast.department)
            .replace("{budget}", &currency.format(forecast.total_budget))
            .replace("{projected}", &currency.format(forecast.projected_spent))
            .replace("{overage}", &currency.format(forecast.overage))
    }

    /// Forecast, alert message and evidence in one pass
    pub fn report(&self, state: &BudgetState) -> BudgetReport {
        let forecast = self.forecast(state);
        let alert_message = self.message(&forecast);
        let evidence = vec![
            format!("daily_average={}", forecast.daily_average),
            format!("projected_spent={}", forecast.projected_spent),
            format!("total_budget={}", forecast.total_budget),
            format!("days_elapsed={}/{}", forecast.days_elapsed, forecast.total_days),
        ];
        BudgetReport {
            forecast,
            alert_message,
            evidence,
        }
    }
}
