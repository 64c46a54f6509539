use clap::Subcommand;
use rust_decimal::Decimal;
use serde_json::json;

use crate::cli::utils::output_value;
use crate::cli::OutputFormat;
use crate::locale::{format_currency, normalize_locale_param, Region};
use crate::site::calculator::{AffordabilityInput, MortgageInput};
use crate::site::{affordability, mortgage_payment};

#[derive(Subcommand)]
pub enum CalcCommands {
    #[command(about = "Monthly payment on a fully amortizing mortgage")]
    Mortgage {
        #[arg(long, help = "Loan principal")]
        principal: Decimal,
        #[arg(long, help = "Annual interest rate in percent")]
        rate: Decimal,
        #[arg(long, default_value_t = 25, help = "Amortization in years")]
        years: u32,
        #[arg(long, default_value = "global", help = "Region for currency display")]
        region: String,
    },

    #[command(about = "Maximum purchase price under the debt service limits")]
    Affordability {
        #[arg(long, help = "Gross annual household income")]
        income: Decimal,
        #[arg(long, default_value_t = Decimal::ZERO, help = "Other monthly debt payments")]
        debts: Decimal,
        #[arg(long, default_value_t = Decimal::ZERO, help = "Monthly property tax, heating and fees")]
        housing_costs: Decimal,
        #[arg(long, default_value_t = Decimal::ZERO, help = "Down payment")]
        down_payment: Decimal,
        #[arg(long, help = "Annual interest rate in percent")]
        rate: Decimal,
        #[arg(long, default_value_t = 25, help = "Amortization in years")]
        years: u32,
        #[arg(long, default_value = "global", help = "Region for currency display")]
        region: String,
    },
}

pub fn handle(cmd: CalcCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CalcCommands::Mortgage { principal, rate, years, region } => {
            let region = normalize_locale_param(&region);
            let quote = mortgage_payment(&MortgageInput {
                principal,
                annual_rate: rate,
                amortization_years: years,
            })?;

            let money = |amount| display(output_format, region, amount);
            output_value(
                output_format,
                &json!({
                    "monthly_payment": money(quote.monthly_payment),
                    "payments": quote.payments,
                    "total_paid": money(quote.total_paid),
                    "total_interest": money(quote.total_interest),
                }),
            )
        }
        CalcCommands::Affordability {
            income,
            debts,
            housing_costs,
            down_payment,
            rate,
            years,
            region,
        } => {
            let region = normalize_locale_param(&region);
            let quote = affordability(&AffordabilityInput {
                annual_income: income,
                monthly_debts: debts,
                monthly_housing_costs: housing_costs,
                down_payment,
                annual_rate: rate,
                amortization_years: years,
            })?;

            let money = |amount| display(output_format, region, amount);
            output_value(
                output_format,
                &json!({
                    "max_monthly_payment": money(quote.max_monthly_payment),
                    "max_loan_amount": money(quote.max_loan_amount),
                    "max_purchase_price": money(quote.max_purchase_price),
                    "gds_limit": money(quote.gds_limit),
                    "tds_limit": money(quote.tds_limit),
                }),
            )
        }
    }
}

/// Raw decimal for JSON output, region currency for text.
fn display(output_format: OutputFormat, region: Region, amount: Decimal) -> serde_json::Value {
    match output_format {
        OutputFormat::Json => json!(amount),
        OutputFormat::Text => json!(format_currency(region, amount)),
    }
}
