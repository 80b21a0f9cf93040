//! CSV export for download. Flat labeled rows; never parsed back.

use crate::error::OptimizerError;
use crate::harvester::HarvestOpportunity;
use crate::redemption::TaxImplication;
use crate::summary::TaxOptimizationSummary;
use std::io::Write;

/// One row per implication, camelCase headers
pub fn write_implications_csv<W: Write>(
    writer: W,
    implications: &[TaxImplication],
) -> Result<(), OptimizerError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for implication in implications {
        csv_writer.serialize(implication)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// One row per harvesting opportunity, camelCase headers
pub fn write_harvest_csv<W: Write>(
    writer: W,
    opportunities: &[HarvestOpportunity],
) -> Result<(), OptimizerError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for opportunity in opportunities {
        csv_writer.serialize(opportunity)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// `Label,Value` rows for the headline figures followed by recommendations
pub fn write_summary_csv<W: Write>(
    writer: W,
    summary: &TaxOptimizationSummary,
) -> Result<(), OptimizerError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Label", "Value"])?;

    let rows = [
        ("As of", summary.as_of.to_string()),
        ("Total Invested", format!("{:.2}", summary.total_invested)),
        ("Current Value", format!("{:.2}", summary.total_current_value)),
        ("Unrealized Gain", format!("{:.2}", summary.total_unrealized_gain)),
        ("Long-Term Gains", format!("{:.2}", summary.total_ltcg)),
        ("Short-Term Gains", format!("{:.2}", summary.total_stcg)),
        ("Taxable Gain", format!("{:.2}", summary.total_taxable_gain)),
        ("Total Tax", format!("{:.2}", summary.total_tax)),
        ("Exemption Used", format!("{:.2}", summary.exemption_used)),
        ("Exemption Remaining", format!("{:.2}", summary.exemption_remaining)),
        (
            "Harvestable Losses",
            format!("{:.2}", summary.harvest_summary.total_harvestable_losses),
        ),
        (
            "Potential Harvest Savings",
            format!("{:.2}", summary.harvest_summary.total_potential_savings),
        ),
    ];
    for (label, value) in rows.iter() {
        csv_writer.write_record([*label, value.as_str()])?;
    }
    for recommendation in &summary.recommendations {
        csv_writer.write_record(["Recommendation", recommendation.as_str()])?;
    }

    csv_writer.flush()?;
    Ok(())
}
