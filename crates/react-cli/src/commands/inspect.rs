use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use reactpp::core::models::record::OutputRecord;
use reactpp::core::units::EnergyUnit;
use reactpp::workflows::{self, report};
use std::fmt::{self, Write as _};
use tracing::info;

pub async fn run(args: InspectArgs) -> Result<()> {
    info!("Inspecting {:?}", &args.path);
    let path = args.path.clone();
    let record = tokio::task::spawn_blocking(move || workflows::inspect::run(&path))
        .await
        .map_err(|e| CliError::Other(anyhow::anyhow!("Inspection task failed: {}", e)))??;

    let summary = summarize(&record, args.unit)
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to format summary: {}", e)))?;
    println!("{}", summary);

    if let Some(destination) = &args.write_xyz {
        workflows::inspect::export_final_geometry(&record, &args.path, destination)?;
        println!("✓ Final geometry written to: {}", destination.display());
    }
    Ok(())
}

/// Human-readable summary of a record. Energies are shown in Hartree, and also in
/// `unit` when one other than Hartree is requested.
fn summarize(
    record: &OutputRecord,
    unit: Option<EnergyUnit>,
) -> std::result::Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "Program:      {}", record.software)?;

    match record.energy {
        Some(e) => {
            write!(out, "Energy:       {:.8} Hartree", e)?;
            if let Some(unit) = unit.filter(|u| *u != EnergyUnit::Hartree) {
                write!(out, " ({:.4} {})", unit.convert(e), unit)?;
            }
            out.push('\n');
        }
        None => out.push_str("Energy:       not found\n"),
    }

    let convergence = match record.converged {
        Some(true) => "converged",
        Some(false) => "NOT converged",
        None => "not an optimization",
    };
    writeln!(
        out,
        "Optimization: {} ({} SCF cycles, {} geometries)",
        convergence,
        record.trace.scf_energies.len(),
        record.geometries.len()
    )?;
    if let Some(solvent) = &record.solvent {
        writeln!(out, "Solvent:      {}", solvent)?;
    }
    if let (Some(charge), Some(multiplicity)) = (record.charge, record.multiplicity) {
        writeln!(out, "Charge/Mult:  {} / {}", charge, multiplicity)?;
    }

    if record.has_frequencies() {
        let corrections = [
            ("Zero-point", record.zero_point()),
            ("dE(thermal)", record.thermal_de()),
            ("dH(thermal)", record.thermal_dh()),
            ("dG(thermal)", record.thermal_dg()),
        ];
        for (label, value) in corrections {
            if let Some(v) = value {
                writeln!(out, "{:<13} {:.6} Hartree", format!("{label}:"), v)?;
            }
        }
        let imaginary = record.imaginary().count();
        if imaginary > 0 {
            writeln!(out, "Imaginary:    {}", imaginary)?;
        }
        out.push('\n');
        out.push_str(&report::frequency_listing(record));
    } else {
        out.push_str("Frequencies:  none");
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactpp::core::models::record::{Software, ThermalCorrections, Vibration};

    #[test]
    fn summary_of_a_single_point() {
        let record = OutputRecord::new(Software::Orca).with_energy(-76.5);
        let text = summarize(&record, Some(EnergyUnit::KcalPerMol)).unwrap();
        assert!(text.contains("Program:      ORCA"));
        assert!(text.contains("-76.50000000 Hartree (-48004.5150 kcal/mol)"));
        assert!(text.contains("not an optimization"));
        assert!(text.ends_with("Frequencies:  none"));
    }

    #[test]
    fn summary_lists_frequencies_with_their_sign() {
        let record = OutputRecord::new(Software::Gaussian)
            .with_energy(-76.4)
            .with_solvent("Water")
            .with_thermal(ThermalCorrections {
                zero_point: Some(0.021),
                energy: Some(0.024),
                enthalpy: Some(0.025),
                gibbs: Some(0.0035),
            })
            .with_vibrations(vec![
                Vibration {
                    frequency: 1634.75,
                    ir_intensity: 71.53,
                },
                Vibration {
                    frequency: -412.7,
                    ir_intensity: 120.5,
                },
            ]);
        let text = summarize(&record, None).unwrap();
        assert!(text.contains("Solvent:      Water"));
        assert!(text.contains("dG(thermal):  0.003500 Hartree"));
        assert!(text.contains("Imaginary:    1"));
        assert!(text.contains(" -412.7000   120.5000"));
        assert!(!text.contains("kcal/mol"));
    }

    #[test]
    fn summary_of_an_empty_record_reports_missing_values() {
        let record = OutputRecord::new(Software::Gaussian);
        let text = summarize(&record, Some(EnergyUnit::KjPerMol)).unwrap();
        assert!(text.contains("Energy:       not found\n"));
        assert!(text.contains("(0 SCF cycles, 0 geometries)"));
        assert!(!text.contains("Charge/Mult"));
    }
}
