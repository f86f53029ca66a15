//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - statevector simulation of small quantum circuits",
        style("Kvant").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  kvant-ir           Circuit builder, gate catalog and circuit descriptions");
    println!("  kvant-hal          Backend jobs and result types");
    println!("  kvant-adapter-sim  Statevector engine and shot sampler");
    println!("  kvant-cli          Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
