use s7hwcfg::config::runtime::RuntimeConfig;
use s7hwcfg::model::{NodeView, Station};
use s7hwcfg::{logging, pipeline, HwConfig};
use std::env;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = RuntimeConfig::default();
    logging::init_global_logging_with(config.logging.clone())?;

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <station.cfg> [--json]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let json = parse_json_flag(&args[2..]);
    let input_path = Path::new(&args[1]);

    match pipeline::process_file_with_config(input_path, &config) {
        Ok(parsed) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                print_topology(&parsed);
                print_diagnostics(&parsed);
            }
            logging::print_cargo_style_summary();
        }
        Err(error) => {
            eprintln!("\nFAILED: {}", error);
            print_detailed_error(&error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("s7hwcfg v{}", env!("CARGO_PKG_VERSION"));
    println!("STEP 7 hardware configuration export parser");
    println!();
    println!("USAGE:");
    println!("    {} <station.cfg> [--json]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help    Show this help message");
    println!("    --json    Print the resolved station as JSON");
    println!();
    println!("ENVIRONMENT:");
    println!("    S7HWCFG_REQUIRE_CFG_EXTENSION            Reject files without .cfg extension");
    println!("    S7HWCFG_RESOLUTION_LOG_PASS_DETAILS      Log every section per pass");
    println!("    S7HWCFG_RESOLUTION_LOG_UNKNOWN_SECTIONS  Log ignored sections");
    println!("    S7HWCFG_LOGGING_MIN_LEVEL                error | warn | info | debug");
    println!();
    println!("{}", s7hwcfg::config::build_info::source_info());
}

fn parse_json_flag(args: &[String]) -> bool {
    let mut json = false;
    for arg in args {
        match arg.as_str() {
            "--json" => json = true,
            _ => eprintln!("Warning: Unknown option '{}'", arg),
        }
    }
    json
}

fn print_topology(config: &HwConfig) {
    let station = &config.station;
    println!("{}", station);
    println!("  File version: {}", config.header.file_version);

    for rack in station.racks().values() {
        println!("  Rack {} \"{}\" ({})", rack.number, rack.name, rack.order_number);
        for module in rack.slots.values() {
            print!("    Slot {:>2}: {}", module.slot, module.ident.name);
            if let Some(membership) = module.membership {
                print!("  [{}]", membership);
            }
            println!();
            for subslot in module.subslots.values() {
                print!("      Sub-slot {}: {}", subslot.subslot, subslot.ident.name);
                if let Some(membership) = subslot.membership {
                    print!("  [{}]", membership);
                }
                println!();
            }
        }
    }

    for subsystem in station.subsystems().values() {
        println!(
            "  Subsystem {} \"{}\" ({})",
            subsystem.number, subsystem.name, subsystem.subnet_type
        );
        for (address, _) in subsystem.nodes() {
            let name = describe_node(station, subsystem.number, address);
            println!("    Address {:>3}: {}", address, name);
        }
    }

    let summary = station.summary();
    println!(
        "\n{} racks, {} modules, {} subsystems, {} bus racks, {} bus nodes",
        summary.racks,
        summary.modules,
        summary.subsystems,
        summary.subsystem_racks,
        summary.bus_nodes
    );
    println!("{}", config.stats.summary());
}

fn describe_node(station: &Station, subsystem: u32, address: u32) -> String {
    match station.resolve_node(subsystem, address) {
        Some(NodeView::SubsystemRack(rack)) => {
            let modules: Vec<String> = rack
                .slots
                .values()
                .map(|module| format!("{}:{}", module.slot, module.ident.name))
                .collect();
            format!("{} [{}]", rack.designation(), modules.join(", "))
        }
        Some(node) => format!("{} ({})", node.name(), node.order_number()),
        None => "<unresolved>".to_string(),
    }
}

fn print_diagnostics(config: &HwConfig) {
    if config.diagnostics.is_empty() {
        return;
    }
    println!();
    for diagnostic in &config.diagnostics {
        println!("{}", diagnostic);
    }
}

fn print_detailed_error(error: &pipeline::PipelineError) {
    match error {
        pipeline::PipelineError::FileProcessing(ref file_err) => {
            eprintln!("File processing stage failed [{}]:", file_err.error_code());
            eprintln!("  {}", file_err);
        }
        pipeline::PipelineError::FileFormat(ref format_err) => {
            eprintln!("File structure is invalid [{}]:", format_err.error_code());
            eprintln!("  {}", format_err);
        }
        pipeline::PipelineError::SectionFormat(ref section_err) => {
            eprintln!(
                "Section at {} could not be resolved [{}]:",
                section_err.span(),
                section_err.error_code()
            );
            eprintln!("  {}", section_err.header());
            eprintln!("  {}", section_err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_flag() {
        assert!(parse_json_flag(&["--json".to_string()]));
        assert!(!parse_json_flag(&[]));
        assert!(!parse_json_flag(&["--verbose".to_string()]));
    }
}
