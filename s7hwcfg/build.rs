// Generates `config::compile_time` from the TOML profile in `<workspace>/config/`
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
struct Profile {
    file_processing: FileProcessing,
    segmentation: Segmentation,
    resolution: Resolution,
    logging: Logging,
}

#[derive(serde::Deserialize)]
struct FileProcessing {
    max_file_size: u64,
    large_file_threshold: u64,
    max_line_count: usize,
}

#[derive(serde::Deserialize)]
struct Segmentation {
    max_sections: usize,
    max_header_lines: usize,
    max_body_lines: usize,
}

#[derive(serde::Deserialize)]
struct Resolution {
    max_diagnostics: usize,
}

#[derive(serde::Deserialize)]
struct Logging {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_file: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=S7HWCFG_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=S7HWCFG_CONFIG_DIR");

    if let Err(message) = run() {
        panic!("s7hwcfg build configuration: {}", message);
    }
}

fn run() -> Result<(), String> {
    let profile_name =
        env::var("S7HWCFG_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("S7HWCFG_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    let path = profile_path(&config_dir, &profile_name)?;
    println!("cargo:rerun-if-changed={}", path.display());

    let text = fs::read_to_string(&path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let profile: Profile =
        toml::from_str(&text).map_err(|e| format!("invalid TOML in {}: {}", path.display(), e))?;

    check_limits(&profile, &profile_name)?;

    let out_dir = env::var("OUT_DIR").map_err(|e| format!("OUT_DIR: {}", e))?;
    fs::write(
        Path::new(&out_dir).join("constants.rs"),
        render(&profile, &profile_name),
    )
    .map_err(|e| format!("cannot write constants.rs: {}", e))
}

/// The config directory sits next to the crate, at the workspace root
fn profile_path(config_dir: &str, profile_name: &str) -> Result<PathBuf, String> {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").map_err(|e| e.to_string())?;
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .ok_or("crate has no parent directory")?;
    let path = workspace_root
        .join(config_dir)
        .join(format!("{}.toml", profile_name));

    if path.exists() {
        Ok(path)
    } else {
        Err(format!("profile not found: {}", path.display()))
    }
}

fn check_limits(profile: &Profile, profile_name: &str) -> Result<(), String> {
    let files = &profile.file_processing;
    if files.max_file_size > 1_000_000_000 {
        return Err("max_file_size exceeds 1 GB".into());
    }
    if files.large_file_threshold > files.max_file_size {
        return Err("large_file_threshold exceeds max_file_size".into());
    }
    if profile_name == "production" && files.max_file_size > 50_000_000 {
        return Err("production max_file_size exceeds 50 MB".into());
    }

    let sections = &profile.segmentation;
    if sections.max_sections == 0 || sections.max_header_lines == 0 || sections.max_body_lines == 0 {
        return Err("segmentation limits must be positive".into());
    }
    if profile.resolution.max_diagnostics == 0 {
        return Err("max_diagnostics must be positive".into());
    }
    if profile.logging.max_log_events_per_file > profile.logging.log_buffer_size {
        return Err("max_log_events_per_file exceeds log_buffer_size".into());
    }
    Ok(())
}

fn render(profile: &Profile, profile_name: &str) -> String {
    let files = &profile.file_processing;
    let sections = &profile.segmentation;
    let logging = &profile.logging;

    format!(
        r#"// Generated by build.rs from the `{profile_name}` profile.

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const LARGE_FILE_THRESHOLD: u64 = {};
        pub const MAX_LINE_COUNT: usize = {};
    }}

    pub mod segmentation {{
        pub const MAX_SECTIONS: usize = {};
        pub const MAX_HEADER_LINES: usize = {};
        pub const MAX_BODY_LINES: usize = {};
    }}

    pub mod resolution {{
        pub const MAX_DIAGNOSTICS: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_FILE: usize = {};
    }}
}}
"#,
        files.max_file_size,
        files.large_file_threshold,
        files.max_line_count,
        sections.max_sections,
        sections.max_header_lines,
        sections.max_body_lines,
        profile.resolution.max_diagnostics,
        logging.log_buffer_size,
        logging.max_log_message_length,
        logging.max_log_events_per_file,
    )
}
