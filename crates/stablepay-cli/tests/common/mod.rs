/*
[INPUT]:  Mock server URIs and temporary directories
[OUTPUT]: Config files and fixtures for CLI tests
[POS]:    Test infrastructure - shared across CLI test modules
[UPDATE]: When the config schema or CLI fixtures change
*/

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use stablepay_adapter::WidgetConfig;

pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

/// YAML config pointing every service at `server_uri`
pub fn config_yaml(server_uri: &str) -> String {
    format!(
        r#"api:
  base_url: "{server_uri}"
  timeout_secs: 5
solana:
  network: local
  usdc_mint: "{USDC_MINT}"
org:
  networks:
    local: "{server_uri}"
conversion:
  base_url: "{server_uri}"
  currency_api_key: test-key
geolocation:
  url: "{server_uri}/v1/ip/country.json"
"#
    )
}

pub fn config_for(server_uri: &str) -> WidgetConfig {
    WidgetConfig::from_yaml(&config_yaml(server_uri)).unwrap()
}

pub fn write_config(dir: &Path, server_uri: &str) -> PathBuf {
    let path = dir.join("stablepay.yaml");
    fs::write(&path, config_yaml(server_uri)).unwrap();
    path
}
