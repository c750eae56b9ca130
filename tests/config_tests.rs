use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

use playlist_drop::config::Config;

#[test]
fn config_from_path_parses_toml_with_defaults() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("cfg.toml");
    let mut f = File::create(&cfg_path).unwrap();
    let toml = r#"
client_id = "cid"
client_secret = "csecret"
refresh_token = "rt"
playlist_id = "pl1"
port = 8080
"#;
    f.write_all(toml.as_bytes()).unwrap();
    let cfg = Config::from_path(&cfg_path).expect("parse config");
    assert_eq!(cfg.playlist_id, "pl1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.cache_ttl_secs, 600);
    assert_eq!(cfg.search_limit, 10);
    assert_eq!(cfg.page_size, 100);
    assert_eq!(cfg.api_base, "https://api.spotify.com/v1");
    assert!(cfg.missing_required().is_empty());
}

#[test]
fn from_lookup_reads_environment_names() {
    let vars: HashMap<&str, &str> = [
        ("CLIENT_ID", "cid"),
        ("CLIENT_SECRET", "csecret"),
        ("REFRESH_TOKEN", "rt"),
        ("PLAYLIST_ID", "pl1"),
        ("PORT", "4000"),
        ("SPOTIFY_API_BASE", "http://localhost:9999"),
        ("PLAYLIST_CACHE_TTL_SECS", "30"),
        ("LOG_DIR", "/tmp/drop-logs"),
    ]
    .into_iter()
    .collect();

    let cfg = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string())).expect("config");
    assert_eq!(cfg.client_id, "cid");
    assert_eq!(cfg.port, 4000);
    assert_eq!(cfg.bind_addr(), "0.0.0.0:4000");
    assert_eq!(cfg.api_base, "http://localhost:9999");
    assert_eq!(cfg.auth_base, "https://accounts.spotify.com");
    assert_eq!(cfg.cache_ttl_secs, 30);
    assert_eq!(cfg.log_dir.as_deref(), Some(std::path::Path::new("/tmp/drop-logs")));
}

#[test]
fn invalid_port_is_an_error() {
    let res = Config::from_lookup(|k| (k == "PORT").then(|| "eighty".to_string()));
    assert!(res.is_err());
}

#[test]
fn missing_credentials_are_reported_not_rejected() {
    let cfg = Config::from_lookup(|_| None).expect("defaults load");
    assert_eq!(
        cfg.missing_required(),
        vec!["client_id", "client_secret", "refresh_token", "playlist_id"]
    );
}

#[test]
fn debug_output_hides_secrets() {
    let cfg = Config {
        client_id: "cid".into(),
        client_secret: "super-secret".into(),
        refresh_token: "refresh-secret".into(),
        ..Config::default()
    };
    let s = format!("{:?}", cfg);
    assert!(s.contains("cid"));
    assert!(!s.contains("super-secret"));
    assert!(!s.contains("refresh-secret"));
}

#[test]
fn extreme_ttl_loads_and_page_size_is_clamped() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("cfg.toml");
    std::fs::write(
        &cfg_path,
        format!("cache_ttl_secs = {}\npage_size = 500\n", i64::MAX),
    )
    .unwrap();
    let cfg = Config::from_path(&cfg_path).expect("parse config");
    assert_eq!(cfg.cache_ttl_secs, i64::MAX as u64);
    assert_eq!(cfg.page_size, 100);

    let cfg = Config::from_lookup(|k| match k {
        "PLAYLIST_CACHE_TTL_SECS" => Some(u64::MAX.to_string()),
        "PLAYLIST_PAGE_SIZE" => Some("0".into()),
        _ => None,
    })
    .expect("config");
    assert_eq!(cfg.cache_ttl_secs, u64::MAX);
    assert_eq!(cfg.page_size, 1);
}
