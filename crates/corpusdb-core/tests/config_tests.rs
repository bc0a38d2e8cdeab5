use figment::{
    providers::{Format, Toml},
    Figment,
};

use corpusdb_core::config::Config;

#[test]
fn empty_figment_resolves_to_defaults() {
    let config = Config::from_figment(&Figment::new()).expect("defaults");

    assert_eq!(config.embedding.dimension, 1024);
    assert_eq!(config.icd.host, "localhost");
    assert_eq!(config.icd.port, 5432);
    assert_eq!(config.icd.database, "vnd");
    assert_eq!(config.legal.database, "npa");
    assert_eq!(config.legal.max_connections, 10);
    assert_eq!(config.legal.idle_timeout_secs, 30);
    assert_eq!(config.legal.connect_timeout_secs, 10);
}

#[test]
fn toml_overrides_fill_in_over_defaults() {
    let figment = Figment::new().merge(Toml::string(
        r#"
        [icd]
        host = "db1.internal"
        database = "vnd_prod"
        password = "secret"

        [legal]
        database = "npa_prod"
        max_connections = 4
        "#,
    ));
    let config = Config::from_figment(&figment).expect("config");

    assert_eq!(config.icd.host, "db1.internal");
    assert_eq!(config.icd.database, "vnd_prod");
    assert_eq!(config.icd.password, "secret");
    // Untouched fields keep their defaults.
    assert_eq!(config.icd.port, 5432);
    assert_eq!(config.legal.max_connections, 4);
    assert_eq!(config.legal.user, "postgres");
}

#[test]
fn later_provider_wins() {
    let figment = Figment::new()
        .merge(Toml::string("[icd]\ndatabase = \"vnd\"\nhost = \"base\""))
        .merge(Toml::string("[icd]\nhost = \"override\""));
    let config = Config::from_figment(&figment).expect("config");

    assert_eq!(config.icd.host, "override");
    assert_eq!(config.icd.database, "vnd");
}

#[test]
fn zero_dimension_is_rejected() {
    let figment = Figment::new().merge(Toml::string("[embedding]\ndimension = 0"));
    let err = Config::from_figment(&figment).expect_err("must fail");
    assert!(err.to_string().contains("dimension"));
}

#[test]
fn zero_pool_size_is_rejected() {
    let figment = Figment::new().merge(Toml::string(
        "[legal]\ndatabase = \"npa\"\nmax_connections = 0",
    ));
    let err = Config::from_figment(&figment).expect_err("must fail");
    assert!(err.to_string().contains("max_connections"));
}
