use std::fs;
use std::time::Duration;

use color_eyre::eyre::Report;
use rinth_api::persist::{PersistError, PersistedEntity};
use rinth_api::{AuthToken, Config, HttpTransport, Modrinth};
use rstest::{fixture, rstest};
use tempdir::TempDir;
use url::Url;

const TEMPDIR_PREFIX: &str = "rinth-api-test";

#[derive(Debug)]
#[must_use]
pub struct Inputs {
    pub dir: TempDir,
    pub config: Config,
}

#[fixture]
fn inputs() -> Inputs {
    // One `.unwrap()` here lets everything else use `?`.
    (|| -> Result<Inputs, Box<dyn std::error::Error>> {
        let config = Config {
            base_url: Url::parse("https://staging-api.modrinth.com/v2/")?,
            timeout_secs: Some(5),
            user_agent: Some("rinth-tests".into()),
            token: Some(AuthToken::try_new("mrp_secret".to_owned())?),
        };

        let dir = TempDir::new(TEMPDIR_PREFIX)?;
        config.write_to(dir.path())?;

        Ok(Inputs { dir, config })
    })()
    .unwrap()
}

#[rstest]
fn persistence(inputs: Inputs) -> Result<(), Report> {
    assert_eq!(Config::read_from(inputs.dir.path())?, inputs.config);
    assert_eq!(inputs.config.timeout(), Some(Duration::from_secs(5)));
    Ok(())
}

#[rstest]
fn token_is_stored_but_never_logged(inputs: Inputs) -> Result<(), Report> {
    let yml = fs::read_to_string(inputs.dir.path().join(Config::FILE_PATH))?;
    assert!(yml.contains("mrp_secret"));
    assert!(!format!("{:?}", inputs.config).contains("mrp_secret"));
    Ok(())
}

#[rstest]
fn missing_files_fall_back_to_defaults() -> Result<(), Report> {
    let dir = TempDir::new(TEMPDIR_PREFIX)?;
    let config = Config::load_or_default(dir.path())?;
    assert_eq!(config, Config::default());
    assert_eq!(config.base_url.as_str(), HttpTransport::DEFAULT_BASE_URL);
    assert_eq!(config.token, None);
    Ok(())
}

#[rstest]
fn partial_files_keep_defaults() -> Result<(), Report> {
    let dir = TempDir::new(TEMPDIR_PREFIX)?;
    fs::write(dir.path().join(Config::FILE_PATH), "timeout_secs: 12\n")?;
    let config = Config::load_or_default(dir.path())?;
    assert_eq!(config.timeout_secs, Some(12));
    assert_eq!(config.base_url.as_str(), HttpTransport::DEFAULT_BASE_URL);
    Ok(())
}

#[rstest]
#[case("token: '   '\n")]
#[case("base_url: not a url\n")]
fn invalid_files_are_errors(#[case] yml: &str) -> Result<(), Report> {
    let dir = TempDir::new(TEMPDIR_PREFIX)?;
    fs::write(dir.path().join(Config::FILE_PATH), yml)?;
    let error = Config::load_or_default(dir.path()).unwrap_err();
    assert!(matches!(error, PersistError::SerdeYml(_)));
    Ok(())
}

#[rstest]
fn clients_pick_up_the_token(inputs: Inputs) -> Result<(), Report> {
    let modrinth = Modrinth::from_config(&inputs.config)?;
    assert_eq!(modrinth.token(), inputs.config.token.as_ref());
    Ok(())
}
