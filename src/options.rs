//! Application options, loaded from RON.

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use color_eyre::Section;
use eyre::Context;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};

/// Global options for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Options {
    /// Directory where application data is stored (including logs).
    ///
    /// Default is `data`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Address the http server listens on.
    ///
    /// Default is `127.0.0.1:3000`.
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    /// Url of the OPMET query service that queries are posted to.
    ///
    /// Default is [`opmet::DEFAULT_ENDPOINT`].
    #[serde(default = "default_endpoint")]
    pub endpoint: url::Url,
}

fn default_data_dir() -> PathBuf {
    "data".into()
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_endpoint() -> url::Url {
    opmet::DEFAULT_ENDPOINT
        .parse()
        .expect("Unable to parse url")
}

impl Default for Options {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            listen_address: default_listen_address(),
            endpoint: default_endpoint(),
        }
    }
}

impl Options {
    /// Initialize the options using the `OPTIONS` environment variable, otherwise load from file
    /// `options.ron` if it exists, otherwise use the defaults. If `OPTIONS` contains a file path,
    /// it will load the options from that path, if `OPTIONS` contains a RON definition then it
    /// will load the options from the string contained in the variable.
    pub async fn initialize() -> eyre::Result<Self> {
        let options: Self = match std::env::var("OPTIONS") {
            Ok(options) => match ron::from_str(&options) {
                Ok(options) => {
                    println!("Options loaded from `OPTIONS` environment variable");
                    options
                }
                Err(error) => {
                    let path = PathBuf::from(options);
                    if !path.is_file() {
                        return Err(error)
                            .wrap_err(
                                "Error deserializing options from `OPTIONS` environment \
                                variable string",
                            )
                            .suggestion(
                                "`OPTIONS` should contain either options in RON format, or the \
                                path to an existing options file",
                            );
                    }
                    let options = Self::load(&path).await?;
                    println!(
                        "Options loaded from file specified in `OPTIONS` environment variable: {:?}",
                        path
                    );
                    options
                }
            },
            Err(std::env::VarError::NotPresent) => {
                let path = Path::new("options.ron");
                if path.is_file() {
                    let options = Self::load(path).await?;
                    println!("Options loaded from default file: {:?}", path);
                    options
                } else {
                    println!("No options file found, using default options");
                    Self::default()
                }
            }
            Err(error) => {
                return Err(error).wrap_err("Error reading `OPTIONS` environment variable")
            }
        };

        let options_str = ron::ser::to_string_pretty(&options, PrettyConfig::default())?;
        println!("Options{}", options_str);

        Ok(options)
    }

    async fn load(path: &Path) -> eyre::Result<Self> {
        let options_str = tokio::fs::read_to_string(path)
            .await
            .wrap_err_with(|| format!("Error reading options file: {:?}", path))?;
        ron::from_str(&options_str)
            .wrap_err_with(|| format!("Error deserializing options file: {:?}", path))
    }
}

#[cfg(test)]
mod test {
    use std::net::SocketAddr;

    use super::Options;

    #[test]
    fn test_deserialize_defaults() {
        let options: Options = ron::from_str("()").unwrap();
        assert_eq!(Options::default(), options);
        assert_eq!(
            "https://ogcie.iblsoft.com/ria/opmetquery/ria/dbr",
            options.endpoint.as_str()
        );
    }

    #[test]
    fn test_deserialize() {
        let options: Options = ron::from_str(
            r#"(
                data_dir: "/var/lib/opmet-query",
                listen_address: "0.0.0.0:8080",
                endpoint: "http://localhost:9000/dbr",
            )"#,
        )
        .unwrap();
        assert_eq!("/var/lib/opmet-query", options.data_dir.to_str().unwrap());
        assert_eq!(
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap(),
            options.listen_address
        );
        assert_eq!("http://localhost:9000/dbr", options.endpoint.as_str());
    }
}
