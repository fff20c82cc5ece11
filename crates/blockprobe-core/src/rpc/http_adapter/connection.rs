use reqwest::Url;

use crate::error::{CoreError, ErrorKind};

/// Accept only `http://` and `https://` node endpoints.
pub(super) fn parse_connection(connection: &str) -> Result<Url, CoreError> {
    let parsed = Url::parse(connection).map_err(|e| {
        CoreError::new(
            ErrorKind::Generic,
            format!("invalid endpoint `{connection}`: expected HTTP(S) URL ({e})"),
        )
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CoreError::generic(format!(
            "unsupported endpoint scheme `{other}`; expected http or https"
        ))),
    }
}
