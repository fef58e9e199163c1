use std::env;
use std::fmt::Debug;
use std::io;
use std::num::NonZeroU16;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::errors::{Error, ErrorKind, InvalidArgumentError};

macro_rules! define_env {
    ($(
        #[doc=$doc:expr]
        #[env($($env_name:expr),+)]
        $(#[parse=$parse:expr])?
        $(#[validate=$validate:expr])?
        $name:ident: $type:ty
    ),* $(,)?) => {
        /// Accessors for libpq-compatible environment variables.
        #[derive(Debug, Clone)]
        pub struct Env {
        }

        impl Env {
            $(
                #[doc = $doc]
                pub fn $name() -> ::std::result::Result<::std::option::Option<$type>, $crate::errors::Error> {
                    const ENV_NAMES: &[&str] = &[$(stringify!($env_name)),+];
                    let Some((name, s)) = $crate::env::get_envs(ENV_NAMES)? else {
                        return Ok(None);
                    };

                    // Either $parse or std::str::FromStr, without requiring
                    // every type to implement FromStr.
                    #[allow(unused_labels)]
                    let value: $type = 'block: {
                        $(
                            break 'block $parse(&name, &s)?;

                            #[cfg(all(debug_assertions, not(debug_assertions)))]
                        )?
                        $crate::env::parse(&name, &s)?
                    };

                    $($validate(name, &value)?;)?
                    Ok(Some(value))
                }
            )*
        }
    };
}

define_env!(
    /// The host to connect to, or a Unix socket directory.
    #[env(PGHOST)]
    #[validate=validate_host]
    host: String,

    /// The port to connect to.
    #[env(PGPORT)]
    port: NonZeroU16,

    /// The database name to connect to.
    #[env(PGDATABASE)]
    #[validate=non_empty_string]
    database: String,

    /// The username to connect as.
    #[env(PGUSER)]
    #[validate=non_empty_string]
    user: String,

    /// The password to use for authentication.
    #[env(PGPASSWORD)]
    password: String,

    /// Application name reported to the server.
    #[env(PGAPPNAME)]
    application_name: String,

    /// Connection string.
    #[env(PGDSN, DATABASE_URL)]
    dsn: Url,

    /// Maximum time to wait for a connection, in seconds.
    #[env(PGCONNECT_TIMEOUT)]
    #[parse=parse_seconds]
    connect_timeout: Duration,
);

fn non_empty_string(var: &str, s: &str) -> Result<(), Error> {
    if s.is_empty() {
        Err(create_var_error(var, "empty string"))
    } else {
        Ok(())
    }
}

fn validate_host(var: &str, s: &str) -> Result<(), Error> {
    if s.is_empty() {
        return Err(create_var_error(var, "invalid host: empty string"));
    } else if s.contains(',') {
        return Err(create_var_error(var, "invalid host: multiple hosts"));
    }
    Ok(())
}

fn parse_seconds(var: &str, s: &str) -> Result<Duration, Error> {
    let secs: u64 = parse(var, s)?;
    Ok(Duration::from_secs(secs))
}

#[inline(never)]
#[doc(hidden)]
pub fn parse<T: FromStr>(var: &str, s: &str) -> Result<T, Error>
where
    <T as FromStr>::Err: Debug,
{
    s.parse().map_err(|e| create_var_error(var, e))
}

#[inline(never)]
pub(crate) fn get_env(name: &str) -> Result<Option<String>, Error> {
    match env::var(name) {
        Ok(v) if v.is_empty() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(create_var_error(name, e)),
    }
}

#[inline(never)]
#[doc(hidden)]
pub fn get_envs(
    names: &'static [&'static str],
) -> Result<Option<(&'static str, String)>, Error> {
    let mut value = None;
    let mut found_vars = Vec::new();

    for name in names {
        if let Some(val) = get_env(name)? {
            found_vars.push(*name);
            if value.is_none() {
                value = Some((*name, val));
            }
        }
    }

    if found_vars.len() > 1 {
        log::warn!(
            "Multiple environment variables set: {}, using {}",
            found_vars.join(", "),
            found_vars[0],
        );
    }

    Ok(value)
}

pub(crate) fn create_var_error(var: &str, e: impl Debug) -> Error {
    InvalidArgumentError::with_source(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{var} is invalid: {e:?}"),
    ))
}
