use crate::prelude::*;

use std::{error::Error, fmt::Display};

/// Error for invalid caller-supplied arguments, e.g. a table name the
/// connector does not provide. Fatal: the same call never succeeds on retry.
#[derive(Debug)]
pub struct ConfigError {
    pub err: anyhow::Error,
}

impl ConfigError {
    pub fn new(message: &str) -> Self {
        Self {
            err: anyhow!("{}", message),
        }
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        Display::fmt(&self.err, f)
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.err.source()
    }
}

impl From<anyhow::Error> for ConfigError {
    fn from(err: anyhow::Error) -> ConfigError {
        if err.is::<ConfigError>() {
            return err.downcast::<ConfigError>().unwrap();
        }
        Self { err }
    }
}

#[macro_export]
macro_rules! config_bail {
    ( $fmt:literal $(, $($arg:tt)*)?) => {
        return Err($crate::error::ConfigError::new(&format!($fmt $(, $($arg)*)?)).into())
    };
}

#[macro_export]
macro_rules! config_error {
    ( $fmt:literal $(, $($arg:tt)*)?) => {
        $crate::error::ConfigError::new(&format!($fmt $(, $($arg)*)?))
    };
}
