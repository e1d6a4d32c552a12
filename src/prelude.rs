#![allow(unused_imports)]

pub use crate::{config_bail, config_error};

pub use anyhow::{Context, Result, anyhow, bail};
pub use async_trait::async_trait;
pub use futures::{StreamExt, stream, stream::BoxStream};
pub use log::{debug, error, info, trace, warn};
pub use serde::{Deserialize, Serialize};

pub use std::collections::BTreeMap;
