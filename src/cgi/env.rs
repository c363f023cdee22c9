//! Snapshot of the CGI invocation environment.

use std::collections::HashMap;

/// Immutable view of the named string variables a web server hands to a CGI
/// program. Taken once at process entry; nothing else reads `std::env`.
#[derive(Debug, Clone, Default)]
pub struct CgiEnv {
    vars: HashMap<String, String>,
}

impl CgiEnv {
    /// Capture the current process environment.
    ///
    /// Non-UTF-8 values are converted lossily rather than dropped, so a
    /// malformed cookie cannot hide the rest of the request.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect();
        Self { vars }
    }

    /// Build an environment from explicit pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Like [`get`](Self::get), but treats an empty value as absent.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|v| !v.is_empty())
    }
}
