use std::env;

#[derive(Clone)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    /// Directive string handed to `EnvFilter`.
    pub(crate) filter: String,
    /// Warnings captured during config parsing so they can be logged after tracing is initialized.
    pub(crate) warnings: Vec<String>,
}

pub(crate) const DEFAULT_FILTER: &str = "info";

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        let component = component.trim().to_string();

        let service_name = env_string("SERVICE_NAME")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| component.clone());

        let environment = env_string("STAGE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let (filter, warnings) = filter_from(env_string("RUST_LOG"));

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
            filter,
            warnings,
        }
    }
}

fn filter_from(raw: Option<String>) -> (String, Vec<String>) {
    let mut warnings = Vec::new();
    let filter = match raw.map(|v| v.trim().to_string()) {
        Some(raw) if !raw.is_empty() => {
            if tracing_subscriber::EnvFilter::try_new(&raw).is_ok() {
                raw
            } else {
                warnings.push(format!(
                    "RUST_LOG is invalid (value: {raw}); defaulting to {DEFAULT_FILTER}"
                ));
                DEFAULT_FILTER.to_string()
            }
        }
        _ => DEFAULT_FILTER.to_string(),
    };
    (filter, warnings)
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_filter_uses_default_quietly() {
        let (filter, warnings) = filter_from(None);
        assert_eq!(filter, DEFAULT_FILTER);
        assert!(warnings.is_empty());
    }

    #[test]
    fn valid_filter_is_kept() {
        let (filter, warnings) = filter_from(Some("backend=debug,tower_http=info".to_string()));
        assert_eq!(filter, "backend=debug,tower_http=info");
        assert!(warnings.is_empty());
    }

    #[test]
    fn invalid_filter_falls_back_with_warning() {
        let (filter, warnings) = filter_from(Some("backend=loud[".to_string()));
        assert_eq!(filter, DEFAULT_FILTER);
        assert_eq!(warnings.len(), 1);
    }
}
